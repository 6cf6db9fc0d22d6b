// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use thiserror::Error;

use crate::frame::{Exception, ExceptionResponse, FunctionCode};

/// modbus-tcp-slave Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The buffer cannot hold an MBAP header and unit id.
    #[error("Request too short to contain MBAP header: {0} byte(s)")]
    TooShort(usize),
    /// The MBAP length field does not match the received bytes.
    #[error("Length Mismatch: Length Field: {length_field}, received: {received}")]
    LengthMismatch { length_field: usize, received: usize },
    /// The frame ends right after the unit id.
    #[error("PDU missing function code")]
    MissingFunctionCode,
    /// Unsupported function code
    #[error("Invalid function code: 0x{0:0>2X}")]
    FnCode(u8),
    /// The request payload has the wrong size for its function.
    #[error("Invalid data length for function 0x{fn_code:0>2X}: {len} byte(s)")]
    PayloadLength { fn_code: u8, len: usize },
    /// The byte count field does not match the payload.
    #[error("Invalid byte count: {0}")]
    ByteCount(u8),
    /// The addressed range does not fit into the table.
    #[error("Address out of range: start = {start}, quantity = {quantity}, table length = {len}")]
    OutOfRange {
        start: usize,
        quantity: usize,
        len: usize,
    },
    /// The byte count of a response does not fit into a single byte.
    #[error("Response byte count too large: {0}")]
    ByteCountOverflow(usize),
}

/// Why a request could not be answered regularly.
///
/// Every variant is turned into an exception response; see
/// [`Failure::exception_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A Modbus exception with a specific exception code.
    Exception(ExceptionResponse),
    /// The request payload does not match its function code, or the
    /// response cannot be encoded.
    Malformed(FunctionCode, Error),
    /// The MBAP frame itself is broken.
    ///
    /// The function code is `0` unless it could be read from the buffer.
    Frame(FunctionCode, Error),
}

impl Failure {
    /// The exception response sent back for this failure.
    ///
    /// Malformed payloads, unencodable responses and broken frames are
    /// reported as [`Exception::ServerDeviceFailure`].
    #[must_use]
    pub const fn exception_response(&self) -> ExceptionResponse {
        match *self {
            Self::Exception(response) => response,
            Self::Malformed(function, _) | Self::Frame(function, _) => ExceptionResponse {
                function,
                exception: Exception::ServerDeviceFailure,
            },
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exception(ExceptionResponse {
                function,
                exception,
            }) => write!(f, "{exception} (function {function})"),
            Self::Malformed(function, err) => {
                write!(f, "Malformed request (function {function}): {err}")
            }
            Self::Frame(_, err) => write!(f, "Malformed frame: {err}"),
        }
    }
}
