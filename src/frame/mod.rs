// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

mod coils;
mod data;
pub(crate) mod tcp;

pub use self::{coils::*, data::*};
use byteorder::{BigEndian, ByteOrder};

/// A Modbus function code supported by the slave.
///
/// It is represented by an unsigned 8 bit integer.
/// Every code without a dedicated variant is [`FunctionCode::Unsupported`].
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`).
    ReadDiscreteInputs,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `05` (`0x05`).
    WriteSingleCoil,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,

    /// Modbus Function Code: `17` (`0x11`).
    ReportServerId,

    /// Any other function code.
    Unsupported(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            0x11 => Self::ReportServerId,
            code => Self::Unsupported(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::ReportServerId => 0x11,
            Self::Unsupported(code) => code,
        }
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<FunctionCode> for u8 {
    fn from(code: FunctionCode) -> Self {
        code.value()
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0>2X}", self.value())
    }
}

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and any other value.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// Raw PDU data
type RawData<'r> = &'r [u8];

/// A request represents a message from the client (master) to the server (slave).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'r> {
    ReadCoils(Address, Quantity),
    ReadDiscreteInputs(Address, Quantity),
    ReadHoldingRegisters(Address, Quantity),
    ReadInputRegisters(Address, Quantity),
    /// The raw value is kept because the response echoes it unchanged.
    WriteSingleCoil(Address, Word),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Coils<'r>),
    WriteMultipleRegisters(Address, Data<'r>),
    ReportServerId,
}

/// A server (slave) exception response.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionResponse {
    pub function: FunctionCode,
    pub exception: Exception,
}

/// Represents a message from the client (master) to the server (slave).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPdu<'r>(pub Request<'r>);

/// Represents a message from the server (slave) to the client (master).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePdu<'r>(pub Result<Response<'r>, ExceptionResponse>);

/// The response data of a successful request.
///
/// Read responses borrow the addressed part of the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'r> {
    ReadCoils(&'r [Coil]),
    ReadDiscreteInputs(&'r [Coil]),
    ReadHoldingRegisters(&'r [Word]),
    ReadInputRegisters(&'r [Word]),
    WriteSingleCoil(Address, Word),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Quantity),
    WriteMultipleRegisters(Address, Quantity),
    ReportServerId {
        server_id: u8,
        run_indicator: bool,
        additional_data: RawData<'r>,
    },
}

impl<'r> From<Request<'r>> for FunctionCode {
    fn from(r: Request<'r>) -> Self {
        use Request as R;

        match r {
            R::ReadCoils(_, _) => Self::ReadCoils,
            R::ReadDiscreteInputs(_, _) => Self::ReadDiscreteInputs,
            R::ReadHoldingRegisters(_, _) => Self::ReadHoldingRegisters,
            R::ReadInputRegisters(_, _) => Self::ReadInputRegisters,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
            R::ReportServerId => Self::ReportServerId,
        }
    }
}

impl<'r> From<Response<'r>> for FunctionCode {
    fn from(r: Response<'r>) -> Self {
        use Response as R;

        match r {
            R::ReadCoils(_) => Self::ReadCoils,
            R::ReadDiscreteInputs(_) => Self::ReadDiscreteInputs,
            R::ReadHoldingRegisters(_) => Self::ReadHoldingRegisters,
            R::ReadInputRegisters(_) => Self::ReadInputRegisters,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
            R::ReportServerId { .. } => Self::ReportServerId,
        }
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    ServerDeviceFailure = 0x04,
}

impl Exception {
    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::ServerDeviceFailure => "Server device failure",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.get_name())
    }
}

impl Response<'_> {
    /// Number of bytes required for a serialized PDU frame.
    #[must_use]
    pub const fn pdu_len(&self) -> usize {
        match *self {
            Self::ReadCoils(coils) | Self::ReadDiscreteInputs(coils) => {
                2 + crate::util::packed_coils_len(coils.len())
            }
            Self::ReadHoldingRegisters(words) | Self::ReadInputRegisters(words) => {
                2 + words.len() * 2
            }
            Self::WriteSingleCoil(_, _)
            | Self::WriteSingleRegister(_, _)
            | Self::WriteMultipleCoils(_, _)
            | Self::WriteMultipleRegisters(_, _) => 5,
            Self::ReportServerId {
                additional_data, ..
            } => 4 + additional_data.len(),
        }
    }

    /// Value of the single byte count field, if the response has one.
    #[must_use]
    pub const fn byte_count(&self) -> Option<usize> {
        match *self {
            Self::ReadCoils(_)
            | Self::ReadDiscreteInputs(_)
            | Self::ReadHoldingRegisters(_)
            | Self::ReadInputRegisters(_) => Some(self.pdu_len() - 2),
            Self::ReportServerId {
                additional_data, ..
            } => Some(2 + additional_data.len()),
            Self::WriteSingleCoil(_, _)
            | Self::WriteSingleRegister(_, _)
            | Self::WriteMultipleCoils(_, _)
            | Self::WriteMultipleRegisters(_, _) => None,
        }
    }
}

impl ResponsePdu<'_> {
    /// Number of bytes required for a serialized PDU frame.
    #[must_use]
    pub const fn pdu_len(&self) -> usize {
        match &self.0 {
            Ok(rsp) => rsp.pdu_len(),
            Err(_) => 2,
        }
    }
}

pub(crate) fn read_address_and_value(bytes: &[u8]) -> (Address, Word) {
    (
        BigEndian::read_u16(&bytes[0..2]),
        BigEndian::read_u16(&bytes[2..4]),
    )
}
