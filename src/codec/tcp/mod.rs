// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP

use super::*;

pub mod server;
pub use crate::frame::tcp::*;

/// Size of the MBAP header including the unit id.
pub const HEADER_LEN: usize = 7;

/// Number of MBAP bytes not covered by the length field.
const LENGTH_FIELD_END: usize = 6;

/// An extracted TCP PDU frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub hdr: Header,
    pub pdu: &'a [u8],
}

/// A frame that could not be decoded.
///
/// Carries everything that could be recovered from the buffer so that
/// an exception response can still be addressed to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameError {
    /// Header fields, `0` where not available.
    pub hdr: Header,
    /// The function code byte, `0` if the buffer ends before it.
    pub fn_code: u8,
    pub error: Error,
}

/// Decode a single MBAP framed request from `buf`.
///
/// The buffer must contain exactly one frame.
pub fn decode(buf: &[u8]) -> core::result::Result<DecodedFrame<'_>, FrameError> {
    if buf.len() < HEADER_LEN {
        return Err(FrameError {
            hdr: Header::default(),
            fn_code: 0,
            error: Error::TooShort(buf.len()),
        });
    }
    let (mbap, pdu) = buf.split_at(HEADER_LEN);
    let hdr = Header {
        transaction_id: BigEndian::read_u16(&mbap[0..2]),
        protocol_id: BigEndian::read_u16(&mbap[2..4]),
        unit_id: mbap[6],
    };
    let length_field = usize::from(BigEndian::read_u16(&mbap[4..6]));
    let received = buf.len() - LENGTH_FIELD_END;
    if length_field != received {
        return Err(FrameError {
            hdr,
            fn_code: pdu.first().copied().unwrap_or_default(),
            error: Error::LengthMismatch {
                length_field,
                received,
            },
        });
    }
    if pdu.is_empty() {
        return Err(FrameError {
            hdr,
            fn_code: 0,
            error: Error::MissingFunctionCode,
        });
    }
    Ok(DecodedFrame { hdr, pdu })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_usual_tcp_request_frame() {
        let buf = &[
            0x01, // transaction id
            0x02, // transaction id
            0x00, // protocol id
            0x00, // protocol id
            0x00, // length
            0x06, // length
            0x11, // unit id
            0x03, // function code
            0x00, // start
            0x6B, // start
            0x00, // quantity
            0x03, // quantity
        ];
        let DecodedFrame { hdr, pdu } = decode(buf).unwrap();
        assert_eq!(hdr.transaction_id, 258);
        assert_eq!(hdr.protocol_id, 0);
        assert_eq!(hdr.unit_id, 0x11);
        assert_eq!(pdu, &[0x03, 0x00, 0x6B, 0x00, 0x03]);
    }

    #[test]
    fn decode_too_short_frame() {
        for len in 0..HEADER_LEN {
            let buf = [0x42; HEADER_LEN];
            let err = decode(&buf[..len]).err().unwrap();
            assert_eq!(err.error, Error::TooShort(len));
            assert_eq!(err.hdr, Header::default());
            assert_eq!(err.fn_code, 0);
        }
    }

    #[test]
    fn decode_length_mismatch() {
        let buf = &[0x79, 0x56, 0x00, 0x00, 0x00, 0x06, 0x01, 0x0F, 0x00, 0x16];
        let err = decode(buf).err().unwrap();
        assert_eq!(
            err.error,
            Error::LengthMismatch {
                length_field: 6,
                received: 4
            }
        );
        assert_eq!(err.hdr.transaction_id, 0x7956);
        assert_eq!(err.hdr.unit_id, 0x01);
        assert_eq!(err.fn_code, 0x0F);
    }

    #[test]
    fn decode_length_mismatch_without_function_code() {
        let buf = &[0x00, 0x07, 0x00, 0x00, 0x00, 0x02, 0x05];
        let err = decode(buf).err().unwrap();
        assert_eq!(
            err.error,
            Error::LengthMismatch {
                length_field: 2,
                received: 1
            }
        );
        assert_eq!(err.hdr.transaction_id, 7);
        assert_eq!(err.hdr.unit_id, 0x05);
        assert_eq!(err.fn_code, 0);
    }

    #[test]
    fn decode_trailing_bytes_are_a_length_mismatch() {
        let buf = &[0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x01, 0x11, 0xFF];
        assert!(matches!(
            decode(buf).err().unwrap().error,
            Error::LengthMismatch { .. }
        ));
    }

    #[test]
    fn decode_missing_function_code() {
        let buf = &[0x00, 0x09, 0x00, 0x02, 0x00, 0x01, 0x07];
        let err = decode(buf).err().unwrap();
        assert_eq!(err.error, Error::MissingFunctionCode);
        assert_eq!(
            err.hdr,
            Header {
                transaction_id: 9,
                protocol_id: 2,
                unit_id: 7,
            }
        );
        assert_eq!(err.fn_code, 0);
    }

    #[test]
    fn decode_keeps_foreign_protocol_id() {
        let buf = &[0x00, 0x2a, 0x00, 0x01, 0x00, 0x02, 0x12, 0x11];
        let DecodedFrame { hdr, pdu } = decode(buf).unwrap();
        assert_eq!(hdr.protocol_id, 1);
        assert_eq!(pdu, &[0x11]);
    }
}
