// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;

use crate::{error::*, frame::*, util::*};
use byteorder::{BigEndian, ByteOrder};

pub mod tcp;

type Result<T> = core::result::Result<T, Error>;

impl From<ExceptionResponse> for [u8; 2] {
    fn from(ex: ExceptionResponse) -> [u8; 2] {
        let fn_code: u8 = ex.function.into();
        [fn_code | 0x80, ex.exception as u8]
    }
}

impl<'r> TryFrom<&'r [u8]> for Request<'r> {
    type Error = Error;

    /// Decode a request PDU (function code followed by its payload).
    fn try_from(bytes: &'r [u8]) -> Result<Self> {
        let Some((&fn_code, data)) = bytes.split_first() else {
            return Err(Error::MissingFunctionCode);
        };

        use crate::frame::Request::*;
        use FunctionCode as f;

        let req = match FunctionCode::new(fn_code) {
            f::ReadCoils
            | f::ReadDiscreteInputs
            | f::ReadHoldingRegisters
            | f::ReadInputRegisters
            | f::WriteSingleCoil
            | f::WriteSingleRegister => {
                if data.len() != 4 {
                    return Err(Error::PayloadLength {
                        fn_code,
                        len: data.len(),
                    });
                }
                let (addr, value) = read_address_and_value(data);

                match FunctionCode::new(fn_code) {
                    f::ReadCoils => ReadCoils(addr, value),
                    f::ReadDiscreteInputs => ReadDiscreteInputs(addr, value),
                    f::ReadHoldingRegisters => ReadHoldingRegisters(addr, value),
                    f::ReadInputRegisters => ReadInputRegisters(addr, value),
                    f::WriteSingleCoil => WriteSingleCoil(addr, value),
                    f::WriteSingleRegister => WriteSingleRegister(addr, value),
                    _ => unreachable!(),
                }
            }
            f::WriteMultipleCoils => {
                let (address, quantity, payload) = split_multiple_write(fn_code, data)?;
                let coils = Coils {
                    quantity: usize::from(quantity),
                    data: payload,
                };
                WriteMultipleCoils(address, coils)
            }
            f::WriteMultipleRegisters => {
                let (address, quantity, payload) = split_multiple_write(fn_code, data)?;
                if payload.len() != usize::from(quantity) * 2 {
                    return Err(Error::ByteCount(data[4]));
                }
                let words = Data {
                    quantity: usize::from(quantity),
                    data: payload,
                };
                WriteMultipleRegisters(address, words)
            }
            // Any payload is accepted and ignored.
            f::ReportServerId => ReportServerId,
            f::Unsupported(code) => return Err(Error::FnCode(code)),
        };
        Ok(req)
    }
}

/// Split the payload of a multiple write request into
/// start address, quantity and the bytes announced by the byte count.
fn split_multiple_write(fn_code: u8, data: &[u8]) -> Result<(Address, Quantity, &[u8])> {
    if data.len() < 5 {
        return Err(Error::PayloadLength {
            fn_code,
            len: data.len(),
        });
    }
    let (address, quantity) = read_address_and_value(data);
    let byte_count = data[4];
    let payload = &data[5..];
    if payload.len() != usize::from(byte_count) {
        return Err(Error::ByteCount(byte_count));
    }
    Ok((address, quantity, payload))
}

impl Response<'_> {
    /// Check that the byte count fits into its single byte field.
    ///
    /// A response passing this check is at most 257 bytes long and
    /// always fits into the MBAP length field.
    pub fn check_len(&self) -> Result<()> {
        match self.byte_count() {
            Some(byte_count) if byte_count > usize::from(u8::MAX) => {
                Err(Error::ByteCountOverflow(byte_count))
            }
            _ => Ok(()),
        }
    }

    /// Append the serialized PDU to `buf`.
    ///
    /// The response must pass [`Response::check_len`].
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.pdu_len());
        buf.push(FunctionCode::from(*self).value());
        match *self {
            Self::ReadCoils(coils) | Self::ReadDiscreteInputs(coils) => {
                let packed = pack_coils(coils);
                push_byte_count(buf, packed.len());
                buf.extend_from_slice(&packed);
            }
            Self::ReadHoldingRegisters(words) | Self::ReadInputRegisters(words) => {
                push_byte_count(buf, words.len() * 2);
                for word in words {
                    push_u16(buf, *word);
                }
            }
            Self::WriteSingleCoil(address, value)
            | Self::WriteSingleRegister(address, value)
            | Self::WriteMultipleCoils(address, value)
            | Self::WriteMultipleRegisters(address, value) => {
                push_u16(buf, address);
                push_u16(buf, value);
            }
            Self::ReportServerId {
                server_id,
                run_indicator,
                additional_data,
            } => {
                push_byte_count(buf, 2 + additional_data.len());
                buf.push(server_id);
                buf.push(if run_indicator { 0xFF } else { 0x00 });
                buf.extend_from_slice(additional_data);
            }
        }
    }
}

impl ResponsePdu<'_> {
    /// Append the serialized PDU (regular or exception) to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self.0 {
            Ok(rsp) => rsp.encode(buf),
            Err(ex) => buf.extend_from_slice(&<[u8; 2]>::from(ex)),
        }
    }
}

fn push_byte_count(buf: &mut Vec<u8>, byte_count: usize) {
    debug_assert!(byte_count <= usize::from(u8::MAX));
    buf.push(byte_count as u8);
}

fn push_u16(buf: &mut Vec<u8>, value: u16) {
    let mut bytes = [0; 2];
    BigEndian::write_u16(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}
