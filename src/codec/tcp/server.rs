// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP server (slave) specific functions.
use super::*;

/// A request that cannot be executed.
///
/// The header holds the best available fields for addressing the
/// exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestError {
    pub hdr: Header,
    pub failure: Failure,
}

/// Decode a TCP request.
pub fn decode_request(buf: &[u8]) -> core::result::Result<RequestAdu<'_>, RequestError> {
    let DecodedFrame { hdr, pdu } = decode(buf).map_err(|FrameError { hdr, fn_code, error }| {
        log::warn!("Failed to decode request frame: {error}");
        RequestError {
            hdr,
            failure: Failure::Frame(FunctionCode::new(fn_code), error),
        }
    })?;
    if hdr.protocol_id != 0 {
        log::warn!(
            "Protocol not Modbus(0), received {} instead",
            hdr.protocol_id
        );
    }
    Request::try_from(pdu)
        .map(|req| RequestAdu {
            hdr,
            pdu: RequestPdu(req),
        })
        .map_err(|error| {
            let function = FunctionCode::new(pdu.first().copied().unwrap_or_default());
            let failure = match error {
                Error::FnCode(_) => Failure::Exception(ExceptionResponse {
                    function,
                    exception: Exception::IllegalFunction,
                }),
                error => {
                    log::warn!("Failed to decode request PDU: {error}");
                    Failure::Malformed(function, error)
                }
            };
            RequestError { hdr, failure }
        })
}

/// Encode a TCP response.
#[must_use]
pub fn encode_response(adu: ResponseAdu<'_>) -> Vec<u8> {
    let ResponseAdu { hdr, pdu } = adu;
    let pdu_len = pdu.pdu_len();
    let mut buf = Vec::with_capacity(HEADER_LEN + pdu_len);
    buf.resize(LENGTH_FIELD_END, 0);
    BigEndian::write_u16(&mut buf[0..2], hdr.transaction_id);
    BigEndian::write_u16(&mut buf[2..4], hdr.protocol_id);
    debug_assert!(pdu_len < usize::from(u16::MAX));
    BigEndian::write_u16(&mut buf[4..6], (pdu_len + 1) as u16);
    buf.push(hdr.unit_id);
    pdu.encode(&mut buf);
    debug_assert_eq!(buf.len(), HEADER_LEN + pdu_len);
    buf
}
