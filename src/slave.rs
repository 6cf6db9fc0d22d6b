// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request processing against a [`DataStore`].
//!
//! ```
//! use modbus_tcp_slave::{DataStore, process_request};
//!
//! let mut store = DataStore::default();
//! store.holding_registers.write(0, &[0x1234]).unwrap();
//!
//! // Read Holding Registers, start = 0, quantity = 1
//! let request = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x01];
//! let response = process_request(&mut store, &request);
//! assert_eq!(
//!     response,
//!     [0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0x12, 0x34]
//! );
//! ```

use alloc::vec::Vec;

use crate::{
    codec::tcp::{
        RequestAdu, ResponseAdu, UnitId,
        server::{RequestError, decode_request, encode_response},
    },
    error::{Error, Failure},
    frame::*,
    store::{DEFAULT_TABLE_LEN, DataStore},
    util::u16_coil_to_bool,
};

/// Identification bytes appended to a Report Slave ID response.
pub const DEFAULT_IDENTIFICATION: &[u8] = b"Demo Device";

/// Slave configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of items in each of the four tables.
    pub table_len: usize,
    /// Device specific data of the Report Slave ID response.
    pub identification: Vec<u8>,
    /// Run indicator status of the Report Slave ID response.
    pub run_indicator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_len: DEFAULT_TABLE_LEN,
            identification: DEFAULT_IDENTIFICATION.to_vec(),
            run_indicator: true,
        }
    }
}

/// A Modbus TCP slave owning its data store.
///
/// Transports serving several connections must serialize calls to
/// [`Slave::process_request`], e.g. by keeping the slave behind a mutex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slave {
    store: DataStore,
    identification: Vec<u8>,
    run_indicator: bool,
}

impl Slave {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let Config {
            table_len,
            identification,
            run_indicator,
        } = config;
        Self {
            store: DataStore::new(table_len),
            identification,
            run_indicator,
        }
    }

    /// Serve an existing store with the default identification.
    #[must_use]
    pub fn with_store(store: DataStore) -> Self {
        let Config {
            identification,
            run_indicator,
            ..
        } = Config::default();
        Self {
            store,
            identification,
            run_indicator,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DataStore {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> DataStore {
        self.store
    }

    /// Process one MBAP framed request and return the framed response.
    pub fn process_request(&mut self, request: &[u8]) -> Vec<u8> {
        let identity = Identity {
            run_indicator: self.run_indicator,
            additional_data: &self.identification,
        };
        process(&mut self.store, identity, request)
    }
}

impl Default for Slave {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Process one MBAP framed request and return the framed response.
///
/// Never fails: every problem with the request is answered with an
/// exception response.
pub fn process_request(store: &mut DataStore, request: &[u8]) -> Vec<u8> {
    let identity = Identity {
        run_indicator: true,
        additional_data: DEFAULT_IDENTIFICATION,
    };
    process(store, identity, request)
}

#[derive(Debug, Clone, Copy)]
struct Identity<'a> {
    run_indicator: bool,
    additional_data: &'a [u8],
}

fn process(store: &mut DataStore, identity: Identity<'_>, request: &[u8]) -> Vec<u8> {
    let (hdr, result) = match decode_request(request) {
        Ok(RequestAdu {
            hdr,
            pdu: RequestPdu(req),
        }) => {
            log::debug!(
                "Processing request {req:?} (transaction {}, unit {})",
                hdr.transaction_id,
                hdr.unit_id
            );
            (hdr, execute(store, identity, hdr.unit_id, req))
        }
        Err(RequestError { hdr, failure }) => (hdr, Err(failure)),
    };
    let pdu = ResponsePdu(result.map_err(|failure| {
        log::debug!(
            "Responding with exception to transaction {}: {failure}",
            hdr.transaction_id
        );
        failure.exception_response()
    }));
    encode_response(ResponseAdu { hdr, pdu })
}

/// Apply `req` to the store and build the response.
fn execute<'a>(
    store: &'a mut DataStore,
    identity: Identity<'a>,
    unit_id: UnitId,
    req: Request<'_>,
) -> Result<Response<'a>, Failure> {
    let function = FunctionCode::from(req);
    let illegal_address = |err: Error| {
        log::debug!("Rejecting {function} request: {err}");
        Failure::Exception(ExceptionResponse {
            function,
            exception: Exception::IllegalDataAddress,
        })
    };

    use Request as R;

    let rsp = match req {
        R::ReadCoils(start, quantity) => Response::ReadCoils(
            store
                .coils
                .read(start, quantity.into())
                .map_err(illegal_address)?,
        ),
        R::ReadDiscreteInputs(start, quantity) => Response::ReadDiscreteInputs(
            store
                .discrete_inputs
                .read(start, quantity.into())
                .map_err(illegal_address)?,
        ),
        R::ReadHoldingRegisters(start, quantity) => Response::ReadHoldingRegisters(
            store
                .holding_registers
                .read(start, quantity.into())
                .map_err(illegal_address)?,
        ),
        R::ReadInputRegisters(start, quantity) => Response::ReadInputRegisters(
            store
                .input_registers
                .read(start, quantity.into())
                .map_err(illegal_address)?,
        ),
        R::WriteSingleCoil(address, value) => {
            store
                .coils
                .write(address, &[u16_coil_to_bool(value)])
                .map_err(illegal_address)?;
            Response::WriteSingleCoil(address, value)
        }
        R::WriteSingleRegister(address, value) => {
            store
                .holding_registers
                .write(address, &[value])
                .map_err(illegal_address)?;
            Response::WriteSingleRegister(address, value)
        }
        R::WriteMultipleCoils(start, coils) => {
            // The announced quantity must fit even if fewer coils were sent.
            store
                .coils
                .check_range(start, coils.len())
                .map_err(illegal_address)?;
            store
                .coils
                .write(start, &coils.to_vec())
                .map_err(illegal_address)?;
            Response::WriteMultipleCoils(start, coils.len() as Quantity)
        }
        R::WriteMultipleRegisters(start, words) => {
            store
                .holding_registers
                .write(start, &words.to_vec())
                .map_err(illegal_address)?;
            Response::WriteMultipleRegisters(start, words.len() as Quantity)
        }
        R::ReportServerId => Response::ReportServerId {
            server_id: unit_id,
            run_indicator: identity.run_indicator,
            additional_data: identity.additional_data,
        },
    };
    rsp.check_len().map_err(|err| {
        log::warn!("Cannot encode {function} response: {err}");
        Failure::Malformed(function, err)
    })?;
    Ok(rsp)
}
