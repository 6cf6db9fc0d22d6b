// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod codec;
mod error;
mod frame;
mod slave;
mod store;
pub mod util;

pub use codec::tcp;
pub use error::*;
pub use frame::*;
pub use slave::*;
pub use store::*;
