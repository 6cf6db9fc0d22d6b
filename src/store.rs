// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory data store of the slave.

use alloc::{vec, vec::Vec};

use crate::{
    error::Error,
    frame::{Address, Coil, Word},
};

/// Default number of items in each table.
pub const DEFAULT_TABLE_LEN: usize = 1000;

/// A fixed size table of coils or registers.
///
/// The length is set once on construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<T> {
    items: Vec<T>,
}

impl<T: Copy + Default> Table<T> {
    /// Create a table with `len` items set to their default value.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            items: vec![T::default(); len],
        }
    }
}

impl<T: Copy> Table<T> {
    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    ///  Returns `true` if the table has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read `quantity` consecutive items starting at `start`.
    pub fn read(&self, start: Address, quantity: usize) -> Result<&[T], Error> {
        let range = self.check_range(start, quantity)?;
        Ok(&self.items[range])
    }

    /// Write `values` into consecutive items starting at `start`.
    ///
    /// Nothing is written if the range does not fit.
    pub fn write(&mut self, start: Address, values: &[T]) -> Result<(), Error> {
        let range = self.check_range(start, values.len())?;
        self.items[range].copy_from_slice(values);
        Ok(())
    }

    /// All items
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// All items, e.g. for seeding read-only tables.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Check that `quantity` items starting at `start` fit into the table.
    pub fn check_range(
        &self,
        start: Address,
        quantity: usize,
    ) -> Result<core::ops::Range<usize>, Error> {
        let start = usize::from(start);
        let end = start + quantity;
        if end > self.items.len() {
            return Err(Error::OutOfRange {
                start,
                quantity,
                len: self.items.len(),
            });
        }
        Ok(start..end)
    }
}

/// The four addressable tables of a Modbus slave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    pub coils: Table<Coil>,
    pub discrete_inputs: Table<Coil>,
    pub holding_registers: Table<Word>,
    pub input_registers: Table<Word>,
}

impl DataStore {
    /// Create a store whose four tables hold `len` items each.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            coils: Table::new(len),
            discrete_inputs: Table::new(len),
            holding_registers: Table::new(len),
            input_registers: Table::new(len),
        }
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_LEN)
    }
}
