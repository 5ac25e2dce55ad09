// Licensed under the Apache-2.0 license

//! Address decoding for a finalized register bank.

use crate::error::RegBankResult;
use crate::model::{RegisterBank, RegisterHandle};
use std::collections::BTreeMap;

/// Result of decoding one bus address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    Register(RegisterHandle),
    /// No register lives here: reads return the unmapped value, writes are
    /// dropped. This is not an error at this layer.
    Unmapped,
}

/// Maps bus addresses to registers.
#[derive(Clone, Debug)]
pub struct AddressDecoder {
    address_mask: u64,
    table: BTreeMap<u64, RegisterHandle>,
}

impl AddressDecoder {
    pub fn new(bank: &RegisterBank) -> RegBankResult<Self> {
        bank.ensure_finalized()?;
        let table = bank
            .register_handles()
            .map(|(handle, reg)| (reg.address, handle))
            .collect();
        Ok(Self {
            address_mask: crate::util::low_mask(bank.address_width()),
            table,
        })
    }

    /// Decodes `address`. Bits above the bank's address width are ignored,
    /// as the generated logic only sees `address_width` bits.
    pub fn decode(&self, address: u64) -> Decoded {
        match self.table.get(&(address & self.address_mask)) {
            Some(&handle) => Decoded::Register(handle),
            None => Decoded::Unmapped,
        }
    }
}
