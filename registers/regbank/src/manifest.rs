// Licensed under the Apache-2.0 license

//! Address-map manifest.
//!
//! The manifest is both the machine-readable artifact emitted for a
//! finalized bank and the declarative input format: a description file is
//! a manifest whose optional per-field keys may be omitted. Building a bank
//! from a manifest replays the same `add_register`/`add_field` calls a
//! caller would make, so every definition-time error is reported exactly as
//! it would be from code.
//!
//! ```text
//! {
//!   "bank_name": "can_aximm",
//!   "address_width": 32,
//!   "data_width": 32,
//!   "registers": [
//!     { "address": 3, "name": "IRQ", "fields": [
//!         { "name": "rx_data_irq", "access_kind": "Write2Clear",
//!           "bit_offset": 0, "bit_width": 1, "description": "...",
//!           "activity_signal": false, "reset_value": 0 } ] } ]
//! }
//! ```

use crate::error::{RegBankError, RegBankResult};
use crate::model::{FieldDef, RegisterBank};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub bank_name: String,
    pub address_width: u32,
    pub data_width: u32,
    #[serde(default)]
    pub registers: Vec<ManifestRegister>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRegister {
    pub address: u64,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ManifestField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestField {
    pub name: String,
    /// Kept as text so that an unknown kind surfaces as
    /// [`RegBankError::UnsupportedAccessKind`] when the bank is built.
    pub access_kind: String,
    pub bit_offset: u32,
    pub bit_width: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activity_signal: bool,
    #[serde(default)]
    pub reset_value: u64,
}

/// Text formats a manifest can be read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    /// Picks the format from a file extension; anything but `toml` is JSON.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(e) if e.eq_ignore_ascii_case("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

impl Manifest {
    /// Describes a finalized bank.
    pub fn from_bank(bank: &RegisterBank) -> RegBankResult<Self> {
        bank.ensure_finalized()?;
        Ok(Self {
            bank_name: bank.name().to_string(),
            address_width: bank.address_width(),
            data_width: bank.data_width(),
            registers: bank
                .registers()
                .map(|reg| ManifestRegister {
                    address: reg.address,
                    name: reg.name.clone(),
                    fields: reg
                        .fields
                        .iter()
                        .map(|f| ManifestField {
                            name: f.name.clone(),
                            access_kind: f.access_kind.to_string(),
                            bit_offset: f.bit_offset,
                            bit_width: f.bit_width,
                            description: f.description.clone(),
                            activity_signal: f.activity_signal,
                            reset_value: f.reset_value,
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    pub fn parse(text: &str, format: ManifestFormat) -> RegBankResult<Self> {
        match format {
            ManifestFormat::Json => Self::from_json(text),
            ManifestFormat::Toml => Self::from_toml(text),
        }
    }

    pub fn from_json(text: &str) -> RegBankResult<Self> {
        serde_json::from_str(text).map_err(|e| RegBankError::Description(e.to_string()))
    }

    pub fn from_toml(text: &str) -> RegBankResult<Self> {
        toml::from_str(text).map_err(|e| RegBankError::Description(e.to_string()))
    }

    pub fn to_json(&self) -> RegBankResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RegBankError::Description(e.to_string()))
    }

    /// Builds and finalizes the described bank.
    pub fn build(&self) -> RegBankResult<RegisterBank> {
        let mut bank = self.build_draft()?;
        bank.finalize()?;
        Ok(bank)
    }

    /// Builds the described bank without finalizing it.
    pub fn build_draft(&self) -> RegBankResult<RegisterBank> {
        let mut bank = RegisterBank::new(&self.bank_name, self.address_width, self.data_width)?;
        for reg in &self.registers {
            let handle = bank.add_register(reg.address, &reg.name)?;
            for f in &reg.fields {
                let def = FieldDef::new(&f.name, f.access_kind.parse()?, f.bit_offset, f.bit_width)
                    .description(&f.description)
                    .activity_signal(f.activity_signal)
                    .reset_value(f.reset_value);
                bank.add_field_def(handle, def)?;
            }
        }
        debug!(
            "built bank '{}' from manifest: {} register(s)",
            self.bank_name,
            self.registers.len()
        );
        Ok(bank)
    }
}
