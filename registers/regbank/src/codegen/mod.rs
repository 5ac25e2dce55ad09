// Licensed under the Apache-2.0 license

//! Artifact generation for finalized register banks.
//!
//! The generator refuses draft banks with
//! [`RegBankError::BankNotFinalized`](crate::RegBankError::BankNotFinalized)
//! and produces:
//!
//! - `rtl`: a SystemVerilog register file (address decoder, per-field
//!   storage and side effects, read-data mux).
//! - `manifest`: the address map as a [`Manifest`], also rendered to JSON.
//! - `header`: C preprocessor defines for software.

mod header;
mod rtl;


pub(crate) use header::{field_macros, offset_macro};

use crate::config::GeneratorConfig;
use crate::error::RegBankResult;
use crate::manifest::Manifest;
use crate::model::RegisterBank;
use log::info;

/// Every artifact generated for one bank.
#[derive(Clone, Debug)]
pub struct GeneratedArtifacts {
    /// Name of the HDL module, also used as the RTL file stem.
    pub module_name: String,
    pub rtl: String,
    pub manifest: Manifest,
    pub manifest_json: String,
    pub c_header: String,
}

impl GeneratedArtifacts {
    /// Suggested file names paired with their contents.
    pub fn files(&self) -> Vec<(String, &str)> {
        vec![
            (format!("{}.sv", self.module_name), self.rtl.as_str()),
            (
                format!("{}.json", self.manifest.bank_name),
                self.manifest_json.as_str(),
            ),
            (
                format!("{}.h", self.manifest.bank_name),
                self.c_header.as_str(),
            ),
        ]
    }
}

/// Emits artifacts for one finalized bank.
pub struct Generator<'a> {
    bank: &'a RegisterBank,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(bank: &'a RegisterBank, config: GeneratorConfig) -> RegBankResult<Self> {
        bank.ensure_finalized()?;
        Ok(Self { bank, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn module_name(&self) -> String {
        self.config.module_name(self.bank.name())
    }

    /// SystemVerilog source of the register file.
    pub fn rtl(&self) -> String {
        rtl::RtlWriter::new(self.bank, &self.config).generate()
    }

    pub fn manifest(&self) -> RegBankResult<Manifest> {
        Manifest::from_bank(self.bank)
    }

    /// C header with offsets, widths, masks and reset values.
    pub fn c_header(&self) -> String {
        header::generate(self.bank, &self.config)
    }

    pub fn generate(&self) -> RegBankResult<GeneratedArtifacts> {
        let manifest = self.manifest()?;
        let manifest_json = manifest.to_json()?;
        let artifacts = GeneratedArtifacts {
            module_name: self.module_name(),
            rtl: self.rtl(),
            manifest,
            manifest_json,
            c_header: self.c_header(),
        };
        info!(
            "generated artifacts for bank '{}' (module {})",
            self.bank.name(),
            artifacts.module_name
        );
        Ok(artifacts)
    }
}

/// Generates every artifact for `bank` with `config`.
pub fn generate(bank: &RegisterBank, config: &GeneratorConfig) -> RegBankResult<GeneratedArtifacts> {
    Generator::new(bank, config.clone())?.generate()
}
