// Licensed under the Apache-2.0 license

use std::fmt;
use thiserror::Error;

/// Errors raised while declaring, validating or generating a register bank.
///
/// Definition-time variants are returned by the offending builder call and
/// leave the bank untouched. [`RegBankError::Validation`] collects every
/// violation found when a bank is finalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegBankError {
    #[error("register address {address:#x} is already used by register '{existing}'")]
    DuplicateAddress { address: u64, existing: String },

    #[error("{scope} already declares a {kind} named '{name}'")]
    DuplicateName {
        scope: String,
        kind: &'static str,
        name: String,
    },

    #[error(
        "field '{field}' bits [{msb}:{lsb}] overlap field '{existing}' bits [{existing_msb}:{existing_lsb}] in register '{register}'"
    )]
    FieldOverlap {
        register: String,
        field: String,
        msb: u32,
        lsb: u32,
        existing: String,
        existing_msb: u32,
        existing_lsb: u32,
    },

    #[error(
        "field '{field}' in register '{register}' spans bits {bit_offset}+{bit_width}, beyond the {data_width}-bit data width"
    )]
    FieldOutOfRange {
        register: String,
        field: String,
        bit_offset: u32,
        bit_width: u32,
        data_width: u32,
    },

    #[error("field '{field}' in register '{register}' has zero width")]
    ZeroWidthField { register: String, field: String },

    #[error("unsupported access kind '{0}'")]
    UnsupportedAccessKind(String),

    #[error("register '{name}' address {address:#x} does not fit a {address_width}-bit address")]
    AddressOutOfRange {
        name: String,
        address: u64,
        address_width: u32,
    },

    #[error("bank '{bank}' has invalid geometry: {reason}")]
    InvalidBankGeometry { bank: String, reason: String },

    #[error("'{0}' is not a valid HDL identifier")]
    InvalidIdentifier(String),

    #[error("generated identifier '{identifier}' is produced by both {first} and {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("field '{register}.{field}' requests an activity signal but is {kind}, not SplitReadWrite")]
    InvalidActivitySignal {
        register: String,
        field: String,
        kind: String,
    },

    #[error("reset value {value:#x} of field '{register}.{field}' does not fit {bit_width} bits")]
    ResetValueOutOfRange {
        register: String,
        field: String,
        value: u64,
        bit_width: u32,
    },

    #[error("field '{register}.{field}' is {kind}, which has no reset value, but {value:#x} was given")]
    ResetValueNotApplicable {
        register: String,
        field: String,
        kind: String,
        value: u64,
    },

    #[error("bank '{0}' is finalized and can no longer be modified")]
    BankFinalized(String),

    #[error("bank '{0}' has not been finalized")]
    BankNotFinalized(String),

    #[error("unknown register {0}")]
    UnknownRegister(String),

    #[error("unknown field {0}")]
    UnknownField(String),

    #[error("invalid bank description: {0}")]
    Description(String),

    #[error("{0}")]
    Validation(ValidationReport),
}

/// Result type for register bank operations.
pub type RegBankResult<T> = std::result::Result<T, RegBankError>;

/// Every invariant violation found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub bank: String,
    pub violations: Vec<RegBankError>,
}

impl ValidationReport {
    pub fn new(bank: &str) -> Self {
        Self {
            bank: bank.to_string(),
            violations: Vec::new(),
        }
    }

    pub fn push(&mut self, violation: RegBankError) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegBankError> {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bank '{}' failed validation with {} violation(s)",
            self.bank,
            self.violations.len()
        )?;
        for (i, v) in self.violations.iter().enumerate() {
            write!(f, "\n  {}: {v}", i + 1)?;
        }
        Ok(())
    }
}
