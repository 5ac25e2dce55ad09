// Licensed under the Apache-2.0 license

//! Access kinds supported by register bank fields.
//!
//! The set is closed. Textual names coming from descriptions are converted
//! with [`FromStr`], which rejects anything outside the set.

use crate::error::RegBankError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Read/write side-effect policy of a bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccessKind {
    /// Software reads a hardware-driven value; writes are ignored.
    ReadOnly,
    /// Plain flip-flop backed field.
    ReadWrite,
    /// Status bits set by hardware, cleared by writing `1`.
    Write2Clear,
    /// Writing `1` produces a one-cycle pulse; always reads `0`.
    Write2Pulse,
    /// Reads pop from a read-side store, writes push to a write-side store.
    SplitReadWrite,
}

impl AccessKind {
    pub const ALL: [AccessKind; 5] = [
        AccessKind::ReadOnly,
        AccessKind::ReadWrite,
        AccessKind::Write2Clear,
        AccessKind::Write2Pulse,
        AccessKind::SplitReadWrite,
    ];

    /// Canonical name, as written in bank descriptions and manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::ReadOnly => "ReadOnly",
            AccessKind::ReadWrite => "ReadWrite",
            AccessKind::Write2Clear => "Write2Clear",
            AccessKind::Write2Pulse => "Write2Pulse",
            AccessKind::SplitReadWrite => "SplitReadWrite",
        }
    }

    /// Whether the field keeps state that a reset value applies to.
    pub fn has_reset_value(&self) -> bool {
        match self {
            AccessKind::ReadWrite | AccessKind::Write2Clear => true,
            AccessKind::ReadOnly | AccessKind::Write2Pulse | AccessKind::SplitReadWrite => false,
        }
    }

    /// Whether the `activity_signal` option is meaningful for this kind.
    pub fn supports_activity_signal(&self) -> bool {
        matches!(self, AccessKind::SplitReadWrite)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessKind {
    type Err = RegBankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RegBankError::UnsupportedAccessKind(s.to_string()))
    }
}

impl TryFrom<String> for AccessKind {
    type Error = RegBankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccessKind> for String {
    fn from(kind: AccessKind) -> Self {
        kind.as_str().to_string()
    }
}
