// Licensed under the Apache-2.0 license

//! Declarative register-bank compiler.
//!
//! This crate takes a description of a memory-mapped control/status register
//! bank (registers, their word addresses, and the bitfields within them),
//! validates it, and generates a SystemVerilog register file, a JSON address
//! map and a C header from it. A cycle model of the generated register file
//! is provided for test harnesses.
//!
//! ## Usage
//!
//! ```
//! use registers_regbank::{AccessKind, GeneratorConfig, RegisterBank, RegisterFileSim};
//!
//! let mut bank = RegisterBank::new("can_aximm", 32, 32).unwrap();
//! let irq = bank.add_register(3, "IRQ").unwrap();
//! bank.add_field(irq, "rx_irq", AccessKind::Write2Clear, 0, 1).unwrap();
//! bank.add_field(irq, "rx_irq_mask", AccessKind::ReadWrite, 1, 1).unwrap();
//! bank.finalize().unwrap();
//!
//! let artifacts = registers_regbank::generate(&bank, &GeneratorConfig::default()).unwrap();
//! assert!(artifacts.rtl.contains("module can_aximm_regbank"));
//!
//! let mut sim = RegisterFileSim::new(&bank).unwrap();
//! sim.set_input("IRQ", "rx_irq", 1).unwrap();
//! sim.idle();
//! sim.set_input("IRQ", "rx_irq", 0).unwrap();
//! assert_eq!(sim.read(3), 0b01);
//! sim.write(3, 0b01);
//! assert_eq!(sim.read(3), 0b00);
//! ```
//!
//! Banks can also be loaded from a TOML or JSON description with
//! [`Manifest::parse`] and [`Manifest::build`].
//!
//! ## Module Organization
//!
//! - [`access`]: The closed set of access kinds ([`AccessKind`])
//! - [`model`]: Bank, register and field data model ([`RegisterBank`])
//! - [`validate`]: Whole-bank validation producing a [`ValidationReport`]
//! - [`semantics`]: Per-kind read/write behavior and hardware ports
//! - [`decode`]: Bus address to register decoding
//! - [`sim`]: Cycle model of the generated register file
//! - [`codegen`]: SystemVerilog, manifest and C header generation
//! - [`manifest`]: Address-map manifest and description format
//! - [`config`]: Generator configuration ([`GeneratorConfig`], [`NameConfig`])
//! - [`util`]: Name conversion and formatting utilities

pub mod access;
pub mod codegen;
pub mod config;
pub mod decode;
pub mod manifest;
pub mod model;
pub mod semantics;
pub mod sim;
pub mod util;
pub mod validate;

mod error;

// Re-export main public API
pub use access::AccessKind;
pub use codegen::{generate, GeneratedArtifacts, Generator};
pub use config::{GeneratorConfig, NameConfig};
pub use decode::{AddressDecoder, Decoded};
pub use error::{RegBankError, RegBankResult, ValidationReport};
pub use manifest::{Manifest, ManifestField, ManifestFormat, ManifestRegister};
pub use model::{BankState, Field, FieldDef, FieldHandle, Register, RegisterBank, RegisterHandle};
pub use semantics::{FieldBehavior, PortRole};
pub use sim::{BusCycle, RegisterFileSim};
