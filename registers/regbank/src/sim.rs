// Licensed under the Apache-2.0 license

//! Cycle model of the generated register file.
//!
//! [`RegisterFileSim`] behaves exactly like the SystemVerilog emitted by
//! [`crate::codegen`]: one bus access per [`RegisterFileSim::tick`], read
//! data derived combinationally from the state at the start of the cycle,
//! and all side effects applied at the clock edge that ends it. Test
//! harnesses use it to check software drivers against a bank without
//! running an HDL simulator.

use crate::config::GeneratorConfig;
use crate::decode::{AddressDecoder, Decoded};
use crate::error::{RegBankError, RegBankResult};
use crate::model::RegisterBank;
use crate::semantics::{FieldAccess, FieldBehavior, FieldState, PortRole};
use log::{debug, trace};

/// Bus signals for one clock cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusCycle {
    pub address: u64,
    pub wdata: u64,
    pub write: bool,
    pub read: bool,
}

impl BusCycle {
    /// No strobe asserted.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn read(address: u64) -> Self {
        Self {
            address,
            read: true,
            ..Default::default()
        }
    }

    pub fn write(address: u64, wdata: u64) -> Self {
        Self {
            address,
            wdata,
            write: true,
            ..Default::default()
        }
    }

    /// Address and data driven without either strobe.
    pub fn address_only(address: u64, wdata: u64) -> Self {
        Self {
            address,
            wdata,
            ..Default::default()
        }
    }
}

struct FieldSim {
    name: String,
    behavior: FieldBehavior,
    state: FieldState,
    input: u64,
}

struct RegisterSim {
    name: String,
    fields: Vec<FieldSim>,
}

/// Behavioral model of one finalized register bank.
pub struct RegisterFileSim {
    bank_name: String,
    data_mask: u64,
    unmapped_read_value: u64,
    decoder: AddressDecoder,
    /// Indexed like the bank's register arena.
    registers: Vec<RegisterSim>,
    cycles: u64,
}

impl RegisterFileSim {
    /// Builds a model of `bank` with the default generator configuration.
    pub fn new(bank: &RegisterBank) -> RegBankResult<Self> {
        Self::with_config(bank, &GeneratorConfig::with_defaults())
    }

    pub fn with_config(bank: &RegisterBank, config: &GeneratorConfig) -> RegBankResult<Self> {
        let decoder = AddressDecoder::new(bank)?;
        let registers = bank
            .registers_in_declaration_order()
            .iter()
            .map(|reg| RegisterSim {
                name: reg.name.clone(),
                fields: reg
                    .fields
                    .iter()
                    .map(|field| {
                        let behavior = FieldBehavior::expand(&reg.name, field);
                        FieldSim {
                            name: field.name.clone(),
                            state: behavior.reset_state(),
                            behavior,
                            input: 0,
                        }
                    })
                    .collect(),
            })
            .collect();
        Ok(Self {
            bank_name: bank.name().to_string(),
            data_mask: bank.data_mask(),
            unmapped_read_value: config.unmapped_read_value & bank.data_mask(),
            decoder,
            registers,
            cycles: 0,
        })
    }

    /// Returns every field to its reset state. Hardware inputs are kept.
    pub fn reset(&mut self) {
        for field in self.registers.iter_mut().flat_map(|r| r.fields.iter_mut()) {
            field.state = field.behavior.reset_state();
        }
        debug!("{}: reset", self.bank_name);
    }

    /// Number of ticks since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Drives the hardware input of a field. The value is held until changed.
    ///
    /// ReadOnly fields take their value, Write2Clear fields their per-bit set
    /// events, SplitReadWrite fields the head of their read-side store.
    pub fn set_input(&mut self, register: &str, field: &str, value: u64) -> RegBankResult<()> {
        let f = self.field_mut(register, field)?;
        if f.behavior.input_port().is_none() {
            return Err(RegBankError::UnknownField(format!(
                "'{register}.{field}' has no hardware input"
            )));
        }
        f.input = value & f.behavior.mask();
        Ok(())
    }

    /// Value currently driven on one of a field's output ports.
    pub fn output(&self, register: &str, field: &str, role: PortRole) -> RegBankResult<u64> {
        let f = self.field(register, field)?;
        f.behavior
            .output_value(&f.state, role)
            .ok_or_else(|| {
                RegBankError::UnknownField(format!(
                    "'{register}.{field}' has no {role:?} output"
                ))
            })
    }

    /// Stored value of a field, bypassing the bus.
    pub fn stored(&self, register: &str, field: &str) -> RegBankResult<u64> {
        Ok(self.field(register, field)?.state.storage)
    }

    /// Read data the bus would see for `address` in the current cycle.
    pub fn peek(&self, address: u64) -> u64 {
        match self.decoder.decode(address) {
            Decoded::Register(handle) => self.registers[handle.0]
                .fields
                .iter()
                .fold(0, |acc, f| {
                    let value = f.behavior.read_value(&f.state, f.input);
                    acc | value.checked_shl(f.behavior.lsb).unwrap_or(0)
                })
                & self.data_mask,
            Decoded::Unmapped => self.unmapped_read_value,
        }
    }

    /// Runs one clock cycle and returns the read data of that cycle.
    pub fn tick(&mut self, bus: BusCycle) -> u64 {
        let rdata = self.peek(bus.address);
        let target = match self.decoder.decode(bus.address) {
            Decoded::Register(handle) => Some(handle.0),
            Decoded::Unmapped => {
                if bus.write || bus.read {
                    debug!(
                        "{}: access to unmapped address {:#x} ignored",
                        self.bank_name, bus.address
                    );
                }
                None
            }
        };
        let wdata = bus.wdata & self.data_mask;

        for (idx, reg) in self.registers.iter_mut().enumerate() {
            let selected = target == Some(idx);
            if selected && bus.write {
                trace!("{}: write {wdata:#x} to '{}'", self.bank_name, reg.name);
            }
            for f in reg.fields.iter_mut() {
                let access = FieldAccess {
                    write: (selected && bus.write)
                        .then(|| wdata.checked_shr(f.behavior.lsb).unwrap_or(0)),
                    read: selected && bus.read,
                };
                f.state = f.behavior.next_state(&f.state, f.input, access);
            }
        }
        self.cycles += 1;
        rdata
    }

    /// One cycle with a qualifying read of `address`.
    pub fn read(&mut self, address: u64) -> u64 {
        self.tick(BusCycle::read(address))
    }

    /// One cycle with a qualifying write of `wdata` to `address`.
    pub fn write(&mut self, address: u64, wdata: u64) {
        self.tick(BusCycle::write(address, wdata));
    }

    /// One cycle with no bus access.
    pub fn idle(&mut self) {
        self.tick(BusCycle::idle());
    }

    fn field(&self, register: &str, field: &str) -> RegBankResult<&FieldSim> {
        self.registers
            .iter()
            .find(|r| r.name == register)
            .ok_or_else(|| RegBankError::UnknownRegister(format!("'{register}'")))?
            .fields
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| RegBankError::UnknownField(format!("'{register}.{field}'")))
    }

    fn field_mut(&mut self, register: &str, field: &str) -> RegBankResult<&mut FieldSim> {
        self.registers
            .iter_mut()
            .find(|r| r.name == register)
            .ok_or_else(|| RegBankError::UnknownRegister(format!("'{register}'")))?
            .fields
            .iter_mut()
            .find(|f| f.name == field)
            .ok_or_else(|| RegBankError::UnknownField(format!("'{register}.{field}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessKind;
    use crate::model::FieldDef;

    fn irq_bank() -> RegisterBank {
        let mut bank = RegisterBank::new("irq_bank", 32, 32).unwrap();
        let irq = bank.add_register(3, "IRQ").unwrap();
        bank.add_field(irq, "rx_irq", AccessKind::Write2Clear, 0, 1)
            .unwrap();
        bank.add_field(irq, "rx_irq_mask", AccessKind::ReadWrite, 1, 1)
            .unwrap();
        bank.finalize().unwrap();
        bank
    }

    #[test]
    fn test_requires_finalized_bank() {
        let bank = RegisterBank::new("draft", 32, 32).unwrap();
        assert!(matches!(
            RegisterFileSim::new(&bank),
            Err(RegBankError::BankNotFinalized(_))
        ));
    }

    #[test]
    fn test_write_visible_next_cycle() {
        let mut sim = RegisterFileSim::new(&irq_bank()).unwrap();
        // Read data in the write cycle still shows the old value.
        let rdata = sim.tick(BusCycle {
            address: 3,
            wdata: 0b10,
            write: true,
            read: true,
        });
        assert_eq!(rdata, 0);
        assert_eq!(sim.read(3), 0b10);
        assert_eq!(sim.cycles(), 2);
    }

    #[test]
    fn test_address_match_without_strobe() {
        let mut sim = RegisterFileSim::new(&irq_bank()).unwrap();
        sim.tick(BusCycle::address_only(3, 0b10));
        assert_eq!(sim.read(3), 0);
    }

    #[test]
    fn test_unmapped_address() {
        let bank = irq_bank();
        let mut sim = RegisterFileSim::new(&bank).unwrap();
        sim.write(4, u64::MAX);
        assert_eq!(sim.read(4), 0);
        assert_eq!(sim.read(3), 0);

        let config = GeneratorConfig::with_defaults().unmapped_read_value(0x1_dead_beef);
        let sim = RegisterFileSim::with_config(&bank, &config).unwrap();
        assert_eq!(sim.peek(0x40), 0xdead_beef);
    }

    #[test]
    fn test_reset_restores_reset_values() {
        let mut bank = RegisterBank::new("rst", 32, 16).unwrap();
        let cfg = bank.add_register(1, "Config").unwrap();
        bank.add_field_def(
            cfg,
            FieldDef::new("divider", AccessKind::ReadWrite, 4, 8).reset_value(0x2a),
        )
        .unwrap();
        bank.finalize().unwrap();
        let mut sim = RegisterFileSim::new(&bank).unwrap();
        assert_eq!(sim.read(1), 0x2a0);
        sim.write(1, 0xffff);
        assert_eq!(sim.read(1), 0xff0);
        sim.reset();
        assert_eq!(sim.peek(1), 0x2a0);
    }

    #[test]
    fn test_input_and_output_errors() {
        let mut sim = RegisterFileSim::new(&irq_bank()).unwrap();
        assert!(matches!(
            sim.set_input("IRQ", "rx_irq_mask", 1),
            Err(RegBankError::UnknownField(_))
        ));
        assert!(matches!(
            sim.set_input("Nope", "rx_irq", 1),
            Err(RegBankError::UnknownRegister(_))
        ));
        assert!(matches!(
            sim.output("IRQ", "rx_irq", PortRole::Pulse),
            Err(RegBankError::UnknownField(_))
        ));
        assert_eq!(sim.output("IRQ", "rx_irq", PortRole::Value).unwrap(), 0);
    }
}
