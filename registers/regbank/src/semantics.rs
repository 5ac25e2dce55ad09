// Licensed under the Apache-2.0 license

//! Access-kind semantics engine.
//!
//! [`FieldBehavior::expand`] turns a declared [`Field`] into the concrete
//! hardware it needs: where a bus read takes its value from, what a
//! qualifying write does to storage, and which hardware-facing ports the
//! field exposes. Both the SystemVerilog emitter and the cycle model in
//! [`crate::sim`] are driven from the same expansion.
//!
//! ## Timing contract
//!
//! ```text
//!             cycle t                       cycle t+1
//! bus:   addr/wdata/wr_en/rd_en     |
//! read:  rdata = f(state_t, hw_t)   |
//! edge:  ---------------------------+--> state_{t+1} = next(state_t, hw_t, access_t)
//! ```
//!
//! Reads are combinational from the current state and hardware inputs.
//! Every side effect (load, clear, pulse, push, strobe) is registered and
//! becomes visible on the following cycle. A side effect requires both an
//! address match and the matching strobe; an address match alone does
//! nothing.
//!
//! | Kind           | Read      | Qualifying write            | Ports                        |
//! |----------------|-----------|-----------------------------|------------------------------|
//! | ReadOnly       | hw input  | ignored                     | `_i`                         |
//! | ReadWrite      | storage   | load written bits           | `_o`                         |
//! | Write2Clear    | storage   | clear bits written as 1     | `_set_i`, `_o`               |
//! | Write2Pulse    | zero      | pulse bits written as 1     | `_o`                         |
//! | SplitReadWrite | hw input  | push written bits           | `_i`, `_o`, `_rd_stb_o`, `_wr_stb_o` |
//!
//! The strobes of SplitReadWrite only exist when `activity_signal` is set.

use crate::access::AccessKind;
use crate::model::Field;
use crate::util::{low_mask, snake_case};

/// Fixed ports of the generated bus interface.
pub const BUS_PORTS: [&str; 7] = [
    "clk_i", "rst_n_i", "addr_i", "wdata_i", "wr_en_i", "rd_en_i", "rdata_o",
];

/// Per-register decode signals: address select, qualified write and read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterSignals {
    pub select: String,
    pub write: String,
    pub read: String,
}

impl RegisterSignals {
    pub fn new(register: &str) -> Self {
        let base = snake_case(register);
        Self {
            select: format!("{base}_sel"),
            write: format!("{base}_wr"),
            read: format!("{base}_rd"),
        }
    }
}

/// Names of the decode signals generated for `register`.
pub fn register_signals(register: &str) -> Vec<String> {
    let signals = RegisterSignals::new(register);
    vec![signals.select, signals.write, signals.read]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDir {
    Input,
    Output,
}

/// What a hardware-facing port carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortRole {
    /// Current field value (hardware-driven for ReadOnly, stored otherwise).
    Value,
    /// Per-bit set events of a Write2Clear field.
    Set,
    /// One-cycle pulse of a Write2Pulse field.
    Pulse,
    /// Head of the read-side store of a SplitReadWrite field.
    ReadData,
    /// Last value pushed into the write-side store.
    WriteData,
    /// One-cycle strobe after a qualifying read.
    ReadStrobe,
    /// One-cycle strobe after a qualifying write.
    WriteStrobe,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub dir: PortDir,
    pub width: u32,
    pub role: PortRole,
}

/// Where a bus read of the field gets its bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadSource {
    HardwareInput,
    Storage,
    Zero,
}

/// What a qualifying bus write does to the field's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteEffect {
    Ignore,
    Load,
    ClearOnOne,
    PulseOnOne,
    Push,
}

/// Registered state of one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldState {
    pub storage: u64,
    pub read_strobe: bool,
    pub write_strobe: bool,
}

/// The bus access seen by one field in one cycle, already qualified by
/// address match and strobe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldAccess {
    /// Field-aligned write bits, present only on a qualifying write.
    pub write: Option<u64>,
    /// True only on a qualifying read.
    pub read: bool,
}

/// Concrete behavior of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldBehavior {
    pub kind: AccessKind,
    /// Identifier prefix for every signal of this field.
    pub base: String,
    pub lsb: u32,
    pub width: u32,
    pub reset_value: u64,
    pub read: ReadSource,
    pub write: WriteEffect,
    /// Hardware may set storage bits (Write2Clear).
    pub hardware_set: bool,
    pub activity_signal: bool,
    pub ports: Vec<Port>,
}

impl FieldBehavior {
    /// Expands `field` of `register` into its concrete behavior.
    pub fn expand(register: &str, field: &Field) -> Self {
        let base = format!("{}_{}", snake_case(register), snake_case(&field.name));
        let width = field.bit_width;
        let port = |suffix: &str, dir: PortDir, width: u32, role: PortRole| Port {
            name: format!("{base}{suffix}"),
            dir,
            width,
            role,
        };

        let (read, write, hardware_set, ports) = match field.access_kind {
            AccessKind::ReadOnly => (
                ReadSource::HardwareInput,
                WriteEffect::Ignore,
                false,
                vec![port("_i", PortDir::Input, width, PortRole::Value)],
            ),
            AccessKind::ReadWrite => (
                ReadSource::Storage,
                WriteEffect::Load,
                false,
                vec![port("_o", PortDir::Output, width, PortRole::Value)],
            ),
            AccessKind::Write2Clear => (
                ReadSource::Storage,
                WriteEffect::ClearOnOne,
                true,
                vec![
                    port("_set_i", PortDir::Input, width, PortRole::Set),
                    port("_o", PortDir::Output, width, PortRole::Value),
                ],
            ),
            AccessKind::Write2Pulse => (
                ReadSource::Zero,
                WriteEffect::PulseOnOne,
                false,
                vec![port("_o", PortDir::Output, width, PortRole::Pulse)],
            ),
            AccessKind::SplitReadWrite => {
                let mut ports = vec![
                    port("_i", PortDir::Input, width, PortRole::ReadData),
                    port("_o", PortDir::Output, width, PortRole::WriteData),
                ];
                if field.activity_signal {
                    ports.push(port("_rd_stb_o", PortDir::Output, 1, PortRole::ReadStrobe));
                    ports.push(port("_wr_stb_o", PortDir::Output, 1, PortRole::WriteStrobe));
                }
                (ReadSource::HardwareInput, WriteEffect::Push, false, ports)
            }
        };

        Self {
            kind: field.access_kind,
            base,
            lsb: field.bit_offset,
            width,
            reset_value: field.reset_value,
            read,
            write,
            hardware_set,
            activity_signal: field.activity_signal && field.access_kind.supports_activity_signal(),
            ports,
        }
    }

    pub fn msb(&self) -> u32 {
        self.lsb.saturating_add(self.width).saturating_sub(1)
    }

    pub fn mask(&self) -> u64 {
        low_mask(self.width)
    }

    pub fn has_storage(&self) -> bool {
        self.write != WriteEffect::Ignore
    }

    pub fn storage_signal(&self) -> String {
        format!("{}_q", self.base)
    }

    pub fn read_strobe_signal(&self) -> String {
        format!("{}_rd_stb_q", self.base)
    }

    pub fn write_strobe_signal(&self) -> String {
        format!("{}_wr_stb_q", self.base)
    }

    /// Registered signals internal to the generated module.
    pub fn internal_signals(&self) -> Vec<String> {
        let mut signals = Vec::new();
        if self.has_storage() {
            signals.push(self.storage_signal());
        }
        if self.activity_signal {
            signals.push(self.read_strobe_signal());
            signals.push(self.write_strobe_signal());
        }
        signals
    }

    pub fn port(&self, role: PortRole) -> Option<&Port> {
        self.ports.iter().find(|p| p.role == role)
    }

    /// The hardware input port, if the field has one.
    pub fn input_port(&self) -> Option<&Port> {
        self.ports.iter().find(|p| p.dir == PortDir::Input)
    }

    /// State right after reset.
    pub fn reset_state(&self) -> FieldState {
        FieldState {
            storage: self.reset_value & self.mask(),
            read_strobe: false,
            write_strobe: false,
        }
    }

    /// Field-aligned value returned by a bus read in the current cycle.
    pub fn read_value(&self, state: &FieldState, input: u64) -> u64 {
        match self.read {
            ReadSource::HardwareInput => input & self.mask(),
            ReadSource::Storage => state.storage,
            ReadSource::Zero => 0,
        }
    }

    /// State after the clock edge that ends the current cycle.
    ///
    /// `input` is the field's hardware input during the cycle (the set
    /// events for Write2Clear, unused by kinds without an input).
    pub fn next_state(&self, state: &FieldState, input: u64, access: FieldAccess) -> FieldState {
        let mask = self.mask();
        let written = access.write.map(|bits| bits & mask);
        let storage = match self.write {
            WriteEffect::Ignore => state.storage,
            WriteEffect::Load | WriteEffect::Push => written.unwrap_or(state.storage),
            // Hardware events win over a software clear in the same cycle.
            WriteEffect::ClearOnOne => {
                (state.storage & !written.unwrap_or(0)) | (input & mask)
            }
            WriteEffect::PulseOnOne => written.unwrap_or(0),
        };
        FieldState {
            storage,
            read_strobe: self.activity_signal && access.read,
            write_strobe: self.activity_signal && written.is_some(),
        }
    }

    /// Value currently driven on an output port of this field.
    pub fn output_value(&self, state: &FieldState, role: PortRole) -> Option<u64> {
        let port = self.port(role)?;
        if port.dir != PortDir::Output {
            return None;
        }
        Some(match role {
            PortRole::Value | PortRole::Pulse | PortRole::WriteData => state.storage,
            PortRole::ReadStrobe => u64::from(state.read_strobe),
            PortRole::WriteStrobe => u64::from(state.write_strobe),
            PortRole::Set | PortRole::ReadData => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: AccessKind, width: u32) -> Field {
        Field {
            name: "f".into(),
            access_kind: kind,
            bit_offset: 4,
            bit_width: width,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        }
    }

    fn write(bits: u64) -> FieldAccess {
        FieldAccess {
            write: Some(bits),
            read: false,
        }
    }

    const IDLE: FieldAccess = FieldAccess {
        write: None,
        read: false,
    };

    #[test]
    fn test_port_names() {
        let b = FieldBehavior::expand("IRQ", &field(AccessKind::Write2Clear, 1));
        let names: Vec<_> = b.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["irq_f_set_i", "irq_f_o"]);
        assert_eq!(b.internal_signals(), ["irq_f_q"]);

        let ro = FieldBehavior::expand("Line_Status", &field(AccessKind::ReadOnly, 1));
        assert_eq!(ro.ports[0].name, "line_status_f_i");
        assert!(ro.internal_signals().is_empty());
    }

    #[test]
    fn test_read_only_ignores_writes() {
        let b = FieldBehavior::expand("R", &field(AccessKind::ReadOnly, 4));
        let s = b.reset_state();
        assert_eq!(b.read_value(&s, 0x1a), 0xa);
        assert_eq!(b.next_state(&s, 0xa, write(0xf)), s);
    }

    #[test]
    fn test_read_write_loads() {
        let b = FieldBehavior::expand("R", &field(AccessKind::ReadWrite, 4));
        let s = b.next_state(&b.reset_state(), 0, write(0x1c));
        assert_eq!(s.storage, 0xc);
        assert_eq!(b.read_value(&s, 0), 0xc);
        assert_eq!(b.next_state(&s, 0, IDLE), s);
    }

    #[test]
    fn test_write2clear() {
        let b = FieldBehavior::expand("R", &field(AccessKind::Write2Clear, 2));
        let set = b.next_state(&b.reset_state(), 0b11, IDLE);
        assert_eq!(set.storage, 0b11);
        let cleared = b.next_state(&set, 0, write(0b01));
        assert_eq!(cleared.storage, 0b10);
        // Writing zero leaves bits alone.
        assert_eq!(b.next_state(&cleared, 0, write(0)).storage, 0b10);
        // A set event in the same cycle as the clear wins.
        assert_eq!(b.next_state(&cleared, 0b10, write(0b10)).storage, 0b10);
    }

    #[test]
    fn test_write2pulse_self_resets() {
        let b = FieldBehavior::expand("R", &field(AccessKind::Write2Pulse, 1));
        let pulse = b.next_state(&b.reset_state(), 0, write(1));
        assert_eq!(b.output_value(&pulse, PortRole::Pulse), Some(1));
        assert_eq!(b.read_value(&pulse, 0), 0);
        let after = b.next_state(&pulse, 0, IDLE);
        assert_eq!(b.output_value(&after, PortRole::Pulse), Some(0));
    }

    #[test]
    fn test_split_with_activity() {
        let mut f = field(AccessKind::SplitReadWrite, 8);
        f.activity_signal = true;
        let b = FieldBehavior::expand("Data", &f);
        assert_eq!(b.ports.len(), 4);
        let s = b.next_state(&b.reset_state(), 0x55, write(0xaa));
        assert_eq!(b.output_value(&s, PortRole::WriteData), Some(0xaa));
        assert_eq!(b.output_value(&s, PortRole::WriteStrobe), Some(1));
        assert_eq!(b.output_value(&s, PortRole::ReadStrobe), Some(0));
        // Reads see the read-side store, never the written value.
        assert_eq!(b.read_value(&s, 0x55), 0x55);
        let s = b.next_state(
            &s,
            0x55,
            FieldAccess {
                write: None,
                read: true,
            },
        );
        assert_eq!(b.output_value(&s, PortRole::ReadStrobe), Some(1));
        assert_eq!(b.output_value(&s, PortRole::WriteStrobe), Some(0));
        assert_eq!(b.output_value(&s, PortRole::WriteData), Some(0xaa));
    }

    #[test]
    fn test_split_without_activity_has_no_strobes() {
        let b = FieldBehavior::expand("Data", &field(AccessKind::SplitReadWrite, 8));
        assert!(b.port(PortRole::ReadStrobe).is_none());
        let s = b.next_state(&b.reset_state(), 0, write(1));
        assert!(!s.write_strobe);
    }
}
