// Licensed under the Apache-2.0 license

//! Register bank data model.
//!
//! A [`RegisterBank`] owns every [`Register`] and, transitively, every
//! [`Field`]. Registers live in an arena and are referred to by
//! [`RegisterHandle`]/[`FieldHandle`] indices, with side tables indexing the
//! arena by address and by name.
//!
//! ```text
//! RegisterBank
//! ├── registers: Vec<Register>          # arena, declaration order
//! │   └── fields: Vec<Field>            # declaration order
//! ├── by_address: BTreeMap<u64, idx>    # address order, used for iteration
//! └── by_name: HashMap<String, idx>
//! ```
//!
//! A bank starts in [`BankState::Draft`]. The builder calls check their own
//! invariants immediately and leave the bank unchanged on error.
//! [`RegisterBank::finalize`] re-validates the whole bank and, if clean,
//! moves it to [`BankState::Finalized`], after which every mutator fails with
//! [`RegBankError::BankFinalized`].

use crate::access::AccessKind;
use crate::error::{RegBankError, RegBankResult};
use crate::util::low_mask;
use crate::validate;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

/// Index into the register arena.
pub type RegisterIdx = usize;

/// Refers to a register of the bank that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterHandle(pub(crate) RegisterIdx);

/// Refers to a field of the bank that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    pub(crate) register: RegisterIdx,
    pub(crate) field: usize,
}

impl FieldHandle {
    pub fn register(&self) -> RegisterHandle {
        RegisterHandle(self.register)
    }
}

/// A named, contiguous bit range within a register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub access_kind: AccessKind,
    pub bit_offset: u32,
    pub bit_width: u32,
    pub description: String,
    pub activity_signal: bool,
    pub reset_value: u64,
}

impl Field {
    /// Least significant bit position.
    pub fn lsb(&self) -> u32 {
        self.bit_offset
    }

    /// Most significant bit position (inclusive).
    pub fn msb(&self) -> u32 {
        self.bit_offset
            .saturating_add(self.bit_width)
            .saturating_sub(1)
    }

    /// Mask of the field in register position.
    pub fn mask(&self) -> u64 {
        low_mask(self.bit_width)
            .checked_shl(self.bit_offset)
            .unwrap_or(0)
    }

    /// Extracts this field's value from a full register word.
    pub fn extract(&self, word: u64) -> u64 {
        word.checked_shr(self.bit_offset).unwrap_or(0) & low_mask(self.bit_width)
    }

    /// Places a field value at this field's position in a register word.
    pub fn insert(&self, value: u64) -> u64 {
        (value & low_mask(self.bit_width))
            .checked_shl(self.bit_offset)
            .unwrap_or(0)
    }

    /// One past the most significant bit, widened so it cannot overflow.
    pub(crate) fn end(&self) -> u64 {
        u64::from(self.bit_offset) + u64::from(self.bit_width)
    }

    pub fn overlaps(&self, other: &Field) -> bool {
        u64::from(self.bit_offset) < other.end() && u64::from(other.bit_offset) < self.end()
    }
}

/// Declaration of a field, passed to [`RegisterBank::add_field_def`].
///
/// # Example
///
/// ```
/// use registers_regbank::{AccessKind, FieldDef};
///
/// let def = FieldDef::new("i2s_mm_left", AccessKind::SplitReadWrite, 0, 32)
///     .description("Left channel FIFO data")
///     .activity_signal(true);
/// assert!(def.activity_signal);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub access_kind: AccessKind,
    pub bit_offset: u32,
    pub bit_width: u32,
    pub description: String,
    pub activity_signal: bool,
    pub reset_value: u64,
}

impl FieldDef {
    pub fn new(name: &str, access_kind: AccessKind, bit_offset: u32, bit_width: u32) -> Self {
        Self {
            name: name.to_string(),
            access_kind,
            bit_offset,
            bit_width,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn activity_signal(mut self, enable: bool) -> Self {
        self.activity_signal = enable;
        self
    }

    pub fn reset_value(mut self, value: u64) -> Self {
        self.reset_value = value;
        self
    }

    fn into_field(self) -> Field {
        Field {
            name: self.name,
            access_kind: self.access_kind,
            bit_offset: self.bit_offset,
            bit_width: self.bit_width,
            description: self.description,
            activity_signal: self.activity_signal,
            reset_value: self.reset_value,
        }
    }
}

/// A register at one bank address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub address: u64,
    pub name: String,
    /// Fields in declaration order. Bits not covered by any field read as
    /// zero and ignore writes.
    pub fields: Vec<Field>,
}

impl Register {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Union of all field masks.
    pub fn covered_mask(&self) -> u64 {
        self.fields.iter().fold(0, |acc, f| acc | f.mask())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankState {
    Draft,
    Finalized,
}

/// A named collection of registers sharing an address width and data width.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    name: String,
    address_width: u32,
    data_width: u32,
    /// Arena of registers. Registers are added but never removed, so
    /// indices stay valid for the lifetime of the bank.
    registers: Vec<Register>,
    by_address: BTreeMap<u64, RegisterIdx>,
    by_name: HashMap<String, RegisterIdx>,
    state: BankState,
}

impl RegisterBank {
    /// Largest supported data or address width in bits.
    pub const MAX_WIDTH: u32 = 64;

    /// Creates an empty draft bank.
    pub fn new(name: &str, address_width: u32, data_width: u32) -> RegBankResult<Self> {
        if let Some(err) = validate::geometry_violation(name, address_width, data_width) {
            return Err(err);
        }
        Ok(Self {
            name: name.to_string(),
            address_width,
            data_width,
            registers: Vec::new(),
            by_address: BTreeMap::new(),
            by_name: HashMap::new(),
            state: BankState::Draft,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn state(&self) -> BankState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == BankState::Finalized
    }

    /// Mask covering `data_width` bits.
    pub fn data_mask(&self) -> u64 {
        low_mask(self.data_width)
    }

    /// Registers in address order.
    pub fn registers(&self) -> impl Iterator<Item = &Register> + '_ {
        self.by_address.values().map(|&idx| &self.registers[idx])
    }

    /// Registers paired with their handles, in address order.
    pub fn register_handles(&self) -> impl Iterator<Item = (RegisterHandle, &Register)> + '_ {
        self.by_address
            .values()
            .map(|&idx| (RegisterHandle(idx), &self.registers[idx]))
    }

    /// Registers in the order they were declared.
    pub fn registers_in_declaration_order(&self) -> &[Register] {
        &self.registers
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    pub fn register(&self, handle: RegisterHandle) -> RegBankResult<&Register> {
        self.registers
            .get(handle.0)
            .ok_or_else(|| RegBankError::UnknownRegister(format!("#{}", handle.0)))
    }

    pub fn field(&self, handle: FieldHandle) -> RegBankResult<&Field> {
        let reg = self.register(handle.register())?;
        reg.fields.get(handle.field).ok_or_else(|| {
            RegBankError::UnknownField(format!("{}#{}", reg.name, handle.field))
        })
    }

    pub fn register_by_name(&self, name: &str) -> Option<&Register> {
        self.by_name.get(name).map(|&idx| &self.registers[idx])
    }

    pub fn handle_by_name(&self, name: &str) -> Option<RegisterHandle> {
        self.by_name.get(name).copied().map(RegisterHandle)
    }

    pub fn register_at(&self, address: u64) -> Option<&Register> {
        self.by_address.get(&address).map(|&idx| &self.registers[idx])
    }

    /// Adds an empty register at `address`.
    pub fn add_register(&mut self, address: u64, name: &str) -> RegBankResult<RegisterHandle> {
        self.ensure_draft()?;
        if let Some(err) = validate::register_violations(self, address, name)
            .into_iter()
            .next()
        {
            return Err(err);
        }
        if let Some(&idx) = self.by_address.get(&address) {
            return Err(RegBankError::DuplicateAddress {
                address,
                existing: self.registers[idx].name.clone(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(RegBankError::DuplicateName {
                scope: format!("bank '{}'", self.name),
                kind: "register",
                name: name.to_string(),
            });
        }

        let idx = self.registers.len();
        self.registers.push(Register {
            address,
            name: name.to_string(),
            fields: Vec::new(),
        });
        self.by_address.insert(address, idx);
        self.by_name.insert(name.to_string(), idx);
        debug!("{}: added register '{name}' at {address:#x}", self.name);
        Ok(RegisterHandle(idx))
    }

    /// Adds a field with no description, activity signal or reset value.
    pub fn add_field(
        &mut self,
        register: RegisterHandle,
        name: &str,
        access_kind: AccessKind,
        bit_offset: u32,
        bit_width: u32,
    ) -> RegBankResult<FieldHandle> {
        self.add_field_def(
            register,
            FieldDef::new(name, access_kind, bit_offset, bit_width),
        )
    }

    /// Adds a fully described field to `register`.
    pub fn add_field_def(
        &mut self,
        register: RegisterHandle,
        def: FieldDef,
    ) -> RegBankResult<FieldHandle> {
        self.ensure_draft()?;
        let data_width = self.data_width;
        let reg = self
            .registers
            .get_mut(register.0)
            .ok_or_else(|| RegBankError::UnknownRegister(format!("#{}", register.0)))?;

        let field = def.into_field();
        if let Some(err) = validate::field_violations(&reg.name, &reg.fields, &field, data_width)
            .into_iter()
            .next()
        {
            return Err(err);
        }

        debug!(
            "{}: added {} field '{}' [{}:{}]",
            reg.name,
            field.access_kind,
            field.name,
            field.msb(),
            field.lsb()
        );
        reg.fields.push(field);
        Ok(FieldHandle {
            register: register.0,
            field: reg.fields.len() - 1,
        })
    }

    /// Validates the whole bank and freezes it if no violation is found.
    ///
    /// On failure the bank stays in [`BankState::Draft`] and the returned
    /// [`RegBankError::Validation`] lists every violation.
    pub fn finalize(&mut self) -> RegBankResult<()> {
        let report = validate::validate(self);
        if !report.is_empty() {
            warn!("{}", report);
            return Err(RegBankError::Validation(report));
        }
        if self.state == BankState::Draft {
            info!(
                "finalized bank '{}' with {} register(s)",
                self.name,
                self.registers.len()
            );
        }
        self.state = BankState::Finalized;
        Ok(())
    }

    /// Fails with [`RegBankError::BankNotFinalized`] unless finalized.
    pub fn ensure_finalized(&self) -> RegBankResult<()> {
        match self.state {
            BankState::Finalized => Ok(()),
            BankState::Draft => Err(RegBankError::BankNotFinalized(self.name.clone())),
        }
    }

    fn ensure_draft(&self) -> RegBankResult<()> {
        match self.state {
            BankState::Draft => Ok(()),
            BankState::Finalized => Err(RegBankError::BankFinalized(self.name.clone())),
        }
    }
}

/// Two banks are equal when they describe the same address map, regardless
/// of the order in which registers were declared.
impl PartialEq for RegisterBank {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.address_width == other.address_width
            && self.data_width == other.data_width
            && self.registers.len() == other.registers.len()
            && self.registers().eq(other.registers())
    }
}

impl Eq for RegisterBank {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> RegisterBank {
        RegisterBank::new("test_bank", 32, 32).unwrap()
    }

    #[test]
    fn test_add_register() {
        let mut bank = bank();
        let golden = bank.add_register(0, "Golden").unwrap();
        let irq = bank.add_register(3, "IRQ").unwrap();
        assert_ne!(golden, irq);
        assert_eq!(bank.register(irq).unwrap().address, 3);
        assert_eq!(bank.register_at(0).unwrap().name, "Golden");
        assert_eq!(bank.handle_by_name("IRQ"), Some(irq));
    }

    #[test]
    fn test_duplicate_address() {
        let mut bank = bank();
        bank.add_register(3, "IRQ").unwrap();
        assert_eq!(
            bank.add_register(3, "Status"),
            Err(RegBankError::DuplicateAddress {
                address: 3,
                existing: "IRQ".into()
            })
        );
        assert_eq!(bank.register_count(), 1);
    }

    #[test]
    fn test_duplicate_register_name() {
        let mut bank = bank();
        bank.add_register(3, "IRQ").unwrap();
        let err = bank.add_register(4, "IRQ").unwrap_err();
        assert!(matches!(
            err,
            RegBankError::DuplicateName { kind: "register", ref name, .. } if name == "IRQ"
        ));
        assert!(bank.register_at(4).is_none());
    }

    #[test]
    fn test_address_out_of_range() {
        let mut bank = RegisterBank::new("narrow", 4, 32).unwrap();
        bank.add_register(15, "Last").unwrap();
        assert!(matches!(
            bank.add_register(16, "TooFar"),
            Err(RegBankError::AddressOutOfRange { address: 16, .. })
        ));
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(matches!(
            RegisterBank::new("b", 32, 0),
            Err(RegBankError::InvalidBankGeometry { .. })
        ));
        assert!(matches!(
            RegisterBank::new("b", 0, 32),
            Err(RegBankError::InvalidBankGeometry { .. })
        ));
        assert!(matches!(
            RegisterBank::new("b", 32, 65),
            Err(RegBankError::InvalidBankGeometry { .. })
        ));
    }

    #[test]
    fn test_field_out_of_range() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        let err = bank
            .add_field(reg, "wide", AccessKind::ReadWrite, 30, 4)
            .unwrap_err();
        assert_eq!(
            err,
            RegBankError::FieldOutOfRange {
                register: "Config".into(),
                field: "wide".into(),
                bit_offset: 30,
                bit_width: 4,
                data_width: 32,
            }
        );
        // A field ending exactly at the top bit is fine.
        bank.add_field(reg, "top", AccessKind::ReadWrite, 28, 4)
            .unwrap();
    }

    #[test]
    fn test_field_offset_at_u32_limit() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        bank.add_field(reg, "a", AccessKind::ReadWrite, 0, 1)
            .unwrap();
        assert!(matches!(
            bank.add_field(reg, "b", AccessKind::ReadWrite, u32::MAX, 1),
            Err(RegBankError::FieldOutOfRange {
                bit_offset: u32::MAX,
                ..
            })
        ));
        assert_eq!(bank.register(reg).unwrap().fields.len(), 1);
    }

    #[test]
    fn test_field_overlap_leaves_register_unchanged() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        bank.add_field(reg, "low", AccessKind::ReadWrite, 0, 4)
            .unwrap();
        let before = bank.register(reg).unwrap().clone();
        let err = bank
            .add_field(reg, "mid", AccessKind::ReadWrite, 2, 4)
            .unwrap_err();
        assert_eq!(
            err,
            RegBankError::FieldOverlap {
                register: "Config".into(),
                field: "mid".into(),
                msb: 5,
                lsb: 2,
                existing: "low".into(),
                existing_msb: 3,
                existing_lsb: 0,
            }
        );
        assert_eq!(bank.register(reg).unwrap(), &before);
    }

    #[test]
    fn test_zero_width_field() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        assert!(matches!(
            bank.add_field(reg, "empty", AccessKind::ReadOnly, 0, 0),
            Err(RegBankError::ZeroWidthField { .. })
        ));
    }

    #[test]
    fn test_duplicate_field_name() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        bank.add_field(reg, "enable", AccessKind::ReadWrite, 0, 1)
            .unwrap();
        assert!(matches!(
            bank.add_field(reg, "enable", AccessKind::ReadWrite, 1, 1),
            Err(RegBankError::DuplicateName { kind: "field", .. })
        ));
    }

    #[test]
    fn test_activity_signal_requires_split() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Data").unwrap();
        let err = bank
            .add_field_def(
                reg,
                FieldDef::new("data", AccessKind::ReadWrite, 0, 8).activity_signal(true),
            )
            .unwrap_err();
        assert!(matches!(err, RegBankError::InvalidActivitySignal { .. }));
        bank.add_field_def(
            reg,
            FieldDef::new("data", AccessKind::SplitReadWrite, 0, 8).activity_signal(true),
        )
        .unwrap();
    }

    #[test]
    fn test_reset_values() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        assert!(matches!(
            bank.add_field_def(
                reg,
                FieldDef::new("mode", AccessKind::ReadWrite, 0, 2).reset_value(4)
            ),
            Err(RegBankError::ResetValueOutOfRange { value: 4, .. })
        ));
        assert!(matches!(
            bank.add_field_def(
                reg,
                FieldDef::new("go", AccessKind::Write2Pulse, 0, 1).reset_value(1)
            ),
            Err(RegBankError::ResetValueNotApplicable { .. })
        ));
        let mode = bank
            .add_field_def(
                reg,
                FieldDef::new("mode", AccessKind::ReadWrite, 0, 2).reset_value(3),
            )
            .unwrap();
        assert_eq!(bank.field(mode).unwrap().reset_value, 3);
    }

    #[test]
    fn test_unknown_register_handle() {
        let mut bank = bank();
        let mut other = RegisterBank::new("other", 32, 32).unwrap();
        other.add_register(0, "A").unwrap();
        let foreign = other.add_register(1, "B").unwrap();
        assert!(matches!(
            bank.add_field(foreign, "x", AccessKind::ReadOnly, 0, 1),
            Err(RegBankError::UnknownRegister(_))
        ));
    }

    #[test]
    fn test_finalize_freezes_bank() {
        let mut bank = bank();
        let reg = bank.add_register(0, "Config").unwrap();
        bank.add_field(reg, "enable", AccessKind::ReadWrite, 0, 1)
            .unwrap();
        assert_eq!(
            bank.ensure_finalized(),
            Err(RegBankError::BankNotFinalized("test_bank".into()))
        );
        bank.finalize().unwrap();
        assert!(bank.is_finalized());
        // Finalizing twice is harmless.
        bank.finalize().unwrap();
        assert_eq!(
            bank.add_register(1, "Late"),
            Err(RegBankError::BankFinalized("test_bank".into()))
        );
        assert_eq!(
            bank.add_field(reg, "late", AccessKind::ReadWrite, 1, 1),
            Err(RegBankError::BankFinalized("test_bank".into()))
        );
    }

    #[test]
    fn test_registers_iterate_in_address_order() {
        let mut bank = bank();
        bank.add_register(7, "C").unwrap();
        bank.add_register(1, "A").unwrap();
        bank.add_register(3, "B").unwrap();
        let names: Vec<_> = bank.registers().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        let declared: Vec<_> = bank
            .registers_in_declaration_order()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(declared, ["C", "A", "B"]);
    }

    #[test]
    fn test_field_bit_helpers() {
        let f = Field {
            name: "rx_reserved".into(),
            access_kind: AccessKind::ReadOnly,
            bit_offset: 25,
            bit_width: 2,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        };
        assert_eq!(f.msb(), 26);
        assert_eq!(f.mask(), 0x0600_0000);
        assert_eq!(f.extract(0x0400_0000), 2);
        assert_eq!(f.insert(3), 0x0600_0000);
        assert_eq!(f.insert(7), 0x0600_0000);

        let far = Field {
            bit_offset: u32::MAX,
            bit_width: 4,
            ..f.clone()
        };
        assert_eq!(far.msb(), u32::MAX - 1);
        assert!(!far.overlaps(&f));
        assert!(!f.overlaps(&far));
    }
}
