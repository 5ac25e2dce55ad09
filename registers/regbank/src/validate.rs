// Licensed under the Apache-2.0 license

//! Whole-bank validation.
//!
//! The builder calls in [`crate::model`] reuse the per-item checks from this
//! module and stop at the first violation. [`validate`] runs the same checks
//! over the entire bank, plus checks that only make sense once everything is
//! declared (generated identifier collisions), and reports every violation
//! it finds in declaration order. It does not modify the bank and can be run
//! any number of times.

use crate::codegen;
use crate::error::{RegBankError, ValidationReport};
use crate::model::{Field, RegisterBank};
use crate::semantics::{self, FieldBehavior};
use crate::util::is_valid_identifier;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Validates every invariant of `bank`.
pub fn validate(bank: &RegisterBank) -> ValidationReport {
    let mut report = ValidationReport::new(bank.name());

    if let Some(err) = geometry_violation(bank.name(), bank.address_width(), bank.data_width()) {
        report.push(err);
    }

    let mut addresses: HashMap<u64, &str> = HashMap::new();
    let mut names: HashSet<&str> = HashSet::new();
    for reg in bank.registers_in_declaration_order() {
        for err in register_violations(bank, reg.address, &reg.name) {
            report.push(err);
        }
        if let Some(existing) = addresses.insert(reg.address, &reg.name) {
            report.push(RegBankError::DuplicateAddress {
                address: reg.address,
                existing: existing.to_string(),
            });
        }
        if !names.insert(&reg.name) {
            report.push(RegBankError::DuplicateName {
                scope: format!("bank '{}'", bank.name()),
                kind: "register",
                name: reg.name.clone(),
            });
        }
        if reg.fields.is_empty() {
            warn!(
                "{}: register '{}' declares no fields and always reads zero",
                bank.name(),
                reg.name
            );
        }
        for (i, field) in reg.fields.iter().enumerate() {
            for err in field_violations(&reg.name, &reg.fields[..i], field, bank.data_width()) {
                report.push(err);
            }
        }
    }

    check_identifier_collisions(bank, &mut report);
    check_header_collisions(bank, &mut report);

    debug!(
        "validated bank '{}': {} violation(s)",
        bank.name(),
        report.len()
    );
    report
}

/// Checks the bank-wide widths.
pub(crate) fn geometry_violation(
    name: &str,
    address_width: u32,
    data_width: u32,
) -> Option<RegBankError> {
    let invalid = |reason: String| {
        Some(RegBankError::InvalidBankGeometry {
            bank: name.to_string(),
            reason,
        })
    };
    if !is_valid_identifier(name) {
        return Some(RegBankError::InvalidIdentifier(name.to_string()));
    }
    if !(1..=RegisterBank::MAX_WIDTH).contains(&address_width) {
        return invalid(format!(
            "address width {address_width} is outside 1..={}",
            RegisterBank::MAX_WIDTH
        ));
    }
    if !(1..=RegisterBank::MAX_WIDTH).contains(&data_width) {
        return invalid(format!(
            "data width {data_width} is outside 1..={}",
            RegisterBank::MAX_WIDTH
        ));
    }
    None
}

/// Checks a register declaration in isolation (name and address range).
pub(crate) fn register_violations(
    bank: &RegisterBank,
    address: u64,
    name: &str,
) -> Vec<RegBankError> {
    let mut violations = Vec::new();
    if !is_valid_identifier(name) {
        violations.push(RegBankError::InvalidIdentifier(name.to_string()));
    }
    let width = bank.address_width();
    if width < RegisterBank::MAX_WIDTH && address >> width != 0 {
        violations.push(RegBankError::AddressOutOfRange {
            name: name.to_string(),
            address,
            address_width: width,
        });
    }
    violations
}

/// Checks `field` against the fields declared before it in the same register.
pub(crate) fn field_violations(
    register: &str,
    earlier: &[Field],
    field: &Field,
    data_width: u32,
) -> Vec<RegBankError> {
    let mut violations = Vec::new();

    if !is_valid_identifier(&field.name) {
        violations.push(RegBankError::InvalidIdentifier(field.name.clone()));
    }
    if field.bit_width == 0 {
        violations.push(RegBankError::ZeroWidthField {
            register: register.to_string(),
            field: field.name.clone(),
        });
    }
    if field.end() > u64::from(data_width) {
        violations.push(RegBankError::FieldOutOfRange {
            register: register.to_string(),
            field: field.name.clone(),
            bit_offset: field.bit_offset,
            bit_width: field.bit_width,
            data_width,
        });
    }
    if earlier.iter().any(|f| f.name == field.name) {
        violations.push(RegBankError::DuplicateName {
            scope: format!("register '{register}'"),
            kind: "field",
            name: field.name.clone(),
        });
    }
    for other in earlier.iter().filter(|f| f.overlaps(field)) {
        violations.push(RegBankError::FieldOverlap {
            register: register.to_string(),
            field: field.name.clone(),
            msb: field.msb(),
            lsb: field.lsb(),
            existing: other.name.clone(),
            existing_msb: other.msb(),
            existing_lsb: other.lsb(),
        });
    }
    if field.activity_signal && !field.access_kind.supports_activity_signal() {
        violations.push(RegBankError::InvalidActivitySignal {
            register: register.to_string(),
            field: field.name.clone(),
            kind: field.access_kind.to_string(),
        });
    }
    if field.reset_value != 0 {
        if !field.access_kind.has_reset_value() {
            violations.push(RegBankError::ResetValueNotApplicable {
                register: register.to_string(),
                field: field.name.clone(),
                kind: field.access_kind.to_string(),
                value: field.reset_value,
            });
        } else if field.bit_width < 64 && field.reset_value >> field.bit_width != 0 {
            violations.push(RegBankError::ResetValueOutOfRange {
                register: register.to_string(),
                field: field.name.clone(),
                value: field.reset_value,
                bit_width: field.bit_width,
            });
        }
    }
    violations
}

/// Records who generated each identifier and reports the second claimant
/// of a name that is already taken.
struct Claims {
    owners: HashMap<String, String>,
}

impl Claims {
    fn new() -> Self {
        Self {
            owners: HashMap::new(),
        }
    }

    fn claim(&mut self, identifier: String, owner: &str, report: &mut ValidationReport) {
        if let Some(first) = self.owners.get(&identifier) {
            report.push(RegBankError::IdentifierCollision {
                identifier,
                first: first.clone(),
                second: owner.to_string(),
            });
        } else {
            self.owners.insert(identifier, owner.to_string());
        }
    }
}

/// Every generated signal name must be unique, including the bus ports.
fn check_identifier_collisions(bank: &RegisterBank, report: &mut ValidationReport) {
    let mut claims = Claims::new();
    for port in semantics::BUS_PORTS {
        claims.claim(port.to_string(), "the bus interface", report);
    }

    for reg in bank.registers_in_declaration_order() {
        let owner = format!("register '{}'", reg.name);
        for signal in semantics::register_signals(&reg.name) {
            claims.claim(signal, &owner, report);
        }
        for field in &reg.fields {
            let owner = format!("field '{}.{}'", reg.name, field.name);
            let behavior = FieldBehavior::expand(&reg.name, field);
            for signal in behavior.internal_signals() {
                claims.claim(signal, &owner, report);
            }
            for port in behavior.ports {
                claims.claim(port.name, &owner, report);
            }
        }
    }
}

/// C header defines live in their own namespace and must be unique too.
fn check_header_collisions(bank: &RegisterBank, report: &mut ValidationReport) {
    let mut claims = Claims::new();
    for reg in bank.registers_in_declaration_order() {
        let owner = format!("register '{}'", reg.name);
        claims.claim(codegen::offset_macro(&reg.name), &owner, report);
        for field in &reg.fields {
            let owner = format!("field '{}.{}'", reg.name, field.name);
            for name in codegen::field_macros(&reg.name, &field.name) {
                claims.claim(name, &owner, report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessKind;
    use crate::model::FieldDef;

    #[test]
    fn test_clean_bank_has_no_violations() {
        let mut bank = RegisterBank::new("clean", 32, 32).unwrap();
        let reg = bank.add_register(3, "IRQ").unwrap();
        bank.add_field(reg, "rx_irq", AccessKind::Write2Clear, 0, 1)
            .unwrap();
        bank.add_field(reg, "rx_irq_mask", AccessKind::ReadWrite, 1, 1)
            .unwrap();
        let report = validate(&bank);
        assert!(report.is_empty(), "{report}");
        // Re-running gives the same answer.
        assert_eq!(validate(&bank), report);
    }

    #[test]
    fn test_field_violations_are_all_reported() {
        let earlier = vec![Field {
            name: "low".into(),
            access_kind: AccessKind::ReadWrite,
            bit_offset: 0,
            bit_width: 4,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        }];
        let bad = Field {
            name: "low".into(),
            access_kind: AccessKind::ReadOnly,
            bit_offset: 2,
            bit_width: 31,
            description: String::new(),
            activity_signal: true,
            reset_value: 1,
        };
        let violations = field_violations("Config", &earlier, &bad, 32);
        assert_eq!(violations.len(), 5, "{violations:?}");
        assert!(matches!(violations[0], RegBankError::FieldOutOfRange { .. }));
        assert!(matches!(violations[1], RegBankError::DuplicateName { .. }));
        assert!(matches!(violations[2], RegBankError::FieldOverlap { .. }));
        assert!(matches!(
            violations[3],
            RegBankError::InvalidActivitySignal { .. }
        ));
        assert!(matches!(
            violations[4],
            RegBankError::ResetValueNotApplicable { .. }
        ));
    }

    #[test]
    fn test_register_name_collision_after_casing() {
        let mut bank = RegisterBank::new("casing", 32, 32).unwrap();
        let a = bank.add_register(0, "Status").unwrap();
        let b = bank.add_register(1, "STATUS").unwrap();
        bank.add_field(a, "busy", AccessKind::ReadOnly, 0, 1)
            .unwrap();
        bank.add_field(b, "busy", AccessKind::ReadOnly, 0, 1)
            .unwrap();
        let err = bank.finalize().unwrap_err();
        let RegBankError::Validation(report) = err else {
            panic!("expected a validation report");
        };
        assert!(!report.is_empty());
        assert!(report
            .iter()
            .all(|v| matches!(v, RegBankError::IdentifierCollision { .. })));
        assert!(!bank.is_finalized());
    }

    #[test]
    fn test_port_suffix_collision() {
        let mut bank = RegisterBank::new("ports", 32, 32).unwrap();
        let reg = bank.add_register(0, "Events").unwrap();
        // A Write2Clear field exports a `_set_i` input for its hardware events,
        // which would clash with a ReadOnly field named `<x>_set`.
        bank.add_field(reg, "rx", AccessKind::Write2Clear, 0, 1)
            .unwrap();
        bank.add_field(reg, "rx_set", AccessKind::ReadOnly, 1, 1)
            .unwrap();
        let report = validate(&bank);
        assert_eq!(report.len(), 1, "{report}");
        assert!(matches!(
            &report.violations[0],
            RegBankError::IdentifierCollision { identifier, .. } if identifier == "events_rx_set_i"
        ));
    }

    #[test]
    fn test_reset_value_width() {
        let ok = Field {
            name: "mode".into(),
            access_kind: AccessKind::ReadWrite,
            bit_offset: 0,
            bit_width: 64,
            description: String::new(),
            activity_signal: false,
            reset_value: u64::MAX,
        };
        assert!(field_violations("Wide", &[], &ok, 64).is_empty());
    }

    #[test]
    fn test_split_activity_is_valid() {
        let mut bank = RegisterBank::new("fifo", 32, 32).unwrap();
        let reg = bank.add_register(6, "Left_Data_Channel").unwrap();
        bank.add_field_def(
            reg,
            FieldDef::new("i2s_mm_left", AccessKind::SplitReadWrite, 0, 32).activity_signal(true),
        )
        .unwrap();
        assert!(validate(&bank).is_empty());
    }

    #[test]
    fn test_header_define_collision() {
        let mut bank = RegisterBank::new("defines", 32, 32).unwrap();
        let a_b = bank.add_register(0, "A_B").unwrap();
        bank.add_field(a_b, "c", AccessKind::ReadOnly, 0, 1)
            .unwrap();
        let a = bank.add_register(1, "A").unwrap();
        bank.add_field(a, "b_c", AccessKind::ReadWrite, 4, 2)
            .unwrap();

        let report = validate(&bank);
        let identifiers: Vec<_> = report
            .iter()
            .map(|v| match v {
                RegBankError::IdentifierCollision { identifier, .. } => identifier.as_str(),
                other => panic!("unexpected violation {other}"),
            })
            .collect();
        assert_eq!(
            identifiers,
            [
                "A_B_C_FIELD_OFFSET",
                "A_B_C_FIELD_WIDTH",
                "A_B_C_FIELD_MASK",
                "A_B_C_RESET",
            ]
        );
        assert!(bank.finalize().is_err());
    }

    #[test]
    fn test_register_offset_define_collision() {
        let mut bank = RegisterBank::new("defines", 32, 32).unwrap();
        let a = bank.add_register(0, "A").unwrap();
        bank.add_field(a, "x", AccessKind::ReadOnly, 0, 1)
            .unwrap();
        let a_x_field = bank.add_register(1, "A_X_FIELD").unwrap();
        bank.add_field(a_x_field, "y", AccessKind::ReadOnly, 0, 1)
            .unwrap();
        let report = validate(&bank);
        assert_eq!(report.len(), 1, "{report}");
        assert!(matches!(
            &report.violations[0],
            RegBankError::IdentifierCollision { identifier, .. } if identifier == "A_X_FIELD_OFFSET"
        ));
    }

    #[test]
    fn test_huge_offset_is_out_of_range() {
        let earlier = vec![Field {
            name: "a".into(),
            access_kind: AccessKind::ReadWrite,
            bit_offset: 0,
            bit_width: 1,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        }];
        let far = Field {
            name: "b".into(),
            access_kind: AccessKind::ReadWrite,
            bit_offset: u32::MAX,
            bit_width: u32::MAX,
            description: String::new(),
            activity_signal: false,
            reset_value: 0,
        };
        let violations = field_violations("Config", &earlier, &far, 32);
        assert_eq!(violations.len(), 1, "{violations:?}");
        assert!(matches!(violations[0], RegBankError::FieldOutOfRange { .. }));
    }
}
