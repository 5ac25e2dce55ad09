// Licensed under the Apache-2.0 license

//! C header emission.
//!
//! ```text
//! #define IRQ_OFFSET 0x3
//! #define IRQ_RX_IRQ_FIELD_OFFSET 0
//! #define IRQ_RX_IRQ_FIELD_WIDTH 1
//! #define IRQ_RX_IRQ_FIELD_MASK 0x1
//! #define IRQ_RX_IRQ_RESET 0x0
//! ```

use crate::config::GeneratorConfig;
use crate::model::RegisterBank;
use crate::util::upper_snake;
use std::fmt::Write;

/// Suffixes of the per-field defines, in emission order.
const FIELD_MACRO_SUFFIXES: [&str; 4] = ["_FIELD_OFFSET", "_FIELD_WIDTH", "_FIELD_MASK", "_RESET"];

/// Name of the define holding a register's offset.
pub(crate) fn offset_macro(register: &str) -> String {
    format!("{}_OFFSET", upper_snake(register))
}

/// Names of the defines describing one field, in emission order.
pub(crate) fn field_macros(register: &str, field: &str) -> [String; 4] {
    let base = format!("{}_{}", upper_snake(register), upper_snake(field));
    FIELD_MACRO_SUFFIXES.map(|suffix| format!("{base}{suffix}"))
}

/// Escapes `text` for use inside a C string literal.
fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            // Octal escapes stop after three digits, unlike `\x`.
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

pub(super) fn generate(bank: &RegisterBank, config: &GeneratorConfig) -> String {
    let guard = upper_snake(bank.name());
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "#ifndef {guard}_H");
    let _ = writeln!(out, "#define {guard}_H");
    out.push('\n');
    let _ = writeln!(
        out,
        "/* File generated automatically by registers-regbank: DO NOT EDIT. */"
    );
    if let Some(version) = &config.header_version {
        let _ = writeln!(out, "#define {guard}_VERSION \"{}\"", c_string(version));
    }

    for reg in bank.registers() {
        out.push('\n');
        let _ = writeln!(out, "/* Register {} */", reg.name);
        let _ = writeln!(out, "#define {} {:#x}", offset_macro(&reg.name), reg.address);
        for field in &reg.fields {
            if config.emit_descriptions && !field.description.trim().is_empty() {
                let _ = writeln!(
                    out,
                    "/* {}.{} ({}): {} */",
                    reg.name,
                    field.name,
                    field.access_kind,
                    field.description.trim().replace("*/", "* /")
                );
            } else {
                let _ = writeln!(
                    out,
                    "/* {}.{} ({}) */",
                    reg.name, field.name, field.access_kind
                );
            }
            let [offset, width, mask, reset] = field_macros(&reg.name, &field.name);
            let _ = writeln!(out, "#define {offset} {}", field.bit_offset);
            let _ = writeln!(out, "#define {width} {}", field.bit_width);
            let _ = writeln!(out, "#define {mask} {:#x}", field.mask());
            let _ = writeln!(out, "#define {reset} {:#x}", field.reset_value);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "#endif /* {guard}_H */");
    out
}
