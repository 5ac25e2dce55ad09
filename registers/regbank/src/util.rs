// Licensed under the Apache-2.0 license

//! Utility functions for name conversion, identifier checks and formatting.
//!
//! This module provides functions for converting between naming conventions
//! (snake_case, UPPER_SNAKE) and formatting values for HDL and C emission.

/// Converts a name to snake_case.
///
/// Handles various edge cases:
/// - Punctuation and whitespace become underscores
/// - CamelCase transitions get underscore separators
/// - Repeated separators collapse to one
///
/// # Examples
/// ```
/// use registers_regbank::util::snake_case;
/// assert_eq!(snake_case("Config_1"), "config_1");
/// assert_eq!(snake_case("LineStatus"), "line_status");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut result = String::new();
    let mut prev = None;
    for c in name.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_punctuation() {
            if prev != Some('_') {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(prev) = prev {
            if (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && c.is_ascii_uppercase() {
                result.push('_');
            }
        }
        prev = Some(c);
        result.push(c.to_ascii_lowercase());
    }
    result.trim_matches('_').to_string()
}

/// Converts a name to UPPER_SNAKE_CASE, as used for C preprocessor macros.
///
/// Unlike [`snake_case`], existing case boundaries are not split, so
/// `TX_DATA0` and `tx_data0` both map to `TX_DATA0`.
pub fn upper_snake(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns true if `name` is usable as a generated HDL identifier.
///
/// Identifiers must start with an ASCII letter, contain only ASCII
/// alphanumerics and underscores, and must not be a SystemVerilog keyword.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !is_hdl_keyword(&name.to_ascii_lowercase())
}

/// SystemVerilog keywords that commonly collide with register or field names.
fn is_hdl_keyword(s: &str) -> bool {
    matches!(
        s,
        "always"
            | "always_comb"
            | "always_ff"
            | "assign"
            | "begin"
            | "bit"
            | "case"
            | "default"
            | "else"
            | "end"
            | "endcase"
            | "endmodule"
            | "enum"
            | "for"
            | "function"
            | "if"
            | "initial"
            | "inout"
            | "input"
            | "int"
            | "integer"
            | "logic"
            | "module"
            | "negedge"
            | "or"
            | "output"
            | "package"
            | "parameter"
            | "posedge"
            | "reg"
            | "signed"
            | "struct"
            | "typedef"
            | "unique"
            | "wire"
    )
}

/// Returns a mask with the low `width` bits set.
///
/// # Examples
/// ```
/// use registers_regbank::util::low_mask;
/// assert_eq!(low_mask(1), 0x1);
/// assert_eq!(low_mask(29), 0x1fff_ffff);
/// assert_eq!(low_mask(64), u64::MAX);
/// ```
pub fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Formats a sized SystemVerilog literal, e.g. `32'h1f`.
pub fn sv_literal(width: u32, val: u64) -> String {
    format!("{width}'h{val:x}")
}
