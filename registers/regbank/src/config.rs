// Licensed under the Apache-2.0 license

//! Configuration for artifact generation.
//!
//! [`NameConfig`] controls how the bank name is turned into the generated
//! module and header names. [`GeneratorConfig`] collects everything else the
//! generator needs beyond the bank itself.

/// Affixes removed from a bank name before it becomes a module or file stem.
///
/// ```
/// use registers_regbank::config::NameConfig;
///
/// let names = NameConfig::with_defaults();
/// assert_eq!(names.transform("i2s_regbank"), "i2s");
/// assert_eq!(names.transform("can_aximm"), "can_aximm");
///
/// let names = NameConfig::none().add_suffix("_aximm").add_prefix("soc_");
/// assert_eq!(names.transform("SOC_can_aximm"), "can");
/// ```
#[derive(Clone, Debug, Default)]
pub struct NameConfig {
    /// Removed repeatedly from the end, ignoring ASCII case.
    pub strip_suffixes: Vec<String>,
    /// Each removed at most once from the start, ignoring ASCII case.
    pub strip_prefixes: Vec<String>,
}

impl NameConfig {
    /// Strips the usual register bank suffixes: `_regbank`, `_regs`, `_csr`.
    pub fn with_defaults() -> Self {
        Self::none()
            .add_suffix("_regbank")
            .add_suffix("_regs")
            .add_suffix("_csr")
    }

    /// Leaves names untouched.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn add_suffix(mut self, suffix: &str) -> Self {
        self.strip_suffixes.push(suffix.to_string());
        self
    }

    pub fn add_prefix(mut self, prefix: &str) -> Self {
        self.strip_prefixes.push(prefix.to_string());
        self
    }

    /// Bank name with prefixes, then suffixes, removed. The remaining
    /// characters keep their case and the result is never empty.
    pub fn transform(&self, name: &str) -> String {
        let mut rest = name;
        for prefix in &self.strip_prefixes {
            if let Some(stripped) = strip_prefix_ignore_case(rest, prefix) {
                rest = stripped;
            }
        }
        while let Some(stripped) = self
            .strip_suffixes
            .iter()
            .find_map(|suffix| strip_suffix_ignore_case(rest, suffix))
        {
            rest = stripped;
        }
        rest.to_string()
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let n = prefix.len();
    let matches = n > 0
        && name.len() > n
        && name.is_char_boundary(n)
        && name[..n].eq_ignore_ascii_case(prefix);
    matches.then(|| &name[n..])
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let n = suffix.len();
    let matches = n > 0
        && name.len() > n
        && name.is_char_boundary(name.len() - n)
        && name[name.len() - n..].eq_ignore_ascii_case(suffix);
    matches.then(|| &name[..name.len() - n])
}

/// Options for [`crate::codegen::Generator`].
///
/// # Example
///
/// ```
/// use registers_regbank::config::GeneratorConfig;
///
/// let config = GeneratorConfig::with_defaults()
///     .unmapped_read_value(0xdead_beef)
///     .header_version("20210528_1505");
/// assert_eq!(config.unmapped_read_value, 0xdead_beef);
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Bank name transformations applied before suffixes are added.
    pub names: NameConfig,

    /// Appended to the transformed bank name to form the HDL module name.
    pub module_suffix: String,

    /// Value returned by reads of unmapped addresses. Truncated to the
    /// bank's data width.
    pub unmapped_read_value: u64,

    /// Emit field descriptions as comments in the generated sources.
    pub emit_descriptions: bool,

    /// Version string written to the C header, if any.
    pub header_version: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    pub fn with_defaults() -> Self {
        Self {
            names: NameConfig::with_defaults(),
            module_suffix: "_regbank".to_string(),
            unmapped_read_value: 0,
            emit_descriptions: true,
            header_version: None,
        }
    }

    pub fn names(mut self, names: NameConfig) -> Self {
        self.names = names;
        self
    }

    pub fn module_suffix(mut self, suffix: &str) -> Self {
        self.module_suffix = suffix.to_string();
        self
    }

    pub fn unmapped_read_value(mut self, value: u64) -> Self {
        self.unmapped_read_value = value;
        self
    }

    pub fn emit_descriptions(mut self, emit: bool) -> Self {
        self.emit_descriptions = emit;
        self
    }

    pub fn header_version(mut self, version: &str) -> Self {
        self.header_version = Some(version.to_string());
        self
    }

    /// Name of the generated HDL module for a bank.
    pub fn module_name(&self, bank_name: &str) -> String {
        format!(
            "{}{}",
            crate::util::snake_case(&self.names.transform(bank_name)),
            self.module_suffix
        )
    }
}
