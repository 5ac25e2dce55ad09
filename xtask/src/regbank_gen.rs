// Licensed under the Apache-2.0 license

//! `xtask regbank` commands: build a bank from its description file and
//! write the generated artifacts.

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use registers_regbank::{
    GeneratorConfig, Manifest, ManifestFormat, RegBankError, RegisterBank,
};
use std::path::Path;

/// Which artifacts `generate` writes.
#[derive(Clone, Copy, Debug)]
pub struct Outputs {
    pub rtl: bool,
    pub header: bool,
    pub manifest: bool,
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_u64(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid integer '{s}': {e}"))
}

/// Loads and finalizes the bank described by `input`.
///
/// Every validation violation is printed before the error is returned.
fn load_bank(input: &Path) -> Result<RegisterBank> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let format = ManifestFormat::from_extension(input.extension().and_then(|e| e.to_str()));
    let manifest = Manifest::parse(&text, format)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut bank = manifest
        .build_draft()
        .with_context(|| format!("invalid bank description {}", input.display()))?;

    match bank.finalize() {
        Ok(()) => Ok(bank),
        Err(RegBankError::Validation(report)) => {
            for (i, violation) in report.iter().enumerate() {
                eprintln!("{}: violation {}: {violation}", input.display(), i + 1);
            }
            bail!(
                "bank '{}' has {} violation(s)",
                report.bank,
                report.len()
            )
        }
        Err(e) => Err(anyhow!(e)),
    }
}

/// Validates a bank description without generating anything.
pub fn check(input: &Path) -> Result<()> {
    let bank = load_bank(input)?;
    println!(
        "{}: bank '{}' is valid ({} registers)",
        input.display(),
        bank.name(),
        bank.register_count()
    );
    Ok(())
}

/// Generate the selected artifacts for the bank described by `input`.
pub fn generate(
    input: &Path,
    out_dir: &Path,
    outputs: &Outputs,
    unmapped_read_value: Option<u64>,
    header_version: Option<&str>,
) -> Result<()> {
    println!("Generating register bank from: {}", input.display());
    let bank = load_bank(input)?;

    let mut config = GeneratorConfig::with_defaults();
    if let Some(value) = unmapped_read_value {
        config = config.unmapped_read_value(value);
    }
    if let Some(version) = header_version {
        config = config.header_version(version);
    }
    let artifacts = registers_regbank::generate(&bank, &config)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let selected = [outputs.rtl, outputs.manifest, outputs.header];
    for ((name, contents), wanted) in artifacts.files().into_iter().zip(selected) {
        if !wanted {
            continue;
        }
        let path = out_dir.join(&name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
        println!("Output written to: {}", path.display());
    }
    Ok(())
}
