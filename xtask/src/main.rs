// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod regbank_gen;

#[derive(Parser, Debug)]
#[command(
    name = "xtask",
    author,
    version,
    about = "Register bank compiler developer tasks"
)]
struct Cli {
    /// Log every builder and validation step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register bank descriptions
    Regbank {
        #[command(subcommand)]
        command: RegbankCommands,
    },
}

#[derive(Subcommand, Debug)]
enum RegbankCommands {
    /// Generate RTL, manifest and C header from a bank description
    Generate {
        /// Bank description (.toml or .json)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Directory the artifacts are written to
        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Skip the SystemVerilog register file
        #[arg(long)]
        no_rtl: bool,

        /// Skip the C header
        #[arg(long)]
        no_header: bool,

        /// Skip the JSON manifest
        #[arg(long)]
        no_manifest: bool,

        /// Value returned by reads of unmapped addresses (decimal or 0x-prefixed hex)
        #[arg(long, value_name = "N", value_parser = regbank_gen::parse_u64)]
        unmapped_read_value: Option<u64>,

        /// Version string written to the C header
        #[arg(long, value_name = "VERSION")]
        header_version: Option<String>,
    },
    /// Validate a bank description and report every violation
    Check {
        /// Bank description (.toml or .json)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new().with_level(level).init();

    let result = match cli.command {
        Commands::Regbank { command } => match command {
            RegbankCommands::Generate {
                input,
                out_dir,
                no_rtl,
                no_header,
                no_manifest,
                unmapped_read_value,
                header_version,
            } => regbank_gen::generate(
                &input,
                &out_dir,
                &regbank_gen::Outputs {
                    rtl: !no_rtl,
                    header: !no_header,
                    manifest: !no_manifest,
                },
                unmapped_read_value,
                header_version.as_deref(),
            ),
            RegbankCommands::Check { input } => regbank_gen::check(&input),
        },
    };
    result.unwrap_or_else(|e| {
        eprintln!("{e:#}");
        std::process::exit(1);
    });
}
