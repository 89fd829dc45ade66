mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::hexdump::parse_offset;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "cartpatch")]
#[command(version, about = "Cartridge ROM patcher: batteryless saves, SRAM conversion, IPS")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        env = "CARTPATCH_CONFIG",
        default_value = "cartpatch.toml"
    )]
    config: PathBuf,

    /// Print the patch report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the batteryless save payload
    Batteryless {
        rom: PathBuf,
        /// Payload blob (defaults to [batteryless].payload from the config)
        #[arg(short, long)]
        payload: Option<PathBuf>,
        /// Fall back to a 128KB save when no write routine is found
        #[arg(long)]
        auto: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert the ROM's save library to plain SRAM
    Sram {
        rom: PathBuf,
        #[arg(long, default_value_t = 0)]
        bank_type: u8,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply an IPS patch
    Ips {
        rom: PathBuf,
        patch: PathBuf,
        /// SRAM patch the result as part of the same operation
        #[arg(long)]
        sram: bool,
        /// Recompute the header check byte after patching
        #[arg(long)]
        fix_checksum: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create an IPS patch from two images
    IpsCreate {
        original: PathBuf,
        modified: PathBuf,
        output: PathBuf,
    },
    /// Cut trailing padding down to the configured alignment
    Trim {
        rom: PathBuf,
        #[arg(long)]
        alignment: Option<usize>,
        /// Rewrite mixed 0x00/0xFF padding without resizing
        #[arg(long)]
        uniformize: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show save library tags and hookable write routines
    Detect { rom: PathBuf },
    /// Search for a byte pattern (`??` matches any byte)
    Scan {
        rom: PathBuf,
        pattern: String,
        #[arg(long, default_value_t = 1)]
        stride: usize,
        /// Bytes of context shown around each match
        #[arg(long, default_value_t = 16)]
        context: usize,
    },
    /// Dump bytes of a ROM
    Hexdump {
        rom: PathBuf,
        /// Start offset or cartridge address (hex)
        #[arg(value_parser = parse_offset)]
        offset: usize,
        #[arg(long, default_value_t = 256)]
        size: usize,
        /// Hide the ASCII column
        #[arg(long)]
        no_ascii: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "cartpatch=debug" } else { "cartpatch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Batteryless {
            rom,
            payload,
            auto,
            output,
        } => {
            let payload = payload
                .or_else(|| config.batteryless.payload.clone())
                .context("No payload given; pass --payload or set [batteryless].payload")?;
            let mut options = config.options();
            if auto {
                options = options.auto_mode(true);
            }
            commands::batteryless::run(&rom, &payload, output, &options.build(), cli.json)
        }
        Command::Sram {
            rom,
            bank_type,
            output,
        } => {
            let options = config.options().sram_bank_type(bank_type).build();
            commands::sram::run(&rom, output, &options, cli.json)
        }
        Command::Ips {
            rom,
            patch,
            sram,
            fix_checksum,
            output,
        } => {
            let options = config.options().fix_header_checksum(fix_checksum).build();
            commands::ips::run(&rom, &patch, output, &options, sram, cli.json)
        }
        Command::IpsCreate {
            original,
            modified,
            output,
        } => commands::ips::create(&original, &modified, &output),
        Command::Trim {
            rom,
            alignment,
            uniformize,
            output,
        } => {
            let mut options = config.options();
            if let Some(alignment) = alignment {
                options = options.alignment(alignment);
            }
            commands::trim::run(&rom, output, &options.build(), uniformize, cli.json)
        }
        Command::Detect { rom } => commands::detect::run(&rom, cli.json),
        Command::Scan {
            rom,
            pattern,
            stride,
            context,
        } => commands::scan::run(&rom, &pattern, stride, context, cli.json),
        Command::Hexdump {
            rom,
            offset,
            size,
            no_ascii,
        } => commands::hexdump::run(&rom, offset, size, !no_ascii),
    }
}
