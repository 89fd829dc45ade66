//! CLI command implementations.
//!
//! Each command reads its inputs, calls one core operation and writes the
//! result. Nothing is written when the operation fails.

pub mod batteryless;
pub mod detect;
pub mod hexdump;
pub mod ips;
pub mod scan;
pub mod sram;
pub mod trim;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{ByteBuffer, PatchReport};
use owo_colors::OwoColorize;
use tracing::info;

pub fn read_rom(path: &Path) -> Result<ByteBuffer> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read ROM {}", path.display()))?;
    info!("Loaded {} (0x{:X} bytes)", path.display(), bytes.len());
    Ok(ByteBuffer::from(bytes))
}

pub fn write_rom(path: &Path, rom: &ByteBuffer) -> Result<()> {
    fs::write(path, rom.as_slice())
        .with_context(|| format!("Failed to write ROM {}", path.display()))?;
    info!("Wrote {} (0x{:X} bytes)", path.display(), rom.len());
    Ok(())
}

/// `output`, or `<stem>_<suffix>.<ext>` next to `input`.
pub fn output_path(input: &Path, output: Option<PathBuf>, suffix: &str) -> PathBuf {
    if let Some(output) = output {
        return output;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rom".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    input.with_file_name(name)
}

pub fn print_report(report: &PatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("{} {}", "==>".bold(), report.operation.bold());
    if !report.save_types.is_empty() {
        println!("  save types: {}", report.save_types.join(", ").cyan());
    }
    for location in &report.locations {
        match location.offset {
            Some(offset) if location.found => {
                println!("  {} {} at 0x{:X}", "+".green(), location.name, offset)
            }
            _ => println!("  {} {} not found", "-".dimmed(), location.name.dimmed()),
        }
    }
    if let Some(offset) = report.payload_offset {
        println!("  payload at 0x{:X}", offset);
    }
    if let Some(size) = report.save_size {
        println!("  save size 0x{:X} ({} KiB)", size, size / 1024);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
    println!("  ROM size 0x{:X}", report.rom_size);
    Ok(())
}
