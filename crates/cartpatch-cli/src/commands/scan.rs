//! Scan command implementation.
//!
//! Searches a ROM for a pattern such as `"70 B5 ?? 03"` and prints each match
//! with the bytes around it.

use std::path::Path;

use anyhow::{Context, Result};
use cartpatch_core::{find_all, format_pattern, parse_pattern};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::hexdump::{format_lines, format_location};
use super::read_rom;

/// Matches shown with context; the rest are only counted
const MAX_SHOWN: usize = 16;

#[derive(Debug, Serialize)]
struct ScanOutput {
    pattern: String,
    stride: usize,
    offsets: Vec<usize>,
}

/// Run the scan command
pub fn run(
    rom_path: &Path,
    pattern: &str,
    stride: usize,
    context: usize,
    json: bool,
) -> Result<()> {
    let rom = read_rom(rom_path)?;
    let pattern = parse_pattern(pattern).context("Invalid search pattern")?;
    let offsets = find_all(rom.as_slice(), &pattern, stride)?;

    if json {
        let output = ScanOutput {
            pattern: format_pattern(&pattern),
            stride,
            offsets,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} match(es) for {} (stride {})",
        offsets.len().bold(), format_pattern(&pattern).cyan(), stride
    );
    for &offset in offsets.iter().take(MAX_SHOWN) {
        println!();
        println!("{}", format_location(offset).green());
        let start = offset.saturating_sub(context) & !0xF;
        let end = (offset + pattern.len() + context).min(rom.len());
        for line in format_lines(&rom.as_slice()[start..end], start, true) {
            println!("  {}", line);
        }
    }
    if offsets.len() > MAX_SHOWN {
        println!();
        println!("... and {} more", offsets.len() - MAX_SHOWN);
    }
    Ok(())
}
