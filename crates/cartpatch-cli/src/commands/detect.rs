//! Detect command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use cartpatch_core::{SaveFamily, inspect};
use owo_colors::OwoColorize;

use super::{print_report, read_rom};

/// Run the detect command
pub fn run(rom_path: &Path, json: bool) -> Result<()> {
    let rom = read_rom(rom_path)?;
    let report = inspect(rom.as_slice())
        .with_context(|| format!("Failed to inspect {}", rom_path.display()))?;

    if !json {
        match SaveFamily::detect(rom.as_slice()) {
            Some(family) => println!("Save family: {}", family.to_string().cyan()),
            None => println!("Save family: {}", "none".dimmed()),
        }
    }
    print_report(&report, json)
}
