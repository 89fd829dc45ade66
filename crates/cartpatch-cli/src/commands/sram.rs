//! SRAM command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{PatchOptions, patch_save_type};

use super::{output_path, print_report, read_rom, write_rom};

/// Run the sram command
pub fn run(
    rom_path: &Path,
    output: Option<PathBuf>,
    options: &PatchOptions,
    json: bool,
) -> Result<()> {
    let mut rom = read_rom(rom_path)?;
    let report = patch_save_type(&mut rom, options)
        .with_context(|| format!("Failed to SRAM patch {}", rom_path.display()))?;

    write_rom(&output_path(rom_path, output, "sram"), &rom)?;
    print_report(&report, json)
}
