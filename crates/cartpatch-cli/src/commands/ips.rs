//! IPS apply and create commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{PatchOptions, apply_ips_and_patch_save_type, apply_ips_patch, create_patch};
use tracing::info;

use super::{output_path, print_report, read_rom, write_rom};

/// Run the ips command, optionally SRAM patching the result in the same step
pub fn run(
    rom_path: &Path,
    patch_path: &Path,
    output: Option<PathBuf>,
    options: &PatchOptions,
    sram: bool,
    json: bool,
) -> Result<()> {
    let mut rom = read_rom(rom_path)?;
    let patch = fs::read(patch_path)
        .with_context(|| format!("Failed to read patch {}", patch_path.display()))?;

    let report = if sram {
        apply_ips_and_patch_save_type(&mut rom, &patch, options)
    } else {
        apply_ips_patch(&mut rom, &patch, options)
    }
    .with_context(|| format!("Failed to apply {}", patch_path.display()))?;

    write_rom(&output_path(rom_path, output, "patched"), &rom)?;
    print_report(&report, json)
}

/// Run the ips-create command
pub fn create(original: &Path, modified: &Path, output: &Path) -> Result<()> {
    let original_bytes = fs::read(original)
        .with_context(|| format!("Failed to read {}", original.display()))?;
    let modified_bytes = fs::read(modified)
        .with_context(|| format!("Failed to read {}", modified.display()))?;

    let patch = create_patch(&original_bytes, &modified_bytes)
        .context("Images cannot be expressed as an IPS patch")?;
    fs::write(output, &patch)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} ({} bytes)", output.display(), patch.len());
    println!("Created {} ({} bytes)", output.display(), patch.len());
    Ok(())
}
