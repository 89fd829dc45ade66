//! Batteryless command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{PatchOptions, Payload, patch_payload};

use super::{output_path, print_report, read_rom, write_rom};

/// Run the batteryless command
pub fn run(
    rom_path: &Path,
    payload_path: &Path,
    output: Option<PathBuf>,
    options: &PatchOptions,
    json: bool,
) -> Result<()> {
    let mut rom = read_rom(rom_path)?;
    let payload = Payload::from_file(payload_path)
        .with_context(|| format!("Failed to load payload {}", payload_path.display()))?;

    let report = patch_payload(&mut rom, &payload, options)
        .with_context(|| format!("Failed to patch {}", rom_path.display()))?;

    write_rom(&output_path(rom_path, output, "batteryless"), &rom)?;
    print_report(&report, json)
}
