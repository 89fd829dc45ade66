//! Trim command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{PatchOptions, trim, uniformize};

use super::{output_path, print_report, read_rom, write_rom};

/// Run the trim command.
///
/// With `uniformize_only` the image keeps its size and only its padding is
/// rewritten.
pub fn run(
    rom_path: &Path,
    output: Option<PathBuf>,
    options: &PatchOptions,
    uniformize_only: bool,
    json: bool,
) -> Result<()> {
    let mut rom = read_rom(rom_path)?;

    let (report, suffix) = if uniformize_only {
        let report = uniformize(&mut rom, options)
            .with_context(|| format!("Failed to uniformize {}", rom_path.display()))?;
        (report, "uniform")
    } else {
        (trim(&mut rom, options), "trimmed")
    };

    write_rom(&output_path(rom_path, output, suffix), &rom)?;
    print_report(&report, json)
}
