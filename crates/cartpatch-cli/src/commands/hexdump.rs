//! Hexdump command implementation.
//!
//! # Output Format
//!
//! ```text
//! 0x001000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```
//!
//! Offsets are given in hex. Values inside the cartridge window (0x08000000
//! and up) are read as CPU addresses and mapped back to ROM offsets.

use std::path::Path;

use anyhow::{Result, bail};
use cartpatch_core::rom::{cartridge, rom_address, rom_offset};

use super::read_rom;

/// Parse a ROM offset or cartridge address given in hex.
pub fn parse_offset(s: &str) -> Result<usize> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    let value = match u32::from_str_radix(digits, 16) {
        Ok(value) => value,
        Err(e) => bail!("Invalid hex offset {:?}: {}", s, e),
    };
    if value >= cartridge::ROM_BASE {
        return match rom_offset(value) {
            Some(offset) => Ok(offset),
            None => bail!("0x{:08X} is outside the cartridge window", value),
        };
    }
    Ok(value as usize)
}

/// `0x001234 (0x08001234)`, or the bare offset past the addressable range.
pub fn format_location(offset: usize) -> String {
    match rom_address(offset) {
        Some(address) => format!("0x{:06X} (0x{:08X})", offset, address),
        None => format!("0x{:06X}", offset),
    }
}

/// Run the hexdump command
pub fn run(rom_path: &Path, offset: usize, size: usize, ascii: bool) -> Result<()> {
    let rom = read_rom(rom_path)?;
    let bytes = rom.get(offset, size.min(rom.len().saturating_sub(offset)))?;

    println!("Hexdump at 0x{:X} ({} bytes):", offset, bytes.len());
    println!();
    for line in format_lines(bytes, offset, ascii) {
        println!("{}", line);
    }
    Ok(())
}

/// Render `bytes` as 16-byte rows labelled from `base`.
pub fn format_lines(bytes: &[u8], base: usize, ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:06X}: ", base + i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                line.push_str(" |");
                for &byte in chunk {
                    let printable = (0x20..0x7F).contains(&byte);
                    line.push(if printable { byte as char } else { '.' });
                }
                for _ in chunk.len()..16 {
                    line.push(' ');
                }
                line.push('|');
            }
            line
        })
        .collect()
}
