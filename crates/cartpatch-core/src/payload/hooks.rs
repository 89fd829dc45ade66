//! Save-write routines the payload can take over.

use tracing::debug;

use crate::error::Result;
use crate::pattern::{Pattern, parse_pattern};
use crate::rom::ByteBuffer;

use super::layout::{PayloadField, thunk};

/// Bytes at the end of the image that are never scanned, so a thunk always fits
pub const SCAN_TAIL_MARGIN: usize = 64;

/// Hook candidates start on halfword boundaries
pub const SCAN_STRIDE: usize = 2;

/// How control is diverted from a write routine into the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thunk {
    /// Thumb `ldr`/`bx` over the routine's first instructions
    Thumb,
    /// ARM-state `ldr`/`bx` over the routine's first instructions
    Arm,
    /// The routine runs unchanged; its epilogue jumps to a post-write hook
    EepromV111Epilogue,
}

impl Thunk {
    /// Write the branch for a routine found at `offset`, targeting `address`.
    pub fn install(self, rom: &mut ByteBuffer, offset: usize, address: u32) -> Result<()> {
        match self {
            Thunk::Thumb => {
                rom.write(offset, &thunk::THUMB)?;
                rom.write_u32_le(offset + thunk::THUMB_ADDRESS, address)
            }
            Thunk::Arm => {
                rom.write(offset, &thunk::ARM)?;
                rom.write_u32_le(offset + thunk::ARM_ADDRESS, address)
            }
            Thunk::EepromV111Epilogue => {
                rom.write(
                    offset + thunk::EEPROM_V111_EPILOGUE_AT,
                    &thunk::EEPROM_V111_EPILOGUE,
                )?;
                rom.write_u32_le(offset + thunk::EEPROM_V111_ADDRESS, address)
            }
        }
    }
}

/// A recognisable save-write routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteHook {
    pub name: &'static str,
    pub signature: &'static str,
    pub thunk: Thunk,
    /// Payload header field holding the replacement routine's offset
    pub target: PayloadField,
    /// Save size implied by this routine, in bytes
    pub save_size: u32,
}

pub const WRITE_HOOKS: [WriteHook; 8] = [
    WriteHook {
        name: "WRITE_SRAM",
        signature: "30 B5 05 1C 0C 1C 13 1C 0B 4A 10 88 0B 49 08 40",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteSramHook,
        save_size: 0x8000,
    },
    WriteHook {
        name: "WRITE_SRAM2",
        signature: "80 B5 83 B0 6F 46 38 60 79 60 BA 60 09 48 09 49",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteSramHook,
        save_size: 0x8000,
    },
    WriteHook {
        name: "WRITE_SRAM_RAM",
        signature: "04 C0 90 E4 01 C0 C1 E4 2C C4 A0 E1 01 C0 C1 E4",
        thunk: Thunk::Arm,
        target: PayloadField::WriteSramHook,
        save_size: 0x8000,
    },
    WriteHook {
        name: "WRITE_EEPROM",
        signature: "70 B5 00 04 0A 1C 40 0B E0 21 09 05 41 18 07 31 00 23 10 78",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteEepromHook,
        save_size: 0x2000,
    },
    WriteHook {
        name: "WRITE_FLASH",
        signature: "70 B5 00 03 0A 1C E0 21 09 05 41 18 01 23 1B 03",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteFlashHook,
        save_size: 0x10000,
    },
    WriteHook {
        name: "WRITE_FLASH2",
        signature: "7C B5 90 B0 00 03 0A 1C E0 21 09 05 09 18 01 23",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteFlashHook,
        save_size: 0x10000,
    },
    WriteHook {
        name: "WRITE_FLASH3",
        signature: "F0 B5 90 B0 0F 1C 00 04 04 0C 03 48 00 68 40 89",
        thunk: Thunk::Thumb,
        target: PayloadField::WriteFlashHook,
        save_size: 0x20000,
    },
    WriteHook {
        name: "WRITE_EEPROMV111",
        signature: "0A 88 80 21 09 06 0A 43 02 60 07 48 00 47 00 00",
        thunk: Thunk::EepromV111Epilogue,
        target: PayloadField::EepromV111Posthook,
        save_size: 0x2000,
    },
];

/// A write routine located in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookMatch {
    pub hook: &'static WriteHook,
    pub offset: usize,
}

/// Walk the image once and collect every write routine it contains.
///
/// Matches never overlap: after a hit the walk resumes past the matched
/// signature. The last [`SCAN_TAIL_MARGIN`] bytes are not examined.
pub fn scan_write_hooks(rom: &[u8]) -> Result<Vec<HookMatch>> {
    let patterns: Vec<(&'static WriteHook, Pattern<'static>)> = WRITE_HOOKS
        .iter()
        .map(|hook| Ok((hook, parse_pattern(hook.signature)?)))
        .collect::<Result<_>>()?;

    let limit = rom.len().saturating_sub(SCAN_TAIL_MARGIN);
    let mut matches = Vec::new();
    let mut pos = 0;
    while pos < limit {
        let hit = patterns.iter().find(|(_, pattern)| {
            rom.get(pos..pos + pattern.len())
                .is_some_and(|window| pattern.matches(window))
        });
        match hit {
            Some((hook, pattern)) => {
                debug!("{} found at 0x{:X}", hook.name, pos);
                matches.push(HookMatch { hook, offset: pos });
                pos += pattern.len();
            }
            None => pos += SCAN_STRIDE,
        }
    }
    Ok(matches)
}
