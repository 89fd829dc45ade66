//! EEPROM_V111 conversion.
//!
//! Unlike the other libraries this one cannot be converted with fixed bytes:
//! the replacement routine lives in a footer appended after the game data, and
//! the patched call site and the footer each carry the other's address.

use tracing::info;

use crate::error::{Error, Result};
use crate::pattern::{RomPatch, find, scan_and_apply};
use crate::report::PatchLocation;
use crate::rom::layout::cartridge::PADDING_BYTE;
use crate::rom::{ByteBuffer, find_end_of_data, next_aligned_address};

/// Call site redirected into the footer; bytes +4..+7 receive the footer address
pub const CALL_SITE: RomPatch = RomPatch::new(
    "EEPROM_V111 #1",
    "0e 48 39 68 01 60 0e 48",
    "00 48 00 47 00 00 00 08",
);

pub const READ_FIX: RomPatch = RomPatch::new(
    "EEPROM_V111 #2",
    "27 e0 d0 20 00 05 01 88",
    "27 e0 e0 20 00 05 01 88",
);

/// Replacement routine; bytes +184..+187 receive the return address
pub const FOOTER: [u8; 188] = [
    0x39, 0x68, 0x27, 0x48, 0x81, 0x42, 0x23, 0xD0, 0x89, 0x1C, 0x08, 0x88,
    0x01, 0x28, 0x02, 0xD1, 0x24, 0x48, 0x78, 0x60, 0x33, 0xE0, 0x00, 0x23,
    0x00, 0x22, 0x89, 0x1C, 0x10, 0xB4, 0x01, 0x24, 0x08, 0x68, 0x20, 0x40,
    0x5B, 0x00, 0x03, 0x43, 0x89, 0x1C, 0x52, 0x1C, 0x06, 0x2A, 0xF7, 0xD1,
    0x10, 0xBC, 0x39, 0x60, 0xDB, 0x01, 0x02, 0x20, 0x00, 0x02, 0x1B, 0x18,
    0x0E, 0x20, 0x00, 0x06, 0x1B, 0x18, 0x7B, 0x60, 0x39, 0x1C, 0x08, 0x31,
    0x08, 0x88, 0x09, 0x38, 0x08, 0x80, 0x16, 0xE0, 0x15, 0x49, 0x00, 0x23,
    0x00, 0x22, 0x10, 0xB4, 0x01, 0x24, 0x08, 0x68, 0x20, 0x40, 0x5B, 0x00,
    0x03, 0x43, 0x89, 0x1C, 0x52, 0x1C, 0x06, 0x2A, 0xF7, 0xD1, 0x10, 0xBC,
    0xDB, 0x01, 0x02, 0x20, 0x00, 0x02, 0x1B, 0x18, 0x0E, 0x20, 0x00, 0x06,
    0x1B, 0x18, 0x08, 0x3B, 0x3B, 0x60, 0x0B, 0x48, 0x39, 0x68, 0x01, 0x60,
    0x0A, 0x48, 0x79, 0x68, 0x01, 0x60, 0x0A, 0x48, 0x39, 0x1C, 0x08, 0x31,
    0x0A, 0x88, 0x80, 0x21, 0x09, 0x06, 0x0A, 0x43, 0x02, 0x60, 0x07, 0x48,
    0x00, 0x47, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x0E,
    0x04, 0x00, 0x00, 0x0E, 0xD4, 0x00, 0x00, 0x04, 0xD8, 0x00, 0x00, 0x04,
    0xDC, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x08,
];

const FOOTER_ALIGNMENT: usize = 16;
const CALL_SITE_ADDRESS_FIELD: usize = 4;
const FOOTER_RETURN_FIELD: usize = 184;
const RETURN_OFFSET: usize = 33;

/// Addresses are stored as 24-bit offsets under a fixed 0x08 high byte.
const MAX_FIELD_VALUE: usize = 0xFF_FFFF;

/// Apply the EEPROM_V111 conversion.
///
/// The footer goes at the first 16-byte boundary past the end of data, growing
/// the ROM when it does not fit. Fails with [`Error::PatternNotFound`] before
/// modifying anything if the call site is missing.
pub fn patch_eeprom_v111(
    rom: &mut ByteBuffer,
    interchangeable_empty_byte: bool,
) -> Result<Vec<PatchLocation>> {
    let call_site_pattern = CALL_SITE.find_pattern()?;
    if !find(rom.as_slice(), &call_site_pattern, 0, 1)?.found {
        return Err(Error::PatternNotFound(
            "EEPROM_V111 call site; cannot write footer".to_string(),
        ));
    }

    let end_of_data = find_end_of_data(rom.as_slice(), interchangeable_empty_byte);
    let footer_offset = next_aligned_address(end_of_data + 1, FOOTER_ALIGNMENT);
    if footer_offset + 1 > MAX_FIELD_VALUE {
        return Err(Error::RomTooLarge {
            size: footer_offset,
            max: MAX_FIELD_VALUE,
        });
    }

    let call_site = scan_and_apply(rom, &CALL_SITE, 1)?;
    let read_fix = scan_and_apply(rom, &READ_FIX, 1)?;
    let Some(call_site_offset) = call_site.offset() else {
        return Err(Error::PatternNotFound(CALL_SITE.name.to_string()));
    };

    let footer_end = footer_offset + FOOTER.len();
    if footer_end > rom.len() {
        let fill = rom.last().unwrap_or(PADDING_BYTE);
        rom.resize(footer_end, fill);
    }
    rom.write(footer_offset, &FOOTER)?;
    rom.write_u24_le(
        call_site_offset + CALL_SITE_ADDRESS_FIELD,
        (footer_offset + 1) as u32,
    )?;
    rom.write_u24_le(
        footer_offset + FOOTER_RETURN_FIELD,
        (call_site_offset + RETURN_OFFSET) as u32,
    )?;
    info!(
        "EEPROM_V111 footer written at 0x{:X}, call site at 0x{:X}",
        footer_offset, call_site_offset
    );

    Ok(vec![
        PatchLocation::from_match(CALL_SITE.name, call_site),
        PatchLocation::from_match(READ_FIX.name, read_fix),
        PatchLocation::found("EEPROM_V111 footer", footer_offset),
    ])
}
