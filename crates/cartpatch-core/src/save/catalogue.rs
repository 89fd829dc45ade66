//! Static SRAM conversion patches, keyed by save library revision.
//!
//! Each set rewrites the library's erase/write/identify routines so the game
//! talks to plain battery-backed SRAM instead of the original chip. Entries are
//! attempted independently; revisions differ enough that not every entry
//! matches every ROM.

use crate::error::{Error, Result};
use crate::pattern::RomPatch;

use super::SaveType;

/// FLASH_V120 and FLASH_V121
pub const FLASH_V12X: &[RomPatch] = &[
    RomPatch::new(
        "FLASH_V12X #1",
        "90 b5 93 b0 6f 46 39 1d 08 1c 00 f0",
        "00 b5 3d 20 00 02 1f 21 08 43 02 bc 08 47",
    ),
    RomPatch::new(
        "FLASH_V12X #2",
        "80 b5 94 b0 6f 46 39 1c 08 80 38 1c 01 88 0f 29 \
         04 d9 01 48 56 e0 00 00 ff 80 00 00 23 48 23 49 \
         0a 88 23",
        "7c b5 00 07 00 0c e0 21 09 05 09 18 01 23 1b 03 \
         ff 20 08 70 01 3b 01 31 00 2b fa d1 00 20 7c bc \
         02 bc 08 47",
    ),
    RomPatch::new(
        "FLASH_V12X #3",
        "80 b5 94 b0 6f 46 79 60 39 1c 08 80 38 1c 01 88 \
         0f 29 03 d9 00 48 73 e0 ff 80 00 00 38 1c 01 88 \
         08 1c ff f7 21 fe 39 1c 0c 31",
        "7c b5 90 b0 00 03 0a 1c e0 21 09 05 09 18 01 23 \
         1b 03 10 78 08 70 01 3b 01 32 01 31 00 2b f8 d1 \
         00 20 10 b0 7c bc 08 bc 08 47",
    ),
];

/// FLASH_V123 and FLASH_V124
pub const FLASH_V12Y: &[RomPatch] = &[
    RomPatch::new(
        "FLASH_V12Y #1",
        "ff f7 aa ff 00 04 03 0c",
        "1b 23 1b 02 32 20 03 43",
    ),
    RomPatch::new(
        "FLASH_V12Y #2",
        "70 b5 90 b0 15 4d",
        "00 20 70 47 15 4d",
    ),
    RomPatch::new(
        "FLASH_V12Y #3",
        "70 b5 46 46 40 b4 90 b0 00",
        "00 20 70 47 40 b4 90 b0 00",
    ),
    RomPatch::new(
        "FLASH_V12Y #4",
        "f0 b5 90 b0 0f 1c 00 04 04 0c 0f 2c 04 d9 01 48 \
         40 e0 00 00 ff 80 00 00 20 1c ff f7 d7 fe 00 04 \
         05 0c 00 2d 35 d1",
        "70 b5 00 03 0a 1c e0 21 09 05 41 18 01 23 1b 03 \
         10 78 08 70 01 3b 01 32 01 31 00 2b f8 d1 00 20 \
         70 bc 02 bc 08 47",
    ),
];

/// FLASH_V125 and FLASH_V126 use the same routines as V123/V124
pub const FLASH_V12Z: &[RomPatch] = FLASH_V12Y;

/// FLASH512_V130, FLASH512_V131 and FLASH512_V133
///
/// FLASH512_V133 support is unverified against real cartridges.
pub const FLASH512_V13X: &[RomPatch] = &[
    RomPatch::new(
        "FLASH512_V13X #1",
        "f0 b5 a0 b0 0d 1c 16 1c 1f 1c 03 04 1c 0c 0f 4a \
         10 88 0f 49 08 40 03 21 08 43 10 80 0d 48 00 68 \
         01 68 80 20 80 02",
        "70 b5 a0 b0 00 03 40 18 e0 21 09 05 09 18 08 78 \
         10 70 01 3b 01 32 01 31 00 2b f8 d1 00 20 20 b0 \
         70 bc 02 bc 08 47",
    ),
    RomPatch::new(
        "FLASH512_V13X #2",
        "ff f7 88 fd 00 04 03 0c",
        "1b 23 1b 02 32 20 03 43",
    ),
    RomPatch::new(
        "FLASH512_V13X #3",
        "70 b5 90 b0 15 4d 29 88",
        "00 b5 00 20 02 bc 08 47",
    ),
    RomPatch::new(
        "FLASH512_V13X #4",
        "70 b5 46 46 40 b4 90 b0",
        "00 b5 00 20 02 bc 08 47",
    ),
    RomPatch::new(
        "FLASH512_V13X #5",
        "f0 b5 90 b0 0f 1c 00 04 04 0c 03 48 00 68 40 89 \
         84 42 05 d3 01 48 41 e0",
        "7c b5 90 b0 00 03 0a 1c e0 21 09 05 09 18 01 23 \
         1b 03 10 78 08 70 01 3b 01 32 01 31 00 2b f8 d1 \
         00 20 10 b0 7c bc 02 bc 08 47",
    ),
];

/// FLASH1M_V102
pub const FLASH1M_V102: &[RomPatch] = &[
    RomPatch::new(
        "FLASH1M_V102 #1",
        "aa 21 19 70 05 4a 55 21 11 70 b0 21 19 70 e0 21 \
         09 05 08 70 70 47 55 55 00 0e aa 2a 00 0e 30 b5 \
         91 b0 68 46 00 f0 f3 f8 6d 46 01 35 06 4a aa 20",
        "80 21 09 02 09 22 12 06 9f 44 11 80 03 49 c3 02 \
         c9 18 11 80 70 47 fe ff ff 01 00 00 00 00 30 b5 \
         91 b0 68 46 00 f0 f3 f8 6d 46 01 35 06 4a aa 20 \
         00 00 05 49 55 20 00 00 90 20 00 00 10 a9 03 4a \
         10 1c 08 e0 00 00 55 55 00 0e aa 2a 00 0e 20 4e \
         00 00 08 88 01 38 08 80 08 88 00 28 f9 d1 0c 48 \
         13 20 13 20 00 06 04 0c e0 20 00 05 62 20 62 20 \
         00 06 00 0e 04 43 07 49 aa 20 00 00 07 4a 55 20 \
         00 00 f0 20 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V102 #2",
        "14 49 aa 24 0c 70 13 4b 55 22 1a 70 80 20 08 70 \
         0c 70 1a 70 10 20 08 70",
        "0e 21 09 06 ff 24 80 22 13 4b 52 02 01 3a 8c 54 \
         fc d1 00 00 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V102 #3",
        "aa 25 0d 70 13 4b 55 22 1a 70 80 20 08 70 0d 70 \
         1a 70 30 20 20 70",
        "ff 25 08 22 00 00 52 02 01 3a a5 54 fc d1 00 00 \
         00 00 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V102 #4",
        "22 70 09 4b 55 22 1a 70 a0 22 22 70",
        "00 00 09 4b 55 22 00 00 a0 22 00 00",
    ),
];

/// FLASH1M_V103
pub const FLASH1M_V103: &[RomPatch] = &[
    RomPatch::new(
        "FLASH1M_V103 #1",
        "05 4b aa 21 19 70 05 4a 55 21 11 70 b0 21 19 70 \
         e0 21 09 05 08 70 70 47 55 55 00 0e aa 2a 00 0e \
         30 b5 91 b0 68 46 00 f0 f3 f8 6d 46 01 35 06 4a \
         aa 20 10 70 05 49 55 20 08 70 90 20 10 70 10 a9 \
         03 4a 10 1c 08 e0 00 00 55 55 00 0e aa 2a 00 0e \
         20 4e 00 00 08 88 01 38 08 80 08 88 00 28 f9 d1 \
         0c 48",
        "05 4b 80 21 09 02 09 22 12 06 9f 44 11 80 03 49 \
         c3 02 c9 18 11 80 70 47 fe ff ff 01 00 00 00 00 \
         30 b5 91 b0 68 46 00 f0 f3 f8 6d 46 01 35 06 4a \
         aa 20 00 00 05 49 55 20 00 00 90 20 00 00 10 a9 \
         03 4a 10 1c 08 e0 00 00 55 55 00 0e aa 2a 00 0e \
         20 4e 00 00 08 88 01 38 08 80 08 88 00 28 f9 d1 \
         0c 48 13 20 13 20 00 06 04 0c e0 20 00 05 62 20 \
         62 20 00 06 00 0e 04 43 07 49 aa 20 00 00 07 4a \
         55 20 00 00 f0 20 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V103 #2",
        "14 49 aa 24 0c 70 13 4b 55 22 1a 70 80 20 08 70 \
         0c 70 1a 70 10 20 08 70",
        "0e 21 09 06 ff 24 80 22 13 4b 52 02 01 3a 8c 54 \
         fc d1 00 00 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V103 #3",
        "aa 25 0d 70 14 4b 55 22 1a 70 80 20 08 70 0d 70 \
         1a 70 30 20 20 70",
        "ff 25 08 22 00 00 52 02 01 3a a5 54 fc d1 00 00 \
         00 00 00 00 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V103 #4",
        "10 70 0b 49 55 20 08 70 a0 20 10 70",
        "00 00 0b 49 55 20 00 00 a0 20 00 00",
    ),
    RomPatch::new(
        "FLASH1M_V103 #5",
        "22 70 09 4b 55 22 1a 70 a0 22 22 70",
        "00 00 09 4b 55 22 00 00 a0 22 00 00",
    ),
];

/// EEPROM_V120, EEPROM_V121 and EEPROM_V122
///
/// The wildcard in both find patterns is a branch offset that differs between
/// library revisions.
pub const EEPROM_V12X: &[RomPatch] = &[
    RomPatch::new(
        "EEPROM_V12X #1",
        "a2 b0 0d 1c 00 04 03 0c 03 48 00 68 80 88 83 42 \
         05 d3 01 48 ?? e0",
        "00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 00 23 \
         08 78 10 70 01 33 01 32 01 39 07 2b f8 d9 00 20 \
         70 bc 02 bc 08 47",
    ),
    RomPatch::new(
        "EEPROM_V12X #2",
        "30 b5 a9 b0 0d 1c 00 04 04 0c 03 48 00 68 80 88 \
         84 42 05 d3 01 48 ?? e0",
        "70 b5 00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 \
         00 23 10 78 08 70 01 33 01 32 01 39 07 2b f8 d9 \
         00 20 70 bc 02 bc 08 47",
    ),
];

/// EEPROM_V124
///
/// The first find pattern carries the same revision-dependent wildcard as V12X.
pub const EEPROM_V124: &[RomPatch] = &[
    RomPatch::new(
        "EEPROM_V124 #1",
        "a2 b0 0d 1c 00 04 03 0c 03 48 00 68 80 88 83 42 \
         05 d3 01 48 ?? e0",
        "00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 00 23 \
         08 78 10 70 01 33 01 32 01 39 07 2b f8 d9 00 20 \
         70 bc 02 bc 08 47",
    ),
    RomPatch::new(
        "EEPROM_V124 #2",
        "f0 b5 ac b0 0d 1c 00 04 01 0c 12 06 17 0e 03 48 \
         00 68 80 88 81 42 05 d3",
        "70 b5 00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 \
         00 23 10 78 08 70 01 33 01 32 01 39 07 2b f8 d9 \
         00 20 70 bc 02 bc 08 47",
    ),
];

/// EEPROM_V126
pub const EEPROM_V126: &[RomPatch] = &[
    RomPatch::new(
        "EEPROM_V126 #1",
        "a2 b0 0d 1c 00 04 03 0c 03 48 00 68 80 88 83 42 \
         05 d3 01 48 4a e0",
        "00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 00 23 \
         08 78 10 70 01 33 01 32 01 39 07 2b f8 d9 00 20 \
         70 bc 02 bc 08 47",
    ),
    RomPatch::new(
        "EEPROM_V126 #2",
        "f0 b5 47 46 80 b4 ac b0 0e 1c 00 04 05 0c 12 06 \
         12 0e 90 46 03 48 00 68",
        "70 b5 00 04 0a 1c 40 0b e0 21 09 05 41 18 07 31 \
         00 23 10 78 08 70 01 33 01 32 01 39 07 2b f8 d9 \
         00 20 70 bc 02 bc 08 47",
    ),
];

/// How a save library revision is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePatch {
    /// Apply a fixed patch set
    Set(&'static [RomPatch]),
    /// EEPROM_V111 needs offsets computed from the ROM itself
    EepromV111,
}

/// Look up the conversion for `save_type`.
///
/// Plain SRAM and FRAM libraries need nothing and yield
/// [`Error::UnsupportedSaveType`].
pub fn save_patch(save_type: SaveType) -> Result<SavePatch> {
    use SaveType::*;
    let set = match save_type {
        FlashV120 | FlashV121 => FLASH_V12X,
        FlashV123 | FlashV124 => FLASH_V12Y,
        FlashV125 | FlashV126 => FLASH_V12Z,
        Flash512V130 | Flash512V131 | Flash512V133 => FLASH512_V13X,
        Flash1MV102 => FLASH1M_V102,
        Flash1MV103 => FLASH1M_V103,
        EepromV120 | EepromV121 | EepromV122 => EEPROM_V12X,
        EepromV124 => EEPROM_V124,
        EepromV126 => EEPROM_V126,
        EepromV111 => return Ok(SavePatch::EepromV111),
        SramV110 | SramV111 | SramV112 | SramV113 | SramFV100 | SramFV102 | SramFV103
        | SramFV110 => return Err(Error::UnsupportedSaveType(save_type.id().to_string())),
    };
    Ok(SavePatch::Set(set))
}
