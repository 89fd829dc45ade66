//! Payload header and branch thunk constants

use strum::{Display, EnumIter};

/// Marker embedded in the payload; its presence means the ROM is already patched
pub const SIGNATURE: &[u8] = b"<3 from Maniac";

/// The marker is word aligned inside the payload
pub const SIGNATURE_STRIDE: usize = 4;

/// Words in the payload header table
pub const HEADER_WORDS: usize = 8;

/// Size of the header table in bytes
pub const HEADER_LEN: usize = HEADER_WORDS * 4;

/// Save size assumed when no write routine could be identified (128 KiB)
pub const DEFAULT_SAVE_SIZE: u32 = 0x20000;

/// Little-endian u32 fields at the start of the payload blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[repr(usize)]
pub enum PayloadField {
    /// Written by the injector: absolute address of the game's own entry point
    OriginalEntrypoint = 0,
    /// Written by the injector: flush policy flag
    FlushMode = 1,
    /// Written by the injector: save size in bytes
    SaveSize = 2,
    /// Read by the injector: offset of the payload's boot routine
    PatchedEntrypoint = 3,
    /// Offset of the SRAM write hook
    WriteSramHook = 4,
    /// Offset of the EEPROM write hook
    WriteEepromHook = 5,
    /// Offset of the flash write hook
    WriteFlashHook = 6,
    /// Offset of the EEPROM_V111 post-write hook
    EepromV111Posthook = 7,
}

impl PayloadField {
    /// Byte offset of this field from the start of the payload
    pub fn offset(self) -> usize {
        self as usize * 4
    }
}

/// Branch sequences written over identified write routines
pub mod thunk {
    /// `ldr r3, [pc, #0]; bx r3`, target address stored right after
    pub const THUMB: [u8; 4] = [0x00, 0x4B, 0x18, 0x47];
    pub const THUMB_ADDRESS: usize = 4;

    /// `ldr r3, [pc, #0]; bx r3` in ARM state
    pub const ARM: [u8; 8] = [0x00, 0x30, 0x9F, 0xE5, 0x13, 0xFF, 0x2F, 0xE1];
    pub const ARM_ADDRESS: usize = 8;

    /// `ldr r1, [pc, #28]; bx r1` patched into the EEPROM_V111 epilogue
    pub const EEPROM_V111_EPILOGUE: [u8; 4] = [0x07, 0x49, 0x08, 0x47];
    pub const EEPROM_V111_EPILOGUE_AT: usize = 12;
    pub const EEPROM_V111_ADDRESS: usize = 44;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_field_offsets_cover_header() {
        let offsets: Vec<usize> = PayloadField::iter().map(PayloadField::offset).collect();
        assert_eq!(offsets.len(), HEADER_WORDS);
        assert_eq!(offsets.first(), Some(&0));
        assert_eq!(offsets.last(), Some(&(HEADER_LEN - 4)));
        assert_eq!(PayloadField::SaveSize.offset(), 8);
    }
}
