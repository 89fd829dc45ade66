use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::debug;

use crate::pattern::contains_bytes;

/// Save library revisions, identified by the ASCII tag the library embeds in the ROM.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display, EnumString, EnumIter,
)]
pub enum SaveType {
    #[strum(serialize = "EEPROM_V111")]
    EepromV111,
    #[strum(serialize = "EEPROM_V120")]
    EepromV120,
    #[strum(serialize = "EEPROM_V121")]
    EepromV121,
    #[strum(serialize = "EEPROM_V122")]
    EepromV122,
    #[strum(serialize = "EEPROM_V124")]
    EepromV124,
    #[strum(serialize = "EEPROM_V126")]
    EepromV126,
    #[strum(serialize = "FLASH_V120")]
    FlashV120,
    #[strum(serialize = "FLASH_V121")]
    FlashV121,
    #[strum(serialize = "FLASH_V123")]
    FlashV123,
    #[strum(serialize = "FLASH_V124")]
    FlashV124,
    #[strum(serialize = "FLASH_V125")]
    FlashV125,
    #[strum(serialize = "FLASH_V126")]
    FlashV126,
    #[strum(serialize = "FLASH512_V130")]
    Flash512V130,
    #[strum(serialize = "FLASH512_V131")]
    Flash512V131,
    #[strum(serialize = "FLASH512_V133")]
    Flash512V133,
    #[strum(serialize = "FLASH1M_V102")]
    Flash1MV102,
    #[strum(serialize = "FLASH1M_V103")]
    Flash1MV103,
    #[strum(serialize = "SRAM_V110")]
    SramV110,
    #[strum(serialize = "SRAM_V111")]
    SramV111,
    #[strum(serialize = "SRAM_V112")]
    SramV112,
    #[strum(serialize = "SRAM_V113")]
    SramV113,
    #[strum(serialize = "SRAM_F_V100")]
    SramFV100,
    #[strum(serialize = "SRAM_F_V102")]
    SramFV102,
    #[strum(serialize = "SRAM_F_V103")]
    SramFV103,
    #[strum(serialize = "SRAM_F_V110")]
    SramFV110,
}

impl SaveType {
    /// Identifier string as it appears in the ROM
    pub fn id(self) -> &'static str {
        self.into()
    }

    pub fn family(self) -> SaveFamily {
        use SaveType::*;
        match self {
            EepromV111 | EepromV120 | EepromV121 | EepromV122 | EepromV124 | EepromV126 => {
                SaveFamily::Eeprom
            }
            FlashV120 | FlashV121 | FlashV123 | FlashV124 | FlashV125 | FlashV126
            | Flash512V130 | Flash512V131 | Flash512V133 => SaveFamily::Flash,
            Flash1MV102 | Flash1MV103 => SaveFamily::Flash1M,
            SramV110 | SramV111 | SramV112 | SramV113 | SramFV100 | SramFV102 | SramFV103
            | SramFV110 => SaveFamily::Sram,
        }
    }

    /// Every save library whose identifier occurs in `rom`, in catalogue order.
    pub fn detect_all(rom: &[u8]) -> Vec<SaveType> {
        let found: Vec<SaveType> = SaveType::iter()
            .filter(|save_type| contains_bytes(rom, save_type.id().as_bytes()))
            .collect();
        debug!("Detected save types: {:?}", found);
        found
    }
}

/// Coarse save hardware class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SaveFamily {
    Eeprom,
    Flash,
    Flash1M,
    Sram,
}

impl SaveFamily {
    /// Identifier prefixes checked in order; the first hit decides the family.
    const PREFIXES: [(&'static [u8], SaveFamily); 6] = [
        (b"FLASH1M_V1", SaveFamily::Flash1M),
        (b"EEPROM_V1", SaveFamily::Eeprom),
        (b"FLASH_V1", SaveFamily::Flash),
        (b"FLASH512_V1", SaveFamily::Flash),
        (b"SRAM_V1", SaveFamily::Sram),
        (b"SRAM_F_V1", SaveFamily::Sram),
    ];

    /// Classify a ROM by prefix only. `None` means no save library tag was found.
    pub fn detect(rom: &[u8]) -> Option<SaveFamily> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| contains_bytes(rom, prefix))
            .map(|&(_, family)| family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_tag(tag: &[u8]) -> Vec<u8> {
        let mut rom = vec![0xFF; 0x400];
        rom[0x200..0x200 + tag.len()].copy_from_slice(tag);
        rom
    }

    #[test]
    fn test_ids_roundtrip() {
        assert_eq!(SaveType::iter().count(), 25);
        for save_type in SaveType::iter() {
            assert_eq!(save_type.id().parse::<SaveType>().unwrap(), save_type);
            assert_eq!(save_type.to_string(), save_type.id());
        }
    }

    #[test]
    fn test_detect_all() {
        let rom = rom_with_tag(b"FLASH1M_V103");
        assert_eq!(SaveType::detect_all(&rom), vec![SaveType::Flash1MV103]);
        assert!(SaveType::detect_all(&[0xFF; 64]).is_empty());
    }

    #[test]
    fn test_family() {
        assert_eq!(SaveType::EepromV111.family(), SaveFamily::Eeprom);
        assert_eq!(SaveType::Flash512V133.family(), SaveFamily::Flash);
        assert_eq!(SaveType::Flash1MV102.family(), SaveFamily::Flash1M);
        assert_eq!(SaveType::SramFV110.family(), SaveFamily::Sram);
        assert_eq!(SaveFamily::Flash1M.to_string(), "flash1m");
    }

    #[test]
    fn test_family_detect_prefers_flash1m() {
        assert_eq!(
            SaveFamily::detect(&rom_with_tag(b"FLASH1M_V102")),
            Some(SaveFamily::Flash1M)
        );
        assert_eq!(
            SaveFamily::detect(&rom_with_tag(b"SRAM_F_V100")),
            Some(SaveFamily::Sram)
        );
        assert_eq!(SaveFamily::detect(&rom_with_tag(b"NOTHING")), None);
    }
}
