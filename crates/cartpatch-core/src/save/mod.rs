//! Save library detection and SRAM conversion.

pub mod catalogue;
mod eeprom_v111;
mod types;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::pattern::apply_patch_set;
use crate::report::PatchReport;
use crate::rom::ByteBuffer;

pub use catalogue::{SavePatch, save_patch};
pub use eeprom_v111::patch_eeprom_v111;
pub use types::{SaveFamily, SaveType};

/// Catalogue patterns are searched at every byte offset
pub const SAVE_PATCH_STRIDE: usize = 1;

/// Convert every save library found in `rom` to plain SRAM.
///
/// Each detected library gets its own patch set. Libraries that need no
/// conversion are skipped. The buffer is modified in place; callers wanting
/// all-or-nothing behaviour wrap this in [`ByteBuffer::transact`].
pub fn convert_to_sram(
    rom: &mut ByteBuffer,
    interchangeable_empty_byte: bool,
) -> Result<PatchReport> {
    let mut report = PatchReport::new("sram");
    let detected = SaveType::detect_all(rom.as_slice());
    if detected.is_empty() {
        warn!("No save library identifier found; nothing to patch");
        report.warn("No save library identifier found");
    }

    for save_type in detected {
        report.save_types.push(save_type.id().to_string());
        match save_patch(save_type) {
            Ok(SavePatch::Set(set)) => {
                let locations = apply_patch_set(rom, set, SAVE_PATCH_STRIDE)?;
                let applied = locations.iter().filter(|l| l.found).count();
                info!(
                    "{}: applied {}/{} patches",
                    save_type, applied, locations.len()
                );
                if applied == 0 {
                    report.warn(format!("{}: no patch in its set matched", save_type));
                }
                report.locations.extend(locations);
            }
            Ok(SavePatch::EepromV111) => {
                report
                    .locations
                    .extend(patch_eeprom_v111(rom, interchangeable_empty_byte)?);
            }
            Err(Error::UnsupportedSaveType(id)) => {
                info!("{} needs no SRAM patch", id);
            }
            Err(e) => return Err(e),
        }
    }

    report.rom_size = rom.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    #[test]
    fn test_convert_flash_v120() {
        let patch = &catalogue::FLASH_V12X[0];
        let find = parse_pattern(patch.find).unwrap();

        let mut rom = ByteBuffer::filled(0x4000, 0xFF);
        rom.write(0x100, b"FLASH_V120").unwrap();
        rom.write(0x1000, find.data()).unwrap();

        let report = convert_to_sram(&mut rom, true).unwrap();
        let replace = parse_pattern(patch.replace).unwrap();
        assert_eq!(rom.get(0x1000, replace.len()).unwrap(), replace.data());
        assert_eq!(report.save_types, vec!["FLASH_V120".to_string()]);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.locations.len(), catalogue::FLASH_V12X.len());
    }

    #[test]
    fn test_sram_library_is_a_no_op() {
        let mut rom = ByteBuffer::filled(0x400, 0xFF);
        rom.write(0x40, b"SRAM_V113").unwrap();
        let before = rom.clone();

        let report = convert_to_sram(&mut rom, true).unwrap();
        assert_eq!(rom, before);
        assert_eq!(report.save_types, vec!["SRAM_V113".to_string()]);
        assert!(report.locations.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_untagged_rom_reports_warning() {
        let mut rom = ByteBuffer::filled(0x400, 0xFF);
        let report = convert_to_sram(&mut rom, true).unwrap();
        assert!(report.save_types.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }
}
