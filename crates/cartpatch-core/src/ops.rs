//! Public patch operations.
//!
//! Each operation works on a copy of the caller's image and writes it back
//! only when every step succeeds. On error the caller's buffer is unchanged.

use tracing::{debug, info};

use crate::error::Result;
use crate::ips::apply_ips;
use crate::options::PatchOptions;
use crate::payload::{Payload, PayloadInjector, SIGNATURE, detect_write_hooks};
use crate::pattern::contains_bytes;
use crate::report::{PatchLocation, PatchReport};
use crate::rom::{ByteBuffer, fix_header_checksum, header, trim_padding, uniformize_padding};
use crate::save::{SaveType, convert_to_sram};

/// Install the batteryless save payload.
///
/// `options.mode` selects both the write-hook policy and the payload's flush flag.
pub fn patch_payload(
    rom: &mut ByteBuffer,
    payload: &Payload,
    options: &PatchOptions,
) -> Result<PatchReport> {
    let injector = PayloadInjector::new(rom.clone(), payload, options.mode)?;
    let (patched, report) = injector.run()?;
    *rom = patched;
    Ok(report)
}

/// Convert the ROM's save library to plain SRAM.
pub fn patch_save_type(rom: &mut ByteBuffer, options: &PatchOptions) -> Result<PatchReport> {
    let mut report =
        rom.transact(|work| convert_to_sram(work, options.interchangeable_empty_byte))?;
    // Accepted for every library; only recorded for now.
    report.sram_bank_type = Some(options.sram_bank_type);
    Ok(report)
}

/// Apply an IPS patch.
///
/// The result matches the patch's target byte for byte unless
/// `options.fix_header_checksum` asks for the header check byte to be
/// recomputed afterwards.
pub fn apply_ips_patch(
    rom: &mut ByteBuffer,
    ips: &[u8],
    options: &PatchOptions,
) -> Result<PatchReport> {
    rom.transact(|work| ips_steps(work, ips, options))
}

/// Apply an IPS patch, then convert the save library, as one operation.
pub fn apply_ips_and_patch_save_type(
    rom: &mut ByteBuffer,
    ips: &[u8],
    options: &PatchOptions,
) -> Result<PatchReport> {
    rom.transact(|work| {
        let mut report = ips_steps(work, ips, options)?;
        let mut sram = convert_to_sram(work, options.interchangeable_empty_byte)?;
        sram.sram_bank_type = Some(options.sram_bank_type);
        report.merge(sram);
        report.operation = "ips+sram".to_string();
        Ok(report)
    })
}

fn ips_steps(rom: &mut ByteBuffer, ips: &[u8], options: &PatchOptions) -> Result<PatchReport> {
    let mut report = PatchReport::new("ips");
    apply_ips(rom, ips)?;

    if options.fix_header_checksum {
        if rom.len() > header::CHECKSUM {
            let check = fix_header_checksum(rom)?;
            debug!("Header check byte set to 0x{:02X}", check);
            report.record(PatchLocation::found("header checksum", header::CHECKSUM));
        } else {
            report.warn("Image too small for a cartridge header; check byte not updated");
        }
    }

    report.rom_size = rom.len();
    Ok(report)
}

/// Drop trailing padding, keeping the image `options.alignment`-aligned.
pub fn trim(rom: &mut ByteBuffer, options: &PatchOptions) -> PatchReport {
    let before = rom.len();
    trim_padding(rom, options.alignment, options.interchangeable_empty_byte);
    info!("Trimmed ROM from 0x{:X} to 0x{:X} bytes", before, rom.len());

    let mut report = PatchReport::new("trim");
    report.rom_size = rom.len();
    report
}

/// Rewrite mixed 0x00/0xFF padding as a single filler byte.
pub fn uniformize(rom: &mut ByteBuffer, options: &PatchOptions) -> Result<PatchReport> {
    rom.transact(|work| {
        uniformize_padding(work, options.alignment, options.interchangeable_empty_byte)
    })?;
    let mut report = PatchReport::new("uniformize");
    report.rom_size = rom.len();
    Ok(report)
}

/// Describe what the patch operations would find, without modifying anything.
pub fn inspect(rom: &[u8]) -> Result<PatchReport> {
    let mut report = PatchReport::new("detect");
    report.save_types = SaveType::detect_all(rom)
        .into_iter()
        .map(|save_type| save_type.id().to_string())
        .collect();
    report.locations = detect_write_hooks(rom)?;
    if contains_bytes(rom, SIGNATURE) {
        report.warn("Batteryless payload signature present");
    }
    report.rom_size = rom.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ips::{EOF_MARKER, HEADER};
    use crate::options::PatchMode;
    use crate::payload::test_payload;

    #[test]
    fn test_failed_payload_leaves_rom_untouched() {
        let mut rom = ByteBuffer::filled(0x4_0000, 0xFF);
        rom.write(0x100, &[0xFC, 0x7F, 0x00, 0x03]).unwrap();
        let before = rom.clone();

        let options = PatchOptions::builder().mode(PatchMode::Auto).build();
        let err = patch_payload(&mut rom, &test_payload(), &options).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEntrypoint(_)));
        assert_eq!(rom, before);
    }

    #[test]
    fn test_save_type_records_bank_type() {
        let mut rom = ByteBuffer::filled(0x400, 0xFF);
        rom.write(0x10, b"SRAM_V112").unwrap();
        let options = PatchOptions::builder().sram_bank_type(2).build();
        let report = patch_save_type(&mut rom, &options).unwrap();
        assert_eq!(report.sram_bank_type, Some(2));
        assert_eq!(report.save_types, vec!["SRAM_V112".to_string()]);
    }

    fn title_patch() -> Vec<u8> {
        let mut ips = HEADER.to_vec();
        ips.extend_from_slice(&[0x00, 0x00, 0xA0, 0x00, 0x04, b'G', b'A', b'M', b'E']);
        ips.extend_from_slice(EOF_MARKER);
        ips
    }

    #[test]
    fn test_ips_updates_check_byte_on_request() {
        let mut rom = ByteBuffer::filled(0x200, 0x00);
        let options = PatchOptions::builder().fix_header_checksum(true).build();
        let report = apply_ips_patch(&mut rom, &title_patch(), &options).unwrap();

        let sum = b"GAME".iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        let expected = 0u8.wrapping_sub(sum).wrapping_sub(header::CHECKSUM_BIAS);
        assert_eq!(rom.read_u8(header::CHECKSUM).unwrap(), expected);
        assert_eq!(report.applied(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_ips_keeps_patched_check_byte_by_default() {
        let mut ips = HEADER.to_vec();
        ips.extend_from_slice(&[0x00, 0x00, 0xBD, 0x00, 0x01, 0x77]);
        ips.extend_from_slice(EOF_MARKER);

        let mut rom = ByteBuffer::filled(0x200, 0x00);
        let report = apply_ips_patch(&mut rom, &ips, &PatchOptions::default()).unwrap();
        assert_eq!(rom.read_u8(header::CHECKSUM).unwrap(), 0x77);
        assert!(report.locations.is_empty());

        let mut rom = ByteBuffer::filled(0x200, 0x00);
        apply_ips_patch(&mut rom, &title_patch(), &PatchOptions::default()).unwrap();
        assert_eq!(rom.read_u8(header::CHECKSUM).unwrap(), 0x00);
    }

    #[test]
    fn test_ips_check_byte_on_short_image_warns() {
        let mut ips = HEADER.to_vec();
        ips.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x42]);
        ips.extend_from_slice(EOF_MARKER);

        let mut rom = ByteBuffer::filled(0x40, 0x00);
        let options = PatchOptions::builder().fix_header_checksum(true).build();
        let report = apply_ips_patch(&mut rom, &ips, &options).unwrap();
        assert_eq!(rom.read_u8(0).unwrap(), 0x42);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_ips_then_save_type_is_atomic() {
        let mut ips = HEADER.to_vec();
        ips.extend_from_slice(&[0x00, 0x00, 0x20, 0x00, 0x0B]);
        ips.extend_from_slice(b"EEPROM_V111");
        ips.extend_from_slice(EOF_MARKER);

        // The tag is added but the call site is missing, so the second step fails.
        let mut rom = ByteBuffer::filled(0x400, 0xFF);
        let before = rom.clone();
        let err =
            apply_ips_and_patch_save_type(&mut rom, &ips, &PatchOptions::default()).unwrap_err();
        assert!(matches!(err, Error::PatternNotFound(_)));
        assert_eq!(rom, before);
    }

    #[test]
    fn test_trim_and_uniformize() {
        let mut rom = ByteBuffer::filled(0x1000, 0xFF);
        rom.write(0, &[0x11; 0x21]).unwrap();
        rom.fill(0x80, 0x10, 0x00).unwrap();

        let options = PatchOptions::builder().alignment(0x40).build();
        uniformize(&mut rom, &options).unwrap();
        let padding = rom.get(0x40, 0x1000 - 0x40).unwrap();
        assert!(padding.iter().all(|&b| b == 0xFF));

        let report = trim(&mut rom, &options);
        assert_eq!(rom.len(), 0x40);
        assert_eq!(report.rom_size, 0x40);
    }

    #[test]
    fn test_inspect_is_read_only() {
        let mut rom = vec![0xFF; 0x400];
        rom[0x10..0x1A].copy_from_slice(b"FLASH_V123");
        let report = inspect(&rom).unwrap();
        assert_eq!(report.save_types, vec!["FLASH_V123".to_string()]);
        assert!(report.locations.is_empty());
        assert_eq!(report.rom_size, 0x400);
    }
}
