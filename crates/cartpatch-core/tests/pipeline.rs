use cartpatch_core::payload::{SIGNATURE, WRITE_HOOKS, thunk};
use cartpatch_core::save::catalogue::FLASH_V12X;
use cartpatch_core::{
    ByteBuffer, Error, PatchMode, PatchOptions, Payload, apply_ips_patch, create_patch,
    find_end_of_data, parse_pattern, patch_payload, patch_save_type,
};
use proptest::prelude::*;

const FOUR_MIB: usize = 0x40_0000;

fn synthetic_payload() -> Payload {
    let mut bytes = vec![0u8; 0x200];
    let header: [u32; 8] = [0, 0, 0, 0x20, 0x100, 0x110, 0x120, 0x130];
    for (i, word) in header.iter().enumerate() {
        bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    bytes[0x40..0x40 + SIGNATURE.len()].copy_from_slice(SIGNATURE);
    Payload::new(bytes).unwrap()
}

fn bootable_rom(size: usize) -> ByteBuffer {
    let mut rom = ByteBuffer::filled(size, 0xFF);
    rom.write(0, &[0x2E, 0x00, 0x00, 0xEA]).unwrap();
    rom.fill(0x04, 0x200, 0x24).unwrap();
    rom.write(0x8000, &[0xFC, 0x7F, 0x00, 0x03]).unwrap();
    rom.write(0x9000, &[0xFC, 0x7F, 0x00, 0x03]).unwrap();
    rom
}

#[test]
fn ips_roundtrip_through_public_api() {
    let original: Vec<u8> = (0..0x3000).map(|i| (i * 7 % 251) as u8).collect();
    let mut modified = original.clone();
    modified[0x10..0x40].fill(0xEE);
    modified[0xBD] = 0x77;
    modified[0x1234] ^= 0x5A;
    modified.extend_from_slice(&[0x42; 0x80]);

    let ips = create_patch(&original, &modified).unwrap();
    let mut rom = ByteBuffer::from(original.clone());
    apply_ips_patch(&mut rom, &ips, &PatchOptions::default()).unwrap();
    assert_eq!(rom.as_slice(), modified.as_slice());

    let shorter = &original[..0x1800];
    let ips = create_patch(&original, shorter).unwrap();
    let mut rom = ByteBuffer::from(original.clone());
    apply_ips_patch(&mut rom, &ips, &PatchOptions::default()).unwrap();
    assert_eq!(rom.as_slice(), shorter);
}

fn image_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        prop::collection::vec(any::<u8>(), 0..0x800),
        prop::collection::vec((any::<u16>(), any::<u8>()), 0..32),
        0usize..0xA00,
        any::<u8>(),
    )
        .prop_map(|(original, edits, new_len, fill)| {
            let mut modified = original.clone();
            modified.resize(new_len, fill);
            if !modified.is_empty() {
                for (offset, value) in edits {
                    let len = modified.len();
                    modified[offset as usize % len] = value;
                }
            }
            (original, modified)
        })
}

proptest! {
    #[test]
    fn ips_patch_reproduces_its_target((original, modified) in image_pair()) {
        let ips = create_patch(&original, &modified).unwrap();
        let mut rom = ByteBuffer::from(original);
        apply_ips_patch(&mut rom, &ips, &PatchOptions::default()).unwrap();
        prop_assert_eq!(rom.as_slice(), modified.as_slice());
    }
}

#[test]
fn malformed_ips_keeps_target_length() {
    let mut ips = b"PATCH".to_vec();
    ips.extend_from_slice(&[0x00, 0x40, 0x00, 0x00, 0x10, 0x01]);

    let mut rom = ByteBuffer::filled(0x1000, 0xFF);
    let err = apply_ips_patch(&mut rom, &ips, &PatchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedPatch { .. }));
    assert_eq!(rom.len(), 0x1000);
}

#[test]
fn sram_patch_on_padded_rom_touches_only_the_match() {
    let patch = &FLASH_V12X[0];
    let find = parse_pattern(patch.find).unwrap();
    let replace = parse_pattern(patch.replace).unwrap();

    let mut rom = ByteBuffer::filled(FOUR_MIB, 0xFF);
    rom.write(0x200, b"FLASH_V120").unwrap();
    rom.write(0x1000, find.data()).unwrap();
    let before = rom.clone();

    let report = patch_save_type(&mut rom, &PatchOptions::default()).unwrap();
    assert_eq!(report.save_types, vec!["FLASH_V120".to_string()]);
    assert_eq!(rom.len(), FOUR_MIB);
    assert_eq!(rom.get(0x1000, replace.len()).unwrap(), replace.data());

    let changed: Vec<usize> = (0..FOUR_MIB)
        .filter(|&i| rom.as_slice()[i] != before.as_slice()[i])
        .collect();
    assert!(!changed.is_empty());
    let patched = 0x1000..0x1000 + replace.len();
    assert!(changed.iter().all(|i| patched.contains(i)));
}

#[test]
fn end_of_data_ignores_either_padding_byte() {
    let mut rom = vec![0x33; 0x1000];
    rom.extend_from_slice(&[0x00; 2048]);
    assert_eq!(find_end_of_data(&rom, false), 0xFFF);
    assert_eq!(find_end_of_data(&rom, true), 0xFFF);

    let mut rom = vec![0x33; 0x1000];
    rom.extend_from_slice(&[0x00; 16]);
    rom.extend_from_slice(&[0xFF; 2048]);
    assert_eq!(find_end_of_data(&rom, true), 0xFFF);
    assert_eq!(find_end_of_data(&rom, false), 0x100F);
}

#[test]
fn batteryless_auto_mode_hooks_flash_writes() {
    let flash = WRITE_HOOKS.iter().find(|h| h.name == "WRITE_FLASH").unwrap();
    let signature = parse_pattern(flash.signature).unwrap();

    let mut rom = bootable_rom(FOUR_MIB);
    rom.write(0xA000, signature.data()).unwrap();

    let payload = synthetic_payload();
    let options = PatchOptions::builder().auto_mode(true).build();
    let report = patch_payload(&mut rom, &payload, &options).unwrap();

    let base = FOUR_MIB - 0x4_0000 - payload.len();
    assert_eq!(report.payload_offset, Some(base));
    assert_eq!(report.save_size, Some(0x10000));
    assert!(report.warnings.is_empty());

    assert_eq!(rom.get(0x8000, 4).unwrap(), &[0xF4, 0x7F, 0x00, 0x03]);
    assert_eq!(rom.get(0x9000, 4).unwrap(), &[0xF4, 0x7F, 0x00, 0x03]);

    assert_eq!(rom.read_u32_le(base).unwrap(), 0x0800_00C0);
    assert_eq!(rom.read_u32_le(base + 4).unwrap(), 0);
    assert_eq!(rom.read_u32_le(base + 8).unwrap(), 0x10000);

    let entry = 0x0800_0000 + base as u32 + 0x20;
    let expected_branch = 0xEA00_0000 | ((entry - 0x0800_0008) >> 2);
    assert_eq!(rom.read_u32_le(0).unwrap(), expected_branch);

    assert_eq!(rom.get(0xA000, 4).unwrap(), &thunk::THUMB);
    assert_eq!(
        rom.read_u32_le(0xA004).unwrap(),
        0x0800_0000 + base as u32 + 0x120
    );
}

#[test]
fn batteryless_manual_mode_requires_a_hook() {
    let mut rom = bootable_rom(FOUR_MIB);
    let before = rom.clone();
    let options = PatchOptions::builder().mode(PatchMode::Manual).build();

    let err = patch_payload(&mut rom, &synthetic_payload(), &options).unwrap_err();
    assert!(matches!(err, Error::NoWriteHookFound));
    assert!(err.is_unsupported_rom());
    assert_eq!(rom, before);
}
