//! Cartridge layout constants
//!
//! This module centralizes the fixed addresses and sizes of the cartridge ROM
//! address space. Constants are organized by concern.

/// Address space and sizing of the ROM image
pub mod cartridge {
    /// CPU address at which ROM offset 0 is mapped
    pub const ROM_BASE: u32 = 0x0800_0000;

    /// Largest image the cartridge bus can address (32 MiB)
    pub const MAX_ROM_SIZE: usize = 0x0200_0000;

    /// Bank size used for padding and free-space search (256 KiB)
    pub const BANK_SIZE: usize = 0x40000;

    /// Growth step when a ROM has no free bank for the payload (512 KiB)
    pub const EXPANSION_SIZE: usize = 0x80000;

    /// Filler used when growing or aligning an image
    pub const PADDING_BYTE: u8 = 0xFF;
}

/// Cartridge header fields
pub mod header {
    /// Offset of the branch instruction executed at boot
    pub const ENTRYPOINT: usize = 0;

    /// Opcode byte (most significant byte of the word) of an unconditional ARM branch
    pub const BRANCH_OPCODE: u8 = 0xEA;

    /// Pipeline offset added to ARM branch targets
    pub const BRANCH_PIPELINE: u32 = 8;

    /// Range covered by the complement check
    pub const CHECKSUM_START: usize = 0xA0;
    pub const CHECKSUM_END: usize = 0xBD;

    /// Complement check byte
    pub const CHECKSUM: usize = 0xBD;

    /// Constant subtracted after summing the checked range
    pub const CHECKSUM_BIAS: u8 = 0x19;
}

/// Interrupt handler vector references patched before payload installation
pub mod irq {
    /// Address literal of the stock IRQ handler slot (0x03007FFC)
    pub const LEGACY_HANDLER_ADDR: [u8; 4] = [0xFC, 0x7F, 0x00, 0x03];

    /// Relocated slot the payload chains through (0x03007FF4)
    pub const PATCHED_HANDLER_ADDR: [u8; 4] = [0xF4, 0x7F, 0x00, 0x03];

    /// Address literals are word aligned
    pub const SCAN_STRIDE: usize = 4;
}

/// Convert a ROM offset to the CPU address it is mapped at
pub fn rom_address(offset: usize) -> Option<u32> {
    u32::try_from(offset)
        .ok()
        .filter(|&offset| offset < cartridge::MAX_ROM_SIZE as u32)
        .map(|offset| cartridge::ROM_BASE + offset)
}

/// Convert a CPU address in the cartridge window back to a ROM offset
pub fn rom_offset(address: u32) -> Option<usize> {
    let offset = address.checked_sub(cartridge::ROM_BASE)? as usize;
    (offset < cartridge::MAX_ROM_SIZE).then_some(offset)
}
