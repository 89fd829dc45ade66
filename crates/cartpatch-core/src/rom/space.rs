//! End-of-data detection, padding normalization and free-space search.

use tracing::debug;

use crate::error::{Error, Result};

use super::ByteBuffer;
use super::layout::header;

fn is_filler(byte: u8, empty: u8, interchangeable_empty_byte: bool) -> bool {
    byte == empty || (interchangeable_empty_byte && (byte == 0x00 || byte == 0xFF))
}

/// Whether `region` is entirely `0x00` or entirely `0xFF`.
pub fn is_uniform_filler(region: &[u8]) -> bool {
    region.iter().all(|&b| b == 0x00) || region.iter().all(|&b| b == 0xFF)
}

/// Offset of the last byte that is not padding.
///
/// The padding value is taken from the last byte of the image. With
/// `interchangeable_empty_byte` both `0x00` and `0xFF` count as padding, so a ROM
/// padded with a mix of the two is still measured correctly. Returns 0 for an
/// empty or all-padding image.
pub fn find_end_of_data(rom: &[u8], interchangeable_empty_byte: bool) -> usize {
    let Some(&empty) = rom.last() else {
        return 0;
    };

    rom.iter()
        .rposition(|&b| !is_filler(b, empty, interchangeable_empty_byte))
        .unwrap_or(0)
}

/// Smallest multiple of `alignment` strictly greater than `addr`.
///
/// An alignment of 0 disables alignment and returns `addr` unchanged.
pub fn next_aligned_address(addr: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return addr;
    }
    (addr / alignment + 1) * alignment
}

/// Force every padding byte past the aligned end of data to the image's last byte.
pub fn uniformize_padding(
    rom: &mut ByteBuffer,
    alignment: usize,
    interchangeable_empty_byte: bool,
) -> Result<()> {
    let Some(empty) = rom.last() else {
        return Ok(());
    };

    let end_of_data = find_end_of_data(rom.as_slice(), interchangeable_empty_byte);
    let begin = if alignment > 0 {
        next_aligned_address(end_of_data, alignment)
    } else {
        end_of_data + 1
    };

    if begin < rom.len() {
        let len = rom.len() - begin;
        debug!(
            "Uniformizing {:#x} padding bytes from {:#x} to {:#04x}",
            len, begin, empty
        );
        rom.fill(begin, len, empty)?;
    }
    Ok(())
}

/// Cut the image down to its aligned end of data.
///
/// The new length is `next_aligned_address(end_of_data, alignment)`, or
/// `end_of_data + 1` without alignment. When the aligned boundary lies past the
/// current end the image is padded up to it with its own padding byte.
///
/// An image that is padding throughout is never emptied: it keeps its first
/// alignment block, or its first byte without alignment.
pub fn trim_padding(rom: &mut ByteBuffer, alignment: usize, interchangeable_empty_byte: bool) {
    let Some(empty) = rom.last() else {
        return;
    };

    let end_of_data = find_end_of_data(rom.as_slice(), interchangeable_empty_byte);
    if end_of_data == 0 && is_filler(rom.as_slice()[0], empty, interchangeable_empty_byte) {
        debug!("ROM holds no data; keeping a single block of padding");
    }
    let cutoff = if alignment > 0 {
        next_aligned_address(end_of_data, alignment) - 1
    } else {
        end_of_data
    };

    debug!(
        "Trimming ROM from {:#x} to {:#x} bytes",
        rom.len(), cutoff + 1
    );
    rom.resize(cutoff + 1, empty);
}

/// Pad the image with `fill` up to the next multiple of `alignment`.
///
/// Returns `true` if any bytes were added.
pub fn pad_to_alignment(rom: &mut ByteBuffer, alignment: usize, fill: u8) -> bool {
    if alignment == 0 || rom.len() % alignment == 0 {
        return false;
    }
    let aligned = next_aligned_address(rom.len(), alignment);
    rom.resize(aligned, fill);
    true
}

/// Find the highest `stride`-spaced offset holding `block_size` bytes of uniform filler.
///
/// The search starts at `rom.len() - block_size` and walks down in `stride`
/// steps, so with a bank-sized stride the block always ends on a bank boundary
/// of a bank-aligned image.
pub fn find_free_block(rom: &[u8], block_size: usize, stride: usize) -> Option<usize> {
    if block_size == 0 || stride == 0 || block_size > rom.len() {
        return None;
    }

    let mut base = rom.len() - block_size;
    loop {
        if is_uniform_filler(&rom[base..base + block_size]) {
            debug!("Free block of {:#x} bytes at {:#x}", block_size, base);
            return Some(base);
        }
        base = base.checked_sub(stride)?;
    }
}

/// Recompute the header complement check byte.
///
/// Returns the new check value.
pub fn fix_header_checksum(rom: &mut ByteBuffer) -> Result<u8> {
    if rom.len() <= header::CHECKSUM {
        return Err(Error::OutOfBounds {
            offset: header::CHECKSUM,
            len: 1,
            size: rom.len(),
        });
    }

    let len = header::CHECKSUM_END - header::CHECKSUM_START;
    let checked = rom.get(header::CHECKSUM_START, len)?;
    let sum = checked.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let check = 0u8.wrapping_sub(sum).wrapping_sub(header::CHECKSUM_BIAS);

    rom.write(header::CHECKSUM, &[check])?;
    Ok(check)
}
