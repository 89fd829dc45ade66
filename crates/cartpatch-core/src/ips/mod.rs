//! IPS diff patches.
//!
//! Layout of a stream:
//!
//! ```text
//! "PATCH"
//! repeated: offset (u24 BE) size (u16 BE) data[size]
//!        or offset (u24 BE) 0x0000 run (u16 BE) value (u8)
//! "EOF"
//! optional: truncate length (u24 BE)
//! ```

mod diff;
mod record;

use tracing::info;

use crate::error::Result;
use crate::rom::ByteBuffer;

pub use diff::create_patch;
pub use record::{EOF_MARKER, HEADER, IpsPatch, IpsRecord, MAX_OFFSET, MAX_RECORD_LEN};

/// Apply an IPS stream to `target`.
///
/// The whole stream is decoded before the first write, so a malformed patch
/// leaves `target` untouched.
pub fn apply_ips(target: &mut ByteBuffer, patch_bytes: &[u8]) -> Result<()> {
    let patch = IpsPatch::parse(patch_bytes)?;
    let before = target.len();
    patch.apply_to(target)?;
    info!(
        "Applied {} IPS record(s), ROM size 0x{:X} -> 0x{:X}",
        patch.records.len(), before, target.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_rle_record_fills_exact_range() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xF4, 0xAB]);
        bytes.extend_from_slice(EOF_MARKER);

        let mut target = ByteBuffer::filled(0x400, 0x11);
        apply_ips(&mut target, &bytes).unwrap();

        assert_eq!(target.len(), 0x400);
        assert_eq!(target.read_u8(0xFF).unwrap(), 0x11);
        assert!(target.get(0x100, 500).unwrap().iter().all(|&b| b == 0xAB));
        assert_eq!(target.read_u8(0x100 + 500).unwrap(), 0x11);
    }

    #[test]
    fn test_malformed_patch_leaves_target_unchanged() {
        let mut bytes = HEADER.to_vec();
        // A complete record that would grow the target, then a cut-off one.
        bytes.extend_from_slice(&[0x00, 0x10, 0x00, 0x00, 0x02, 0xAA, 0xBB]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x20, 0x00, 0x08, 0x01, 0x02]);

        let mut target = ByteBuffer::filled(0x40, 0xFF);
        let err = apply_ips(&mut target, &bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedPatch { .. }));
        assert_eq!(target, ByteBuffer::filled(0x40, 0xFF));
    }
}
