//! Batteryless save payload injection.
//!
//! The payload is an opaque blob supplied by the caller. Its first
//! [`HEADER_WORDS`] words form a table the injector reads from and writes to;
//! see [`PayloadField`].

mod hooks;
mod injector;
mod layout;

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::pattern::{Pattern, find};
use crate::rom::{cartridge, codec};

pub use hooks::{
    HookMatch, SCAN_STRIDE, SCAN_TAIL_MARGIN, Thunk, WRITE_HOOKS, WriteHook, scan_write_hooks,
};
pub use injector::{InjectorStage, PayloadInjector, detect_write_hooks};
pub use layout::{
    DEFAULT_SAVE_SIZE, HEADER_LEN, HEADER_WORDS, PayloadField, SIGNATURE, SIGNATURE_STRIDE, thunk,
};

/// A validated payload blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    /// Wrap `bytes` after checking it can be installed.
    ///
    /// The blob must hold the full header table and be smaller than one bank.
    /// Its length must be a whole number of words and [`SIGNATURE`] must sit
    /// on a word boundary, so both stay word aligned once the blob is placed.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidPayload(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if bytes.len() >= cartridge::BANK_SIZE {
            return Err(Error::InvalidPayload(format!(
                "{:#x} bytes does not fit below a {:#x}-byte bank",
                bytes.len(),
                cartridge::BANK_SIZE
            )));
        }
        if bytes.len() % SIGNATURE_STRIDE != 0 {
            return Err(Error::InvalidPayload(format!(
                "{:#x} bytes is not a multiple of {}",
                bytes.len(),
                SIGNATURE_STRIDE
            )));
        }
        let marker = Pattern::exact(SIGNATURE)?;
        if !find(&bytes, &marker, 0, SIGNATURE_STRIDE)?.found {
            return Err(Error::InvalidPayload(
                "signature missing or not word aligned".to_string(),
            ));
        }
        debug!("Payload accepted ({} bytes)", bytes.len());
        Ok(Self { bytes })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(std::fs::read(path)?)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read a header field as shipped in the blob
    pub fn field(&self, field: PayloadField) -> Result<u32> {
        codec::read_u32_le(&self.bytes, field.offset())
            .ok_or_else(|| Error::InvalidPayload(format!("header field {} unreadable", field)))
    }
}

impl TryFrom<Vec<u8>> for Payload {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Synthetic payload used by tests in this crate
#[cfg(test)]
pub(crate) fn test_payload() -> Payload {
    let mut bytes = vec![0u8; 0x100];
    let header: [u32; HEADER_WORDS] = [0, 0, 0, 0x40, 0x50, 0x60, 0x70, 0x80];
    for (i, word) in header.iter().enumerate() {
        bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    bytes[0x90..0x90 + SIGNATURE.len()].copy_from_slice(SIGNATURE);
    Payload::new(bytes).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_fields() {
        let payload = test_payload();
        assert_eq!(
            payload.field(PayloadField::PatchedEntrypoint).unwrap(),
            0x40
        );
        assert_eq!(
            payload.field(PayloadField::EepromV111Posthook).unwrap(),
            0x80
        );
    }

    #[test]
    fn test_payload_rejects_bad_blobs() {
        assert!(matches!(
            Payload::new(vec![0; 16]),
            Err(Error::InvalidPayload(_))
        ));
        assert!(matches!(
            Payload::new(vec![0; 0x100]),
            Err(Error::InvalidPayload(_))
        ));

        let mut huge = vec![0; cartridge::BANK_SIZE];
        huge[0x100..0x100 + SIGNATURE.len()].copy_from_slice(SIGNATURE);
        assert!(matches!(Payload::new(huge), Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_rejects_misaligned_blobs() {
        let mut bytes = test_payload().as_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(Payload::new(bytes), Err(Error::InvalidPayload(_))));

        let mut bytes = vec![0u8; 0x100];
        bytes[0x92..0x92 + SIGNATURE.len()].copy_from_slice(SIGNATURE);
        assert!(matches!(Payload::new(bytes), Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, test_payload().as_bytes()).unwrap();
        assert_eq!(Payload::from_file(&path).unwrap(), test_payload());

        let err = Payload::from_file(dir.path().join("missing.bin")).unwrap_err();
        assert!(err.is_not_found());
    }
}
