//! Caller policy for the patch operations.
//!
//! ```ignore
//! use cartpatch_core::{PatchMode, PatchOptions};
//!
//! let options = PatchOptions::builder()
//!     .mode(PatchMode::Auto)
//!     .alignment(16)
//!     .build();
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the batteryless injector treats a ROM with no recognizable write routine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PatchMode {
    /// Missing write hooks are fatal; the payload flushes on explicit request only.
    #[default]
    Manual,
    /// Missing write hooks fall back to a default save size; the payload flushes
    /// automatically after writes.
    Auto,
}

impl PatchMode {
    /// Whether a missing write hook aborts the operation
    pub fn is_strict(self) -> bool {
        self == PatchMode::Manual
    }

    /// Value stored in the payload's flush-mode field
    pub fn flush_flag(self) -> u32 {
        match self {
            PatchMode::Auto => 0,
            PatchMode::Manual => 1,
        }
    }
}

/// Options shared by the public patch operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOptions {
    /// Write-hook policy and payload flush mode
    pub mode: PatchMode,
    /// Alignment used by the padding utilities (0 disables alignment)
    pub alignment: usize,
    /// Treat 0x00 and 0xFF as the same padding value
    pub interchangeable_empty_byte: bool,
    /// SRAM bank layout selector, recorded in the report
    pub sram_bank_type: u8,
    /// Recompute the header check byte after an IPS patch
    pub fix_header_checksum: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            mode: PatchMode::Manual,
            alignment: 16,
            interchangeable_empty_byte: true,
            sram_bank_type: 0,
            fix_header_checksum: false,
        }
    }
}

impl PatchOptions {
    /// Create a new options builder
    pub fn builder() -> PatchOptionsBuilder {
        PatchOptionsBuilder::default()
    }
}

/// Builder for PatchOptions
#[derive(Debug, Clone, Default)]
pub struct PatchOptionsBuilder {
    mode: Option<PatchMode>,
    alignment: Option<usize>,
    interchangeable_empty_byte: Option<bool>,
    sram_bank_type: Option<u8>,
    fix_header_checksum: Option<bool>,
}

impl PatchOptionsBuilder {
    pub fn mode(mut self, mode: PatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Shorthand for `mode(PatchMode::Auto)` / `mode(PatchMode::Manual)`
    pub fn auto_mode(self, enabled: bool) -> Self {
        self.mode(if enabled {
            PatchMode::Auto
        } else {
            PatchMode::Manual
        })
    }

    pub fn alignment(mut self, alignment: usize) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn interchangeable_empty_byte(mut self, enabled: bool) -> Self {
        self.interchangeable_empty_byte = Some(enabled);
        self
    }

    pub fn sram_bank_type(mut self, bank_type: u8) -> Self {
        self.sram_bank_type = Some(bank_type);
        self
    }

    pub fn fix_header_checksum(mut self, enabled: bool) -> Self {
        self.fix_header_checksum = Some(enabled);
        self
    }

    /// Build the options
    pub fn build(self) -> PatchOptions {
        let default = PatchOptions::default();
        PatchOptions {
            mode: self.mode.unwrap_or(default.mode),
            alignment: self.alignment.unwrap_or(default.alignment),
            interchangeable_empty_byte: self
                .interchangeable_empty_byte
                .unwrap_or(default.interchangeable_empty_byte),
            sram_bank_type: self.sram_bank_type.unwrap_or(default.sram_bank_type),
            fix_header_checksum: self
                .fix_header_checksum
                .unwrap_or(default.fix_header_checksum),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        assert_eq!(PatchOptions::builder().build(), PatchOptions::default());
    }

    #[test]
    fn test_builder_overrides() {
        let options = PatchOptions::builder()
            .auto_mode(true)
            .alignment(0)
            .interchangeable_empty_byte(false)
            .sram_bank_type(1)
            .fix_header_checksum(true)
            .build();
        assert_eq!(options.mode, PatchMode::Auto);
        assert_eq!(options.alignment, 0);
        assert!(!options.interchangeable_empty_byte);
        assert_eq!(options.sram_bank_type, 1);
        assert!(options.fix_header_checksum);
    }

    #[test]
    fn test_mode_policy() {
        assert!(PatchMode::Manual.is_strict());
        assert!(!PatchMode::Auto.is_strict());
        assert_eq!(PatchMode::Auto.flush_flag(), 0);
        assert_eq!(PatchMode::Manual.flush_flag(), 1);
        assert_eq!("auto".parse::<PatchMode>().unwrap(), PatchMode::Auto);
        assert_eq!(PatchMode::Manual.to_string(), "manual");
    }
}
