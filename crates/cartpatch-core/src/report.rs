//! Structured outcome of a patch operation.

use serde::Serialize;

use crate::error::Result;
use crate::pattern::Match;

/// One attempted signature lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchLocation {
    pub name: String,
    pub found: bool,
    pub offset: Option<usize>,
}

impl PatchLocation {
    pub fn found(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            found: true,
            offset: Some(offset),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            found: false,
            offset: None,
        }
    }

    pub fn from_match(name: impl Into<String>, found: Match) -> Self {
        match found.offset() {
            Some(offset) => Self::found(name, offset),
            None => Self::missing(name),
        }
    }
}

/// What an operation did to the ROM.
///
/// Returned alongside the patched image so callers can log it or print it as
/// JSON without re-scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    /// Name of the operation that produced this report
    pub operation: String,
    /// Every signature looked up, found or not
    pub locations: Vec<PatchLocation>,
    /// Save library identifiers detected in the ROM
    pub save_types: Vec<String>,
    /// Save size recorded into the payload, in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_size: Option<u32>,
    /// Offset the payload blob was copied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sram_bank_type: Option<u8>,
    /// ROM size after the operation
    pub rom_size: usize,
    /// Assumptions made instead of failing
    pub warnings: Vec<String>,
}

impl PatchReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, location: PatchLocation) {
        self.locations.push(location);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Number of lookups that matched
    pub fn applied(&self) -> usize {
        self.locations.iter().filter(|l| l.found).count()
    }

    /// Pretty-printed JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fold another report's findings into this one.
    pub fn merge(&mut self, other: PatchReport) {
        self.locations.extend(other.locations);
        for save_type in other.save_types {
            if !self.save_types.contains(&save_type) {
                self.save_types.push(save_type);
            }
        }
        self.save_size = other.save_size.or(self.save_size);
        self.payload_offset = other.payload_offset.or(self.payload_offset);
        self.sram_bank_type = other.sram_bank_type.or(self.sram_bank_type);
        self.rom_size = other.rom_size;
        self.warnings.extend(other.warnings);
    }
}
