//! # cartpatch-core
//!
//! Pattern-based patch engine for cartridge ROM images.
//!
//! This crate provides:
//! - Masked signature scanning and in-place patch application
//! - IPS patch application and generation
//! - ROM layout utilities (end of data, padding, free-space search, header check byte)
//! - Save library detection and SRAM conversion
//! - Batteryless save payload injection
//!
//! Every operation takes a caller-owned [`ByteBuffer`] and either finishes
//! completely or leaves it untouched. Nothing here performs file I/O except
//! [`Payload::from_file`].

pub mod error;
pub mod ips;
pub mod ops;
pub mod options;
pub mod pattern;
pub mod payload;
pub mod report;
pub mod rom;
pub mod save;

pub use error::{Error, Result};
pub use ips::{IpsPatch, IpsRecord, apply_ips, create_patch};
pub use ops::{
    apply_ips_and_patch_save_type, apply_ips_patch, inspect, patch_payload, patch_save_type,
    trim, uniformize,
};
pub use options::{PatchMode, PatchOptions, PatchOptionsBuilder};
pub use pattern::{Match, Pattern, RomPatch, find, find_all, format_pattern, parse_pattern};
pub use payload::{InjectorStage, Payload, PayloadField, PayloadInjector, detect_write_hooks};
pub use report::{PatchLocation, PatchReport};
pub use rom::{ByteBuffer, find_end_of_data, find_free_block, next_aligned_address};
pub use save::{SaveFamily, SaveType, convert_to_sram};
