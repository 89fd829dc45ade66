//! Masked signature search and in-place patching.

mod patch;
mod scanner;
mod signature;

pub use patch::{RomPatch, apply, apply_patch_set, scan_and_apply, validate_catalogue};
pub use scanner::{Match, contains_bytes, find, find_all};
pub use signature::{Pattern, format_pattern, parse_pattern};
