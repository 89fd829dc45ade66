//! In-place replacement of matched regions.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::report::PatchLocation;
use crate::rom::ByteBuffer;

use super::{Match, Pattern, find, parse_pattern};

/// A catalogue entry: where to patch and what to write there.
///
/// Both sides are written in pattern text form. A `??` in `find` accepts any
/// byte; a `??` in `replace` keeps the byte already in the ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomPatch {
    pub name: &'static str,
    pub find: &'static str,
    pub replace: &'static str,
}

impl RomPatch {
    pub const fn new(name: &'static str, find: &'static str, replace: &'static str) -> Self {
        Self {
            name,
            find,
            replace,
        }
    }

    pub fn find_pattern(&self) -> Result<Pattern<'static>> {
        parse_pattern(self.find)
    }

    pub fn replace_pattern(&self) -> Result<Pattern<'static>> {
        parse_pattern(self.replace)
    }
}

/// Overwrite `buffer[offset..offset + replacement.len()]`.
///
/// Bytes masked out of `replacement` keep their current value. Fails with
/// [`Error::OutOfBounds`] before touching anything if the region does not fit.
pub fn apply(buffer: &mut ByteBuffer, offset: usize, replacement: &Pattern<'_>) -> Result<()> {
    let region = buffer.get_mut(offset, replacement.len())?;
    for (i, (slot, &byte)) in region.iter_mut().zip(replacement.data()).enumerate() {
        if replacement.is_significant(i) {
            *slot = byte;
        }
    }
    Ok(())
}

/// Locate `patch.find` and write `patch.replace` over it.
///
/// When the pattern is absent the buffer is left untouched and a not-found
/// [`Match`] is returned.
pub fn scan_and_apply(buffer: &mut ByteBuffer, patch: &RomPatch, stride: usize) -> Result<Match> {
    let find_pattern = patch.find_pattern()?;
    let replace_pattern = patch.replace_pattern()?;

    let found = find(buffer.as_slice(), &find_pattern, 0, stride)?;
    let Some(offset) = found.offset() else {
        debug!("{}: pattern not found", patch.name);
        return Ok(found);
    };

    apply(buffer, offset, &replace_pattern)?;
    info!("{}: patched at 0x{:X}", patch.name, offset);
    Ok(found)
}

/// Attempt every patch of a set independently.
///
/// A missing pattern does not stop the remaining entries; each attempt is
/// reported. Invalid catalogue text or an out-of-range write is still an error.
pub fn apply_patch_set(
    buffer: &mut ByteBuffer,
    patches: &[RomPatch],
    stride: usize,
) -> Result<Vec<PatchLocation>> {
    patches
        .iter()
        .map(|patch| {
            scan_and_apply(buffer, patch, stride)
                .map(|found| PatchLocation::from_match(patch.name, found))
        })
        .collect()
}

/// Check that both sides of every catalogue entry parse.
pub fn validate_catalogue(patches: &[RomPatch]) -> Result<()> {
    for patch in patches {
        patch.find_pattern().map_err(|e| {
            Error::InvalidPattern(format!("{} (find): {}", patch.name, e))
        })?;
        patch.replace_pattern().map_err(|e| {
            Error::InvalidPattern(format!("{} (replace): {}", patch.name, e))
        })?;
    }
    Ok(())
}
