//! Stride-aware search for exact and masked byte patterns.

use memchr::memmem;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

use super::Pattern;

/// Outcome of a single search. `offset` is only meaningful when `found` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Match {
    pub found: bool,
    pub offset: usize,
}

impl Match {
    pub const NOT_FOUND: Match = Match {
        found: false,
        offset: 0,
    };

    pub fn at(offset: usize) -> Self {
        Self {
            found: true,
            offset,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        self.found.then_some(self.offset)
    }
}

/// Find the first occurrence of `pattern` in `haystack[start..]`.
///
/// Only offsets `start + k * stride` are tried. A pattern longer than the
/// remaining bytes is simply not found.
pub fn find(haystack: &[u8], pattern: &Pattern<'_>, start: usize, stride: usize) -> Result<Match> {
    if stride == 0 {
        return Err(Error::InvalidPattern(
            "Search stride must be at least 1".to_string(),
        ));
    }
    if pattern.is_empty() {
        return Err(Error::InvalidPattern("Pattern is empty".to_string()));
    }

    let len = pattern.len();
    let Some(last) = haystack.len().checked_sub(len) else {
        return Ok(Match::NOT_FOUND);
    };
    if start > last {
        return Ok(Match::NOT_FOUND);
    }

    // Exact byte-granular searches go through memmem.
    if stride == 1 && pattern.mask().is_none() {
        return Ok(memmem::find(&haystack[start..], pattern.data())
            .map(|pos| Match::at(start + pos))
            .unwrap_or(Match::NOT_FOUND));
    }

    let mut offset = start;
    while offset <= last {
        if pattern.matches(&haystack[offset..offset + len]) {
            return Ok(Match::at(offset));
        }
        offset = match offset.checked_add(stride) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Match::NOT_FOUND)
}

/// Every non-overlapping occurrence of `pattern`, in ascending order.
///
/// After a hit the search resumes at the first stride-aligned offset past the
/// match, so occurrences stay on the same stride grid as the first one.
pub fn find_all(haystack: &[u8], pattern: &Pattern<'_>, stride: usize) -> Result<Vec<usize>> {
    let mut offsets = Vec::new();
    let mut start = 0;
    loop {
        let found = find(haystack, pattern, start, stride)?;
        let Some(offset) = found.offset() else {
            break;
        };
        offsets.push(offset);

        let steps = pattern.len().div_ceil(stride);
        start = match steps
            .checked_mul(stride)
            .and_then(|skip| offset.checked_add(skip))
        {
            Some(next) => next,
            None => break,
        };
    }
    debug!("Pattern {} matched {} time(s)", pattern, offsets.len());
    Ok(offsets)
}

/// Whether `needle` occurs anywhere in `haystack`.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && memmem::find(haystack, needle).is_some()
}
