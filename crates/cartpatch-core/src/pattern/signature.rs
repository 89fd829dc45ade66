use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A byte sequence with an optional per-byte mask.
///
/// `mask[i] == true` means byte `i` is significant; `false` accepts any value
/// when searching, and keeps the original byte when the pattern is used as a
/// replacement. Without a mask every byte is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern<'a> {
    data: Cow<'a, [u8]>,
    mask: Option<Cow<'a, [bool]>>,
}

impl<'a> Pattern<'a> {
    pub fn exact(data: &'a [u8]) -> Result<Self> {
        Self::validated(Cow::Borrowed(data), None)
    }

    pub fn masked(data: &'a [u8], mask: &'a [bool]) -> Result<Self> {
        Self::validated(Cow::Borrowed(data), Some(Cow::Borrowed(mask)))
    }

    fn validated(data: Cow<'a, [u8]>, mask: Option<Cow<'a, [bool]>>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidPattern("Pattern is empty".to_string()));
        }
        if let Some(mask) = &mask
            && mask.len() != data.len()
        {
            return Err(Error::InvalidPattern(format!(
                "Mask length {} does not match pattern length {}",
                mask.len(),
                data.len()
            )));
        }
        Ok(Self { data, mask })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// Whether byte `index` must match (or be written).
    pub fn is_significant(&self, index: usize) -> bool {
        self.mask.as_ref().is_none_or(|mask| mask[index])
    }

    /// Compare a window of the same length against this pattern.
    pub fn matches(&self, window: &[u8]) -> bool {
        if window.len() != self.data.len() {
            return false;
        }
        match &self.mask {
            None => window == &*self.data,
            Some(mask) => self
                .data
                .iter()
                .zip(mask.iter())
                .zip(window)
                .all(|((expected, &significant), actual)| !significant || expected == actual),
        }
    }

    pub fn into_owned(self) -> Pattern<'static> {
        Pattern {
            data: Cow::Owned(self.data.into_owned()),
            mask: self.mask.map(|mask| Cow::Owned(mask.into_owned())),
        }
    }
}

/// Parse a pattern written as hex bytes separated by whitespace.
///
/// `??` (or `?`) marks a wildcard byte.
pub fn parse_pattern(pattern: &str) -> Result<Pattern<'static>> {
    let mut data = Vec::new();
    let mut mask = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            data.push(0);
            mask.push(false);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidPattern(format!("Invalid pattern token '{}': {}", token, e))
        })?;
        data.push(value);
        mask.push(true);
    }

    let mask = if mask.iter().all(|&significant| significant) {
        None
    } else {
        Some(Cow::Owned(mask))
    };
    Pattern::validated(Cow::Owned(data), mask)
}

pub fn format_pattern(pattern: &Pattern<'_>) -> String {
    pattern
        .data()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if pattern.is_significant(i) {
                format!("{:02X}", b)
            } else {
                "??".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pattern(self))
    }
}

impl FromStr for Pattern<'static> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_pattern(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern_with_wildcards() {
        let pattern = parse_pattern("0A 88 ?? 21 ?").unwrap();
        assert_eq!(pattern.len(), 5);
        assert_eq!(pattern.data()[0], 0x0A);
        assert_eq!(pattern.data()[1], 0x88);
        assert!(!pattern.is_significant(2));
        assert!(pattern.is_significant(3));
        assert_eq!(pattern.mask(), Some(&[true, true, false, true, false][..]));
    }

    #[test]
    fn test_parse_pattern_without_wildcards_has_no_mask() {
        let pattern = parse_pattern("30 b5 05 1c").unwrap();
        assert!(pattern.mask().is_none());
        assert_eq!(pattern.data(), &[0x30, 0xB5, 0x05, 0x1C]);
    }

    #[test]
    fn test_parse_pattern_rejects_bad_input() {
        assert!(matches!(parse_pattern(""), Err(Error::InvalidPattern(_))));
        assert!(matches!(
            parse_pattern("   "),
            Err(Error::InvalidPattern(_))
        ));
        assert!(matches!(
            parse_pattern("0A GG"),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_format_pattern_roundtrip() {
        let pattern = parse_pattern("48 8d 0d ?? ff").unwrap();
        let formatted = format_pattern(&pattern);
        assert_eq!(formatted, "48 8D 0D ?? FF");
        assert_eq!(formatted.parse::<Pattern>().unwrap(), pattern);
    }

    #[test]
    fn test_mask_length_mismatch() {
        let err = Pattern::masked(&[1, 2, 3], &[true, false]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
        assert!(Pattern::exact(&[]).is_err());
    }

    #[test]
    fn test_matches_respects_mask() {
        let pattern = Pattern::masked(&[0x01, 0x02, 0x03], &[true, false, true]).unwrap();
        assert!(pattern.matches(&[0x01, 0x02, 0x03]));
        assert!(pattern.matches(&[0x01, 0xEE, 0x03]));
        assert!(!pattern.matches(&[0x01, 0x02, 0x04]));
        assert!(!pattern.matches(&[0x01, 0x02]));
    }
}
