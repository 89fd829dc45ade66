use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::rom::ByteBuffer;
use crate::rom::codec::{be_bytes, read_be};

/// Magic bytes every IPS stream starts with
pub const HEADER: &[u8; 5] = b"PATCH";

/// End-of-records marker, read in place of a record offset
pub const EOF_MARKER: &[u8; 3] = b"EOF";

/// Largest offset a record can address
pub const MAX_OFFSET: usize = 0xFF_FFFF;

/// Longest payload a single record can carry
pub const MAX_RECORD_LEN: usize = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpsRecord {
    /// Literal bytes written at `offset`
    Write { offset: u32, data: Vec<u8> },
    /// `length` copies of `value` written at `offset`
    Fill { offset: u32, length: u16, value: u8 },
}

impl IpsRecord {
    pub fn offset(&self) -> u32 {
        match self {
            IpsRecord::Write { offset, .. } | IpsRecord::Fill { offset, .. } => *offset,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IpsRecord::Write { data, .. } => data.len(),
            IpsRecord::Fill { length, .. } => usize::from(*length),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply_to(&self, target: &mut ByteBuffer) -> Result<()> {
        let offset = self.offset() as usize;
        let end = offset + self.len();
        if end > target.len() {
            target.resize(end, 0x00);
        }
        match self {
            IpsRecord::Write { data, .. } => target.write(offset, data),
            IpsRecord::Fill { length, value, .. } => {
                target.fill(offset, usize::from(*length), *value)
            }
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(be_bytes(self.offset(), 3));
        match self {
            IpsRecord::Write { data, .. } => {
                out.extend(be_bytes(data.len() as u32, 2));
                out.extend_from_slice(data);
            }
            IpsRecord::Fill { length, value, .. } => {
                out.extend(be_bytes(0, 2));
                out.extend(be_bytes(u32::from(*length), 2));
                out.push(*value);
            }
        }
    }
}

/// A fully decoded IPS stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpsPatch {
    pub records: Vec<IpsRecord>,
    /// Final image length requested after the end marker
    pub truncate: Option<u32>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn field(&mut self, width: usize, name: &'static str) -> Result<u32> {
        let value = read_be(self.bytes, self.pos, width).ok_or(Error::MalformedPatch {
            position: self.pos,
            field: name,
        })?;
        self.pos += width;
        Ok(value)
    }

    fn take(&mut self, len: usize, name: &'static str) -> Result<&'a [u8]> {
        let slice = self
            .pos
            .checked_add(len)
            .and_then(|end| self.bytes.get(self.pos..end))
            .ok_or(Error::MalformedPatch {
                position: self.pos,
                field: name,
            })?;
        self.pos += len;
        Ok(slice)
    }

    fn at_eof_marker(&self) -> bool {
        self.bytes.get(self.pos..self.pos + EOF_MARKER.len()) == Some(EOF_MARKER.as_slice())
    }
}

impl IpsPatch {
    /// Decode an IPS stream without touching any target.
    ///
    /// Every framing problem is reported as [`Error::MalformedPatch`] naming the
    /// field that could not be read and the position it was expected at.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, pos: 0 };
        if reader.take(HEADER.len(), "header (5 bytes)")? != HEADER {
            return Err(Error::MalformedPatch {
                position: 0,
                field: "header magic \"PATCH\"",
            });
        }

        let mut patch = IpsPatch::default();
        let mut terminated = false;
        while reader.remaining() > 0 {
            if reader.at_eof_marker() {
                reader.pos += EOF_MARKER.len();
                terminated = true;
                break;
            }

            let offset = reader.field(3, "offset (3 bytes)")?;
            let size = reader.field(2, "patch size (2 bytes)")?;
            let record = if size > 0 {
                let data = reader.take(size as usize, "patch data")?;
                IpsRecord::Write {
                    offset,
                    data: data.to_vec(),
                }
            } else {
                let length = reader.field(2, "RLE size (2 bytes)")?;
                let value = reader.field(1, "RLE value (1 byte)")?;
                IpsRecord::Fill {
                    offset,
                    length: length as u16,
                    value: value as u8,
                }
            };
            debug!("IPS record at 0x{:X}: {} bytes", offset, record.len());
            patch.records.push(record);
        }

        if !terminated {
            warn!("IPS patch ends without an EOF marker");
        } else if reader.remaining() >= 3 {
            patch.truncate = Some(reader.field(3, "truncate length (3 bytes)")?);
        }
        Ok(patch)
    }

    /// Write every record into `target`, growing it as needed, then apply the
    /// trailing truncation length if there is one.
    pub fn apply_to(&self, target: &mut ByteBuffer) -> Result<()> {
        for record in &self.records {
            record.apply_to(target)?;
        }
        if let Some(len) = self.truncate {
            debug!("IPS truncation to 0x{:X} bytes", len);
            target.resize(len as usize, 0x00);
        }
        Ok(())
    }

    /// Serialize back to an IPS stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = HEADER.to_vec();
        for record in &self.records {
            record.encode(&mut out);
        }
        out.extend_from_slice(EOF_MARKER);
        if let Some(len) = self.truncate {
            out.extend(be_bytes(len, 3));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(body: &[u8]) -> Vec<u8> {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_parse_write_and_fill() {
        let bytes = stream(&[
            0x00, 0x00, 0x10, 0x00, 0x02, 0xAA, 0xBB, // write
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xF4, 0xAB, // fill 500
            b'E', b'O', b'F',
        ]);
        let patch = IpsPatch::parse(&bytes).unwrap();
        assert_eq!(
            patch.records,
            vec![
                IpsRecord::Write {
                    offset: 0x10,
                    data: vec![0xAA, 0xBB]
                },
                IpsRecord::Fill {
                    offset: 0x100,
                    length: 500,
                    value: 0xAB
                },
            ]
        );
        assert_eq!(patch.truncate, None);
        assert_eq!(patch.to_bytes(), bytes);
    }

    #[test]
    fn test_parse_truncation() {
        let bytes = stream(&[b'E', b'O', b'F', 0x00, 0x20, 0x00]);
        let patch = IpsPatch::parse(&bytes).unwrap();
        assert!(patch.records.is_empty());
        assert_eq!(patch.truncate, Some(0x2000));
    }

    #[test]
    fn test_parse_bad_header() {
        assert!(matches!(
            IpsPatch::parse(b"PAT"),
            Err(Error::MalformedPatch { position: 0, .. })
        ));
        assert!(matches!(
            IpsPatch::parse(b"PATCX"),
            Err(Error::MalformedPatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_parse_truncated_record_names_field() {
        let err = IpsPatch::parse(&stream(&[0x00, 0x00, 0x10, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPatch {
                position: 8,
                field: "patch size (2 bytes)"
            }
        ));

        let err = IpsPatch::parse(&stream(&[0x00, 0x00, 0x10, 0x00, 0x04, 0x01])).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPatch {
                position: 10,
                field: "patch data"
            }
        ));
    }

    #[test]
    fn test_missing_eof_is_tolerated() {
        let patch = IpsPatch::parse(&stream(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x7F])).unwrap();
        assert_eq!(patch.records.len(), 1);
    }

    #[test]
    fn test_apply_grows_target() {
        let patch = IpsPatch {
            records: vec![IpsRecord::Write {
                offset: 6,
                data: vec![0x01, 0x02],
            }],
            truncate: None,
        };
        let mut target = ByteBuffer::filled(4, 0xFF);
        patch.apply_to(&mut target).unwrap();
        assert_eq!(
            target.as_slice(),
            &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x02]
        );
    }
}
