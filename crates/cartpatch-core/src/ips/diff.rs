//! IPS stream generation from two images.

use tracing::debug;

use crate::error::{Error, Result};

use super::record::{IpsPatch, IpsRecord, MAX_OFFSET, MAX_RECORD_LEN};

/// Shortest run of identical bytes worth encoding as a fill record
const RLE_THRESHOLD: usize = 9;

/// Offset that would be read back as the `EOF` marker
const EOF_OFFSET: usize = 0x45_4F46;

fn run_length(bytes: &[u8], start: usize, end: usize) -> usize {
    let value = bytes[start];
    bytes[start..end]
        .iter()
        .take(MAX_RECORD_LEN)
        .take_while(|&&b| b == value)
        .count()
}

fn check_offset(offset: usize) -> Result<u32> {
    if offset > MAX_OFFSET {
        return Err(Error::OutOfBounds {
            offset,
            len: 1,
            size: MAX_OFFSET + 1,
        });
    }
    Ok(offset as u32)
}

/// Encode the changed bytes `modified[start..end]` as records.
fn encode_region(
    records: &mut Vec<IpsRecord>,
    modified: &[u8],
    start: usize,
    end: usize,
) -> Result<()> {
    let mut pos = start;
    while pos < end {
        // A record may not start at the marker offset; back up one byte and
        // rewrite it with its (unchanged or already written) value.
        let record_start = if pos == EOF_OFFSET { pos - 1 } else { pos };
        let offset = check_offset(record_start)?;

        let run = run_length(modified, pos, end);
        if run >= RLE_THRESHOLD && record_start == pos {
            records.push(IpsRecord::Fill {
                offset,
                length: run as u16,
                value: modified[pos],
            });
            pos += run;
            continue;
        }

        let mut literal_end = pos + 1;
        while literal_end < end
            && literal_end - record_start < MAX_RECORD_LEN
            && run_length(modified, literal_end, end) < RLE_THRESHOLD
        {
            literal_end += 1;
        }
        records.push(IpsRecord::Write {
            offset,
            data: modified[record_start..literal_end].to_vec(),
        });
        pos = literal_end;
    }
    Ok(())
}

/// Build an IPS stream that turns `original` into `modified`.
///
/// Runs of nine or more identical bytes become fill records. When `modified`
/// is shorter than `original` the stream carries a truncation length.
pub fn create_patch(original: &[u8], modified: &[u8]) -> Result<Vec<u8>> {
    let differs = |i: usize| original.get(i) != Some(&modified[i]);

    let mut patch = IpsPatch::default();
    let mut pos = 0;
    while pos < modified.len() {
        if !differs(pos) {
            pos += 1;
            continue;
        }
        let mut end = pos + 1;
        while end < modified.len() && differs(end) {
            end += 1;
        }
        encode_region(&mut patch.records, modified, pos, end)?;
        pos = end;
    }

    if modified.len() < original.len() {
        patch.truncate = Some(check_offset(modified.len())?);
    }

    debug!(
        "Created IPS patch with {} record(s){}",
        patch.records.len(), if patch.truncate.is_some() { " and truncation" } else { "" }
    );
    Ok(patch.to_bytes())
}
