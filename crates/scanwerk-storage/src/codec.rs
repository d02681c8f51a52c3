// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tag file encoding.
//
// The file is a plain sequence of records, one per tag:
//
//   +----------------+------------------------+
//   | len: u16 (BE)  | len bytes of UTF-8     |
//   +----------------+------------------------+
//
// There is no header, record count, or separator. End-of-stream directly
// after a complete record terminates the file; anything shorter than a full
// record is corruption.

use std::collections::BTreeSet;

use scanwerk_core::error::TagRetrievalError;

/// Size of the length prefix in bytes.
const LEN_PREFIX: usize = 2;

/// Serialize `tags` into the tag file format, in sorted order.
pub fn encode_tags<'a, I>(tags: I) -> Result<Vec<u8>, TagRetrievalError>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut out = Vec::new();
    for tag in tags {
        let bytes = tag.as_bytes();
        let len = u16::try_from(bytes.len())
            .map_err(|_| TagRetrievalError::TagTooLong { len: bytes.len() })?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(bytes);
    }
    Ok(out)
}

/// Parse a complete tag file. Duplicate records collapse into one entry.
pub fn decode_tags(data: &[u8]) -> Result<BTreeSet<String>, TagRetrievalError> {
    let mut tags = BTreeSet::new();
    let mut offset = 0;

    while offset < data.len() {
        let rest = &data[offset..];
        if rest.len() < LEN_PREFIX {
            return Err(TagRetrievalError::Truncated { offset });
        }
        let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
        let payload = rest
            .get(LEN_PREFIX..LEN_PREFIX + len)
            .ok_or(TagRetrievalError::Truncated { offset })?;
        let tag = std::str::from_utf8(payload)
            .map_err(|_| TagRetrievalError::InvalidUtf8 { offset })?;
        tags.insert(tag.to_owned());
        offset += LEN_PREFIX + len;
    }

    Ok(tags)
}
