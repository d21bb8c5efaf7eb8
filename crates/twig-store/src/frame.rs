//! Object framing and compression.
//!
//! A frame is `"<kind> <len>\0<payload>"`. The content hash is taken over the
//! whole frame, and the frame is what gets zlib-compressed on disk.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use twig_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::ObjectKind;

/// Build the frame for a payload of the given kind.
pub fn encode_frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    let mut frame = Vec::with_capacity(header.len() + payload.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Parse a frame back into its kind and payload.
///
/// `id` is only used to label errors. The declared length must match the
/// payload length exactly; an unrecognized kind tag is rejected after the
/// length check.
pub fn decode_frame(id: &ObjectId, frame: &[u8]) -> StoreResult<(ObjectKind, Vec<u8>)> {
    let malformed = |reason: String| StoreError::MalformedObject { id: *id, reason };

    let space = frame
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| malformed("missing type separator".into()))?;
    let nul = frame[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|offset| space + offset)
        .ok_or_else(|| malformed("missing header terminator".into()))?;

    let tag = std::str::from_utf8(&frame[..space])
        .map_err(|_| malformed("type tag is not ASCII".into()))?;
    // Canonical decimal only: no sign, no leading zeros.
    let digits = &frame[space + 1..nul];
    let canonical = !digits.is_empty()
        && digits.iter().all(u8::is_ascii_digit)
        && (digits.len() == 1 || digits[0] != b'0');
    let declared: usize = std::str::from_utf8(digits)
        .ok()
        .filter(|_| canonical)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed("length is not a canonical decimal number".into()))?;

    let payload = &frame[nul + 1..];
    if payload.len() != declared {
        return Err(malformed(format!(
            "bad length: declared {declared}, found {}",
            payload.len()
        )));
    }

    let kind: ObjectKind = tag.parse()?;
    Ok((kind, payload.to_vec()))
}

/// zlib-compress a frame for storage.
pub fn compress(frame: &[u8]) -> StoreResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(frame)?;
    Ok(encoder.finish()?)
}

/// Inflate stored bytes back into a frame.
pub fn decompress(id: &ObjectId, data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut frame = Vec::new();
    decoder
        .read_to_end(&mut frame)
        .map_err(|e| StoreError::MalformedObject {
            id: *id,
            reason: format!("decompression failed: {e}"),
        })?;
    Ok(frame)
}
