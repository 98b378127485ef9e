//! Raw PDF stream scan: inflate every `stream ... endstream` slice.
//!
//! This knows nothing about PDF objects, xref tables or filters other than
//! Flate. It exists for documents whose decoded surface is too short to be
//! useful and is deliberately tolerant: any slice that fails to inflate is
//! skipped.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use tracing::trace;

const STREAM: &[u8] = b"stream";
const END_STREAM: &[u8] = b"endstream";

/// Cap on inflated bytes per stream.
const MAX_INFLATED: u64 = 8 * 1024 * 1024;

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Drop the end-of-line marker that follows `stream`. Bytes after the end
/// of the compressed data (the EOL before `endstream`) are ignored by the
/// decoders.
fn trim_eol(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\r\n")
        .or_else(|| data.strip_prefix(b"\n"))
        .or_else(|| data.strip_prefix(b"\r"))
        .unwrap_or(data)
}

fn inflate_with<R: Read>(reader: R) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    reader.take(MAX_INFLATED).read_to_end(&mut out).ok()?;
    (!out.is_empty()).then_some(out)
}

/// Inflate a zlib-wrapped slice, falling back to raw deflate.
pub(crate) fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    inflate_with(ZlibDecoder::new(data)).or_else(|| inflate_with(DeflateDecoder::new(data)))
}

/// Concatenate the text of every stream that inflates, each fragment
/// preceded by a newline. Empty when nothing inflates.
pub fn scan_streams(bytes: &[u8]) -> String {
    let mut extracted = String::new();
    let mut pos = 0;
    let mut found = 0usize;

    while let Some(start) = find(bytes, STREAM, pos) {
        let body_start = start + STREAM.len();
        let Some(end) = find(bytes, END_STREAM, body_start) else {
            break;
        };

        if let Some(inflated) = inflate(trim_eol(&bytes[body_start..end])) {
            let text = String::from_utf8_lossy(&inflated);
            if !text.is_empty() {
                extracted.push('\n');
                extracted.push_str(&text);
                found += 1;
            }
        }
        pos = end + END_STREAM.len();
    }

    trace!("Stream scan inflated {} streams, {} chars", found, extracted.len());
    extracted
}
