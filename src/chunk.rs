//! Sentence-snapping text chunker.
//!
//! Splits a document body into bounded segments of at most `max_chars`
//! characters. When a window contains a sentence terminator (`". "`) late
//! enough in the window, the cut is moved back to just after it so sentences
//! stay whole.
//!
//! # Algorithm
//!
//! 1. Collapse every whitespace run to a single space and trim the ends.
//! 2. From the current offset, take a window of up to `max_chars` characters.
//! 3. Find the last `". "` in the window. If it starts past 60% of
//!    `max_chars`, end the window just after it; otherwise keep the raw cut.
//! 4. Emit the trimmed window.
//! 5. Advance to the window end and repeat until the text is consumed.
//!
//! Offsets and lengths count `char`s, not bytes.
//!
//! The `overlap` argument is accepted for interface compatibility, but the
//! advancement rule `max(end - overlap, end)` always resolves to `end`, so
//! consecutive chunks never overlap.
//!
//! # Example
//!
//! ```rust
//! use shardsmith::chunk::chunk_text;
//!
//! let chunks = chunk_text("Hello   world.\n\nSecond line.", 1800, 200);
//! assert_eq!(chunks, vec!["Hello world. Second line."]);
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Chunk, Document};

/// Fraction of `max_chars` a terminator must pass before the window snaps to it.
const SNAP_THRESHOLD: f64 = 0.6;

/// Split text into bounded chunks, snapping to sentence ends where possible.
///
/// # Guarantees
///
/// - Empty (or whitespace-only) text yields no chunks.
/// - Text of at most `max_chars` characters yields exactly one chunk.
/// - No chunk is longer than `max_chars` characters.
/// - Chunks appear in text order and together cover the normalized text.
///
/// A `max_chars` of 0 cannot bound anything and yields the whole
/// normalized text as a single chunk.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }
    if max_chars == 0 {
        return vec![normalized];
    }

    let chars: Vec<char> = normalized.chars().collect();
    let snap_floor = max_chars as f64 * SNAP_THRESHOLD;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());

        if let Some(period) = last_terminator(&chars[start..end]) {
            if period as f64 > snap_floor {
                end = start + period + 2;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        chunks.push(piece.trim().to_string());
        start = next_start(end, overlap);
    }

    chunks
}

/// Chunk a document body into [`Chunk`] records with contiguous indices.
///
/// Each record carries a UUIDv5 derived from the document's `source_id` and
/// the chunk index, so re-chunking unchanged input yields identical ids, plus
/// a SHA-256 hash of its text for staleness detection downstream.
pub fn chunk_document(doc: &Document, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    chunk_text(&doc.body, max_chars, overlap)
        .into_iter()
        .enumerate()
        .map(|(i, text)| make_chunk(&doc.meta.source_id, i as i64, text))
        .collect()
}

/// Position of the last `". "` pair that lies entirely inside the window.
fn last_terminator(window: &[char]) -> Option<usize> {
    window
        .windows(2)
        .rposition(|pair| pair[0] == '.' && pair[1] == ' ')
}

/// The overlap is subtracted and then discarded by `max`; the next window
/// always starts where the previous one ended.
fn next_start(end: usize, overlap: usize) -> usize {
    end.saturating_sub(overlap).max(end)
}

fn make_chunk(source_id: &str, index: i64, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    let id = Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{}#{}", source_id, index).as_bytes(),
    );

    Chunk {
        id: id.to_string(),
        source_id: source_id.to_string(),
        chunk_index: index,
        text,
        hash,
    }
}
