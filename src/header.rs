//! Structured document header parser.
//!
//! Documents fed to the chunker open with a fixed five-line header block
//! followed by a `---` separator:
//!
//! ```text
//! TITLE:<value>
//! YEAR:<value>
//! TYPE:<value>
//! TAGS:<comma,separated,values>
//! SOURCE_ID:<value>
//! ---
//! <body text>
//! ```
//!
//! The block is anchored at the first byte of the file. Anything else,
//! including a reordered or partial block, is reported as
//! [`DocumentError::MissingHeader`]. There is no partial recovery.

use std::path::Path;

use crate::error::DocumentError;
use crate::models::{Document, DocumentMeta};

/// Header labels, in the order they must appear.
const FIELDS: [&str; 5] = ["TITLE", "YEAR", "TYPE", "TAGS", "SOURCE_ID"];

const SEPARATOR: &str = "---";

/// Read and parse a document file, returning `(body, metadata)`.
///
/// Invalid UTF-8 byte sequences are dropped, so stray bytes never abort a
/// parse or leave replacement characters in the text.
pub fn parse_document(path: &Path) -> Result<(String, DocumentMeta), DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document_str(&decode_dropping_invalid(&bytes), path)
}

/// Parse document text already in memory. `path` is recorded in the metadata.
pub fn parse_document_str(
    text: &str,
    path: &Path,
) -> Result<(String, DocumentMeta), DocumentError> {
    let missing = || DocumentError::MissingHeader {
        path: path.to_path_buf(),
    };

    let mut values: Vec<&str> = Vec::with_capacity(FIELDS.len());
    let mut rest = text;
    for label in FIELDS {
        let (line, tail) = next_line(rest).ok_or_else(missing)?;
        let value = line
            .strip_prefix(label)
            .and_then(|v| v.strip_prefix(':'))
            .ok_or_else(missing)?;
        values.push(value.trim());
        rest = tail;
    }

    let (separator, body) = next_line(rest).ok_or_else(missing)?;
    if separator != SEPARATOR {
        return Err(missing());
    }

    let meta = DocumentMeta {
        title: values[0].to_string(),
        year: values[1].to_string(),
        doc_type: values[2].to_string(),
        tags: split_tags(values[3]),
        source_id: values[4].to_string(),
        path: path.to_path_buf(),
    };

    Ok((body.trim().to_string(), meta))
}

/// Parse a document file into a [`Document`].
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let (body, meta) = parse_document(path)?;
    Ok(Document { meta, body })
}

fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split off one newline-terminated line. Returns `None` when no newline
/// remains, since every header line (separator included) must be terminated.
fn next_line(s: &str) -> Option<(&str, &str)> {
    let pos = s.find('\n')?;
    let line = &s[..pos];
    Some((line.strip_suffix('\r').unwrap_or(line), &s[pos + 1..]))
}
