//! Typed errors for the document pipeline.
//!
//! Shard loading never fails (unreadable files are skipped), so the only
//! errors a library caller can observe come from parsing structured
//! documents. Application code wraps these in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file does not open with the `TITLE`/`YEAR`/`TYPE`/`TAGS`/`SOURCE_ID`
    /// block followed by a `---` separator line.
    #[error("Missing header in {}", path.display())]
    MissingHeader { path: PathBuf },

    #[error("Failed to read document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
