//! Document ingestion: directory scan → header parse → chunk records.
//!
//! Walks `[documents].dir`, parses every matching file with the header
//! parser, and hands the resulting documents to the chunker. Documents
//! without a valid header block are skipped with a warning rather than
//! aborting the run.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::chunk::chunk_document;
use crate::config::{Config, DocumentsConfig};
use crate::corpus::build_globset;
use crate::header::{load_document, parse_document};
use crate::models::{Chunk, Document};

/// Outcome of a document directory scan.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: Vec<Document>,
    /// Files that matched the globs but failed to parse, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

pub fn scan_documents(config: &DocumentsConfig) -> Result<IngestReport> {
    let root = config
        .dir
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Documents directory not configured ([documents].dir)"))?;

    if !root.exists() {
        bail!("Documents directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut paths: Vec<(String, PathBuf)> = Vec::new();
    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        paths.push((rel_str, path.to_path_buf()));
    }

    // Sort for deterministic ordering
    paths.sort();

    let mut report = IngestReport::default();
    for (_, path) in paths {
        match load_document(&path) {
            Ok(doc) => report.documents.push(doc),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping document");
                report.skipped.push((path, e.to_string()));
            }
        }
    }

    tracing::info!(
        dir = %root.display(),
        documents = report.documents.len(),
        skipped = report.skipped.len(),
        "scanned documents"
    );
    Ok(report)
}

/// Chunk every document in order.
pub fn chunk_documents(documents: &[Document], max_chars: usize, overlap: usize) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|doc| chunk_document(doc, max_chars, overlap))
        .collect()
}

/// Run the `chunk` command over one file or the configured directory.
pub fn run_chunk(
    config: &Config,
    path: Option<&Path>,
    max_chars: Option<usize>,
    overlap: Option<usize>,
    json: bool,
    dry_run: bool,
) -> Result<()> {
    let max_chars = max_chars.unwrap_or(config.chunking.max_chars);
    let overlap = overlap.unwrap_or(config.chunking.overlap);
    if max_chars == 0 {
        bail!("--max-chars must be > 0");
    }

    let report = match path {
        Some(path) => IngestReport {
            documents: vec![load_document(path)
                .with_context(|| format!("Failed to parse document: {}", path.display()))?],
            skipped: Vec::new(),
        },
        None => scan_documents(&config.documents)?,
    };

    let chunks = chunk_documents(&report.documents, max_chars, overlap);

    if dry_run {
        println!("chunk (dry-run)");
        println!("  documents: {}", report.documents.len());
        println!("  skipped: {}", report.skipped.len());
        println!("  chunks: {}", chunks.len());
        return Ok(());
    }

    if json {
        for chunk in &chunks {
            println!("{}", serde_json::to_string(chunk)?);
        }
        return Ok(());
    }

    for chunk in &chunks {
        println!(
            "--- {} #{} ({} chars)",
            chunk.source_id,
            chunk.chunk_index,
            chunk.text.chars().count()
        );
        println!("{}", chunk.text);
    }
    println!();
    println!("documents: {}", report.documents.len());
    if !report.skipped.is_empty() {
        println!("skipped: {}", report.skipped.len());
        for (path, reason) in &report.skipped {
            println!("  {}: {}", path.display(), reason);
        }
    }
    println!("chunks: {}", chunks.len());

    Ok(())
}

/// Run the `parse` command: print a document's metadata as JSON.
pub fn run_parse(path: &Path) -> Result<()> {
    let (body, meta) = parse_document(path)?;
    let mut value = serde_json::to_value(&meta)?;
    value["body_chars"] = serde_json::json!(body.chars().count());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc_text(source_id: &str, body: &str) -> String {
        format!(
            "TITLE:{id}\nYEAR:2020\nTYPE:essay\nTAGS:a,b\nSOURCE_ID:{id}\n---\n{body}",
            id = source_id,
            body = body
        )
    }

    fn documents_config(root: &Path) -> DocumentsConfig {
        DocumentsConfig {
            dir: Some(root.to_path_buf()),
            ..DocumentsConfig::default()
        }
    }

    #[test]
    fn test_scan_sorted_and_skips_bad_headers() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), doc_text("b", "Bravo.")).unwrap();
        fs::write(tmp.path().join("a.md"), doc_text("a", "Alpha.")).unwrap();
        fs::write(tmp.path().join("bad.txt"), "no header here").unwrap();
        fs::write(tmp.path().join("ignored.json"), "{}").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("c.txt"), doc_text("c", "Charlie.")).unwrap();

        let report = scan_documents(&documents_config(tmp.path())).unwrap();
        let ids: Vec<&str> = report
            .documents
            .iter()
            .map(|d| d.meta.source_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("bad.txt"));
        assert!(report.skipped[0].1.contains("Missing header"));
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.txt"), doc_text("keep", "Kept.")).unwrap();
        fs::write(tmp.path().join("drop.txt"), doc_text("drop", "Dropped.")).unwrap();

        let mut config = documents_config(tmp.path());
        config.exclude_globs = vec!["drop.txt".to_string()];
        let report = scan_documents(&config).unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].meta.source_id, "keep");
    }

    #[test]
    fn test_unconfigured_or_missing_dir() {
        assert!(scan_documents(&DocumentsConfig::default()).is_err());
        let config = documents_config(Path::new("/nonexistent/docs"));
        assert!(scan_documents(&config).is_err());
    }

    #[test]
    fn test_chunk_documents_keeps_document_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), doc_text("a", &"Alpha line. ".repeat(20))).unwrap();
        fs::write(tmp.path().join("b.txt"), doc_text("b", "Short.")).unwrap();

        let report = scan_documents(&documents_config(tmp.path())).unwrap();
        let chunks = chunk_documents(&report.documents, 60, 10);
        assert!(chunks.len() > 2);
        assert_eq!(chunks.last().unwrap().source_id, "b");
        assert_eq!(chunks.last().unwrap().chunk_index, 0);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 60));
    }
}
