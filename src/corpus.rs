//! Shard corpus loader.
//!
//! Scans the shard directory (non-recursively, following symlinks, skipping
//! dot-prefixed names) for files matching the configured include globs,
//! parses each file's leading `# key: value` header lines, and caches the
//! resulting catalog for the lifetime of the [`ShardCorpus`] instance.
//!
//! Loading never fails. Unreadable files, empty files, unparsable
//! priorities and unavailable modification times each fall back to a
//! default or a silent skip, so a caller cannot distinguish "file skipped"
//! from "file never existed".
//!
//! # Concurrency
//!
//! The catalog lives in a [`OnceLock`]. Concurrent first callers block on
//! the single in-flight scan and then share its result; once populated,
//! reads take no lock. [`ShardCorpus::reset`] drops the cache so the next
//! [`ShardCorpus::load`] rescans the directory.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::config::ShardsConfig;
use crate::models::{SelectionRequest, Shard};
use crate::render::render_style_block;
use crate::select::select_shards;

/// Priority assigned when the header omits it or it does not parse.
pub const DEFAULT_PRIORITY: i64 = 10;

/// Header fields whose words become a shard's keywords, in order.
const KEYWORD_FIELDS: [&str; 4] = ["id", "source", "notes", "type"];

/// Lazily-loaded, cached catalog of voice shards.
pub struct ShardCorpus {
    dir: PathBuf,
    include: GlobSet,
    cache: OnceLock<Vec<Shard>>,
}

impl ShardCorpus {
    /// A corpus over `dir` that includes `*.txt` files.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_globs(dir, &["*.txt".to_string()])
    }

    pub fn with_globs(dir: impl Into<PathBuf>, include_globs: &[String]) -> Result<Self> {
        Ok(Self {
            dir: dir.into(),
            include: build_globset(include_globs)?,
            cache: OnceLock::new(),
        })
    }

    pub fn from_config(config: &ShardsConfig) -> Result<Self> {
        Self::with_globs(&config.dir, &config.include_globs)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the catalog, scanning the directory on first use.
    pub fn load(&self) -> &[Shard] {
        self.cache.get_or_init(|| scan_shards(&self.dir, &self.include))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Drop the cached catalog.
    pub fn reset(&mut self) {
        self.cache.take();
    }

    /// Select shards from the cached catalog.
    pub fn select(&self, request: &SelectionRequest) -> Vec<&Shard> {
        select_shards(self.load(), request)
    }

    /// Select shards and render them as a style block.
    pub fn render(&self, request: &SelectionRequest) -> String {
        render_style_block(&self.select(request))
    }
}

fn scan_shards(dir: &Path, include: &GlobSet) -> Vec<Shard> {
    let mut shards = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable shard entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_hidden(entry.file_name()) || !include.is_match(entry.file_name()) {
            continue;
        }

        let path = entry.path();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable shard");
                continue;
            }
        };

        match parse_shard(path, &text) {
            Some(shard) => shards.push(shard),
            None => tracing::debug!(path = %path.display(), "skipping empty shard"),
        }
    }

    tracing::info!(dir = %dir.display(), count = shards.len(), "loaded shard corpus");
    shards
}

/// Dot-prefixed names (editor swap files, backups) are never shards.
fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Build a [`Shard`] from file text. Returns `None` for files with neither
/// headers nor body.
pub fn parse_shard(path: &Path, text: &str) -> Option<Shard> {
    if text.is_empty() {
        return None;
    }

    let (headers, body) = split_header_body(text);
    if headers.is_empty() && body.is_empty() {
        return None;
    }

    let id = headers
        .get("id")
        .filter(|id| !id.is_empty())
        .cloned()
        .unwrap_or_else(|| file_stem(path));

    Some(Shard {
        id,
        path: path.to_path_buf(),
        priority: priority_of(&headers),
        keywords: infer_keywords(&headers),
        mtime: mtime_of(path),
        headers,
        body,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InHeader,
    InBody,
}

/// Separate leading `# key: value` lines from the body.
///
/// The first line that is not a header line switches the scanner to the
/// body state for the rest of the file; later `# key: value` lines are body.
pub fn split_header_body(text: &str) -> (BTreeMap<String, String>, String) {
    let mut headers = BTreeMap::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut state = ScanState::InHeader;

    for line in text.lines() {
        if state == ScanState::InHeader {
            if let Some((key, value)) = parse_header_line(line) {
                headers.insert(key, value);
                continue;
            }
            state = ScanState::InBody;
        }
        body_lines.push(line.trim_end());
    }

    (headers, body_lines.join("\n").trim().to_string())
}

/// Match `# key: value` with optional whitespace around `#`, the key and `:`.
/// The key must be word characters only; it is lowercased.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim_start().strip_prefix('#')?;
    let (key, value) = rest.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((key.to_lowercase(), value.trim().to_string()))
}

fn priority_of(headers: &BTreeMap<String, String>) -> i64 {
    headers
        .get("priority")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Lowercased alphanumeric runs from the keyword fields, first occurrence kept.
fn infer_keywords(headers: &BTreeMap<String, String>) -> Vec<String> {
    let bag = KEYWORD_FIELDS
        .iter()
        .map(|k| headers.get(*k).map(String::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut keywords: Vec<String> = Vec::new();
    for token in bag
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

fn mtime_of(path: &Path) -> f64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_header_scanner_state_transition() {
        let text = "# id: bridge\n#source : Star Trek\n  #  NOTES:  calm, command  \nBody line one.   \n# not: a header now\n";
        let (headers, body) = split_header_body(text);
        assert_eq!(headers.get("id").unwrap(), "bridge");
        assert_eq!(headers.get("source").unwrap(), "Star Trek");
        assert_eq!(headers.get("notes").unwrap(), "calm, command");
        assert!(!headers.contains_key("not"));
        assert_eq!(body, "Body line one.\n# not: a header now");
    }

    #[test]
    fn test_header_line_rejects_non_word_keys() {
        assert!(parse_header_line("# two words: value").is_none());
        assert!(parse_header_line("#: value").is_none());
        assert!(parse_header_line("no hash: value").is_none());
        assert!(parse_header_line("# title").is_none());
        assert_eq!(
            parse_header_line("#key_1:  v: w ").unwrap(),
            ("key_1".to_string(), "v: w".to_string())
        );
    }

    #[test]
    fn test_parse_shard_defaults() {
        let shard = parse_shard(Path::new("/nonexistent/some_shard.txt"), "Just a body.").unwrap();
        assert_eq!(shard.id, "some_shard");
        assert_eq!(shard.priority, DEFAULT_PRIORITY);
        assert!(shard.keywords.is_empty());
        assert_eq!(shard.body, "Just a body.");
        assert_eq!(shard.mtime, 0.0);
    }

    #[test]
    fn test_parse_shard_headers() {
        let text = "# id: movie_st4\n# type: Film Quote\n# source: Star Trek IV (1986)\n# notes: humor, diplomacy, humor\n# priority: 25\n\nWe come in peace.";
        let shard = parse_shard(Path::new("x.txt"), text).unwrap();
        assert_eq!(shard.id, "movie_st4");
        assert_eq!(shard.priority, 25);
        assert_eq!(
            shard.keywords,
            vec!["movie", "st4", "star", "trek", "iv", "1986", "humor", "diplomacy", "film", "quote"]
        );
        assert_eq!(shard.body, "We come in peace.");
    }

    #[test]
    fn test_unparsable_priority_defaults() {
        let shard = parse_shard(Path::new("x.txt"), "# priority: high\nbody").unwrap();
        assert_eq!(shard.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_headers_only_shard_is_kept() {
        let shard = parse_shard(Path::new("x.txt"), "# id: only\n").unwrap();
        assert_eq!(shard.id, "only");
        assert_eq!(shard.body, "");
    }

    #[test]
    fn test_blank_shard_is_skipped() {
        assert!(parse_shard(Path::new("x.txt"), "").is_none());
        assert!(parse_shard(Path::new("x.txt"), "\n   \n").is_none());
    }

    #[test]
    fn test_load_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.txt", "# id: bravo\nBody B");
        write(tmp.path(), "a.txt", "Body A");
        write(tmp.path(), "c.md", "Not included");
        write(tmp.path(), "empty.txt", "");
        fs::create_dir(tmp.path().join("nested")).unwrap();
        write(&tmp.path().join("nested"), "d.txt", "Too deep");

        let corpus = ShardCorpus::new(tmp.path()).unwrap();
        let ids: Vec<&str> = corpus.load().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "bravo"]);
        assert!(corpus.load()[0].mtime > 0.0);
    }

    #[test]
    fn test_missing_dir_yields_empty_corpus() {
        let corpus = ShardCorpus::new("/nonexistent/shards").unwrap();
        assert!(corpus.load().is_empty());
        assert!(corpus.is_loaded());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_shard_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        let shards = tmp.path().join("shards");
        fs::create_dir(&real).unwrap();
        fs::create_dir(&shards).unwrap();
        write(&real, "target.txt", "# id: linked\nLinked body.");
        std::os::unix::fs::symlink(real.join("target.txt"), shards.join("a.txt")).unwrap();
        std::os::unix::fs::symlink(real.join("missing.txt"), shards.join("b.txt")).unwrap();

        let corpus = ShardCorpus::new(&shards).unwrap();
        let loaded = corpus.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "linked");
        assert_eq!(loaded[0].body, "Linked body.");
        assert!(loaded[0].mtime > 0.0);
    }

    #[test]
    fn test_dotfiles_are_not_shards() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".hidden.txt", "# id: hidden\nSwap file.");
        write(tmp.path(), "visible.txt", "# id: visible\nReal shard.");

        let corpus = ShardCorpus::new(tmp.path()).unwrap();
        let ids: Vec<&str> = corpus.load().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["visible"]);
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();
        write(tmp.path(), "good.txt", "fine");
        let corpus = ShardCorpus::new(tmp.path()).unwrap();
        assert_eq!(corpus.load().len(), 1);
    }

    #[test]
    fn test_cache_until_reset() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "Body A");

        let mut corpus = ShardCorpus::new(tmp.path()).unwrap();
        assert!(!corpus.is_loaded());
        assert_eq!(corpus.load().len(), 1);

        write(tmp.path(), "b.txt", "Body B");
        assert_eq!(corpus.load().len(), 1, "directory changes are invisible");

        corpus.reset();
        assert!(!corpus.is_loaded());
        assert_eq!(corpus.load().len(), 2);
    }

    #[test]
    fn test_concurrent_first_load_shares_one_catalog() {
        let tmp = TempDir::new().unwrap();
        for i in 0..20 {
            write(tmp.path(), &format!("s{:02}.txt", i), &format!("Shard body {}", i));
        }
        let corpus = Arc::new(ShardCorpus::new(tmp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let corpus = Arc::clone(&corpus);
                std::thread::spawn(move || {
                    let shards = corpus.load();
                    (shards.as_ptr() as usize, shards.len())
                })
            })
            .collect();

        let results: Vec<(usize, usize)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results {
            assert_eq!(*r, results[0]);
            assert_eq!(r.1, 20);
        }
    }
}
