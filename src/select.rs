//! Shard selection: lexical ranking with a seeded sampling fallback.
//!
//! With query words, every shard is scored by keyword overlap plus a small
//! priority bonus and the top `k` are returned. Without query words, the
//! highest-priority, most recent shards form a small front pool; the pool's
//! top shard is always kept and the rest of the selection is sampled from
//! the pool with a generator seeded from the request hint.
//!
//! Seeds come from [`seed_for_hint`]: the first 64 bits of SHA-256 of the
//! hint, or the current Unix time in whole seconds when there is no hint.
//! Hintless selections are therefore only reproducible within one second.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{SelectionRequest, Shard};

/// Minimum size of the front pool sampled from when there are no query words.
const FRONT_POOL_MIN: usize = 6;

/// Weight of priority relative to one matching keyword.
const PRIORITY_WEIGHT: f64 = 0.01;

/// Select up to `request.k` distinct shards from `corpus`.
pub fn select_shards<'a>(corpus: &'a [Shard], request: &SelectionRequest) -> Vec<&'a Shard> {
    select_shards_with_seed(corpus, request, seed_for_hint(request.hint.as_deref()))
}

/// Same as [`select_shards`] with an explicit sampling seed. The seed is
/// only consulted on the fallback path.
pub fn select_shards_with_seed<'a>(
    corpus: &'a [Shard],
    request: &SelectionRequest,
    seed: u64,
) -> Vec<&'a Shard> {
    if corpus.is_empty() || request.k == 0 {
        return Vec::new();
    }

    let words = normalize_words(&request.words);
    if !words.is_empty() {
        return rank_lexical(corpus, &words, request.k);
    }

    sample_front_pool(corpus, request.k, seed)
}

/// Derive the sampling seed for a hint.
pub fn seed_for_hint(hint: Option<&str>) -> u64 {
    match hint.filter(|h| !h.is_empty()) {
        Some(hint) => {
            let digest = Sha256::digest(hint.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            u64::from_be_bytes(head)
        }
        None => Utc::now().timestamp().max(0) as u64,
    }
}

/// Keyword overlap with `words` plus the priority bonus.
pub fn score(shard: &Shard, words: &HashSet<String>) -> f64 {
    let overlap = shard
        .keywords
        .iter()
        .filter(|k| words.contains(k.as_str()))
        .count();
    overlap as f64 + PRIORITY_WEIGHT * shard.priority as f64
}

fn normalize_words(words: &[String]) -> HashSet<String> {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn rank_lexical<'a>(corpus: &'a [Shard], words: &HashSet<String>, k: usize) -> Vec<&'a Shard> {
    let mut scored: Vec<(f64, &Shard)> = corpus.iter().map(|s| (score(s, words), s)).collect();
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| by_priority_then_recency(a, b))
    });
    scored.into_iter().take(k).map(|(_, s)| s).collect()
}

fn sample_front_pool(corpus: &[Shard], k: usize, seed: u64) -> Vec<&Shard> {
    let mut pool: Vec<&Shard> = corpus.iter().collect();
    pool.sort_by(|a, b| by_priority_then_recency(a, b));
    pool.truncate(k.max(FRONT_POOL_MIN));

    if pool.len() <= k {
        return pool;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let rest = &pool[1..];
    let mut picked = Vec::with_capacity(k);
    picked.push(pool[0]);
    picked.extend(
        index::sample(&mut rng, rest.len(), k - 1)
            .into_iter()
            .map(|i| rest[i]),
    );
    picked
}

/// Descending priority, then descending mtime.
fn by_priority_then_recency(a: &Shard, b: &Shard) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.mtime.partial_cmp(&a.mtime).unwrap_or(Ordering::Equal))
}
