//! CLI views over the shard corpus: listing, selection and rendering.

use anyhow::Result;

use crate::config::Config;
use crate::corpus::ShardCorpus;
use crate::models::{SelectionRequest, Shard};

/// Print the loaded catalog as a table.
pub fn list_shards(config: &Config) -> Result<()> {
    let corpus = ShardCorpus::from_config(&config.shards)?;
    let shards = corpus.load();

    if shards.is_empty() {
        println!("No shards found in {}", corpus.dir().display());
        return Ok(());
    }

    println!("{:<32} {:>8}  {:<40} FILE", "ID", "PRIORITY", "KEYWORDS");
    println!("{}", "-".repeat(96));
    for shard in shards {
        println!(
            "{:<32} {:>8}  {:<40} {}",
            shard.id,
            shard.priority,
            truncate(&shard.keywords.join(","), 40),
            file_name(shard)
        );
    }
    println!();
    println!("{} shard(s) in {}", shards.len(), corpus.dir().display());

    Ok(())
}

/// Run the `select` command.
pub fn run_select(config: &Config, request: &SelectionRequest, json: bool) -> Result<()> {
    let corpus = ShardCorpus::from_config(&config.shards)?;
    let picked = corpus.select(request);

    if json {
        println!("{}", serde_json::to_string_pretty(&picked)?);
        return Ok(());
    }

    if picked.is_empty() {
        println!("No shards selected.");
        return Ok(());
    }
    for (rank, shard) in picked.iter().enumerate() {
        println!("{}. {} (priority {})", rank + 1, shard.id, shard.priority);
    }
    Ok(())
}

/// Run the `render` command. Prints nothing when the selection is empty.
pub fn run_render(config: &Config, request: &SelectionRequest) -> Result<()> {
    let corpus = ShardCorpus::from_config(&config.shards)?;
    let block = corpus.render(request);
    if !block.is_empty() {
        println!("{}", block);
    }
    Ok(())
}

fn file_name(shard: &Shard) -> String {
    shard
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }
}
