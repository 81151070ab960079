//! Style block rendering.
//!
//! Turns a shard selection into the plain-text block handed to prompt
//! assembly:
//!
//! ```text
//! <preamble>
//!
//! [shard:<id>]
//! SOURCE: <source>
//! NOTES: <notes>
//! <body>
//!
//! [shard:<id>]
//! ...
//! ```
//!
//! `SOURCE` and `NOTES` lines appear only when the header carries a
//! non-empty value. An empty selection renders as `""`.

use crate::models::Shard;

/// Opening line telling the consumer how to use the shards.
pub const STYLE_PREAMBLE: &str = "The following scene shards are cadence/diction exemplars\u{2014}emulate voice; do not quote long passages back to the user.";

pub fn render_style_block(shards: &[&Shard]) -> String {
    if shards.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = vec![STYLE_PREAMBLE.to_string(), String::new()];

    for shard in shards {
        let display_id = shard.headers.get("id").unwrap_or(&shard.id);
        lines.push(format!("[shard:{}]", display_id));
        if let Some(source) = non_empty_header(shard, "source") {
            lines.push(format!("SOURCE: {}", source));
        }
        if let Some(notes) = non_empty_header(shard, "notes") {
            lines.push(format!("NOTES: {}", notes));
        }
        lines.push(shard.body.trim().to_string());
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}

fn non_empty_header<'a>(shard: &'a Shard, key: &str) -> Option<&'a str> {
    shard
        .headers
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}
