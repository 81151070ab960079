//! # shardsmith
//!
//! Local-first voice shard selection and document chunking for prompt
//! assembly.
//!
//! shardsmith has two independent pipelines. The shard pipeline loads small
//! voice exemplars ("shards") from a directory, picks a handful for a request
//! and renders them into a style block for a system prompt. The document
//! pipeline parses structured documents and cuts their bodies into bounded,
//! sentence-snapped chunks for an indexer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌──────────┐
//! │ ShardCorpus  │──▶│ Selector │──▶│ Renderer │──▶ style block
//! │ (cached dir) │   │ lex/seed │   │          │
//! └──────────────┘   └──────────┘   └──────────┘
//!
//! ┌──────────────┐   ┌──────────┐
//! │ Header parse │──▶│ Chunker  │──▶ chunk sequence
//! └──────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shardsmith::corpus::ShardCorpus;
//! use shardsmith::models::SelectionRequest;
//!
//! let corpus = ShardCorpus::new("./persona/shards").unwrap();
//! let request = SelectionRequest::new(6)
//!     .with_words(["command"])
//!     .with_hint("A Romulan ship decloaks off our port bow.");
//! let block = corpus.render(&request);
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Document parse errors |
//! | [`header`] | Five-field document header parser |
//! | [`chunk`] | Sentence-snapping chunker |
//! | [`ingest`] | Document directory scan and chunking |
//! | [`corpus`] | Cached shard corpus loader |
//! | [`select`] | Lexical ranking and seeded sampling |
//! | [`render`] | Style block rendering |
//! | [`catalog`] | CLI views over the corpus |

pub mod catalog;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod error;
pub mod header;
pub mod ingest;
pub mod models;
pub mod render;
pub mod select;
