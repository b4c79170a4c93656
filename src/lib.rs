//! Extraction of football betting-program odds from spordb.com.
//!
//! The core is [`Extractor`], which turns one already-fetched program page
//! into an [`ExtractionBatch`] of [`MatchRecord`]s for a single competition.
//! [`IddaaClient`] fetches weekly pages, [`Dataset`] merges weeks and writes
//! CSV, and [`GithubPublisher`] stores the CSV in a repository.

pub mod client;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod model;
pub mod publish;

pub use client::IddaaClient;
pub use dataset::{Dataset, DatasetRow};
pub use error::{IddaaError, Result};
pub use extract::{
    collapse_whitespace, extract_detail_value, normalize_sentinel, CellKind, Extractor,
};
pub use model::*;
pub use publish::{GithubPublisher, PublishOutcome, RemoteFile};
