//! EXFOR DOI enrichment
//!
//! Finds DOIs for EXFOR bibliographic entries that lack one by searching the
//! Crossref works API with each entry's title, first author surname and year,
//! scoring the returned candidates with Ratcliff/Obershelp similarity, and
//! accepting the best candidate only when both title and author scores
//! exceed 0.8. Accepted matches are then merged into the EXFOR table, with
//! native DOIs taking precedence.
//!
//! # Features
//!
//! - **Sequential batch**: one request at a time, cooperative Ctrl-C handling
//! - **Rate-limited**: client-side token bucket at the declared Crossref rate
//! - **Contained failures**: a failed entry is logged and skipped, never fatal
//! - **Deterministic merge**: identical inputs give byte-identical outputs
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use exfor_doi::config::Config;
//! use exfor_doi::diagnostics::TracingSink;
//! use exfor_doi::models::SourceRecord;
//! use exfor_doi::pipeline::{MatchContext, match_record};
//! use exfor_doi::CrossrefClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = CrossrefClient::new(&config)?;
//!     let ctx = MatchContext::new(Arc::new(client), Arc::new(TracingSink), config);
//!
//!     let record = SourceRecord::new("A0001")
//!         .with_title("Elastic Scattering Study")
//!         .with_first_author("M.Brischetto")
//!         .with_year("2024");
//!     let result = match_record(&ctx, &record).await?;
//!     println!("{:?}", result.most_probable);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod similarity;
pub mod store;

pub use client::{CrossrefClient, WorksSearch};
pub use config::Config;
pub use error::{ClientError, PipelineError, StoreError};
