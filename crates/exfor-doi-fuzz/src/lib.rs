//! Fuzzing library for exfor-doi.
//!
//! Targets cover decoding of Crossref responses and source rows, plus the
//! similarity and surname routines that run on every record.
//!
//! # Usage
//!
//! ```bash
//! cd crates/exfor-doi-fuzz
//! cargo +nightly fuzz run fuzz_similarity -- -max_total_time=60
//! ```

pub use exfor_doi::{models, pipeline::retriever, similarity};
