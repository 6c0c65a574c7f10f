#![forbid(unsafe_code)]
//! geoconf-core library.
//!
//! Scores a batch of geocoder search results against the parsed query that
//! produced them, then ranks the batch and drops low-confidence entries.
//!
//! # Conventions
//!
//! - **Errors**: Scoring never fails. Configuration ingestion returns
//!   [`error::ConfigError`]; file loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod stats;

pub use config::{AddressPartSpec, ScoringConfig, ScoringSettings};
pub use error::ConfigError;
pub use matching::{FuzzyMatcher, LevenshteinMatcher};
pub use model::{FieldValues, ParsedQuery, Query, ResultHit, ScoreRequest};
pub use pipeline::{ConfidenceStage, StageOutcome, setup};
