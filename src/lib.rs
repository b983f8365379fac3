//! # clone-recall: Recall Evaluation for Code Clone Detectors
//!
//! Measures how many of a benchmark's known clone pairs a clone detection tool
//! finds, broken down by clone type, Type-3 similarity band, project locality
//! and functionality.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────────────┐    ┌──────────────┐
//! │ Clone Store  │ ─▶ │ RecallEvaluator           │ ─▶ │ ReportWriter │
//! │ (benchmark + │    │  • in-scope snapshot      │    │ (plain text) │
//! │  tool output)│    │  • CloneMatcher decisions │    └──────────────┘
//! └──────────────┘    │  • count / recall queries │
//!                     └───────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clone_recall::engine::{Dimension, EvaluationSettings, RecallEvaluator};
//! use clone_recall::io::store::InMemoryStore;
//! use clone_recall::matchers;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::open("benchmark.json")?;
//!     let matcher = matchers::load(1, "CoverageMatcher", "0.7")?;
//!     let evaluator = RecallEvaluator::new(&store, EvaluationSettings::new(1), matcher)?;
//!
//!     let strong = evaluator.count(&Dimension::type3(70, 90)?);
//!     println!("Strongly Type-3: {} = {}", strong, strong.recall());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Core data model, configuration and errors
pub mod core {
    //! Benchmark entities, selection filters, configuration and errors.

    pub mod config;
    pub mod errors;
    pub mod filter;
    pub mod model;
}

// Clone matching strategies
pub mod matchers;

// Recall evaluation engine
pub mod engine;

// Store access and reporting
pub mod io {
    //! Clone store access and report output.

    pub mod report;
    pub mod store;
}

pub use crate::core::config::EvaluationConfig;
pub use crate::core::errors::{EvalError, Result, ResultExt};
pub use crate::engine::{Dimension, Recall, RecallEvaluator, SimilarityBand, Tally};
pub use crate::matchers::{CloneMatcher, MatcherRegistry};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
