//! # textlens-core
//!
//! Core library for textlens - an LLM-backed text analysis pipeline.
//!
//! This library provides:
//! - Domain types for analysis requests, payloads, and recorded attempts
//! - A completion client with a hard per-call deadline
//! - Strict decoding of model output with code-fence tolerance
//! - Owner attribution heuristics for action items
//! - SQLite-backed attempt history
//! - Configuration management and logging infrastructure
//!
//! ## Flow
//!
//! One request runs validate, prompt, complete, decode, record. Failures at
//! any stage produce a uniform envelope carrying a placeholder payload, and
//! every run is recorded exactly once when the store is available.
//!
//! ## Example
//!
//! ```rust,no_run
//! use textlens_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open the attempt store
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! ```

// Re-export commonly used items at the crate root
pub use completion::CompletionClient;
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{AnalysisOutcome, Orchestrator, ResponseEnvelope};
pub use store::{AttemptStore, Database, StoreHealth};
pub use types::*;

// Public modules
pub mod attribution;
pub mod completion;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod types;
