//! CiteCtx Common Library
//!
//! Shared code for the citation context classifier including:
//! - Citation context data model (datasets, documents, sentences)
//! - Text feature abstraction and bag-of-words / n-gram representations
//! - Lexical cue predicates
//! - Error types and handling
//! - Configuration management
//! - Metrics and tracing setup

pub mod config;
pub mod errors;
pub mod lexicon;
pub mod metrics;
pub mod models;
pub mod observability;
pub mod text;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use lexicon::Lexicon;
pub use models::{Dataset, DatasetContext, Document, Sentence, SentenceType};
pub use text::{BagOfWords, NgramText, TextFeatures};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
