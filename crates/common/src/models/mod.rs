//! Citation context data model
//!
//! A dataset is one cited work plus every document (citing paper) that
//! cites it. Documents are immutable once loaded.

mod sentence;
mod dataset;

pub use sentence::{Sentence, SentenceType};
pub use dataset::{Dataset, DatasetContext, Document};
