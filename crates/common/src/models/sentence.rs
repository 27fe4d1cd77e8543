//! Sentence and its ground-truth label

use serde::{Deserialize, Serialize};

/// Ground-truth label of a sentence with respect to the cited work
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentenceType {
    /// Contains a formal citation of the cited work
    ExplicitReference,
    /// Talks about the cited work without a formal citation
    ImplicitReference,
    /// Unrelated to the cited work
    NotReference,
}

impl SentenceType {
    /// Explicit and implicit references both refer to the cited work
    pub fn is_reference(&self) -> bool {
        !matches!(self, SentenceType::NotReference)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, SentenceType::ExplicitReference)
    }
}

/// One sentence of a citing paper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence<T> {
    /// Position in the document (0-based)
    pub index: usize,

    /// Label, used for evaluation only
    pub sentence_type: SentenceType,

    /// Text representation
    pub text: T,
}
