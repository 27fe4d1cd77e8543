//! Documents, per-work context and datasets

use super::{Sentence, SentenceType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A citing paper: sentences in reading order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    /// Identifier of the citing paper
    pub id: String,

    /// Sentences, indexed by position
    pub sentences: Vec<Sentence<T>>,
}

impl<T> Document<T> {
    /// Build a document, assigning positions in order
    pub fn new(id: impl Into<String>, sentences: Vec<(SentenceType, T)>) -> Self {
        let sentences = sentences
            .into_iter()
            .enumerate()
            .map(|(index, (sentence_type, text))| Sentence { index, sentence_type, text })
            .collect();

        Self { id: id.into(), sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Positions of explicit references
    pub fn explicit_positions(&self) -> Vec<usize> {
        self.sentences
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sentence_type.is_explicit())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn sentence_type(&self, position: usize) -> Option<SentenceType> {
        self.sentences.get(position).map(|s| s.sentence_type)
    }
}

/// Read-only data about the cited work, shared by all its citing documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetContext<T> {
    /// Surname of the cited work's main author
    pub cited_main_author: String,

    /// Cited title
    pub cited_title: T,

    /// Aggregated cited content (abstract, body)
    pub cited_content: T,

    /// Acronyms mined around explicit citations
    #[serde(default)]
    pub acronyms: HashSet<String>,

    /// Lexical hooks mined around explicit citations
    #[serde(default)]
    pub lexical_hooks: HashSet<String>,
}

impl<T> DatasetContext<T> {
    /// Build a context; the main author itself is never a lexical hook
    pub fn new(
        cited_main_author: impl Into<String>,
        cited_title: T,
        cited_content: T,
        acronyms: HashSet<String>,
        mut lexical_hooks: HashSet<String>,
    ) -> Self {
        let cited_main_author = cited_main_author.into();
        lexical_hooks.remove(&cited_main_author);

        Self {
            cited_main_author,
            cited_title,
            cited_content,
            acronyms,
            lexical_hooks,
        }
    }
}

/// One cited work and the documents citing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<T> {
    /// Label of the cited work, e.g. an ACL anthology id
    pub label: String,

    pub context: DatasetContext<T>,

    /// Citing documents
    pub citers: Vec<Document<T>>,
}

impl<T> Dataset<T> {
    pub fn new(label: impl Into<String>, context: DatasetContext<T>, citers: Vec<Document<T>>) -> Self {
        Self { label: label.into(), context, citers }
    }

    /// Total sentences across all citers
    pub fn sentence_count(&self) -> usize {
        self.citers.iter().map(|c| c.len()).sum()
    }
}
