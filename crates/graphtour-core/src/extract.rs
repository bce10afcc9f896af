//! # Collaborator Interfaces
//!
//! The planner consumes triplets; producing them (document chunking,
//! LLM-backed extraction, description summarization) is external work.
//! These traits are the seams those collaborators plug into.
//!
//! # Extension Point
//!
//! `DocumentPreprocessor` and `TripletExtractor` are intentionally defined
//! without in-crate implementations: adapters (file readers, LLM clients)
//! live outside the core and hand the finished triplet list in. The one
//! in-crate implementation, [`ConcatSummarizer`], keeps the pipeline fully
//! offline; it never calls a model.

use crate::types::{PlanError, Triplet};
use std::collections::BTreeMap;

/// A chunk of preprocessed document text with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

/// Splits a document source into chunks the extractor can work on.
pub trait DocumentPreprocessor {
    /// Chunk one document source (a path, a URL, raw text; the adapter's
    /// choice of addressing).
    fn chunks(&self, source: &str) -> Result<Vec<Chunk>, PlanError>;
}

/// Which extraction strategy a `TripletExtractor` adapter runs.
///
/// `Combined` extracts entities and relationships in one pass; `Separate`
/// runs entity extraction first and relationship extraction over the found
/// entities. Picked at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Combined,
    Separate,
}

/// Produces triplets from grouped chunk texts.
pub trait TripletExtractor {
    /// The strategy this extractor implements.
    fn kind(&self) -> ExtractorKind;

    /// Extract triplets from chunk texts, optionally restricted to the
    /// given entity types.
    fn extract(
        &self,
        texts: &[Vec<String>],
        entity_types: Option<&[String]>,
    ) -> Result<Vec<Triplet>, PlanError>;
}

/// Rolls a list of descriptions up into one.
pub trait DescriptionSummarizer {
    fn summarize(&self, descriptions: &[String]) -> Result<String, PlanError>;
}

/// Offline summarizer: a single description is returned as-is, several are
/// joined. Stands in wherever a model-backed summarizer is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatSummarizer;

impl DescriptionSummarizer for ConcatSummarizer {
    fn summarize(&self, descriptions: &[String]) -> Result<String, PlanError> {
        match descriptions {
            [] => Ok(String::new()),
            [single] => Ok(single.clone()),
            many => Ok(many.join("; ")),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_description_is_returned_unchanged() {
        let summarizer = ConcatSummarizer;
        let result = summarizer
            .summarize(&["only one".to_string()])
            .expect("summarize");
        assert_eq!(result, "only one");
    }

    #[test]
    fn several_descriptions_are_joined() {
        let summarizer = ConcatSummarizer;
        let result = summarizer
            .summarize(&["first".to_string(), "second".to_string()])
            .expect("summarize");
        assert_eq!(result, "first; second");
    }

    #[test]
    fn empty_list_summarizes_to_empty() {
        let summarizer = ConcatSummarizer;
        assert_eq!(summarizer.summarize(&[]).expect("summarize"), "");
    }
}
