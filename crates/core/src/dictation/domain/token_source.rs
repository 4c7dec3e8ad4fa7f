use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use crate::lesson::domain::segment::Segment;

/// Where a segment's expected tokens come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSource {
    /// Split the normalized transcript on whitespace.
    Transcript,
    /// Use the word list the service supplied in the segment annotations.
    /// Falls back to `Transcript` when a segment carries no annotations.
    WordList,
}

impl TokenSource {
    pub fn expected_tokens(self, segment: &Segment, normalizer: &Normalizer) -> Vec<String> {
        match (self, segment.annotations.as_ref()) {
            (TokenSource::WordList, Some(annotations)) => annotations
                .iter()
                .map(|a| normalizer.normalize(&a.word))
                .filter(|w| !w.is_empty())
                .collect(),
            _ => normalizer.tokenize(&segment.transcript),
        }
    }
}
