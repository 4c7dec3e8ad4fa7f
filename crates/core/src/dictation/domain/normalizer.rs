use crate::shared::constants::{ENGLISH_PUNCTUATION, UNSEGMENTED_PUNCTUATION};

/// Maps transcripts and learner input into one comparison space.
///
/// Lower-cases, strips the configured punctuation set, collapses whitespace
/// runs to a single space and trims both ends. Total over any input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    punctuation: Vec<char>,
}

impl Normalizer {
    pub fn new(punctuation: &[char]) -> Self {
        Self {
            punctuation: punctuation.to_vec(),
        }
    }

    pub fn english() -> Self {
        Self::new(ENGLISH_PUNCTUATION)
    }

    pub fn unsegmented() -> Self {
        Self::new(UNSEGMENTED_PUNCTUATION)
    }

    pub fn punctuation(&self) -> &[char] {
        &self.punctuation
    }

    pub fn normalize(&self, text: &str) -> String {
        let stripped: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !self.punctuation.contains(c))
            .collect();
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalize, then split on whitespace.
    pub fn tokenize(&self, transcript: &str) -> Vec<String> {
        self.normalize(transcript)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}
