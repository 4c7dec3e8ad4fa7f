use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use super::token_source::TokenSource;
use crate::shared::constants::{UNSEGMENTED_UPLOAD_PATH, WORD_UPLOAD_PATH};

/// Target-language family. Selects punctuation, tokenization and the
/// segmentation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageProfile {
    /// Space-separated words (English and similar).
    #[default]
    English,
    /// Scripts without spaces between words (Chinese); the service supplies
    /// the word list per segment.
    Unsegmented,
}

impl LanguageProfile {
    pub const ALL: &[LanguageProfile] = &[LanguageProfile::English, LanguageProfile::Unsegmented];

    pub fn normalizer(self) -> Normalizer {
        match self {
            LanguageProfile::English => Normalizer::english(),
            LanguageProfile::Unsegmented => Normalizer::unsegmented(),
        }
    }

    pub fn token_source(self) -> TokenSource {
        match self {
            LanguageProfile::English => TokenSource::Transcript,
            LanguageProfile::Unsegmented => TokenSource::WordList,
        }
    }

    pub fn upload_path(self) -> &'static str {
        match self {
            LanguageProfile::English => WORD_UPLOAD_PATH,
            LanguageProfile::Unsegmented => UNSEGMENTED_UPLOAD_PATH,
        }
    }
}

impl std::fmt::Display for LanguageProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageProfile::English => write!(f, "English (word by word)"),
            LanguageProfile::Unsegmented => write!(f, "Chinese (service word list)"),
        }
    }
}
