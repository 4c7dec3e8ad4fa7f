pub mod dictation_event;
pub mod dictation_matcher;
pub mod language_profile;
pub mod mismatch;
pub mod normalizer;
pub mod token_source;
