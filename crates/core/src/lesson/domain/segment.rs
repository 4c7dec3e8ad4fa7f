use serde::{Deserialize, Serialize};

/// Gloss for one word of a segment transcript, aligned with its tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordAnnotation {
    pub word: String,
    /// Phonetic form (pinyin for Chinese lessons).
    #[serde(default, alias = "pinyin", skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    /// Meaning in the learner's native language.
    #[serde(default, alias = "vi", skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

impl WordAnnotation {
    pub fn new(word: impl Into<String>, phonetic: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonetic: Some(phonetic.into()),
            meaning: Some(meaning.into()),
        }
    }
}

/// A time-bounded slice of the lesson audio with its transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(
        default,
        alias = "word_translations",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotations: Option<Vec<WordAnnotation>>,
}

impl Segment {
    pub fn new(start: f64, end: f64, transcript: impl Into<String>) -> Self {
        Self {
            start,
            end,
            transcript: transcript.into(),
            translation: None,
            annotations: None,
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<WordAnnotation>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the window is finite, non-negative and non-empty.
    pub fn has_valid_window(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.start < self.end
    }

    pub fn annotation(&self, index: usize) -> Option<&WordAnnotation> {
        self.annotations.as_ref().and_then(|a| a.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_duration() {
        let seg = Segment::new(1.5, 3.0, "One.");
        assert_relative_eq!(seg.duration(), 1.5);
    }

    #[test]
    fn test_valid_window() {
        assert!(Segment::new(0.0, 1.5, "At home.").has_valid_window());
        assert!(!Segment::new(1.5, 1.5, "x").has_valid_window());
        assert!(!Segment::new(2.0, 1.0, "x").has_valid_window());
        assert!(!Segment::new(-0.1, 1.0, "x").has_valid_window());
        assert!(!Segment::new(0.0, f64::NAN, "x").has_valid_window());
    }

    #[test]
    fn test_deserialize_word_translations_alias() {
        let json = r#"{
            "start": 0.0,
            "end": 2.0,
            "transcript": "我爱你",
            "translation": "Tôi yêu bạn",
            "word_translations": [
                {"word": "我", "pinyin": "wǒ", "vi": "tôi"},
                {"word": "爱", "pinyin": "ài", "vi": "yêu"},
                {"word": "你", "pinyin": "nǐ", "vi": "bạn"}
            ]
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        let annotations = seg.annotations.as_ref().unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[1].word, "爱");
        assert_eq!(annotations[1].phonetic.as_deref(), Some("ài"));
        assert_eq!(annotations[1].meaning.as_deref(), Some("yêu"));
        assert_eq!(seg.translation.as_deref(), Some("Tôi yêu bạn"));
    }

    #[test]
    fn test_deserialize_minimal_segment() {
        let seg: Segment =
            serde_json::from_str(r#"{"start": 3.0, "end": 5.0, "transcript": "Where is Jane?"}"#)
                .unwrap();
        assert_eq!(seg, Segment::new(3.0, 5.0, "Where is Jane?"));
    }

    #[test]
    fn test_annotation_out_of_range_is_none() {
        let seg = Segment::new(0.0, 1.0, "hi").with_annotations(vec![WordAnnotation {
            word: "hi".to_string(),
            phonetic: None,
            meaning: Some("chào".to_string()),
        }]);
        assert!(seg.annotation(0).is_some());
        assert!(seg.annotation(1).is_none());
    }
}
