use serde::{Deserialize, Serialize};

use super::mismatch::Mismatch;
use super::normalizer::Normalizer;

/// When input is judged against the next expected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchGranularity {
    /// Every keystroke must keep the field a prefix of the next token.
    #[default]
    CharacterPrefix,
    /// The field is free text until it equals the token or is submitted.
    WholeWord,
}

/// What happens to the field when a keystroke breaks the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevertPolicy {
    /// Restore the field to its value before the offending keystroke.
    #[default]
    DropLastChar,
    /// Keep the mismatched text and only report the error.
    FlagOnly,
}

impl MatchGranularity {
    pub const ALL: &[MatchGranularity] = &[MatchGranularity::CharacterPrefix, MatchGranularity::WholeWord];
}

impl std::fmt::Display for MatchGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchGranularity::CharacterPrefix => write!(f, "Letter by letter"),
            MatchGranularity::WholeWord => write!(f, "Whole words"),
        }
    }
}

impl RevertPolicy {
    pub const ALL: &[RevertPolicy] = &[RevertPolicy::DropLastChar, RevertPolicy::FlagOnly];
}

impl std::fmt::Display for RevertPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertPolicy::DropLastChar => write!(f, "Remove wrong letter"),
            RevertPolicy::FlagOnly => write!(f, "Keep and highlight"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherState {
    AwaitingWord(usize),
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The segment is already complete; input has no effect.
    Ignored,
    /// Input normalized to nothing.
    Cleared,
    /// Input kept as an in-progress word.
    Partial,
    Accepted {
        token: String,
        segment_completed: bool,
    },
    Rejected(Mismatch),
}

/// Incremental word-by-word matcher for one segment.
///
/// `confirmed` is always a prefix of `expected`. `pending` is what the input
/// field should display; it is either empty, a valid in-progress prefix of the
/// next token, or (under `FlagOnly`/`WholeWord`) text that was just flagged.
#[derive(Debug, Clone)]
pub struct DictationMatcher {
    expected: Vec<String>,
    confirmed: Vec<String>,
    pending: String,
    last_error: Option<Mismatch>,
    granularity: MatchGranularity,
    revert_policy: RevertPolicy,
    normalizer: Normalizer,
}

impl DictationMatcher {
    /// `expected` must already be in normalized form.
    pub fn new(
        expected: Vec<String>,
        normalizer: Normalizer,
        granularity: MatchGranularity,
        revert_policy: RevertPolicy,
    ) -> Self {
        Self {
            expected,
            confirmed: Vec::new(),
            pending: String::new(),
            last_error: None,
            granularity,
            revert_policy,
            normalizer,
        }
    }

    pub fn state(&self) -> MatcherState {
        if self.is_completed() {
            MatcherState::Completed
        } else {
            MatcherState::AwaitingWord(self.confirmed.len())
        }
    }

    pub fn is_completed(&self) -> bool {
        self.confirmed.len() == self.expected.len()
    }

    pub fn expected_tokens(&self) -> &[String] {
        &self.expected
    }

    pub fn confirmed_tokens(&self) -> &[String] {
        &self.confirmed
    }

    pub fn pending_input(&self) -> &str {
        &self.pending
    }

    pub fn last_error(&self) -> Option<&Mismatch> {
        self.last_error.as_ref()
    }

    pub fn next_index(&self) -> Option<usize> {
        (!self.is_completed()).then_some(self.confirmed.len())
    }

    pub fn next_token(&self) -> Option<&str> {
        self.expected.get(self.confirmed.len()).map(String::as_str)
    }

    /// Handle an input-change event carrying the full current field text.
    pub fn on_input(&mut self, raw: &str) -> MatchOutcome {
        let Some(expected) = self.next_token().map(str::to_string) else {
            return MatchOutcome::Ignored;
        };

        let normalized = self.normalizer.normalize(raw);
        if normalized.is_empty() {
            self.pending = raw.to_string();
            self.last_error = None;
            return MatchOutcome::Cleared;
        }

        if normalized == expected {
            return self.accept();
        }

        match self.granularity {
            MatchGranularity::CharacterPrefix if expected.starts_with(&normalized) => {
                self.pending = raw.to_string();
                self.last_error = None;
                MatchOutcome::Partial
            }
            MatchGranularity::CharacterPrefix => {
                let mismatch = Mismatch::WrongLetter {
                    typed: raw.trim().to_string(),
                };
                if self.revert_policy == RevertPolicy::FlagOnly {
                    self.pending = raw.to_string();
                }
                log::debug!("Rejected {raw:?} while expecting {expected:?}");
                self.last_error = Some(mismatch.clone());
                MatchOutcome::Rejected(mismatch)
            }
            MatchGranularity::WholeWord => {
                self.pending = raw.to_string();
                self.last_error = None;
                MatchOutcome::Partial
            }
        }
    }

    /// Confirm the pending word as a discrete unit (Enter or space).
    ///
    /// A wrong submitted word is flagged and left in the field for correction.
    pub fn submit(&mut self) -> MatchOutcome {
        let Some(expected) = self.next_token().map(str::to_string) else {
            return MatchOutcome::Ignored;
        };

        let normalized = self.normalizer.normalize(&self.pending);
        if normalized.is_empty() {
            self.last_error = None;
            return MatchOutcome::Cleared;
        }
        if normalized == expected {
            return self.accept();
        }

        let mismatch = Mismatch::WrongWord {
            typed: self.pending.trim().to_string(),
        };
        self.last_error = Some(mismatch.clone());
        MatchOutcome::Rejected(mismatch)
    }

    fn accept(&mut self) -> MatchOutcome {
        let index = self.confirmed.len();
        let token = self.expected[index].clone();
        self.confirmed.push(token.clone());
        self.pending.clear();
        self.last_error = None;

        let segment_completed = self.is_completed();
        log::debug!(
            "Accepted word {}/{}: {token:?}",
            index + 1,
            self.expected.len()
        );
        MatchOutcome::Accepted {
            token,
            segment_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matcher(transcript: &str) -> DictationMatcher {
        matcher_with(
            transcript,
            MatchGranularity::CharacterPrefix,
            RevertPolicy::DropLastChar,
        )
    }

    fn matcher_with(
        transcript: &str,
        granularity: MatchGranularity,
        revert_policy: RevertPolicy,
    ) -> DictationMatcher {
        let normalizer = Normalizer::english();
        DictationMatcher::new(
            normalizer.tokenize(transcript),
            normalizer,
            granularity,
            revert_policy,
        )
    }

    /// Type `word` one keystroke at a time, then a trailing space.
    fn type_word(m: &mut DictationMatcher, word: &str) -> MatchOutcome {
        let mut field = m.pending_input().to_string();
        let mut last = MatchOutcome::Cleared;
        for ch in word.chars().chain(std::iter::once(' ')) {
            field.push(ch);
            last = m.on_input(&field);
            field = m.pending_input().to_string();
        }
        last
    }

    #[test]
    fn test_exact_match_sequence_completes_segment() {
        let mut m = matcher("She is in the living room.");
        assert_eq!(m.expected_tokens().len(), 6);

        for (i, word) in ["She", "is", "in", "the", "living", "room"]
            .iter()
            .enumerate()
        {
            assert!(!m.is_completed());
            type_word(&mut m, word);
            assert_eq!(m.confirmed_tokens().len(), i + 1);
        }

        assert_eq!(
            m.confirmed_tokens(),
            &["she", "is", "in", "the", "living", "room"]
        );
        assert!(m.is_completed());
        assert_eq!(m.state(), MatcherState::Completed);
    }

    #[test]
    fn test_final_acceptance_reports_completion() {
        let mut m = matcher("One.");
        let outcome = m.on_input("one");
        assert_eq!(
            outcome,
            MatchOutcome::Accepted {
                token: "one".to_string(),
                segment_completed: true
            }
        );
    }

    #[test]
    fn test_partial_prefix_accepted_and_bad_letter_reverted() {
        let mut m = matcher("room");
        assert_eq!(m.on_input("ro"), MatchOutcome::Partial);
        assert!(m.last_error().is_none());
        assert_eq!(m.pending_input(), "ro");

        let outcome = m.on_input("rx");
        assert!(matches!(
            outcome,
            MatchOutcome::Rejected(Mismatch::WrongLetter { .. })
        ));
        assert_eq!(m.pending_input(), "ro");
        assert!(m.last_error().is_some());
        assert!(m.confirmed_tokens().is_empty());
    }

    #[test]
    fn test_partial_keeps_learner_casing() {
        let mut m = matcher("Jane");
        m.on_input("JA");
        assert_eq!(m.pending_input(), "JA");
    }

    #[test]
    fn test_accepted_input_clears_error() {
        let mut m = matcher("room");
        m.on_input("rx");
        assert!(m.last_error().is_some());
        m.on_input("ro");
        assert!(m.last_error().is_none());
    }

    #[test]
    fn test_empty_input_clears_error_without_transition() {
        let mut m = matcher("room");
        m.on_input("x");
        assert_eq!(m.on_input("   "), MatchOutcome::Cleared);
        assert!(m.last_error().is_none());
        assert_eq!(m.state(), MatcherState::AwaitingWord(0));
    }

    #[test]
    fn test_case_and_punctuation_insensitive_match() {
        let mut m = matcher("Where is Jane?");
        m.on_input("WHERE");
        m.on_input("is,");
        m.on_input("Jane?!");
        assert!(m.is_completed());
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let mut m = matcher("piano");
        let outcome = m.on_input("pianno");
        assert!(matches!(outcome, MatchOutcome::Rejected(_)));
        assert!(m.confirmed_tokens().is_empty());
    }

    #[test]
    fn test_empty_transcript_is_immediately_completed() {
        let m = matcher("");
        assert!(m.expected_tokens().is_empty());
        assert_eq!(m.state(), MatcherState::Completed);
        assert_eq!(m.next_index(), None);
    }

    #[test]
    fn test_input_after_completion_is_ignored() {
        let mut m = matcher("One.");
        m.on_input("one");
        assert_eq!(m.on_input("two"), MatchOutcome::Ignored);
        assert_eq!(m.submit(), MatchOutcome::Ignored);
        assert_eq!(m.confirmed_tokens(), &["one"]);
    }

    #[rstest]
    #[case::drop_last_char(RevertPolicy::DropLastChar, "ro")]
    #[case::flag_only(RevertPolicy::FlagOnly, "rox")]
    fn test_revert_policy(#[case] policy: RevertPolicy, #[case] field_after: &str) {
        let mut m = matcher_with("room", MatchGranularity::CharacterPrefix, policy);
        m.on_input("r");
        m.on_input("ro");
        let outcome = m.on_input("rox");
        assert!(matches!(outcome, MatchOutcome::Rejected(_)));
        assert_eq!(m.pending_input(), field_after);
        assert!(m.last_error().is_some());
    }

    #[test]
    fn test_rejections_never_extend_confirmed() {
        let mut m = matcher("The dog is eating.");
        for junk in ["x", "tx", "dog", "eating", "?"] {
            m.on_input(junk);
        }
        assert!(m.confirmed_tokens().is_empty());
        assert_eq!(m.state(), MatcherState::AwaitingWord(0));
    }

    #[test]
    fn test_whole_word_defers_verdict_until_equal_or_submit() {
        let mut m = matcher_with(
            "living room",
            MatchGranularity::WholeWord,
            RevertPolicy::FlagOnly,
        );
        assert_eq!(m.on_input("lx"), MatchOutcome::Partial);
        assert!(m.last_error().is_none());

        let outcome = m.submit();
        assert_eq!(
            outcome,
            MatchOutcome::Rejected(Mismatch::WrongWord {
                typed: "lx".to_string()
            })
        );
        assert_eq!(m.pending_input(), "lx");

        assert!(matches!(
            m.on_input("living"),
            MatchOutcome::Accepted { .. }
        ));
        m.on_input("room");
        assert!(m.is_completed());
    }

    #[test]
    fn test_submit_confirms_pending_prefix_match() {
        let mut m = matcher("the car");
        m.on_input("th");
        assert!(matches!(m.submit(), MatchOutcome::Rejected(_)));
        m.on_input("the");
        assert_eq!(m.confirmed_tokens(), &["the"]);
        assert_eq!(m.submit(), MatchOutcome::Cleared);
    }

    #[test]
    fn test_next_token_tracks_progress() {
        let mut m = matcher("At home.");
        assert_eq!(m.next_token(), Some("at"));
        m.on_input("at");
        assert_eq!(m.next_token(), Some("home"));
        assert_eq!(m.next_index(), Some(1));
    }
}
