use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dictation::domain::dictation_matcher::{DictationMatcher, MatchGranularity, RevertPolicy};
use crate::dictation::domain::language_profile::LanguageProfile;
use crate::lesson::domain::segment::Segment;
use crate::shared::constants::{DEFAULT_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

/// Practice behavior chosen by the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub profile: LanguageProfile,
    pub granularity: MatchGranularity,
    pub revert_policy: RevertPolicy,
    /// Loop state a freshly loaded lesson starts with.
    pub loop_default: bool,
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: LanguageProfile::default(),
            granularity: MatchGranularity::default(),
            revert_policy: RevertPolicy::default(),
            loop_default: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS),
        )
    }

    /// Fresh matcher for `segment` under this profile.
    pub fn matcher_for(&self, segment: &Segment) -> DictationMatcher {
        let normalizer = self.profile.normalizer();
        let expected = self
            .profile
            .token_source()
            .expected_tokens(segment, &normalizer);
        DictationMatcher::new(expected, normalizer, self.granularity, self.revert_policy)
    }
}
