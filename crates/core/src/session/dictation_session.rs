use std::time::Duration;

use thiserror::Error;

use super::session_config::SessionConfig;
use super::session_logger::SessionLogger;
use crate::dictation::domain::dictation_event::DictationEvent;
use crate::dictation::domain::dictation_matcher::{DictationMatcher, MatchOutcome};
use crate::dictation::domain::mismatch::Mismatch;
use crate::lesson::domain::lesson::Lesson;
use crate::lesson::domain::segment::{Segment, WordAnnotation};
use crate::playback::domain::media_player::MediaPlayer;
use crate::playback::domain::segment_playback_controller::SegmentPlaybackController;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("already at the first sentence")]
    AtFirstSegment,
    #[error("finish the current sentence first")]
    SegmentIncomplete,
    #[error("the lesson is already finished")]
    LessonFinished,
}

/// Result of a successful `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    LessonCompleted,
}

/// The next expected word, revealed on request.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub index: usize,
    pub token: String,
    pub annotation: Option<WordAnnotation>,
}

/// What a completed segment shows: its text and glosses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionReveal<'a> {
    pub transcript: &'a str,
    pub translation: Option<&'a str>,
    pub annotations: &'a [WordAnnotation],
}

/// One learner working through one lesson.
///
/// Routes matcher results to the playback controller as `DictationEvent`s.
/// Loading another lesson means building a new session.
pub struct DictationSession {
    lesson: Lesson,
    config: SessionConfig,
    index: usize,
    matcher: DictationMatcher,
    playback: SegmentPlaybackController,
    logger: Box<dyn SessionLogger>,
    transcript_visible: bool,
    finished: bool,
}

impl DictationSession {
    pub fn new(
        lesson: Lesson,
        player: Box<dyn MediaPlayer>,
        config: SessionConfig,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        let playback =
            SegmentPlaybackController::new(player, config.loop_default, config.poll_interval());
        let matcher = config.matcher_for(&lesson.segments()[0]);
        let mut session = Self {
            lesson,
            config,
            index: 0,
            matcher,
            playback,
            logger,
            transcript_visible: false,
            finished: false,
        };
        session.logger.info(&format!(
            "Starting \"{}\" ({} sentences)",
            session.lesson.title(),
            session.lesson.len()
        ));
        session.enter(0);
        session
    }

    // --- input ---

    /// Input-change event with the full field text.
    pub fn input(&mut self, raw: &str) -> MatchOutcome {
        if self.finished {
            return MatchOutcome::Ignored;
        }
        let outcome = self.matcher.on_input(raw);
        self.after_match(&outcome);
        outcome
    }

    /// Confirm the pending word.
    pub fn submit(&mut self) -> MatchOutcome {
        if self.finished {
            return MatchOutcome::Ignored;
        }
        let outcome = self.matcher.submit();
        self.after_match(&outcome);
        outcome
    }

    // --- navigation ---

    pub fn next(&mut self) -> Result<Advance, NavigationError> {
        if self.finished {
            return Err(NavigationError::LessonFinished);
        }
        if !self.matcher.is_completed() {
            return Err(NavigationError::SegmentIncomplete);
        }
        if self.lesson.is_last(self.index) {
            self.finished = true;
            self.publish(DictationEvent::LessonCompleted);
            return Ok(Advance::LessonCompleted);
        }
        self.enter(self.index + 1);
        Ok(Advance::Moved(self.index))
    }

    /// Step back one sentence. After the lesson is finished this reopens the
    /// last sentence instead.
    pub fn previous(&mut self) -> Result<usize, NavigationError> {
        if self.finished {
            self.finished = false;
            self.enter(self.index);
            return Ok(self.index);
        }
        if self.index == 0 {
            return Err(NavigationError::AtFirstSegment);
        }
        self.enter(self.index - 1);
        Ok(self.index)
    }

    // --- playback ---

    pub fn play_current(&mut self) {
        self.playback.play_current();
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.playback.set_loop_enabled(enabled);
    }

    /// Flip looping; returns the new state.
    pub fn toggle_loop(&mut self) -> bool {
        let enabled = !self.playback.loop_enabled();
        self.playback.set_loop_enabled(enabled);
        enabled
    }

    pub fn loop_enabled(&self) -> bool {
        self.playback.loop_enabled()
    }

    pub fn tick(&mut self) {
        self.playback.tick();
    }

    pub fn observe_position(&mut self, position: f64) {
        self.playback.observe_position(position);
    }

    pub fn media_ready(&mut self) {
        self.playback.media_ready();
    }

    pub fn is_polling(&self) -> bool {
        self.playback.is_polling()
    }

    pub fn poll_interval(&self) -> Duration {
        self.playback.poll_interval()
    }

    pub fn playback_position(&self) -> Option<f64> {
        self.playback.player().position()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.player().is_playing()
    }

    // --- transcript ---

    /// Show or hide the transcript; returns the new visibility.
    pub fn toggle_transcript(&mut self) -> bool {
        self.transcript_visible = !self.transcript_visible;
        self.transcript_visible
    }

    pub fn transcript_visible(&self) -> bool {
        self.transcript_visible
    }

    // --- state ---

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_segment(&self) -> &Segment {
        &self.lesson.segments()[self.index]
    }

    /// `(current, total)` with a one-based current sentence.
    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.lesson.len())
    }

    pub fn expected_token_count(&self) -> usize {
        self.matcher.expected_tokens().len()
    }

    pub fn confirmed_tokens(&self) -> &[String] {
        self.matcher.confirmed_tokens()
    }

    pub fn pending_input(&self) -> &str {
        self.matcher.pending_input()
    }

    pub fn last_error(&self) -> Option<&Mismatch> {
        self.matcher.last_error()
    }

    pub fn is_segment_completed(&self) -> bool {
        self.matcher.is_completed()
    }

    pub fn can_go_next(&self) -> bool {
        !self.finished && self.matcher.is_completed()
    }

    pub fn can_go_previous(&self) -> bool {
        self.finished || self.index > 0
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn hint(&self) -> Option<Hint> {
        let index = self.matcher.next_index()?;
        let token = self.matcher.next_token()?.to_string();
        let segment = self.current_segment();
        let normalizer = self.config.profile.normalizer();
        let matches = |a: &&WordAnnotation| normalizer.normalize(&a.word) == token;

        let annotation = segment
            .annotation(index)
            .filter(matches)
            .or_else(|| segment.annotations.as_deref()?.iter().find(matches))
            .cloned();

        Some(Hint {
            index,
            token,
            annotation,
        })
    }

    pub fn completion_reveal(&self) -> Option<CompletionReveal<'_>> {
        if !self.matcher.is_completed() {
            return None;
        }
        let segment = self.current_segment();
        Some(CompletionReveal {
            transcript: &segment.transcript,
            translation: segment.translation.as_deref(),
            annotations: segment.annotations.as_deref().unwrap_or(&[]),
        })
    }

    /// Hand the end-of-session summary to the logger.
    pub fn summary(&self) {
        self.logger.summary();
    }

    fn enter(&mut self, index: usize) {
        self.index = index;
        self.matcher = self.config.matcher_for(&self.lesson.segments()[index]);
        self.transcript_visible = false;

        let segment = &self.lesson.segments()[index];
        let completed = self.matcher.is_completed();
        self.publish(DictationEvent::SegmentChanged {
            index,
            start: segment.start,
            end: segment.end,
            completed,
        });
        if completed {
            log::debug!("Sentence {} has no words to type", index + 1);
            self.publish(DictationEvent::SegmentCompleted { index });
        }
    }

    fn after_match(&mut self, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::Accepted {
                segment_completed, ..
            } => {
                self.logger.attempt(true);
                if *segment_completed {
                    self.publish(DictationEvent::SegmentCompleted { index: self.index });
                }
            }
            MatchOutcome::Rejected(_) => self.logger.attempt(false),
            MatchOutcome::Ignored | MatchOutcome::Cleared | MatchOutcome::Partial => {}
        }
    }

    fn publish(&mut self, event: DictationEvent) {
        self.logger.event(&event);
        self.playback.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictation::domain::dictation_matcher::MatchGranularity;
    use crate::dictation::domain::language_profile::LanguageProfile;
    use crate::lesson::domain::lesson::AudioSource;
    use crate::playback::infrastructure::simulated_media_player::{
        ManualClock, SimulatedMediaPlayer, SimulatedPlayerHandle,
    };
    use crate::session::session_logger::NullSessionLogger;
    use approx::assert_relative_eq;

    fn lesson(segments: Vec<Segment>) -> Lesson {
        Lesson::new("test", AudioSource::Url("http://x/a.mp3".into()), segments).unwrap()
    }

    fn two_segments() -> Lesson {
        lesson(vec![
            Segment::new(0.0, 1.5, "Hello world."),
            Segment::new(1.5, 3.0, "Good night!").with_translation("Chúc ngủ ngon"),
        ])
    }

    fn session_with(
        lesson: Lesson,
        config: SessionConfig,
    ) -> (DictationSession, SimulatedPlayerHandle, ManualClock) {
        let clock = ManualClock::new();
        let player = SimulatedMediaPlayer::new(60.0, clock.clone());
        let handle = player.handle();
        let session =
            DictationSession::new(lesson, Box::new(player), config, Box::new(NullSessionLogger));
        (session, handle, clock)
    }

    fn session(lesson: Lesson) -> (DictationSession, SimulatedPlayerHandle, ManualClock) {
        session_with(lesson, SessionConfig::default())
    }

    fn type_words(session: &mut DictationSession, words: &[&str]) {
        for word in words {
            session.input(&format!("{word} "));
        }
    }

    #[test]
    fn test_new_session_starts_at_first_segment_playing() {
        let (s, player, _) = session(two_segments());
        assert_eq!(s.progress(), (1, 2));
        assert!(s.confirmed_tokens().is_empty());
        assert!(s.loop_enabled());
        assert!(player.is_playing());
        assert_relative_eq!(player.position(), 0.0);
    }

    #[test]
    fn test_next_moves_to_following_segment_and_resets_matcher() {
        let (mut s, player, _) = session(two_segments());
        type_words(&mut s, &["hello", "world"]);
        assert!(s.is_segment_completed());
        assert!(!player.is_playing());

        assert_eq!(s.next(), Ok(Advance::Moved(1)));
        assert_eq!(s.current_index(), 1);
        assert!(s.confirmed_tokens().is_empty());
        assert!(s.last_error().is_none());
        assert!(player.is_playing());
        assert_relative_eq!(player.position(), 1.5);
    }

    #[test]
    fn test_last_segment_next_signals_lesson_complete() {
        let (mut s, _, _) = session(two_segments());
        type_words(&mut s, &["hello", "world"]);
        s.next().unwrap();
        type_words(&mut s, &["good", "night"]);

        assert_eq!(s.next(), Ok(Advance::LessonCompleted));
        assert_eq!(s.current_index(), 1);
        assert!(s.is_finished());
        assert_eq!(s.next(), Err(NavigationError::LessonFinished));
        assert_eq!(s.input("more"), MatchOutcome::Ignored);
    }

    #[test]
    fn test_next_requires_completed_segment() {
        let (mut s, _, _) = session(two_segments());
        s.input("hello ");
        assert_eq!(s.next(), Err(NavigationError::SegmentIncomplete));
        assert_eq!(s.current_index(), 0);
        assert!(!s.can_go_next());
    }

    #[test]
    fn test_previous_disabled_at_start_and_resets_state() {
        let (mut s, _, _) = session(two_segments());
        assert_eq!(s.previous(), Err(NavigationError::AtFirstSegment));

        type_words(&mut s, &["hello", "world"]);
        s.next().unwrap();
        s.input("go");
        assert_eq!(s.previous(), Ok(0));
        assert!(s.confirmed_tokens().is_empty());
        assert_eq!(s.pending_input(), "");
        assert!(!s.is_segment_completed());
    }

    #[test]
    fn test_previous_after_finish_reopens_last_sentence() {
        let (mut s, player, _) = session(lesson(vec![
            Segment::new(0.0, 1.0, "One."),
            Segment::new(1.0, 2.0, "Two."),
            Segment::new(2.0, 3.0, "Three."),
        ]));
        for word in ["one", "two", "three"] {
            s.input(word);
            s.next().unwrap();
        }
        assert!(s.is_finished());
        assert!(s.can_go_previous());

        assert_eq!(s.previous(), Ok(2));
        assert_eq!(s.current_index(), 2);
        assert!(!s.is_finished());
        assert!(!s.is_segment_completed());
        assert!(player.is_playing());
        assert_relative_eq!(player.position(), 2.0);
    }

    #[test]
    fn test_previous_after_finish_on_single_sentence_lesson() {
        let (mut s, _, _) = session(lesson(vec![Segment::new(0.0, 1.0, "Only.")]));
        s.input("only");
        assert_eq!(s.next(), Ok(Advance::LessonCompleted));

        assert_eq!(s.previous(), Ok(0));
        assert!(!s.is_finished());
        assert_eq!(s.previous(), Err(NavigationError::AtFirstSegment));
    }

    #[test]
    fn test_rejected_input_never_advances() {
        let (mut s, _, _) = session(two_segments());
        let outcome = s.input("x");
        assert!(matches!(outcome, MatchOutcome::Rejected(_)));
        assert!(s.confirmed_tokens().is_empty());
        assert_eq!(s.current_index(), 0);
        assert!(s.last_error().is_some());
    }

    #[test]
    fn test_empty_transcript_segment_is_complete_on_entry() {
        let (mut s, player, _) = session(lesson(vec![
            Segment::new(0.0, 1.0, "Hi."),
            Segment::new(1.0, 2.0, "..."),
        ]));
        s.input("hi");
        s.next().unwrap();

        assert!(s.is_segment_completed());
        assert_eq!(s.expected_token_count(), 0);
        assert!(!player.is_playing());
        assert_eq!(s.next(), Ok(Advance::LessonCompleted));
    }

    #[test]
    fn test_looping_until_completion_then_paused() {
        let (mut s, player, clock) = session(two_segments());
        for _ in 0..100 {
            clock.advance(0.05);
            s.tick();
            assert!(player.position() < 1.5 + 0.05);
        }
        assert!(player.is_playing());

        type_words(&mut s, &["hello", "world"]);
        clock.advance(5.0);
        s.tick();
        assert!(!player.is_playing());
        assert!(!s.is_polling());
    }

    #[test]
    fn test_transcript_toggle_resets_on_segment_change() {
        let (mut s, _, _) = session(two_segments());
        assert!(s.toggle_transcript());
        assert!(s.transcript_visible());

        type_words(&mut s, &["hello", "world"]);
        s.next().unwrap();
        assert!(!s.transcript_visible());
    }

    #[test]
    fn test_completion_reveal_only_after_completion() {
        let (mut s, _, _) = session(two_segments());
        type_words(&mut s, &["hello", "world"]);
        s.next().unwrap();
        assert!(s.completion_reveal().is_none());

        type_words(&mut s, &["good", "night"]);
        let reveal = s.completion_reveal().unwrap();
        assert_eq!(reveal.transcript, "Good night!");
        assert_eq!(reveal.translation, Some("Chúc ngủ ngon"));
        assert!(reveal.annotations.is_empty());
    }

    #[test]
    fn test_hint_includes_aligned_annotation() {
        let segment = Segment::new(0.0, 2.0, "我爱你").with_annotations(vec![
            WordAnnotation::new("我", "wǒ", "tôi"),
            WordAnnotation::new("爱", "ài", "yêu"),
            WordAnnotation::new("你", "nǐ", "bạn"),
        ]);
        let config = SessionConfig {
            profile: LanguageProfile::Unsegmented,
            granularity: MatchGranularity::WholeWord,
            ..Default::default()
        };
        let (mut s, _, _) = session_with(lesson(vec![segment]), config);
        s.input("我");

        let hint = s.hint().unwrap();
        assert_eq!(hint.index, 1);
        assert_eq!(hint.token, "爱");
        assert_eq!(hint.annotation.unwrap().phonetic.as_deref(), Some("ài"));
    }

    #[test]
    fn test_hint_is_none_once_completed() {
        let (mut s, _, _) = session(two_segments());
        assert_eq!(s.hint().unwrap().token, "hello");
        type_words(&mut s, &["hello", "world"]);
        assert!(s.hint().is_none());
    }

    #[test]
    fn test_toggle_loop_and_manual_play() {
        let (mut s, player, _) = session(two_segments());
        s.pause();
        assert!(!player.is_playing());
        assert!(s.loop_enabled());

        assert!(!s.toggle_loop());
        s.play_current();
        assert!(player.is_playing());
        assert_relative_eq!(player.position(), 0.0);
    }

    #[test]
    fn test_full_walkthrough_with_submit() {
        let config = SessionConfig {
            granularity: MatchGranularity::WholeWord,
            ..Default::default()
        };
        let (mut s, _, _) = session_with(two_segments(), config);

        s.input("Hello");
        s.submit();
        s.input("wrld");
        assert!(matches!(s.submit(), MatchOutcome::Rejected(Mismatch::WrongWord { .. })));
        s.input("world");
        assert!(s.is_segment_completed());
        assert_eq!(s.next(), Ok(Advance::Moved(1)));

        s.input("good");
        s.submit();
        s.input("Night!");
        assert_eq!(s.confirmed_tokens(), &["good", "night"]);
        assert_eq!(s.next(), Ok(Advance::LessonCompleted));
    }
}
