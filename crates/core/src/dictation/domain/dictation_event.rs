/// Notifications the dictation side publishes for playback and logging.
///
/// Playback reacts to these and never reads matcher state directly.
#[derive(Debug, Clone, PartialEq)]
pub enum DictationEvent {
    /// A segment became current. Matcher state for it is fresh unless
    /// `completed` (an empty segment completes on entry).
    SegmentChanged {
        index: usize,
        start: f64,
        end: f64,
        completed: bool,
    },
    /// Every expected token of the segment has been confirmed.
    SegmentCompleted { index: usize },
    /// Advance was requested past the final completed segment.
    LessonCompleted,
}
