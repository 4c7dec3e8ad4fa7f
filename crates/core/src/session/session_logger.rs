use std::collections::HashMap;
use std::time::Instant;

use crate::dictation::domain::dictation_event::DictationEvent;

/// Cross-cutting logger for practice-session events.
///
/// Lets the CLI print a study summary and the desktop stay silent without
/// changing the session code.
pub trait SessionLogger: Send {
    /// Observe a segment/lesson event.
    fn event(&mut self, event: &DictationEvent);

    /// Record one judged word: accepted or rejected.
    fn attempt(&mut self, accepted: bool);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn event(&mut self, _event: &DictationEvent) {}
    fn attempt(&mut self, _accepted: bool) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger that tracks per-segment time and word accuracy.
pub struct StdoutSessionLogger {
    start_time: Instant,
    segment_started: HashMap<usize, Instant>,
    segment_seconds: HashMap<usize, f64>,
    accepted: usize,
    rejected: usize,
    lesson_completed: bool,
}

impl StdoutSessionLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            segment_started: HashMap::new(),
            segment_seconds: HashMap::new(),
            accepted: 0,
            rejected: 0,
            lesson_completed: false,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was typed
    /// and no segment was finished.
    pub fn summary_string(&self) -> Option<String> {
        if self.segment_seconds.is_empty() && self.accepted == 0 && self.rejected == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} segments completed, {:.0}s total{}):",
            self.segment_seconds.len(),
            elapsed,
            if self.lesson_completed {
                ", lesson finished"
            } else {
                ""
            }
        )];

        let mut indices: Vec<_> = self.segment_seconds.keys().collect();
        indices.sort();
        for index in indices {
            lines.push(format!(
                "  Sentence {:3}: {:6.1}s",
                index + 1,
                self.segment_seconds[index]
            ));
        }

        let attempts = self.accepted + self.rejected;
        if attempts > 0 {
            let pct = self.accepted as f64 / attempts as f64 * 100.0;
            lines.push(format!(
                "  Words: {} accepted, {} mistakes ({pct:.1}% accuracy)",
                self.accepted, self.rejected
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn seconds_for(&self, segment: usize) -> Option<f64> {
        self.segment_seconds.get(&segment).copied()
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn event(&mut self, event: &DictationEvent) {
        match event {
            DictationEvent::SegmentChanged { index, completed, .. } => {
                if !completed {
                    self.segment_started.insert(*index, Instant::now());
                }
                log::info!("Sentence {}", index + 1);
            }
            DictationEvent::SegmentCompleted { index } => {
                let seconds = self
                    .segment_started
                    .get(index)
                    .map(|t| t.elapsed().as_secs_f64())
                    .unwrap_or(0.0);
                self.segment_seconds.insert(*index, seconds);
                log::info!("Sentence {} complete", index + 1);
            }
            DictationEvent::LessonCompleted => {
                self.lesson_completed = true;
                log::info!("Lesson complete");
            }
        }
    }

    fn attempt(&mut self, accepted: bool) {
        if accepted {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.event(&DictationEvent::LessonCompleted);
        logger.attempt(true);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutSessionLogger::new();
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_completed_segments_are_timed() {
        let mut logger = StdoutSessionLogger::new();
        logger.event(&DictationEvent::SegmentChanged {
            index: 0,
            start: 0.0,
            end: 1.5,
            completed: false,
        });
        logger.event(&DictationEvent::SegmentCompleted { index: 0 });

        assert!(logger.seconds_for(0).is_some());
        assert!(logger.seconds_for(1).is_none());
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (1 segments completed"));
        assert!(summary.contains("Sentence   1"));
    }

    #[test]
    fn test_summary_reports_accuracy() {
        let mut logger = StdoutSessionLogger::new();
        logger.attempt(true);
        logger.attempt(true);
        logger.attempt(true);
        logger.attempt(false);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("3 accepted, 1 mistakes (75.0% accuracy)"));
    }

    #[test]
    fn test_lesson_completion_is_noted() {
        let mut logger = StdoutSessionLogger::new();
        logger.attempt(true);
        logger.event(&DictationEvent::LessonCompleted);
        assert!(logger.summary_string().unwrap().contains("lesson finished"));
    }

    #[test]
    fn test_revisited_segment_is_timed_from_latest_entry() {
        let changed = DictationEvent::SegmentChanged {
            index: 0,
            start: 0.0,
            end: 1.5,
            completed: false,
        };
        let mut logger = StdoutSessionLogger::new();
        logger.event(&changed);
        thread::sleep(Duration::from_millis(200));
        logger.event(&changed);
        logger.event(&DictationEvent::SegmentCompleted { index: 0 });

        assert!(logger.seconds_for(0).unwrap() < 0.2);
    }
}
