use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::segment::Segment;

/// Overlap smaller than this is treated as rounding noise from the service.
const OVERLAP_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LessonError {
    #[error("lesson has no playable segments")]
    NoSegments,
    #[error("segment {index} ({start:.2}s-{end:.2}s) overlaps the previous segment ending at {previous_end:.2}s")]
    Overlapping {
        index: usize,
        start: f64,
        end: f64,
        previous_end: f64,
    },
}

/// Where the lesson audio can be fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::Url(url) => write!(f, "{url}"),
            AudioSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A loaded lesson: one audio resource and its ordered, non-overlapping segments.
///
/// Immutable once built. A new upload produces a new `Lesson` rather than
/// editing this one.
#[derive(Clone, Debug, PartialEq)]
pub struct Lesson {
    title: String,
    audio_source: AudioSource,
    segments: Vec<Segment>,
}

impl Lesson {
    /// Build a lesson from raw service output.
    ///
    /// Segments with an unusable time window are dropped, the rest are sorted
    /// by start time. Overlapping windows are rejected.
    pub fn new(
        title: impl Into<String>,
        audio_source: AudioSource,
        segments: Vec<Segment>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        let total = segments.len();
        let mut segments: Vec<Segment> = segments
            .into_iter()
            .filter(|s| s.has_valid_window())
            .collect();
        if segments.len() < total {
            log::warn!(
                "Dropped {} segment(s) with an invalid time window from '{title}'",
                total - segments.len()
            );
        }

        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        for (index, pair) in segments.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.start + OVERLAP_TOLERANCE < previous.end {
                return Err(LessonError::Overlapping {
                    index: index + 1,
                    start: current.start,
                    end: current.end,
                    previous_end: previous.end,
                });
            }
        }

        if segments.is_empty() {
            return Err(LessonError::NoSegments);
        }

        Ok(Self {
            title,
            audio_source,
            segments,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn audio_source(&self) -> &AudioSource {
        &self.audio_source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a constructed lesson; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.segments.len()
    }
}
