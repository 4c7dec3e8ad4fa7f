use std::path::Path;

use super::lesson::Lesson;

/// Domain interface for the external audio segmentation service.
///
/// Implementations upload one audio file and turn the response into a fully
/// validated `Lesson`. A failed call must not yield a partial lesson.
pub trait SegmentationService: Send {
    fn segment(&self, audio_path: &Path) -> Result<Lesson, Box<dyn std::error::Error>>;
}
