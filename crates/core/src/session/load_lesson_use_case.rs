use std::path::Path;

use crate::lesson::domain::lesson::Lesson;
use crate::lesson::domain::segmentation_service::SegmentationService;

/// Turns an audio file into a lesson through the segmentation service.
///
/// Produces a new `Lesson` or an error; it never touches a session, so a
/// failed upload leaves the current lesson usable.
pub struct LoadLessonUseCase {
    service: Box<dyn SegmentationService>,
}

impl LoadLessonUseCase {
    pub fn new(service: Box<dyn SegmentationService>) -> Self {
        Self { service }
    }

    pub fn execute(&self, audio_path: &Path) -> Result<Lesson, Box<dyn std::error::Error>> {
        if !audio_path.is_file() {
            return Err(format!("Audio file not found: {}", audio_path.display()).into());
        }

        log::info!("Uploading {} for segmentation", audio_path.display());
        let lesson = self.service.segment(audio_path)?;
        log::info!(
            "Loaded \"{}\" with {} segments",
            lesson.title(),
            lesson.len()
        );
        Ok(lesson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::domain::lesson::AudioSource;
    use crate::lesson::domain::segment::Segment;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubService {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl SegmentationService for StubService {
        fn segment(&self, audio_path: &Path) -> Result<Lesson, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("upload failed".into());
            }
            Ok(Lesson::new(
                "stub",
                AudioSource::File(audio_path.to_path_buf()),
                vec![
                    Segment::new(0.0, 1.5, "Hello there."),
                    Segment::new(1.5, 3.0, "General Kenobi."),
                ],
            )?)
        }
    }

    fn use_case(fail: bool) -> (LoadLessonUseCase, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = StubService {
            calls: Arc::clone(&calls),
            fail,
        };
        (LoadLessonUseCase::new(Box::new(service)), calls)
    }

    #[test]
    fn test_returns_lesson_from_service() {
        let tmp = TempDir::new().unwrap();
        let audio = tmp.path().join("a.mp3");
        std::fs::write(&audio, b"x").unwrap();
        let (uc, calls) = use_case(false);

        let lesson = uc.execute(&audio).unwrap();

        assert_eq!(lesson.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_file_skips_service() {
        let tmp = TempDir::new().unwrap();
        let (uc, calls) = use_case(false);

        let err = uc.execute(&tmp.path().join("missing.mp3")).unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_service_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let audio = tmp.path().join("a.mp3");
        std::fs::write(&audio, b"x").unwrap();
        let (uc, _) = use_case(true);

        assert_eq!(uc.execute(&audio).unwrap_err().to_string(), "upload failed");
    }
}
