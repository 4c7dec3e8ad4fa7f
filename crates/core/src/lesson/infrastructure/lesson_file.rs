use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::lesson::domain::lesson::{AudioSource, Lesson, LessonError};
use crate::lesson::domain::segment::Segment;

#[derive(Error, Debug)]
pub enum LessonFileError {
    #[error("failed to read lesson file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lesson file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("lesson file {path} is unusable: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: LessonError,
    },
}

#[derive(Deserialize)]
struct LessonFile {
    title: Option<String>,
    audio: String,
    segments: Vec<Segment>,
}

/// Read a prepared lesson from JSON.
///
/// The file has the segmentation response shape plus an optional `title`.
/// A relative `audio` path resolves against the lesson file's directory; a
/// leading `/` is treated as relative too, matching how web fixtures are written.
pub fn read_lesson_file(path: &Path) -> Result<Lesson, LessonFileError> {
    let json = fs::read_to_string(path).map_err(|e| LessonFileError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: LessonFile = serde_json::from_str(&json).map_err(|e| LessonFileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let title = file.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    });
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let source = resolve_audio(&file.audio, base_dir);

    Lesson::new(title, source, file.segments).map_err(|e| LessonFileError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })
}

fn resolve_audio(audio: &str, base_dir: &Path) -> AudioSource {
    if audio.starts_with("http://") || audio.starts_with("https://") {
        AudioSource::Url(audio.to_string())
    } else {
        AudioSource::File(base_dir.join(audio.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_lesson_file_resolves_relative_audio() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "lesson1.json",
            r#"{
                "title": "Lesson 1",
                "audio": "/audio/lesson1.mp3",
                "segments": [
                    {"start": 0.0, "end": 1.5, "transcript": "At home."},
                    {"start": 1.5, "end": 3.0, "transcript": "One."}
                ]
            }"#,
        );
        let lesson = read_lesson_file(&path).unwrap();
        assert_eq!(lesson.title(), "Lesson 1");
        assert_eq!(
            lesson.audio_source(),
            &AudioSource::File(tmp.path().join("audio/lesson1.mp3"))
        );
        assert_eq!(lesson.len(), 2);
    }

    #[test]
    fn test_read_lesson_file_defaults_title_to_stem() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "daily.json",
            r#"{"audio": "https://example.com/a.mp3",
                "segments": [{"start": 0.0, "end": 1.0, "transcript": "Hi."}]}"#,
        );
        let lesson = read_lesson_file(&path).unwrap();
        assert_eq!(lesson.title(), "daily");
        assert_eq!(
            lesson.audio_source(),
            &AudioSource::Url("https://example.com/a.mp3".to_string())
        );
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_lesson_file(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LessonFileError::Read { .. }));
    }

    #[test]
    fn test_read_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "bad.json", r#"{"segments": []}"#);
        let err = read_lesson_file(&path).unwrap_err();
        assert!(matches!(err, LessonFileError::Parse { .. }));
    }

    #[test]
    fn test_read_file_without_segments_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "empty.json", r#"{"audio": "a.mp3", "segments": []}"#);
        let err = read_lesson_file(&path).unwrap_err();
        assert!(matches!(
            err,
            LessonFileError::Invalid {
                source: LessonError::NoSegments,
                ..
            }
        ));
    }
}
