use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lesson::domain::lesson::{AudioSource, Lesson, LessonError};
use crate::lesson::domain::segment::Segment;
use crate::lesson::domain::segmentation_service::SegmentationService;
use crate::shared::constants::{
    DEFAULT_SERVICE_TIMEOUT_SECS, DEFAULT_SERVICE_URL, UPLOAD_FIELD_NAME, WORD_UPLOAD_PATH,
};

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("failed to read audio file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upload to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("segmentation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed segmentation response: {0}")]
    MalformedResponse(String),
    #[error("segmentation service returned an unusable lesson: {0}")]
    InvalidLesson(#[from] LessonError),
}

/// Where the segmentation service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub upload_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_SERVICE_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            upload_path: WORD_UPLOAD_PATH.to_string(),
            timeout_secs: DEFAULT_SERVICE_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, upload_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().to_string(),
            upload_path: upload_path.into(),
            timeout_secs: DEFAULT_SERVICE_TIMEOUT_SECS,
        }
    }

    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    /// Resolve the audio locator returned by the service against the base URL.
    ///
    /// A `t` query parameter is appended so a re-upload under the same server
    /// file name is never served from a stale cache.
    pub fn resolve_audio_url(&self, audio: &str, cache_buster: u128) -> String {
        let url = if audio.starts_with("http://") || audio.starts_with("https://") {
            audio.to_string()
        } else {
            join_url(&self.base_url, audio)
        };
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}t={cache_buster}")
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

#[derive(Deserialize)]
struct UploadResponse {
    audio: Option<String>,
    segments: Option<Vec<Segment>>,
    error: Option<String>,
}

/// Uploads audio to the segmentation service over HTTP (multipart POST).
pub struct HttpSegmentationClient {
    config: ServiceConfig,
    client: reqwest::blocking::Client,
}

impl HttpSegmentationClient {
    pub fn new(config: ServiceConfig) -> Result<Self, SegmentationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SegmentationError::Client)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn upload(&self, audio_path: &Path) -> Result<Lesson, SegmentationError> {
        let bytes = fs::read(audio_path).map_err(|e| SegmentationError::Io {
            path: audio_path.to_path_buf(),
            source: e,
        })?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let url = self.config.upload_url();
        log::info!("Uploading {file_name} ({} bytes) to {url}", bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime_for(audio_path))
            .map_err(|e| SegmentationError::Http {
                url: url.clone(),
                source: e,
            })?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| SegmentationError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| SegmentationError::Http {
            url: url.clone(),
            source: e,
        })?;
        if !status.is_success() {
            return Err(SegmentationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let lesson = parse_upload_response(&body, &file_name, &self.config, cache_buster())?;
        log::info!("Received {} segments for {file_name}", lesson.len());
        Ok(lesson)
    }
}

impl SegmentationService for HttpSegmentationClient {
    fn segment(&self, audio_path: &Path) -> Result<Lesson, Box<dyn std::error::Error>> {
        Ok(self.upload(audio_path)?)
    }
}

/// Turn a service response body into a lesson titled after the uploaded file.
///
/// Both `audio` and `segments` must be present; anything else is malformed.
pub fn parse_upload_response(
    body: &str,
    title: &str,
    config: &ServiceConfig,
    cache_buster: u128,
) -> Result<Lesson, SegmentationError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| SegmentationError::MalformedResponse(e.to_string()))?;

    let (audio, segments) = match (response.audio, response.segments) {
        (Some(audio), Some(segments)) => (audio, segments),
        _ => {
            let reason = response
                .error
                .unwrap_or_else(|| "missing 'audio' or 'segments'".to_string());
            return Err(SegmentationError::MalformedResponse(reason));
        }
    };

    let source = AudioSource::Url(config.resolve_audio_url(&audio, cache_buster));
    Ok(Lesson::new(title, source, segments)?)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
