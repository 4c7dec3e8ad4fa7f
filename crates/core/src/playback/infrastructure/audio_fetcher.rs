use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::lesson::domain::lesson::AudioSource;

#[derive(Error, Debug)]
pub enum AudioFetchError {
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("audio server returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read audio file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(bytes_received, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Load the encoded lesson audio into memory.
pub fn fetch_audio(
    source: &AudioSource,
    progress: Option<ProgressFn>,
) -> Result<Vec<u8>, AudioFetchError> {
    match source {
        AudioSource::File(path) => fs::read(path).map_err(|e| AudioFetchError::Read {
            path: path.clone(),
            source: e,
        }),
        AudioSource::Url(url) => download(url, progress),
    }
}

fn download(url: &str, progress: Option<ProgressFn>) -> Result<Vec<u8>, AudioFetchError> {
    log::info!("Fetching lesson audio from {url}");
    let response = reqwest::blocking::get(url).map_err(|e| AudioFetchError::Download {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AudioFetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| AudioFetchError::Download {
        url: url.to_string(),
        source: e,
    })?;

    if let Some(cb) = progress {
        cb(bytes.len() as u64, total);
    }
    Ok(bytes.to_vec())
}
