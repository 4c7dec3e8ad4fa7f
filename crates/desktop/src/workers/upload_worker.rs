use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use dictation_core::lesson::domain::lesson::Lesson;
use dictation_core::lesson::infrastructure::http_segmentation_client::{
    HttpSegmentationClient, ServiceConfig,
};
use dictation_core::lesson::infrastructure::lesson_file::read_lesson_file;
use dictation_core::playback::infrastructure::audio_fetcher::fetch_audio;
use dictation_core::session::load_lesson_use_case::LoadLessonUseCase;
use dictation_core::shared::constants::LESSON_FILE_EXTENSION;

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum UploadMessage {
    Status(String),
    DownloadProgress(u64, u64),
    /// `audio` is `None` when the lesson loaded but its audio could not be
    /// fetched; the UI falls back to silent playback.
    Loaded {
        lesson: Lesson,
        audio: Option<Vec<u8>>,
    },
    Error(String),
}

/// Parameters for an upload job.
pub struct UploadParams {
    pub input_path: PathBuf,
    pub service: ServiceConfig,
}

fn is_lesson_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(LESSON_FILE_EXTENSION))
        .unwrap_or(false)
}

/// Spawn a background upload. Returns the channel receiver.
pub fn spawn(params: UploadParams) -> Receiver<UploadMessage> {
    let (tx, rx) = crossbeam_channel::unbounded::<UploadMessage>();

    thread::spawn(move || {
        if let Err(e) = run_upload(&tx, &params) {
            log::warn!("Upload failed: {e}");
            let _ = tx.send(UploadMessage::Error(e.to_string()));
        }
    });

    rx
}

fn run_upload(
    tx: &Sender<UploadMessage>,
    params: &UploadParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = &params.input_path;

    let lesson = if is_lesson_file(input) {
        let _ = tx.send(UploadMessage::Status("Opening lesson...".into()));
        read_lesson_file(input)?
    } else {
        let _ = tx.send(UploadMessage::Status(
            "Uploading and splitting into sentences...".into(),
        ));
        let client = HttpSegmentationClient::new(params.service.clone())?;
        LoadLessonUseCase::new(Box::new(client)).execute(input)?
    };

    let _ = tx.send(UploadMessage::Status("Fetching audio...".into()));
    let tx_dl = tx.clone();
    let audio = match fetch_audio(
        lesson.audio_source(),
        Some(Box::new(move |received, total| {
            let _ = tx_dl.send(UploadMessage::DownloadProgress(received, total));
        })),
    ) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    };

    let _ = tx.send(UploadMessage::Loaded { lesson, audio });
    Ok(())
}
