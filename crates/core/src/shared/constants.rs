pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";
pub const WORD_UPLOAD_PATH: &str = "/upload";
pub const UNSEGMENTED_UPLOAD_PATH: &str = "/upload-china";

/// Multipart field name the segmentation service reads the audio from.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Segmentation runs speech recognition server-side, which is slow for long files.
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 100;

pub const ENGLISH_PUNCTUATION: &[char] = &['.', ',', '!', '?'];
pub const UNSEGMENTED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', '\u{FF0C}', '\u{3002}', '\u{FF01}', '\u{FF1F}', '\u{3001}', '\u{FF1B}',
    '\u{FF1A}',
];

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac"];
pub const LESSON_FILE_EXTENSION: &str = "json";
