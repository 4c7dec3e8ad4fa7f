pub mod dictation;
pub mod lesson;
pub mod playback;
pub mod session;
pub mod shared;
