pub mod media_player;
pub mod playback_window;
pub mod segment_playback_controller;
