pub mod audio_fetcher;
pub mod rodio_media_player;
pub mod simulated_media_player;
