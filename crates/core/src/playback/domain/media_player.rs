/// Domain interface for the single audio element a lesson plays through.
///
/// Positions are seconds from the start of the lesson audio. Implementations
/// must tolerate every call before the media is ready; callers check
/// `is_ready` but a late or racing call must still be harmless.
pub trait MediaPlayer {
    /// True once the source is loaded and seekable.
    fn is_ready(&self) -> bool;

    /// Total length when known.
    fn duration(&self) -> Option<f64>;

    /// Current position, or `None` while not ready.
    fn position(&self) -> Option<f64>;

    fn is_playing(&self) -> bool;

    fn seek(&mut self, position: f64);

    fn play(&mut self);

    fn pause(&mut self);
}
