use crate::lesson::domain::segment::Segment;

/// The `[start, end)` slice of the lesson audio a segment plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackWindow {
    pub start: f64,
    pub end: f64,
}

impl PlaybackWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn is_past_end(&self, position: f64) -> bool {
        position >= self.end
    }
}

impl From<&Segment> for PlaybackWindow {
    fn from(segment: &Segment) -> Self {
        Self::new(segment.start, segment.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_end_is_exclusive() {
        let w = PlaybackWindow::new(1.5, 3.0);
        assert!(w.is_past_end(3.0));
        assert!(!w.is_past_end(2.99));
        assert!(!w.is_past_end(1.0));
    }

    #[test]
    fn test_from_segment() {
        let seg = Segment::new(5.0, 6.5, "She is in the living room.");
        assert_eq!(PlaybackWindow::from(&seg), PlaybackWindow::new(5.0, 6.5));
    }
}
