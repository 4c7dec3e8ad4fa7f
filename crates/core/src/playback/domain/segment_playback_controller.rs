use std::time::Duration;

use super::media_player::MediaPlayer;
use super::playback_window::PlaybackWindow;
use crate::dictation::domain::dictation_event::DictationEvent;
use crate::shared::constants::{MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

/// What the active boundary check does when playback reaches the window end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Loop back if looping is enabled, otherwise pause.
    Window,
    /// Manual single play; restores looping afterwards if it still applies.
    OneShot,
}

/// Owned handle for the boundary check driven by `tick`/`observe_position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollHandle {
    id: u64,
    mode: PollMode,
}

/// Keeps the audio inside the current segment window and repeats it.
///
/// Owns the player exclusively. At most one poll handle is live at a time;
/// every transition cancels the previous one before arming a new one.
pub struct SegmentPlaybackController {
    player: Box<dyn MediaPlayer>,
    window: Option<PlaybackWindow>,
    loop_enabled: bool,
    segment_completed: bool,
    poll: Option<PollHandle>,
    next_poll_id: u64,
    poll_interval: Duration,
    entry_pending: bool,
}

impl SegmentPlaybackController {
    pub fn new(player: Box<dyn MediaPlayer>, loop_enabled: bool, poll_interval: Duration) -> Self {
        let ms = (poll_interval.as_millis() as u64).clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        Self {
            player,
            window: None,
            loop_enabled,
            segment_completed: false,
            poll: None,
            next_poll_id: 0,
            poll_interval: Duration::from_millis(ms),
            entry_pending: false,
        }
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub fn poll_mode(&self) -> Option<PollMode> {
        self.poll.map(|h| h.mode)
    }

    pub fn window(&self) -> Option<PlaybackWindow> {
        self.window
    }

    pub fn player(&self) -> &dyn MediaPlayer {
        self.player.as_ref()
    }

    pub fn on_event(&mut self, event: &DictationEvent) {
        match *event {
            DictationEvent::SegmentChanged {
                start,
                end,
                completed,
                ..
            } => self.enter_segment(PlaybackWindow::new(start, end), completed),
            DictationEvent::SegmentCompleted { .. } | DictationEvent::LessonCompleted => {
                self.mark_completed()
            }
        }
    }

    /// Switch to a new window and, unless it is already complete, play it
    /// from the start.
    pub fn enter_segment(&mut self, window: PlaybackWindow, completed: bool) {
        self.cancel_poll();
        self.window = Some(window);
        self.segment_completed = completed;
        self.entry_pending = false;

        if completed {
            self.player.pause();
            return;
        }
        self.start_from_window_start(PollMode::Window);
    }

    /// Force pause; no further auto-loop for this segment.
    pub fn mark_completed(&mut self) {
        self.segment_completed = true;
        self.entry_pending = false;
        self.cancel_poll();
        self.player.pause();
    }

    /// Play `[start, end)` once regardless of the loop flag.
    pub fn play_current(&mut self) {
        self.cancel_poll();
        self.start_from_window_start(PollMode::OneShot);
    }

    /// Stop playback and the boundary check. The loop flag is kept.
    pub fn pause(&mut self) {
        self.cancel_poll();
        self.entry_pending = false;
        self.player.pause();
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        if self.loop_enabled == enabled {
            return;
        }
        self.loop_enabled = enabled;
        log::debug!("Loop {}", if enabled { "enabled" } else { "disabled" });

        // Turning looping off lets the current pass finish; the live handle
        // reads the flag and pauses at the window end.
        if enabled && !self.segment_completed {
            self.cancel_poll();
            self.start_from_window_start(PollMode::Window);
        }
    }

    /// The media became usable; replay an entry that was absorbed earlier.
    pub fn media_ready(&mut self) {
        if !self.entry_pending || self.segment_completed {
            return;
        }
        log::debug!("Media ready, entering pending segment");
        self.entry_pending = false;
        self.cancel_poll();
        self.start_from_window_start(PollMode::Window);
    }

    /// Pull the player position and run one boundary check.
    pub fn tick(&mut self) {
        if self.poll.is_none() || !self.player.is_ready() {
            return;
        }
        if let Some(position) = self.player.position() {
            self.observe_position(position);
        }
    }

    /// Boundary check for a pushed time-update notification.
    pub fn observe_position(&mut self, position: f64) {
        let (Some(handle), Some(window)) = (self.poll, self.window) else {
            return;
        };
        if !window.is_past_end(position) {
            return;
        }

        let keep_looping = self.loop_enabled && !self.segment_completed;
        match handle.mode {
            PollMode::Window if keep_looping => {
                self.player.seek(window.start);
                self.player.play();
            }
            PollMode::OneShot if keep_looping => {
                log::debug!("One-shot play finished, resuming loop");
                self.cancel_poll();
                self.start_from_window_start(PollMode::Window);
            }
            PollMode::Window | PollMode::OneShot => {
                self.cancel_poll();
                self.player.pause();
                self.player.seek(window.end);
            }
        }
    }

    fn start_from_window_start(&mut self, mode: PollMode) {
        let Some(window) = self.window else {
            return;
        };
        if !self.player.is_ready() {
            log::debug!("Media not ready, playback request absorbed");
            self.entry_pending = true;
            return;
        }
        debug_assert!(self.poll.is_none());
        self.player.seek(window.start);
        self.player.play();
        self.poll = Some(PollHandle {
            id: self.next_poll_id,
            mode,
        });
        log::trace!("Armed poll {} ({mode:?})", self.next_poll_id);
        self.next_poll_id += 1;
    }

    fn cancel_poll(&mut self) {
        if let Some(handle) = self.poll.take() {
            log::trace!("Cancelled poll {}", handle.id);
        }
    }
}

impl Drop for SegmentPlaybackController {
    fn drop(&mut self) {
        self.cancel_poll();
        self.player.pause();
    }
}
