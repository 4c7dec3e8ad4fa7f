use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::playback::domain::media_player::MediaPlayer;

/// Source of elapsed seconds for the simulated player.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock, for silent headless sessions.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug)]
struct PlayerState {
    ready: bool,
    duration: f64,
    /// Position at the last seek/play/pause.
    anchor: f64,
    /// Clock time playback (re)started, while playing.
    started_at: Option<f64>,
    seeks: usize,
}

impl PlayerState {
    fn position(&self, now: f64) -> f64 {
        match self.started_at {
            Some(t0) => (self.anchor + (now - t0)).min(self.duration),
            None => self.anchor,
        }
    }
}

/// A silent player whose position follows a clock.
pub struct SimulatedMediaPlayer<C: Clock> {
    state: Rc<RefCell<PlayerState>>,
    clock: Rc<C>,
}

impl<C: Clock> SimulatedMediaPlayer<C> {
    pub fn new(duration: f64, clock: C) -> Self {
        Self {
            state: Rc::new(RefCell::new(PlayerState {
                ready: true,
                duration: duration.max(0.0),
                anchor: 0.0,
                started_at: None,
                seeks: 0,
            })),
            clock: Rc::new(clock),
        }
    }

    /// Shared view of the player state, usable after the player is boxed.
    pub fn handle(&self) -> SimulatedPlayerHandle
    where
        C: 'static,
    {
        let clock = Rc::clone(&self.clock);
        SimulatedPlayerHandle {
            state: Rc::clone(&self.state),
            now: Rc::new(move || clock.now()),
        }
    }
}

impl<C: Clock> MediaPlayer for SimulatedMediaPlayer<C> {
    fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    fn duration(&self) -> Option<f64> {
        let state = self.state.borrow();
        state.ready.then_some(state.duration)
    }

    fn position(&self) -> Option<f64> {
        let state = self.state.borrow();
        state.ready.then(|| state.position(self.clock.now()))
    }

    fn is_playing(&self) -> bool {
        let state = self.state.borrow();
        state.started_at.is_some() && state.position(self.clock.now()) < state.duration
    }

    fn seek(&mut self, position: f64) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        if !state.ready {
            return;
        }
        state.anchor = position.clamp(0.0, state.duration);
        if state.started_at.is_some() {
            state.started_at = Some(now);
        }
        state.seeks += 1;
    }

    fn play(&mut self) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        if state.ready && state.started_at.is_none() {
            state.started_at = Some(now);
        }
    }

    fn pause(&mut self) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        state.anchor = state.position(now);
        state.started_at = None;
    }
}

/// Inspection and control handle for a [`SimulatedMediaPlayer`].
#[derive(Clone)]
pub struct SimulatedPlayerHandle {
    state: Rc<RefCell<PlayerState>>,
    now: Rc<dyn Fn() -> f64>,
}

impl SimulatedPlayerHandle {
    pub fn position(&self) -> f64 {
        self.state.borrow().position((self.now)())
    }

    pub fn is_playing(&self) -> bool {
        let state = self.state.borrow();
        state.started_at.is_some() && state.position((self.now)()) < state.duration
    }

    pub fn seek_count(&self) -> usize {
        self.state.borrow().seeks
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.borrow_mut().ready = ready;
    }
}
