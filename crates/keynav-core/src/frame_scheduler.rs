#![forbid(unsafe_code)]

//! Cooperative frame loop.
//!
//! The host owns frame pacing (e.g. `requestAnimationFrame`); the scheduler
//! only decides whether another frame is wanted. Callbacks receive the time
//! since the previous frame and return `true` while they still need frames.
//!
//! # Lifecycle
//!
//! ```text
//! stopped --start()--> running --on_frame(), any callback true--> running
//!                        |
//!                        +------on_frame(), all callbacks false--> stopped
//! ```
//!
//! # Invariants
//!
//! 1. At most one frame request is outstanding: `start()` while running does
//!    not request another frame.
//! 2. Every registered callback runs on every frame (no short-circuit), so
//!    each axis integrates the same delta.
//! 3. The first frame of a run reports the nominal first-frame delta
//!    (16ms by default); later frames report wall-clock deltas.
//! 4. Stopping clears the previous timestamp, so a restart never reports the
//!    idle gap as one huge delta.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

/// Host primitive that delivers exactly one [`FrameScheduler::on_frame`]
/// call before the next paint.
pub trait FramePacer {
    /// Ask the host for one frame callback.
    fn request_frame(&mut self);
}

/// Per-frame callback. Returns whether it needs another frame.
pub type FrameCallback = Box<dyn FnMut(Duration) -> bool>;

/// Drives registered callbacks once per host frame while any is active.
pub struct FrameScheduler {
    pacer: Box<dyn FramePacer>,
    callbacks: Vec<FrameCallback>,
    running: bool,
    last_frame: Option<Instant>,
    first_frame_delta: Duration,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("callbacks", &self.callbacks.len())
            .field("running", &self.running)
            .field("has_last_frame", &self.last_frame.is_some())
            .finish()
    }
}

impl FrameScheduler {
    /// Nominal delta for the first frame of a run.
    pub const DEFAULT_FIRST_FRAME_DELTA: Duration = Duration::from_millis(16);

    /// Create a stopped scheduler that requests frames from `pacer`.
    #[must_use]
    pub fn new(pacer: impl FramePacer + 'static) -> Self {
        Self {
            pacer: Box::new(pacer),
            callbacks: Vec::new(),
            running: false,
            last_frame: None,
            first_frame_delta: Self::DEFAULT_FIRST_FRAME_DELTA,
        }
    }

    /// Override the delta reported for the first frame of a run.
    #[must_use]
    pub fn with_first_frame_delta(mut self, delta: Duration) -> Self {
        self.first_frame_delta = delta;
        self
    }

    /// Add a per-frame callback.
    pub fn register(&mut self, callback: impl FnMut(Duration) -> bool + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Start the loop. A no-op while already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_frame = None;
        tracing::trace!(callbacks = self.callbacks.len(), "frame loop started");
        self.pacer.request_frame();
    }

    /// Host frame callback.
    ///
    /// Runs every callback with the frame delta and requests the next frame
    /// if any of them is still active. Returns whether the loop is still
    /// running afterwards. Frames delivered while stopped are ignored.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let delta = match self.last_frame {
            Some(last) => now.saturating_duration_since(last),
            None => self.first_frame_delta,
        };
        self.last_frame = Some(now);

        let mut active = false;
        for callback in &mut self.callbacks {
            active |= callback(delta);
        }

        if active {
            self.pacer.request_frame();
        } else {
            self.running = false;
            self.last_frame = None;
            tracing::trace!("frame loop stopped");
        }
        active
    }

    /// Whether a frame is outstanding.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}
