//! Virtual-clock replay of a key tape.
//!
//! Time only moves through `wait`, `type` and `settle` steps. Whenever it
//! moves, pending frames are delivered every `frame_ms` and each one is
//! written as a `frame` record, so a trace is fully deterministic.

use std::io::{self, Write};
use std::time::Duration;

use keynav_core::config::{ConfigError, NavConfig};
use keynav_core::dispatcher::{Dispatcher, KeyOutcome};
use keynav_core::event::{KeyCode, KeyEvent, KeyEventKind};
use serde::Serialize;
use web_time::Instant;

use crate::script::{MAX_WAIT_MS, Step};
use crate::sim::{ClampedOffset, FrameFlag, PageEvent, SimPage};

/// Gap between characters of a `type` step.
pub const TYPE_GAP_MS: u64 = 30;

/// Upper bound on frames run by one `settle` step.
pub const MAX_SETTLE_FRAMES: u32 = 10_000;

/// Page and clock parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    pub frame_ms: u64,
    pub viewport: f64,
    pub document: f64,
    pub scroll_width: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            viewport: 800.0,
            document: 4000.0,
            scroll_width: 1000.0,
        }
    }
}

#[derive(Serialize)]
struct Record<E> {
    t_ms: u64,
    #[serde(flatten)]
    event: E,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum DriverEvent {
    Key {
        key: String,
        phase: &'static str,
        editable: bool,
        outcome: &'static str,
    },
    Frame {
        x: f64,
        y: f64,
        animating: bool,
    },
}

fn outcome_name(outcome: KeyOutcome) -> &'static str {
    match outcome {
        KeyOutcome::Ignored => "ignored",
        KeyOutcome::Handled => "handled",
        KeyOutcome::Suppressed => "suppressed",
    }
}

/// Dispatcher, simulated page and virtual clock.
pub struct Replay<W: Write> {
    dispatcher: Dispatcher<SimPage>,
    scroll_x: ClampedOffset,
    scroll_y: ClampedOffset,
    frame: FrameFlag,
    base: Instant,
    t_ms: u64,
    frame_ms: u64,
    out: W,
}

impl<W: Write> Replay<W> {
    pub fn new(config: NavConfig, options: ReplayOptions, out: W) -> Result<Self, ConfigError> {
        let scroll_x = ClampedOffset::default();
        scroll_x.set_max(options.scroll_width);
        let scroll_y = ClampedOffset::default();
        let page = SimPage::new(options.viewport, options.document, scroll_y.clone());
        let frame = FrameFlag::default();
        let dispatcher = Dispatcher::new(
            config,
            page,
            scroll_y.clone(),
            scroll_x.clone(),
            frame.clone(),
        )?;
        Ok(Self {
            dispatcher,
            scroll_x,
            scroll_y,
            frame,
            base: Instant::now(),
            t_ms: 0,
            frame_ms: options.frame_ms.max(1),
            out,
        })
    }

    pub fn run(&mut self, steps: &[Step]) -> io::Result<()> {
        for step in steps {
            self.step(step)?;
        }
        Ok(())
    }

    pub fn step(&mut self, step: &Step) -> io::Result<()> {
        match step {
            Step::Viewport(v) => self.dispatcher.host_mut().set_viewport(*v),
            Step::Document(v) => self.dispatcher.host_mut().set_document(*v),
            Step::Target(kind) => self.dispatcher.host_mut().add_target(kind.clone()),
            Step::Down(code) => self.key(KeyEvent::new(*code), false)?,
            Step::Up(code) => self.key(KeyEvent::new(*code).with_kind(KeyEventKind::Release), false)?,
            Step::Press(code) => self.press(*code)?,
            Step::Type(codes) => {
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        self.wait(TYPE_GAP_MS)?;
                    }
                    self.press(*code)?;
                }
            }
            Step::Edit(code) => self.key(KeyEvent::new(*code), true)?,
            Step::Wait(ms) => self.wait(*ms)?,
            Step::Settle => self.settle()?,
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Current scroll offsets `(x, y)`.
    pub fn offsets(&self) -> (f64, f64) {
        (self.scroll_x.get(), self.scroll_y.get())
    }

    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.t_ms)
    }

    fn press(&mut self, code: KeyCode) -> io::Result<()> {
        self.key(KeyEvent::new(code), false)?;
        self.key(KeyEvent::new(code).with_kind(KeyEventKind::Release), false)
    }

    fn key(&mut self, event: KeyEvent, editable: bool) -> io::Result<()> {
        let outcome = if event.kind == KeyEventKind::Release {
            self.dispatcher.handle_key_up(&event)
        } else {
            self.dispatcher.handle_key_down(&event, editable, self.now())
        };
        // Releases that nothing cares about would only add noise.
        if event.kind != KeyEventKind::Release || outcome.is_handled() {
            self.emit(DriverEvent::Key {
                key: event.code.to_string(),
                phase: if event.kind == KeyEventKind::Release { "up" } else { "down" },
                editable,
                outcome: outcome_name(outcome),
            })?;
        }
        self.flush_page_events()
    }

    /// Advance the clock by `ms`, capped at [`MAX_WAIT_MS`]. Once no frame
    /// is pending the clock jumps straight to the end.
    fn wait(&mut self, ms: u64) -> io::Result<()> {
        let end = self.t_ms.saturating_add(ms.min(MAX_WAIT_MS));
        while self.t_ms < end {
            if !self.frame.is_pending() {
                self.t_ms = end;
                break;
            }
            self.t_ms = self.t_ms.saturating_add(self.frame_ms).min(end);
            self.deliver_frame()?;
        }
        Ok(())
    }

    fn settle(&mut self) -> io::Result<()> {
        let mut budget = MAX_SETTLE_FRAMES;
        while self.dispatcher.is_animating() {
            if budget == 0 {
                tracing::warn!(
                    frames = MAX_SETTLE_FRAMES,
                    "scroll did not settle; is a key still held?"
                );
                break;
            }
            budget -= 1;
            self.t_ms = self.t_ms.saturating_add(self.frame_ms);
            self.deliver_frame()?;
        }
        Ok(())
    }

    fn deliver_frame(&mut self) -> io::Result<()> {
        if !self.frame.take() {
            return Ok(());
        }
        let animating = self.dispatcher.on_frame(self.now());
        let (x, y) = self.offsets();
        self.emit(DriverEvent::Frame { x, y, animating })
    }

    fn flush_page_events(&mut self) -> io::Result<()> {
        let events: Vec<PageEvent> = self.dispatcher.host_mut().drain_events().collect();
        for event in events {
            self.emit(event)?;
        }
        Ok(())
    }

    fn emit<E: Serialize>(&mut self, event: E) -> io::Result<()> {
        let record = Record {
            t_ms: self.t_ms,
            event,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")
    }
}
