#![forbid(unsafe_code)]

//! Keyboard-driven navigation for scrollable documents.
//!
//! Hosts translate native key events into [`event::KeyEvent`], feed them to
//! a [`dispatcher::Dispatcher`], and forward their frame callbacks to
//! [`dispatcher::Dispatcher::on_frame`]. Scroll offsets, hint overlays and
//! element activation flow back out through the [`scroll_axis::ScrollPort`]
//! and [`dispatcher::Host`] traits.

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod frame_scheduler;
pub mod hint_labels;
pub mod hint_session;
pub mod key_sequence;
pub mod scroll_axis;

pub use config::{AxisConfig, ConfigError, HintAlphabet, NavConfig};
pub use dispatcher::{Dispatcher, Host, KeyOutcome};
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
