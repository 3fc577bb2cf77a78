#![forbid(unsafe_code)]

//! Top-level key routing.
//!
//! The [`Dispatcher`] owns both scroll axes, the frame scheduler, the
//! sequence recognizer, the single-key command table, the hint session and
//! the help-overlay flag. Hosts feed it key events and frame callbacks; it
//! talks back through the [`Host`] trait and the two [`ScrollPort`]s.
//!
//! # Key-down precedence (highest first)
//!
//! 1. Event target is text-editable: only `Escape` is honored (blur);
//!    everything else belongs to the field.
//! 2. The help key toggles the help overlay, even while it is showing.
//! 3. While help is showing, `Escape` dismisses it and nothing else runs.
//! 4. An active hint session gets the key first; consumed keys are
//!    [`KeyOutcome::Suppressed`].
//! 5. `f` / `F` open a hint session (in place / new tab).
//! 6. The sequence recognizer; pending or matched keys stop here.
//! 7. The single-key command table.
//! 8. The hold keys `j`/`k` (vertical) and `h`/`l` (horizontal).
//!
//! Keys carrying Ctrl, Alt or Super never toggle help and stop after rule 4,
//! so browser shortcuts such as Ctrl+F keep working while an open hint
//! session still sees every key.
//!
//! # Threading
//!
//! Single-threaded. The axes are shared with the scheduler callbacks through
//! `Rc<RefCell<_>>`; no borrow is held across a call into the scheduler.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use web_time::Instant;

use crate::commands::{
    self, COMMAND_DEFINITIONS, CommandDefinition, HELP_KEY, HINT_KEY, HINT_NEW_TAB_KEY,
    NavCommand,
};
use crate::config::{ConfigError, NavConfig};
use crate::event::{KeyCode, KeyEvent, KeyEventKind};
use crate::frame_scheduler::{FramePacer, FrameScheduler};
use crate::hint_session::{
    Activation, HintKeyOutcome, HintSession, HintTarget, Resolution, VisibleHint,
};
use crate::key_sequence::{KeySequence, SequenceOutcome, SequenceRecognizer};
use crate::scroll_axis::{Axis, Direction, ScrollAxis, ScrollPort};

/// Document and element operations supplied by the host.
pub trait Host {
    /// Opaque element handle used by hint targets.
    type Target;

    /// Height of the visible viewport.
    fn viewport_extent(&self) -> f64;

    /// Full scrollable height of the document.
    fn document_extent(&self) -> f64;

    /// Visible, activatable elements in document order.
    fn discover_targets(&mut self) -> Vec<HintTarget<Self::Target>>;

    /// Direct activation (synthetic primary click).
    fn activate(&mut self, target: &Self::Target);

    /// Give input focus.
    fn focus(&mut self, target: &Self::Target);

    /// Open `destination` in a new browsing context.
    fn open_in_new_context(&mut self, destination: &str);

    /// Remove focus from the focused editable element.
    fn blur_editable(&mut self);

    /// The set of matching hint labels changed; redraw the overlay.
    fn hints_changed(&mut self, _hints: &[VisibleHint<'_, Self::Target>]) {}

    /// The hint session ended; remove the overlay.
    fn hints_closed(&mut self) {}

    /// Show or hide the help overlay.
    fn help_visibility_changed(&mut self, _visible: bool) {}
}

/// What the host should do with a key event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOutcome {
    /// Not ours; default handling proceeds.
    Ignored,
    /// Handled; default handling may still proceed.
    Handled,
    /// Handled; the host must prevent default handling.
    Suppressed,
}

impl KeyOutcome {
    /// True unless [`Ignored`](Self::Ignored).
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// True for [`Suppressed`](Self::Suppressed).
    #[must_use]
    pub const fn prevent_default(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// Routes key events to scrolling, sequences, commands and hints.
pub struct Dispatcher<H: Host> {
    host: H,
    vertical: Rc<RefCell<ScrollAxis>>,
    horizontal: Rc<RefCell<ScrollAxis>>,
    scheduler: FrameScheduler,
    sequences: SequenceRecognizer<NavCommand>,
    keys: HashMap<KeyCode, NavCommand>,
    hints: HintSession<H::Target>,
    help_visible: bool,
}

impl<H: Host> fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("vertical", &self.vertical.borrow())
            .field("horizontal", &self.horizontal.borrow())
            .field("scheduler", &self.scheduler)
            .field("sequences", &self.sequences)
            .field("hints", &self.hints)
            .field("help_visible", &self.help_visible)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Dispatcher<H> {
    /// Wire a dispatcher to its host, scroll ports and frame pacer.
    ///
    /// Installs the default bindings from [`commands`].
    pub fn new(
        config: NavConfig,
        host: H,
        vertical: impl ScrollPort + 'static,
        horizontal: impl ScrollPort + 'static,
        pacer: impl FramePacer + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let vertical = Rc::new(RefCell::new(ScrollAxis::new(config.axis, vertical)));
        let horizontal = Rc::new(RefCell::new(ScrollAxis::new(config.axis, horizontal)));

        let mut scheduler =
            FrameScheduler::new(pacer).with_first_frame_delta(config.first_frame_delta);
        for axis in [&vertical, &horizontal] {
            let axis = Rc::clone(axis);
            scheduler.register(move |delta| axis.borrow_mut().tick(delta));
        }

        let mut sequences = SequenceRecognizer::new(config.sequence_timeout);
        for (sequence, command) in commands::default_sequences() {
            sequences.register(sequence, command);
        }

        Ok(Self {
            host,
            vertical,
            horizontal,
            scheduler,
            sequences,
            keys: commands::default_keys().into_iter().collect(),
            hints: HintSession::new(config.hint_alphabet),
            help_visible: false,
        })
    }

    /// Bind a key sequence (one key or more) to a command.
    pub fn register_sequence(&mut self, sequence: impl Into<KeySequence>, command: NavCommand) {
        self.sequences.register(sequence, command);
    }

    /// Bind a single key to a command in the single-key table.
    pub fn register_key(&mut self, key: KeyCode, command: NavCommand) {
        self.keys.insert(key, command);
    }

    /// Dispatch a key-down event.
    ///
    /// `editable_target` tells whether the event originated in a
    /// text-editable element. Release events are forwarded to
    /// [`handle_key_up`](Self::handle_key_up); repeats are handled like
    /// presses.
    pub fn handle_key_down(
        &mut self,
        event: &KeyEvent,
        editable_target: bool,
        now: Instant,
    ) -> KeyOutcome {
        if event.kind == KeyEventKind::Release {
            return self.handle_key_up(event);
        }
        let code = event.code;

        if editable_target {
            if code == KeyCode::Escape {
                tracing::debug!("blurring editable target");
                self.host.blur_editable();
                return KeyOutcome::Suppressed;
            }
            return KeyOutcome::Ignored;
        }

        let modified = event.has_command_modifier();

        if code == HELP_KEY && !modified {
            self.toggle_help();
            return KeyOutcome::Handled;
        }

        if self.help_visible {
            if code == KeyCode::Escape {
                self.set_help_visible(false);
                return KeyOutcome::Handled;
            }
            return KeyOutcome::Ignored;
        }

        if self.hints.is_active() {
            match self.hints.consume_key(code) {
                HintKeyOutcome::Ignored => {}
                HintKeyOutcome::Consumed => {
                    if self.hints.is_active() {
                        publish_hints(&mut self.host, &self.hints);
                    } else {
                        self.host.hints_closed();
                    }
                    return KeyOutcome::Suppressed;
                }
                HintKeyOutcome::Resolved(resolution) => {
                    self.host.hints_closed();
                    self.perform_activation(resolution);
                    return KeyOutcome::Suppressed;
                }
            }
        }

        if modified {
            return KeyOutcome::Ignored;
        }

        if code == HINT_KEY || code == HINT_NEW_TAB_KEY {
            self.open_hints(code == HINT_NEW_TAB_KEY);
            return KeyOutcome::Handled;
        }

        match self.sequences.feed(code, now) {
            SequenceOutcome::Matched(command) => {
                self.run_command(command);
                return KeyOutcome::Handled;
            }
            SequenceOutcome::Pending => return KeyOutcome::Handled,
            SequenceOutcome::Unmatched => {}
        }

        if let Some(&command) = self.keys.get(&code) {
            self.run_command(command);
            return KeyOutcome::Handled;
        }

        if let Some((axis, direction)) = code.as_char().and_then(Direction::for_hold_key) {
            self.axis(axis).borrow_mut().hold_start(direction);
            self.scheduler.start();
            return KeyOutcome::Handled;
        }

        KeyOutcome::Ignored
    }

    /// Dispatch a key-up event. Only the hold keys react.
    pub fn handle_key_up(&mut self, event: &KeyEvent) -> KeyOutcome {
        match event.code.as_char().and_then(Direction::for_hold_key) {
            Some((axis, direction)) => {
                self.axis(axis).borrow_mut().hold_end(direction);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Host frame callback. Returns whether another frame was requested.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        self.scheduler.on_frame(now)
    }

    /// Run a command as if its binding had been typed.
    pub fn run_command(&mut self, command: NavCommand) {
        tracing::debug!(?command, "running command");
        match command {
            NavCommand::ScrollToTop => self.jump_vertical(|axis, _| axis.jump_absolute(0.0)),
            NavCommand::ScrollToBottom => {
                let bottom = (self.host.document_extent() - self.host.viewport_extent()).max(0.0);
                self.jump_vertical(|axis, _| axis.jump_absolute(bottom));
            }
            NavCommand::HalfPageDown => {
                self.jump_vertical(|axis, viewport| axis.jump_relative(viewport / 2.0));
            }
            NavCommand::HalfPageUp => {
                self.jump_vertical(|axis, viewport| axis.jump_relative(-viewport / 2.0));
            }
            NavCommand::ShowHints => self.open_hints(false),
            NavCommand::ShowHintsNewTab => self.open_hints(true),
            NavCommand::ToggleHelp => self.toggle_help(),
        }
    }

    /// Flip the help overlay.
    pub fn toggle_help(&mut self) {
        self.set_help_visible(!self.help_visible);
    }

    fn set_help_visible(&mut self, visible: bool) {
        if self.help_visible == visible {
            return;
        }
        self.help_visible = visible;
        tracing::debug!(visible, "help overlay toggled");
        self.host.help_visibility_changed(visible);
    }

    fn jump_vertical(&mut self, apply: impl FnOnce(&mut ScrollAxis, f64)) {
        let viewport = self.host.viewport_extent();
        apply(&mut *self.vertical.borrow_mut(), viewport);
        self.scheduler.start();
    }

    fn open_hints(&mut self, new_tab: bool) {
        self.sequences.reset();
        if self.hints.is_active() {
            tracing::debug!("hint session already active");
            return;
        }
        let targets = self.host.discover_targets();
        match self.hints.open(targets, new_tab) {
            Ok(count) => {
                tracing::debug!(count, new_tab, "showing hints");
                publish_hints(&mut self.host, &self.hints);
            }
            Err(err) => tracing::debug!(error = %err, "hints not shown"),
        }
    }

    fn perform_activation(&mut self, resolution: Resolution<H::Target>) {
        let Resolution {
            target, activation, ..
        } = resolution;
        match activation {
            Activation::Focus => self.host.focus(&target.handle),
            Activation::OpenInNewContext(destination) => {
                self.host.open_in_new_context(&destination);
            }
            Activation::Click => self.host.activate(&target.handle),
        }
    }

    fn axis(&self, axis: Axis) -> &Rc<RefCell<ScrollAxis>> {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    /// The vertical axis.
    #[must_use]
    pub fn vertical(&self) -> Ref<'_, ScrollAxis> {
        self.vertical.borrow()
    }

    /// The horizontal axis.
    #[must_use]
    pub fn horizontal(&self) -> Ref<'_, ScrollAxis> {
        self.horizontal.borrow()
    }

    /// The hint session (inactive when no hints are shown).
    #[must_use]
    pub fn hint_session(&self) -> &HintSession<H::Target> {
        &self.hints
    }

    /// Whether the help overlay is showing.
    #[must_use]
    pub fn is_help_visible(&self) -> bool {
        self.help_visible
    }

    /// Whether the frame loop is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Help listing for the default bindings.
    #[must_use]
    pub fn available_commands(&self) -> &'static [CommandDefinition] {
        COMMAND_DEFINITIONS
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

fn publish_hints<H: Host>(host: &mut H, hints: &HintSession<H::Target>) {
    let visible: Vec<VisibleHint<'_, H::Target>> = hints.visible().collect();
    host.hints_changed(&visible);
}
