#![forbid(unsafe_code)]

//! Hint session: type a label to activate an element.
//!
//! A session starts from the ordered list of targets the host discovered,
//! assigns each one a label (see [`hint_labels`](crate::hint_labels)) and
//! narrows the candidates as label characters are typed.
//!
//! # Key handling
//!
//! | key                          | effect                                      |
//! |------------------------------|---------------------------------------------|
//! | `Escape`                     | close                                       |
//! | `Backspace`                  | drop the last typed character (if any)      |
//! | label character (any case)   | extend the prefix; resolve or dead-end      |
//! | anything else                | ignored, left to the caller                 |
//!
//! # Invariants
//!
//! 1. While active, the typed prefix starts at least one label. A keystroke
//!    that breaks this closes the session.
//! 2. All labels of a session have the same length, so an exact match can
//!    resolve immediately.
//! 3. At most one session is active; [`HintSession::open`] on an active
//!    session is rejected and the existing session is kept.
//! 4. Targets past the alphabet's capacity are left unlabelled.

use std::fmt;

use crate::config::HintAlphabet;
use crate::event::KeyCode;
use crate::hint_labels::generate_labels;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// How a target reacts to activation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Editable field or selection control: gets input focus.
    TextEntry,
    /// Link with a destination that can be opened elsewhere.
    Link {
        /// Where the link points.
        destination: String,
    },
    /// Anything else clickable.
    Generic,
}

/// A host element handle plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintTarget<T> {
    /// Opaque handle passed back to the host on activation.
    pub handle: T,
    /// Classification used to pick the activation.
    pub kind: TargetKind,
}

impl<T> HintTarget<T> {
    /// A target of the given kind.
    pub fn new(handle: T, kind: TargetKind) -> Self {
        Self { handle, kind }
    }

    /// A text-entry target.
    pub fn text_entry(handle: T) -> Self {
        Self::new(handle, TargetKind::TextEntry)
    }

    /// A link target.
    pub fn link(handle: T, destination: impl Into<String>) -> Self {
        Self::new(
            handle,
            TargetKind::Link {
                destination: destination.into(),
            },
        )
    }

    /// A generic clickable target.
    pub fn generic(handle: T) -> Self {
        Self::new(handle, TargetKind::Generic)
    }
}

/// What the host should do with a resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Give the element input focus.
    Focus,
    /// Open the destination in a new browsing context.
    OpenInNewContext(String),
    /// Direct activation (synthetic primary click).
    Click,
}

impl Activation {
    /// Activation policy for a target kind.
    ///
    /// Text entry always takes focus, even in new-tab mode.
    #[must_use]
    pub fn for_target(kind: &TargetKind, new_tab: bool) -> Self {
        match kind {
            TargetKind::TextEntry => Self::Focus,
            TargetKind::Link { destination } if new_tab => {
                Self::OpenInNewContext(destination.clone())
            }
            TargetKind::Link { .. } | TargetKind::Generic => Self::Click,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// A label was typed in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<T> {
    /// The label that matched.
    pub label: String,
    /// The matched target, moved out of the closed session.
    pub target: HintTarget<T>,
    /// What to do with it.
    pub activation: Activation,
}

/// Result of offering a key to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintKeyOutcome<T> {
    /// Not a session key (or no session active); the caller may use it.
    Ignored,
    /// Part of the hint interaction; nothing to activate yet (or the
    /// session closed without a match).
    Consumed,
    /// A label matched; the session is closed.
    Resolved(Resolution<T>),
}

/// Why a session could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintOpenError {
    /// A session is already active.
    AlreadyActive,
    /// Nothing to label.
    NoTargets,
}

impl fmt::Display for HintOpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("a hint session is already active"),
            Self::NoTargets => f.write_str("no targets to hint"),
        }
    }
}

impl std::error::Error for HintOpenError {}

/// A label still matching the typed prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleHint<'a, T> {
    /// Full label.
    pub label: &'a str,
    /// How many leading characters are already typed.
    pub typed: usize,
    /// The labelled target.
    pub target: &'a HintTarget<T>,
}

// ---------------------------------------------------------------------------
// HintSession
// ---------------------------------------------------------------------------

/// Label assignment and typing state for one hint activation.
pub struct HintSession<T> {
    alphabet: HintAlphabet,
    hints: Vec<(String, HintTarget<T>)>,
    typed: String,
    active: bool,
    new_tab: bool,
}

impl<T> fmt::Debug for HintSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintSession")
            .field("active", &self.active)
            .field("new_tab", &self.new_tab)
            .field("hints", &self.hints.len())
            .field("typed", &self.typed)
            .finish()
    }
}

impl<T> HintSession<T> {
    /// Create an inactive session spelling labels with `alphabet`.
    #[must_use]
    pub fn new(alphabet: HintAlphabet) -> Self {
        Self {
            alphabet,
            hints: Vec::new(),
            typed: String::new(),
            active: false,
            new_tab: false,
        }
    }

    /// Label `targets` and start accepting keys.
    ///
    /// Returns the number of labelled targets.
    pub fn open(
        &mut self,
        mut targets: Vec<HintTarget<T>>,
        new_tab: bool,
    ) -> Result<usize, HintOpenError> {
        if self.active {
            return Err(HintOpenError::AlreadyActive);
        }
        if targets.is_empty() {
            return Err(HintOpenError::NoTargets);
        }
        let capacity = self.alphabet.capacity();
        if targets.len() > capacity {
            tracing::warn!(
                discovered = targets.len(),
                capacity,
                "more targets than labels; extra targets left unlabelled"
            );
            targets.truncate(capacity);
        }
        let labels = match generate_labels(&self.alphabet, targets.len()) {
            Ok(labels) => labels,
            Err(err) => {
                tracing::warn!(error = %err, "hint labelling failed");
                return Err(HintOpenError::NoTargets);
            }
        };

        self.hints = labels.into_iter().zip(targets).collect();
        self.typed.clear();
        self.new_tab = new_tab;
        self.active = true;
        tracing::debug!(hints = self.hints.len(), new_tab, "hint session opened");
        Ok(self.hints.len())
    }

    /// End the session and drop all labels. Idempotent.
    pub fn close(&mut self) {
        if self.active {
            tracing::debug!("hint session closed");
        }
        self.active = false;
        self.new_tab = false;
        self.typed.clear();
        self.hints.clear();
    }

    /// Offer a pressed key to the session.
    pub fn consume_key(&mut self, key: KeyCode) -> HintKeyOutcome<T> {
        if !self.active {
            return HintKeyOutcome::Ignored;
        }
        let c = match key {
            KeyCode::Escape => {
                self.close();
                return HintKeyOutcome::Consumed;
            }
            KeyCode::Backspace => {
                self.typed.pop();
                return HintKeyOutcome::Consumed;
            }
            KeyCode::Char(c) => c.to_ascii_lowercase(),
            _ => return HintKeyOutcome::Ignored,
        };
        if !self.alphabet.contains(c) {
            return HintKeyOutcome::Ignored;
        }

        self.typed.push(c);

        if let Some(index) = self.hints.iter().position(|(label, _)| *label == self.typed) {
            let (label, target) = self.hints.swap_remove(index);
            let activation = Activation::for_target(&target.kind, self.new_tab);
            tracing::debug!(label = %label, ?activation, "hint resolved");
            self.close();
            return HintKeyOutcome::Resolved(Resolution {
                label,
                target,
                activation,
            });
        }

        if !self.hints.iter().any(|(label, _)| label.starts_with(&self.typed)) {
            tracing::debug!(typed = %self.typed, "no hint matches; closing");
            self.close();
        }
        HintKeyOutcome::Consumed
    }

    /// Labels that still start with the typed prefix, in assignment order.
    pub fn visible(&self) -> impl Iterator<Item = VisibleHint<'_, T>> {
        let typed = self.typed.as_str();
        self.hints
            .iter()
            .filter(move |(label, _)| label.starts_with(typed))
            .map(move |(label, target)| VisibleHint {
                label,
                typed: typed.chars().count(),
                target,
            })
    }

    /// All labels with their targets, in assignment order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &HintTarget<T>)> {
        self.hints.iter().map(|(label, target)| (label.as_str(), target))
    }

    /// Characters typed so far.
    #[must_use]
    pub fn typed_prefix(&self) -> &str {
        &self.typed
    }

    /// Whether the session is accepting keys.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether links open in a new context.
    #[must_use]
    pub fn is_new_tab(&self) -> bool {
        self.new_tab
    }

    /// Number of labelled targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    /// True when nothing is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// The label alphabet.
    #[must_use]
    pub fn alphabet(&self) -> &HintAlphabet {
        &self.alphabet
    }
}
