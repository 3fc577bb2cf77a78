#![forbid(unsafe_code)]

//! Multi-key sequence recognizer (`gg`, `G`, ...).
//!
//! [`SequenceRecognizer`] matches the stream of pressed keys against a
//! table of registered sequences. Keys are buffered while they spell the
//! beginning of some sequence; the buffer is dropped once it can no longer
//! match or when the gap since the previous key exceeds the timeout.
//!
//! # Design
//!
//! ## Invariants
//! 1. The buffer is always empty or a strict prefix of a registered sequence.
//! 2. The timeout window is rolling: it is measured from the last accepted
//!    key, not from the first key of the buffer.
//! 3. Exact match wins immediately. If `g` and `gg` are both registered,
//!    `g` fires and `gg` is unreachable; there is no lookahead.
//! 4. A key that neither completes nor extends a sequence is reported
//!    [`SequenceOutcome::Unmatched`] and is never swallowed, so the caller
//!    can reinterpret it as a single-key command.
//!
//! ## Failure Modes
//! - An expired partial sequence is discarded silently; the late key is
//!   evaluated on its own.
//!
//! # Example
//!
//! ```
//! use keynav_core::event::KeyCode;
//! use keynav_core::key_sequence::{KeySequence, SequenceOutcome, SequenceRecognizer};
//! use std::time::Duration;
//! use web_time::Instant;
//!
//! let mut recognizer = SequenceRecognizer::new(Duration::from_millis(500));
//! recognizer.register(KeySequence::parse("gg"), "top");
//!
//! let t = Instant::now();
//! assert_eq!(recognizer.feed(KeyCode::Char('g'), t), SequenceOutcome::Pending);
//! assert_eq!(
//!     recognizer.feed(KeyCode::Char('g'), t + Duration::from_millis(100)),
//!     SequenceOutcome::Matched("top")
//! );
//! ```

use std::fmt;
use std::time::Duration;

use web_time::Instant;

use crate::event::KeyCode;

// ---------------------------------------------------------------------------
// KeySequence
// ---------------------------------------------------------------------------

/// An ordered list of keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyCode>);

impl KeySequence {
    /// Build a sequence from key codes.
    #[must_use]
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self(keys)
    }

    /// One [`KeyCode::Char`] per character: `"gg"` is `g` then `g`.
    #[must_use]
    pub fn parse(keys: &str) -> Self {
        Self(keys.chars().map(KeyCode::Char).collect())
    }

    /// The keys in order.
    #[must_use]
    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty sequence (which can never match).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<KeyCode> for KeySequence {
    fn from(key: KeyCode) -> Self {
        Self(vec![key])
    }
}

impl From<&str> for KeySequence {
    fn from(keys: &str) -> Self {
        Self::parse(keys)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SequenceOutcome
// ---------------------------------------------------------------------------

/// Result of feeding one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome<A> {
    /// The key completed a sequence; the buffer was cleared.
    Matched(A),

    /// The key extended a partial sequence; keep typing.
    Pending,

    /// The key fits no sequence; the buffer was cleared and the caller may
    /// interpret the key on its own.
    Unmatched,
}

// ---------------------------------------------------------------------------
// SequenceRecognizer
// ---------------------------------------------------------------------------

/// Stateful matcher over a table of key sequences.
pub struct SequenceRecognizer<A> {
    timeout: Duration,

    /// Registration order is kept so listings are stable.
    table: Vec<(KeySequence, A)>,

    /// Keys typed so far toward a sequence.
    buffer: Vec<KeyCode>,

    /// When the last key was accepted.
    last_key: Option<Instant>,
}

impl<A> fmt::Debug for SequenceRecognizer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceRecognizer")
            .field("timeout", &self.timeout)
            .field("sequences", &self.table.len())
            .field("buffer_len", &self.buffer.len())
            .finish()
    }
}

impl<A: Clone> SequenceRecognizer<A> {
    /// Create an empty recognizer with the given inter-key timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            table: Vec::new(),
            buffer: Vec::with_capacity(4),
            last_key: None,
        }
    }

    /// Register `sequence`, replacing any action already bound to it.
    ///
    /// Empty sequences are ignored.
    pub fn register(&mut self, sequence: impl Into<KeySequence>, action: A) {
        let sequence = sequence.into();
        if sequence.is_empty() {
            return;
        }
        match self.table.iter_mut().find(|(seq, _)| *seq == sequence) {
            Some(entry) => entry.1 = action,
            None => self.table.push((sequence, action)),
        }
    }

    /// Feed one pressed key.
    pub fn feed(&mut self, key: KeyCode, now: Instant) -> SequenceOutcome<A> {
        let expired = self
            .last_key
            .is_some_and(|last| now.saturating_duration_since(last) > self.timeout);
        if expired && !self.buffer.is_empty() {
            tracing::trace!(pending = self.buffer.len(), "sequence timed out");
            self.buffer.clear();
        }

        self.buffer.push(key);
        self.last_key = Some(now);

        if let Some((sequence, action)) = self
            .table
            .iter()
            .find(|(seq, _)| seq.keys() == self.buffer.as_slice())
        {
            tracing::debug!(sequence = %sequence, "sequence matched");
            let action = action.clone();
            self.buffer.clear();
            return SequenceOutcome::Matched(action);
        }

        let is_prefix = self
            .table
            .iter()
            .any(|(seq, _)| seq.keys().starts_with(&self.buffer));
        if is_prefix {
            SequenceOutcome::Pending
        } else {
            self.buffer.clear();
            SequenceOutcome::Unmatched
        }
    }

    /// Drop any partial sequence.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Whether a partial sequence is buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Registered sequences in registration order.
    pub fn sequences(&self) -> impl Iterator<Item = &KeySequence> {
        self.table.iter().map(|(seq, _)| seq)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(500);
    const MS_100: Duration = Duration::from_millis(100);
    const MS_400: Duration = Duration::from_millis(400);
    const MS_600: Duration = Duration::from_millis(600);

    fn key(c: char) -> KeyCode {
        KeyCode::Char(c)
    }

    fn recognizer() -> SequenceRecognizer<&'static str> {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register("gg", "top");
        r
    }

    #[test]
    fn completes_sequence() {
        let mut r = recognizer();
        let t = Instant::now();
        assert_eq!(r.feed(key('g'), t), SequenceOutcome::Pending);
        assert!(r.has_pending());
        assert_eq!(r.feed(key('g'), t + MS_100), SequenceOutcome::Matched("top"));
        assert!(!r.has_pending());
    }

    #[test]
    fn single_key_sequence_matches_immediately() {
        let mut r = recognizer();
        r.register("G", "bottom");
        let outcome = r.feed(key('G'), Instant::now());
        assert_eq!(outcome, SequenceOutcome::Matched("bottom"));
    }

    #[test]
    fn longer_sequences() {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register("abc", "abc");
        let t = Instant::now();
        assert_eq!(r.feed(key('a'), t), SequenceOutcome::Pending);
        assert_eq!(r.feed(key('b'), t + MS_100), SequenceOutcome::Pending);
        assert_eq!(
            r.feed(key('c'), t + MS_100 * 2),
            SequenceOutcome::Matched("abc")
        );
    }

    #[test]
    fn timeout_discards_partial_sequence() {
        let mut r = recognizer();
        let t = Instant::now();
        r.feed(key('g'), t);
        // Too late: the second g starts a new partial sequence.
        assert_eq!(r.feed(key('g'), t + MS_600), SequenceOutcome::Pending);
    }

    #[test]
    fn timeout_is_measured_from_last_key() {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register("abc", "abc");
        let t = Instant::now();
        r.feed(key('a'), t);
        r.feed(key('b'), t + MS_400);
        // 800ms after the first key but only 400ms after the second.
        assert_eq!(
            r.feed(key('c'), t + MS_400 * 2),
            SequenceOutcome::Matched("abc")
        );
    }

    #[test]
    fn unmatched_key_is_not_consumed() {
        let mut r = recognizer();
        let outcome = r.feed(key('x'), Instant::now());
        assert_eq!(outcome, SequenceOutcome::Unmatched);
        assert!(!r.has_pending());
    }

    #[test]
    fn unmatched_key_clears_buffer() {
        let mut r = recognizer();
        let t = Instant::now();
        r.feed(key('g'), t);
        assert_eq!(r.feed(key('x'), t + MS_100), SequenceOutcome::Unmatched);
        assert!(!r.has_pending());
        // A fresh g is a prefix again, not a completion.
        assert_eq!(r.feed(key('g'), t + MS_100 * 2), SequenceOutcome::Pending);
    }

    #[test]
    fn distinguishes_shared_prefix() {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register("gg", "top");
        r.register("gi", "input");
        let t = Instant::now();
        r.feed(key('g'), t);
        assert_eq!(
            r.feed(key('i'), t + MS_100),
            SequenceOutcome::Matched("input")
        );
        r.feed(key('g'), t + MS_100 * 2);
        assert_eq!(
            r.feed(key('g'), t + MS_100 * 3),
            SequenceOutcome::Matched("top")
        );
    }

    #[test]
    fn exact_match_wins_over_longer_sequence() {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register("g", "short");
        r.register("gg", "long");
        let t = Instant::now();
        assert_eq!(r.feed(key('g'), t), SequenceOutcome::Matched("short"));
        assert_eq!(
            r.feed(key('g'), t + MS_100),
            SequenceOutcome::Matched("short")
        );
    }

    #[test]
    fn reregistering_replaces_action() {
        let mut r = recognizer();
        r.register("gg", "other");
        assert_eq!(r.sequences().count(), 1);
        let t = Instant::now();
        r.feed(key('g'), t);
        assert_eq!(r.feed(key('g'), t + MS_100), SequenceOutcome::Matched("other"));
    }

    #[test]
    fn empty_sequence_is_ignored() {
        let mut r = recognizer();
        r.register("", "nothing");
        assert_eq!(r.sequences().count(), 1);
    }

    #[test]
    fn reset_clears_buffer() {
        let mut r = recognizer();
        r.feed(key('g'), Instant::now());
        r.reset();
        assert!(!r.has_pending());
    }

    #[test]
    fn sequences_listed_in_registration_order() {
        let mut r = recognizer();
        r.register("G", "bottom");
        let listed: Vec<String> = r.sequences().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["gg", "G"]);
    }

    #[test]
    fn non_char_keys_participate() {
        let mut r = SequenceRecognizer::new(TIMEOUT);
        r.register(
            KeySequence::new(vec![KeyCode::Escape, KeyCode::Escape]),
            "double-esc",
        );
        let t = Instant::now();
        assert_eq!(r.feed(KeyCode::Escape, t), SequenceOutcome::Pending);
        assert_eq!(
            r.feed(KeyCode::Escape, t + MS_100),
            SequenceOutcome::Matched("double-esc")
        );
    }

    #[test]
    fn debug_format() {
        let r = recognizer();
        let dbg = format!("{r:?}");
        assert!(dbg.contains("SequenceRecognizer"));
    }
}
