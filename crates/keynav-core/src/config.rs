#![forbid(unsafe_code)]

//! Tuning configuration.
//!
//! All knobs have defaults that match the feel of the reference bindings:
//! a 50-unit tap, 800 units/s while held, 20% interpolation per frame and a
//! 500 ms window for multi-key sequences.
//!
//! Configs are plain values. Build them with `Default` plus the `with_*`
//! builders, then call [`NavConfig::validate`] before handing them to the
//! dispatcher (the dispatcher validates too and refuses invalid configs).
//!
//! With the `serde` feature enabled every config type can be loaded from any
//! serde format; the hint alphabet is (de)serialized as a plain string.

use std::fmt;
use std::time::Duration;

/// Characters used for hint labels by default, in label order.
pub const DEFAULT_HINT_ALPHABET: &str = "sadfjkl";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `lerp_factor` must lie in `(0, 1]`; 0 never converges.
    LerpFactor(f64),
    /// `epsilon` must be positive and finite.
    Epsilon(f64),
    /// `tap_amount` and `hold_velocity` must be finite and non-negative.
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The sequence timeout must be non-zero.
    ZeroSequenceTimeout,
    /// The hint alphabet needs at least two characters.
    AlphabetTooShort(usize),
    /// Hint characters must be unique.
    DuplicateHintChar(char),
    /// Hint characters must be lowercase alphanumerics (typed input is
    /// case-folded before matching).
    InvalidHintChar(char),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LerpFactor(v) => write!(f, "lerp_factor must be in (0, 1], got {v}"),
            Self::Epsilon(v) => write!(f, "epsilon must be positive and finite, got {v}"),
            Self::NonFinite { field, value } => {
                write!(f, "{field} must be finite and non-negative, got {value}")
            }
            Self::ZeroSequenceTimeout => f.write_str("sequence_timeout must be non-zero"),
            Self::AlphabetTooShort(n) => {
                write!(f, "hint alphabet needs at least 2 characters, got {n}")
            }
            Self::DuplicateHintChar(c) => write!(f, "hint alphabet repeats '{c}'"),
            Self::InvalidHintChar(c) => {
                write!(f, "hint alphabet character '{c}' is not a lowercase alphanumeric")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// HintAlphabet
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free set of characters hint labels are spelled with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct HintAlphabet {
    chars: Vec<char>,
}

impl HintAlphabet {
    /// Parse an alphabet from a string, one label character per `char`.
    pub fn new(chars: &str) -> Result<Self, ConfigError> {
        let mut seen: Vec<char> = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if !(c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return Err(ConfigError::InvalidHintChar(c));
            }
            if seen.contains(&c) {
                return Err(ConfigError::DuplicateHintChar(c));
            }
            seen.push(c);
        }
        if seen.len() < 2 {
            return Err(ConfigError::AlphabetTooShort(seen.len()));
        }
        Ok(Self { chars: seen })
    }

    /// Number of characters (`A`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a validated alphabet; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The characters in label order.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Whether `c` is a label character.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Largest number of labels this alphabet can spell (`A²`).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chars.len() * self.chars.len()
    }
}

impl Default for HintAlphabet {
    fn default() -> Self {
        Self {
            chars: DEFAULT_HINT_ALPHABET.chars().collect(),
        }
    }
}

impl TryFrom<String> for HintAlphabet {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<HintAlphabet> for String {
    fn from(value: HintAlphabet) -> Self {
        value.chars.into_iter().collect()
    }
}

impl fmt::Display for HintAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AxisConfig
// ---------------------------------------------------------------------------

/// Motion parameters for one scroll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AxisConfig {
    /// Immediate nudge applied when a direction starts (units).
    pub tap_amount: f64,
    /// Target speed while a direction is held (units per second).
    pub hold_velocity: f64,
    /// Fraction of the remaining distance covered per frame, in `(0, 1]`.
    pub lerp_factor: f64,
    /// Distance below which the axis counts as converged.
    pub epsilon: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            tap_amount: 50.0,
            hold_velocity: 800.0,
            lerp_factor: 0.2,
            epsilon: 0.5,
        }
    }
}

impl AxisConfig {
    /// Set the tap nudge.
    #[must_use]
    pub fn with_tap_amount(mut self, tap_amount: f64) -> Self {
        self.tap_amount = tap_amount;
        self
    }

    /// Set the held-key velocity.
    #[must_use]
    pub fn with_hold_velocity(mut self, hold_velocity: f64) -> Self {
        self.hold_velocity = hold_velocity;
        self
    }

    /// Set the per-frame interpolation factor.
    #[must_use]
    pub fn with_lerp_factor(mut self, lerp_factor: f64) -> Self {
        self.lerp_factor = lerp_factor;
        self
    }

    /// Set the convergence threshold.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tap_amount", self.tap_amount),
            ("hold_velocity", self.hold_velocity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err(ConfigError::LerpFactor(self.lerp_factor));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NavConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a [`Dispatcher`](crate::dispatcher::Dispatcher).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NavConfig {
    /// Motion parameters shared by both axes.
    pub axis: AxisConfig,
    /// Maximum gap between two keys of one sequence (default: 500ms).
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub sequence_timeout: Duration,
    /// Frame delta reported for the first frame of a run (default: 16ms).
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub first_frame_delta: Duration,
    /// Characters hint labels are spelled with.
    pub hint_alphabet: HintAlphabet,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            axis: AxisConfig::default(),
            sequence_timeout: Duration::from_millis(500),
            first_frame_delta: Duration::from_millis(16),
            hint_alphabet: HintAlphabet::default(),
        }
    }
}

impl NavConfig {
    /// Set the axis parameters.
    #[must_use]
    pub fn with_axis(mut self, axis: AxisConfig) -> Self {
        self.axis = axis;
        self
    }

    /// Set the sequence timeout.
    #[must_use]
    pub fn with_sequence_timeout(mut self, timeout: Duration) -> Self {
        self.sequence_timeout = timeout;
        self
    }

    /// Set the nominal first-frame delta.
    #[must_use]
    pub fn with_first_frame_delta(mut self, delta: Duration) -> Self {
        self.first_frame_delta = delta;
        self
    }

    /// Set the hint alphabet.
    #[must_use]
    pub fn with_hint_alphabet(mut self, alphabet: HintAlphabet) -> Self {
        self.hint_alphabet = alphabet;
        self
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.axis.validate()?;
        if self.sequence_timeout.is_zero() {
            return Err(ConfigError::ZeroSequenceTimeout);
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
