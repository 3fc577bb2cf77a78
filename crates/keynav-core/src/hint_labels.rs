#![forbid(unsafe_code)]

//! Hint label generation.
//!
//! Labels are spelled with a small ordered alphabet (home-row keys by
//! default). The scheme keeps every label in one assignment the same length,
//! so no label is ever a prefix of another:
//!
//! | count            | labels                                        |
//! |------------------|-----------------------------------------------|
//! | `0`              | none                                          |
//! | `1..=A`          | first `count` characters, in alphabet order   |
//! | `A+1..=A²`       | two characters each, base-A row-major order   |
//! | `> A²`           | [`LabelCapacityError`]                        |
//!
//! With the default alphabet `sadfjkl`, eight targets get
//! `ss sa sd sf sj sk sl as`.

use std::fmt;

use crate::config::HintAlphabet;

/// More labels requested than two characters can spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCapacityError {
    /// Number of labels asked for.
    pub requested: usize,
    /// Largest count the alphabet supports (`A²`).
    pub capacity: usize,
}

impl fmt::Display for LabelCapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot label {} targets: two-character labels cover at most {}",
            self.requested, self.capacity
        )
    }
}

impl std::error::Error for LabelCapacityError {}

/// Label length used for `count` targets: 0, 1 or 2.
///
/// Returns `None` past the alphabet's capacity.
#[must_use]
pub fn label_len(alphabet: &HintAlphabet, count: usize) -> Option<usize> {
    match count {
        0 => Some(0),
        n if n <= alphabet.len() => Some(1),
        n if n <= alphabet.capacity() => Some(2),
        _ => None,
    }
}

/// Generate `count` unique labels.
///
/// Deterministic: the result depends only on `alphabet` and `count`.
pub fn generate_labels(
    alphabet: &HintAlphabet,
    count: usize,
) -> Result<Vec<String>, LabelCapacityError> {
    let chars = alphabet.chars();
    let base = chars.len();
    match label_len(alphabet, count) {
        Some(0) => Ok(Vec::new()),
        Some(1) => Ok(chars[..count].iter().map(|c| c.to_string()).collect()),
        Some(_) => Ok((0..count)
            .map(|i| {
                let mut label = String::with_capacity(2);
                label.push(chars[(i / base) % base]);
                label.push(chars[i % base]);
                label
            })
            .collect()),
        None => Err(LabelCapacityError {
            requested: count,
            capacity: alphabet.capacity(),
        }),
    }
}
