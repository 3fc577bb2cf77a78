//! Property-based invariant tests for scroll motion and key sequences.
//!
//! 1. Without a held key, the distance to target shrinks every tick and
//!    drops below epsilon in finitely many ticks.
//! 2. Repeated `hold_start` in one direction nudges exactly once.
//! 3. The recognizer only reports `Pending` while the typed keys are a
//!    prefix of some registered sequence.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use keynav_core::config::AxisConfig;
use keynav_core::event::KeyCode;
use keynav_core::key_sequence::{KeySequence, SequenceOutcome, SequenceRecognizer};
use keynav_core::scroll_axis::{Direction, ScrollAxis, ScrollPort};
use proptest::prelude::*;
use web_time::Instant;

#[derive(Clone, Default)]
struct Offset(Rc<Cell<f64>>);

impl ScrollPort for Offset {
    fn offset(&self) -> f64 {
        self.0.get()
    }

    fn set_offset(&mut self, offset: f64) {
        self.0.set(offset);
    }
}

fn key_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Char('g')),
        Just(KeyCode::Char('z')),
        Just(KeyCode::Char('t')),
        Just(KeyCode::Char('x')),
        Just(KeyCode::Escape),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Convergence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn distance_shrinks_until_settled(
        start in -10_000.0f64..10_000.0,
        jump in -10_000.0f64..10_000.0,
        lerp in 0.05f64..=1.0,
        frame_ms in 1u64..100,
    ) {
        let port = Offset::default();
        port.0.set(start);
        let config = AxisConfig::default().with_lerp_factor(lerp);
        let mut axis = ScrollAxis::new(config, port);
        axis.jump_relative(jump);

        let delta = Duration::from_millis(frame_ms);
        let mut distance = (axis.target() - axis.current()).abs();
        let mut steps = 0;
        while axis.tick(delta) {
            let next = (axis.target() - axis.current()).abs();
            prop_assert!(next < distance, "distance grew: {} -> {}", distance, next);
            distance = next;
            steps += 1;
            prop_assert!(steps < 10_000, "never settled");
        }
        prop_assert!((axis.target() - axis.current()).abs() <= config.epsilon);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Tap idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_hold_start_taps_once(repeats in 1usize..20, forward in any::<bool>()) {
        let mut axis = ScrollAxis::new(AxisConfig::default(), Offset::default());
        let direction = if forward { Direction::Forward } else { Direction::Backward };
        for _ in 0..repeats {
            axis.hold_start(direction);
        }
        prop_assert_eq!(axis.target(), direction.sign() * 50.0);
        prop_assert_eq!(axis.held(), direction);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Prefix monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pending_only_on_registered_prefix(keys in proptest::collection::vec(key_strategy(), 0..12)) {
        let registered = [KeySequence::parse("gg"), KeySequence::parse("zt"), KeySequence::parse("gzt")];
        let mut recognizer = SequenceRecognizer::new(Duration::from_millis(500));
        for (i, seq) in registered.iter().enumerate() {
            recognizer.register(seq.clone(), i);
        }

        let t = Instant::now();
        let mut buffer: Vec<KeyCode> = Vec::new();
        for (i, key) in keys.into_iter().enumerate() {
            let now = t + Duration::from_millis(10 * i as u64);
            buffer.push(key);
            match recognizer.feed(key, now) {
                SequenceOutcome::Pending => {
                    prop_assert!(
                        registered.iter().any(|s| s.keys().len() > buffer.len() && s.keys().starts_with(&buffer)),
                        "pending on non-prefix {:?}", buffer
                    );
                }
                SequenceOutcome::Matched(index) => {
                    prop_assert_eq!(registered[index].keys(), buffer.as_slice());
                    buffer.clear();
                }
                SequenceOutcome::Unmatched => buffer.clear(),
            }
            prop_assert_eq!(recognizer.has_pending(), !buffer.is_empty());
        }
    }
}
