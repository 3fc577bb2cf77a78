#![forbid(unsafe_code)]

//! Smooth scrolling along one axis.
//!
//! A [`ScrollAxis`] keeps two numbers: the `target` offset the user asked
//! for and the `current` offset being displayed. Each frame `current` covers
//! a fixed fraction of the remaining distance (exponential ease-out), and
//! the result is written to the host through a [`ScrollPort`].
//!
//! # Motion model
//!
//! - **Tap**: starting a direction nudges `target` by `tap_amount` at once,
//!   so a quick press is never swallowed by the damping.
//! - **Hold**: while a direction is held, `target` moves at `hold_velocity`
//!   units per second, which reads as constant-velocity scrolling. Releasing
//!   the key leaves the damping to bring `current` to rest.
//! - **Jumps**: [`jump_relative`](ScrollAxis::jump_relative) and
//!   [`jump_absolute`](ScrollAxis::jump_absolute) overwrite `target`; any
//!   animation in flight simply bends toward the new target.
//!
//! # Invariants
//!
//! 1. `target`/`current` are seeded from the host offset the first time the
//!    axis is used, never assumed to be zero.
//! 2. At most one direction is held at a time.
//! 3. A key-up for a direction that is no longer held is ignored.
//! 4. `tick` before the first use is a no-op (nothing is written to the host).

use std::fmt;
use std::time::Duration;

use crate::config::AxisConfig;

/// Read/write access to the host's scroll offset for one axis.
pub trait ScrollPort {
    /// Live scroll offset as the host currently displays it.
    fn offset(&self) -> f64;

    /// Display `offset`.
    fn set_offset(&mut self, offset: f64);
}

/// Which axis a key or port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Up/down.
    Vertical,
    /// Left/right.
    Horizontal,
}

/// Held direction on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Toward smaller offsets (up / left).
    Backward,
    /// Nothing held.
    #[default]
    Idle,
    /// Toward larger offsets (down / right).
    Forward,
}

impl Direction {
    /// `-1`, `0` or `+1`.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Backward => -1.0,
            Self::Idle => 0.0,
            Self::Forward => 1.0,
        }
    }

    /// Axis and direction bound to a hold key: `j`/`k` vertical, `l`/`h`
    /// horizontal.
    #[must_use]
    pub const fn for_hold_key(c: char) -> Option<(Axis, Self)> {
        match c {
            'j' => Some((Axis::Vertical, Self::Forward)),
            'k' => Some((Axis::Vertical, Self::Backward)),
            'l' => Some((Axis::Horizontal, Self::Forward)),
            'h' => Some((Axis::Horizontal, Self::Backward)),
            _ => None,
        }
    }
}

/// One smoothly scrolled axis.
pub struct ScrollAxis {
    config: AxisConfig,
    port: Box<dyn ScrollPort>,
    target: f64,
    current: f64,
    initialized: bool,
    held: Direction,
}

impl fmt::Debug for ScrollAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAxis")
            .field("target", &self.target)
            .field("current", &self.current)
            .field("initialized", &self.initialized)
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}

impl ScrollAxis {
    /// Create an axis driving `port`.
    #[must_use]
    pub fn new(config: AxisConfig, port: impl ScrollPort + 'static) -> Self {
        Self {
            config,
            port: Box::new(port),
            target: 0.0,
            current: 0.0,
            initialized: false,
            held: Direction::Idle,
        }
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            let offset = self.port.offset();
            self.current = offset;
            self.target = offset;
            self.initialized = true;
        }
    }

    /// A direction key went down (or auto-repeated).
    ///
    /// The tap nudge is applied only when the held direction changes, so
    /// key repeat never stacks nudges.
    pub fn hold_start(&mut self, direction: Direction) {
        if direction == Direction::Idle {
            return;
        }
        self.ensure_initialized();
        if self.held != direction {
            self.target += direction.sign() * self.config.tap_amount;
        }
        self.held = direction;
    }

    /// A direction key went up.
    pub fn hold_end(&mut self, direction: Direction) {
        if direction != Direction::Idle && self.held == direction {
            self.held = Direction::Idle;
        }
    }

    /// Move the target by `amount` (page-wise jumps).
    pub fn jump_relative(&mut self, amount: f64) {
        self.ensure_initialized();
        self.target += amount;
    }

    /// Set the target to `position` (top/bottom jumps).
    pub fn jump_absolute(&mut self, position: f64) {
        self.ensure_initialized();
        self.target = position;
    }

    /// Advance one frame and write the new offset to the host.
    ///
    /// Returns [`is_active`](Self::is_active) after the step, which is what
    /// a frame scheduler callback reports.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.initialized {
            return false;
        }
        if self.held != Direction::Idle {
            self.target += self.held.sign() * self.config.hold_velocity * delta.as_secs_f64();
        }
        self.current += (self.target - self.current) * self.config.lerp_factor;
        self.port.set_offset(self.current);
        self.is_active()
    }

    /// Still visibly moving toward the target.
    #[must_use]
    pub fn is_converging(&self) -> bool {
        (self.target - self.current).abs() > self.config.epsilon
    }

    /// A direction key is down.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held != Direction::Idle
    }

    /// Needs more frames: held or still converging.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_held() || self.is_converging()
    }

    /// Offset being scrolled toward.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Offset last written to the host.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Currently held direction.
    #[must_use]
    pub fn held(&self) -> Direction {
        self.held
    }

    /// Whether the axis has been seeded from the host.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Motion parameters.
    #[must_use]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CellPort(Rc<Cell<f64>>);

    impl ScrollPort for CellPort {
        fn offset(&self) -> f64 {
            self.0.get()
        }

        fn set_offset(&mut self, offset: f64) {
            self.0.set(offset);
        }
    }

    const FRAME: Duration = Duration::from_millis(16);

    fn axis_at(offset: f64) -> (ScrollAxis, Rc<Cell<f64>>) {
        let cell = Rc::new(Cell::new(offset));
        let axis = ScrollAxis::new(AxisConfig::default(), CellPort(cell.clone()));
        (axis, cell)
    }

    #[test]
    fn tap_sets_target() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        assert_eq!(axis.target(), 50.0);
        assert!(axis.is_held());

        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Backward);
        assert_eq!(axis.target(), -50.0);
    }

    #[test]
    fn idle_direction_is_ignored() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Idle);
        assert!(!axis.is_initialized());
        assert!(!axis.is_held());
    }

    #[test]
    fn repeated_hold_start_nudges_once() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        axis.hold_start(Direction::Forward);
        assert_eq!(axis.target(), 50.0);
    }

    #[test]
    fn taps_accumulate() {
        let (mut axis, _) = axis_at(0.0);
        for _ in 0..3 {
            axis.hold_start(Direction::Forward);
            axis.hold_end(Direction::Forward);
        }
        assert_eq!(axis.target(), 150.0);
    }

    #[test]
    fn direction_change_nudges_again() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        axis.hold_start(Direction::Backward);
        assert_eq!(axis.target(), 0.0);
        assert_eq!(axis.held(), Direction::Backward);
    }

    #[test]
    fn stale_release_is_ignored() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        axis.hold_start(Direction::Backward);
        // The forward key comes up after the switch.
        axis.hold_end(Direction::Forward);
        assert_eq!(axis.held(), Direction::Backward);
        axis.hold_end(Direction::Backward);
        assert!(!axis.is_held());
    }

    #[test]
    fn hold_adds_velocity() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        axis.tick(Duration::from_millis(100));
        // 50 tap + 800 * 0.1
        assert!((axis.target() - 130.0).abs() < 1e-9);
    }

    #[test]
    fn release_stops_velocity() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        axis.hold_end(Direction::Forward);
        axis.tick(Duration::from_millis(100));
        assert_eq!(axis.target(), 50.0);
    }

    #[test]
    fn tick_interpolates_and_writes_port() {
        let (mut axis, cell) = axis_at(0.0);
        axis.jump_relative(100.0);
        axis.tick(FRAME);
        assert!((axis.current() - 20.0).abs() < 1e-9);
        assert!((cell.get() - 20.0).abs() < 1e-9);
        axis.tick(FRAME);
        assert!((axis.current() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn tick_before_use_is_noop() {
        let (mut axis, cell) = axis_at(42.0);
        cell.set(77.0);
        assert!(!axis.tick(FRAME));
        assert_eq!(cell.get(), 77.0);
        assert!(!axis.is_initialized());
    }

    #[test]
    fn seeds_from_host_offset() {
        let (mut axis, _) = axis_at(300.0);
        axis.jump_relative(100.0);
        assert_eq!(axis.target(), 400.0);
        assert_eq!(axis.current(), 300.0);
    }

    #[test]
    fn jump_absolute_overrides_target() {
        let (mut axis, _) = axis_at(500.0);
        axis.jump_relative(100.0);
        axis.jump_absolute(0.0);
        assert_eq!(axis.target(), 0.0);
    }

    #[test]
    fn converges_below_epsilon() {
        let (mut axis, _) = axis_at(0.0);
        axis.jump_absolute(1000.0);
        assert!(axis.is_converging());
        let mut frames = 0;
        while axis.tick(FRAME) {
            frames += 1;
            assert!(frames < 100, "axis never settled");
        }
        assert!(!axis.is_converging());
        assert!((axis.target() - axis.current()).abs() <= 0.5);
    }

    #[test]
    fn held_axis_stays_active_when_converged() {
        let (mut axis, _) = axis_at(0.0);
        axis.hold_start(Direction::Forward);
        assert!(axis.tick(Duration::ZERO));
        assert!(axis.is_active());
    }

    #[test]
    fn hold_key_mapping() {
        assert_eq!(
            Direction::for_hold_key('j'),
            Some((Axis::Vertical, Direction::Forward))
        );
        assert_eq!(
            Direction::for_hold_key('k'),
            Some((Axis::Vertical, Direction::Backward))
        );
        assert_eq!(
            Direction::for_hold_key('l'),
            Some((Axis::Horizontal, Direction::Forward))
        );
        assert_eq!(
            Direction::for_hold_key('h'),
            Some((Axis::Horizontal, Direction::Backward))
        );
        assert_eq!(Direction::for_hold_key('x'), None);
    }

    #[test]
    fn debug_format() {
        let (axis, _) = axis_at(0.0);
        let dbg = format!("{axis:?}");
        assert!(dbg.contains("ScrollAxis"));
    }
}
