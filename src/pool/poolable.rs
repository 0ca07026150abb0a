//! Capability set required of pooled instances.

use std::time::Duration;

/// Behaviour an instance must expose to live in an [`super::ObjectPool`].
///
/// The pool assigns the slot index exactly once, right after the factory
/// produces the instance, and only reads [`Poolable::is_active`] to decide
/// whether an instance can be handed out again.
pub trait Poolable {
    /// Slot index assigned by the owning pool.
    fn slot(&self) -> usize;

    /// Stores the slot index. Called by the pool, never by user code.
    fn set_slot(&mut self, slot: usize);

    /// Returns `true` while the instance is in use.
    fn is_active(&self) -> bool;

    /// Time left before the instance returns to the pool on its own.
    fn remaining(&self) -> Duration;

    /// Returns `true` if the instance ignores its timer and stays active
    /// until someone deactivates it.
    fn is_expiry_suppressed(&self) -> bool;

    /// Turns auto-expiry off (`true`) or back on (`false`).
    fn set_expiry_suppressed(&mut self, suppressed: bool);

    /// Puts the instance in use for `duration`.
    ///
    /// A zero duration suppresses auto-expiry.
    fn activate(&mut self, duration: Duration);

    /// Returns the instance to the idle state.
    fn deactivate(&mut self);

    /// Advances the instance's own timer by one external tick.
    ///
    /// The default does nothing; instances that expire on their own
    /// override it, typically by delegating to an [`ActivityTimer`].
    fn tick(&mut self, _elapsed: Duration) {}
}

/// Bookkeeping for the active flag, the remaining duration and the
/// auto-expiry switch.
///
/// Embed one in a pooled type and forward the [`Poolable`] accessors to it.
///
/// ```
/// use std::time::Duration;
/// use gamekit_core::pool::ActivityTimer;
///
/// let mut timer = ActivityTimer::new();
/// timer.activate(Duration::from_millis(30));
/// assert!(!timer.tick(Duration::from_millis(20)));
/// assert!(timer.tick(Duration::from_millis(20)));
/// assert!(!timer.is_active());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityTimer {
    active: bool,
    remaining: Duration,
    suppressed: bool,
}

impl ActivityTimer {
    /// Creates an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: false,
            remaining: Duration::ZERO,
            suppressed: false,
        }
    }

    /// Returns `true` while active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Time left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Returns `true` if expiry is suppressed.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Sets the suppress-auto-expiry switch.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Starts an active period of `duration`. Zero suppresses expiry.
    pub fn activate(&mut self, duration: Duration) {
        self.active = true;
        self.remaining = duration;
        self.suppressed = duration.is_zero();
    }

    /// Stops the active period.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.remaining = Duration::ZERO;
        self.suppressed = false;
    }

    /// Consumes `elapsed` from the remaining duration.
    ///
    /// Returns `true` exactly on the tick the timer runs out, after which
    /// the timer is idle.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.active || self.suppressed {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.active = false;
            return true;
        }
        false
    }
}
