//! Time sources for the sandbox
//!
//! Programs never read wall time directly. The sandbox hands them a
//! [`Clock`], which during replay is a [`VirtualClock`] stepped once per tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

const NANOS_PER_MS: f64 = 1_000_000.0;

/// A substitutable source of "now"
pub trait Clock {
    /// Milliseconds since the session started
    fn now_ms(&self) -> f64;

    /// Move time forward. Wall clocks ignore this.
    fn advance_ns(&self, _ns: u64) {}
}

/// Deterministic clock that advances in nanoseconds
#[derive(Debug, Clone)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a virtual clock starting at `seed` nanoseconds
    pub fn new(seed: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(seed)),
        }
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    #[inline]
    pub fn advance(&self, ns: u64) {
        self.offset.fetch_add(ns, Ordering::Release);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now_ns() as f64 / NANOS_PER_MS
    }

    fn advance_ns(&self, ns: u64) {
        self.advance(ns);
    }
}

/// Wall time since creation, for live (non-replay) sessions
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// How the sandbox moves the clock at each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteppingPolicy {
    /// Advance by a constant step at the start of every tick
    FixedStep { step_ns: u64 },
    /// The clock moves on its own
    Free,
}

impl SteppingPolicy {
    /// Fixed step from a tick length in milliseconds, rounded to whole nanoseconds
    pub fn fixed_ms(tick_ms: f64) -> Self {
        SteppingPolicy::FixedStep {
            step_ns: (tick_ms * NANOS_PER_MS).round() as u64,
        }
    }

    pub fn step(&self, clock: &dyn Clock) {
        if let SteppingPolicy::FixedStep { step_ns } = *self {
            clock.advance_ns(step_ns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_initial_value() {
        let clock = VirtualClock::new(100);
        assert_eq!(clock.now_ns(), 100);
    }

    #[test]
    fn test_clock_advance() {
        let clock = VirtualClock::new(0);
        clock.advance(500);
        clock.advance(250);
        assert_eq!(clock.now_ns(), 750);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = VirtualClock::default();
        let view = clock.clone();
        clock.advance(2_500_000);
        assert_eq!(view.now_ms(), 2.5);
    }

    #[test]
    fn test_fixed_step_policy() {
        let clock = VirtualClock::default();
        let policy = SteppingPolicy::fixed_ms(1000.0 / 35.0);
        assert_eq!(policy, SteppingPolicy::FixedStep { step_ns: 28_571_429 });
        for _ in 0..35 {
            policy.step(&clock);
        }
        assert_eq!(clock.now_ns(), 35 * 28_571_429);

        let frozen = VirtualClock::default();
        SteppingPolicy::Free.step(&frozen);
        assert_eq!(frozen.now_ns(), 0);
    }

    #[test]
    fn test_system_clock_ignores_advance() {
        let clock = SystemClock::new();
        let before = clock.now_ms();
        clock.advance_ns(10_000_000_000);
        assert!(clock.now_ms() - before < 10_000.0);
    }
}
