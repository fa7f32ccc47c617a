//! Time management for the simulation
//!
//! The simulation advances in discrete ticks. One tick is one simulated
//! minute: every node moves once and every open transfer advances once.

use serde::{Deserialize, Serialize};

/// Minutes in one simulated hour.
pub const MINUTES_PER_HOUR: usize = 60;

/// Manages simulation time in discrete one-minute ticks
///
/// # Example
/// ```
/// use orbital_relay_sim::TimeManager;
///
/// let mut time = TimeManager::new();
/// assert_eq!(time.current_tick(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert_eq!(time.elapsed_minutes(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks (minutes) elapsed since simulation start
    current_tick: usize,
}

impl TimeManager {
    /// Create a clock positioned at minute zero
    pub fn new() -> Self {
        Self { current_tick: 0 }
    }

    /// Advance time by one tick (one simulated minute)
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Simulated minutes elapsed; identical to the tick count
    pub fn elapsed_minutes(&self) -> usize {
        self.current_tick
    }

    /// Whole simulated hours elapsed
    ///
    /// # Example
    /// ```
    /// use orbital_relay_sim::TimeManager;
    ///
    /// let mut time = TimeManager::new();
    /// for _ in 0..125 {
    ///     time.advance_tick();
    /// }
    /// assert_eq!(time.elapsed_hours(), 2);
    /// assert_eq!(time.minute_within_hour(), 5);
    /// ```
    pub fn elapsed_hours(&self) -> usize {
        self.current_tick / MINUTES_PER_HOUR
    }

    /// Minute within the current hour (0-indexed)
    pub fn minute_within_hour(&self) -> usize {
        self.current_tick % MINUTES_PER_HOUR
    }
}
