//! Movement engine
//!
//! Advances one node by one simulated minute. Angular velocity is
//! `linear_speed / height` in radians per minute. Profiles form a closed
//! set and only ever look at the node's own position and profile state:
//!
//! - **Fixed**: never moves
//! - **Clockwise / Anticlockwise**: monotonic with wraparound
//! - **Oscillating**: bounces inside the relay band [140°, 190°]; from
//!   outside the band it first heads whichever way reaches the band fastest
//! - **Teleporting**: travels until it crosses 180°, then lands on 0° and
//!   reverses direction

use crate::geometry::Angle;
use serde::{Deserialize, Serialize};

/// Lower edge of the relay band (degrees)
pub const RELAY_BAND_LOW: f64 = 140.0;
/// Upper edge of the relay band (degrees)
pub const RELAY_BAND_HIGH: f64 = 190.0;
/// Outside the band, positions in (190°, this] head clockwise
pub const RELAY_RETURN_SPLIT: f64 = 345.0;
/// Crossing this angle triggers a teleport
pub const TELEPORT_THRESHOLD: f64 = 180.0;

/// Direction of travel; anticlockwise increases the angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    Anticlockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::Anticlockwise,
            Direction::Anticlockwise => Direction::Clockwise,
        }
    }

    /// Signed rotation in radians for a step of `angular_velocity`
    fn signed(self, angular_velocity: f64) -> f64 {
        match self {
            Direction::Clockwise => -angular_velocity,
            Direction::Anticlockwise => angular_velocity,
        }
    }
}

/// How a node moves each minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionProfile {
    Fixed,
    Clockwise,
    Anticlockwise,
    Oscillating { direction: Direction },
    Teleporting { direction: Direction },
}

/// Result of one minute of movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub position: Angle,
    /// True when this step was a wrap-teleport reset
    pub teleported: bool,
}

impl Step {
    fn moved(position: Angle) -> Self {
        Self {
            position,
            teleported: false,
        }
    }
}

impl MotionProfile {
    /// Relay profile; starts clockwise and re-aims itself outside the band
    pub fn oscillating() -> Self {
        MotionProfile::Oscillating {
            direction: Direction::Clockwise,
        }
    }

    /// Teleporting profile; starts anticlockwise
    pub fn teleporting() -> Self {
        MotionProfile::Teleporting {
            direction: Direction::Anticlockwise,
        }
    }

    /// Current direction of travel, if the profile moves at all
    pub fn direction(&self) -> Option<Direction> {
        match self {
            MotionProfile::Fixed => None,
            MotionProfile::Clockwise => Some(Direction::Clockwise),
            MotionProfile::Anticlockwise => Some(Direction::Anticlockwise),
            MotionProfile::Oscillating { direction } | MotionProfile::Teleporting { direction } => {
                Some(*direction)
            }
        }
    }

    /// Advance one minute from `position` at `angular_velocity` rad/min
    ///
    /// # Example
    /// ```
    /// use orbital_relay_sim::geometry::Angle;
    /// use orbital_relay_sim::movement::MotionProfile;
    ///
    /// let mut profile = MotionProfile::Clockwise;
    /// let step = profile.advance(Angle::from_degrees(0.5), 1.0_f64.to_radians());
    /// assert!((step.position.degrees() - 359.5).abs() < 1e-9);
    /// assert!(!step.teleported);
    /// ```
    pub fn advance(&mut self, position: Angle, angular_velocity: f64) -> Step {
        match self {
            MotionProfile::Fixed => Step::moved(position),
            MotionProfile::Clockwise => {
                Step::moved(position.rotated_by(Direction::Clockwise.signed(angular_velocity)))
            }
            MotionProfile::Anticlockwise => {
                Step::moved(position.rotated_by(Direction::Anticlockwise.signed(angular_velocity)))
            }
            MotionProfile::Oscillating { direction } => {
                if !position.within(RELAY_BAND_LOW, RELAY_BAND_HIGH) {
                    *direction = fastest_way_to_band(position);
                }
                Step::moved(position.rotated_by(direction.signed(angular_velocity)))
            }
            MotionProfile::Teleporting { direction } => {
                let delta = angular_velocity.to_degrees();
                if crosses_threshold(position.degrees(), delta, *direction) {
                    *direction = direction.reversed();
                    return Step {
                        position: Angle::from_degrees(0.0),
                        teleported: true,
                    };
                }
                Step::moved(position.rotated_by(direction.signed(angular_velocity)))
            }
        }
    }
}

/// Direction that brings an out-of-band relay back soonest
fn fastest_way_to_band(position: Angle) -> Direction {
    let degrees = position.degrees();
    if degrees > RELAY_BAND_HIGH && degrees <= RELAY_RETURN_SPLIT {
        Direction::Clockwise
    } else {
        Direction::Anticlockwise
    }
}

/// Whether moving `delta` degrees from `from` crosses the teleport line
///
/// Only a genuine crossing counts: a node already past 180° in its direction
/// of travel has to wrap through 0° before it can reach the line again.
fn crosses_threshold(from: f64, delta: f64, direction: Direction) -> bool {
    match direction {
        Direction::Anticlockwise => from < TELEPORT_THRESHOLD && from + delta >= TELEPORT_THRESHOLD,
        Direction::Clockwise => from > TELEPORT_THRESHOLD && from - delta <= TELEPORT_THRESHOLD,
    }
}
