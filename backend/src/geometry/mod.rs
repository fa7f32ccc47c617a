//! Geometry oracle for the orbital plane
//!
//! Every node lives on a circle around the body centre, described by a
//! height (distance from the centre, km) and an angular position. Ground
//! devices sit on the surface, i.e. at `RADIUS_OF_JUPITER`.
//!
//! All functions here are pure and total over finite inputs:
//! - `distance`: chord length between two placements (cosine rule)
//! - `is_visible`: the straight segment between two placements does not
//!   pass through the body
//! - `line_of_sight`: the node-level rule, which additionally says two
//!   ground devices never see each other

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Radius of the simulated body in km
pub const RADIUS_OF_JUPITER: f64 = 69_911.0;

/// Slack (km) so a surface endpoint does not obstruct its own segment
const SURFACE_TOLERANCE: f64 = 1e-3;

const FULL_TURN_DEGREES: f64 = 360.0;

// ============================================================================
// Angle
// ============================================================================

/// Angular position, always normalised into `[0°, 360°)`
///
/// Anticlockwise is the direction of increasing angle.
///
/// # Example
/// ```
/// use orbital_relay_sim::geometry::Angle;
///
/// let a = Angle::from_degrees(-30.0);
/// assert_eq!(a.degrees(), 330.0);
///
/// let b = Angle::from_degrees(725.0);
/// assert!((b.degrees() - 5.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    /// Build from degrees, wrapping into `[0, 360)`
    pub fn from_degrees(degrees: f64) -> Self {
        let mut wrapped = degrees.rem_euclid(FULL_TURN_DEGREES);
        // rem_euclid rounds tiny negative inputs up to exactly 360.0
        if wrapped >= FULL_TURN_DEGREES {
            wrapped = 0.0;
        }
        Self { degrees: wrapped }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Rotate anticlockwise by `radians` (negative rotates clockwise)
    pub fn rotated_by(&self, radians: f64) -> Self {
        Self::from_degrees(self.degrees + radians.to_degrees())
    }

    /// Smallest angular separation in radians, within `[0, π]`
    pub fn separation(&self, other: &Angle) -> f64 {
        let diff = (self.radians() - other.radians()).abs();
        if diff > PI {
            2.0 * PI - diff
        } else {
            diff
        }
    }

    /// Whether the angle lies in the closed band `[low, high]` (degrees, low <= high)
    pub fn within(&self, low: f64, high: f64) -> bool {
        self.degrees >= low && self.degrees <= high
    }
}

impl From<f64> for Angle {
    fn from(degrees: f64) -> Self {
        Angle::from_degrees(degrees)
    }
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> Self {
        angle.degrees
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°", self.degrees)
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where a node sits in the orbital plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Distance from the body centre (km)
    pub height: f64,
    pub position: Angle,
    /// True for ground devices on the body surface
    pub grounded: bool,
}

impl Placement {
    pub fn orbiting(height: f64, position: Angle) -> Self {
        Self {
            height,
            position,
            grounded: false,
        }
    }

    pub fn on_surface(position: Angle) -> Self {
        Self {
            height: RADIUS_OF_JUPITER,
            position,
            grounded: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn polar(height: f64, position: Angle) -> Self {
        let theta = position.radians();
        Self {
            x: height * theta.cos(),
            y: height * theta.sin(),
        }
    }
}

// ============================================================================
// Oracle functions
// ============================================================================

/// Chord length between two placements (km)
///
/// # Example
/// ```
/// use orbital_relay_sim::geometry::{distance, Angle};
///
/// let d = distance(100.0, Angle::from_degrees(0.0), 100.0, Angle::from_degrees(180.0));
/// assert!((d - 200.0).abs() < 1e-9);
/// ```
pub fn distance(height_a: f64, position_a: Angle, height_b: f64, position_b: Angle) -> f64 {
    let gamma = position_a.separation(&position_b);
    let squared = height_a * height_a + height_b * height_b - 2.0 * height_a * height_b * gamma.cos();
    squared.max(0.0).sqrt()
}

/// Chord length from an orbiting point to a ground point
pub fn distance_to_surface(height: f64, position: Angle, ground_position: Angle) -> f64 {
    distance(height, position, RADIUS_OF_JUPITER, ground_position)
}

/// Whether the segment between two points clears the body
///
/// Closest approach of the segment to the centre must not fall below the
/// body radius.
pub fn is_visible(height_a: f64, position_a: Angle, height_b: f64, position_b: Angle) -> bool {
    let p1 = Point::polar(height_a, position_a);
    let p2 = Point::polar(height_b, position_b);
    let limit = RADIUS_OF_JUPITER - SURFACE_TOLERANCE;

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p1.x * p1.x + p1.y * p1.y >= limit * limit;
    }

    let t = (-(p1.x * dx + p1.y * dy) / len2).clamp(0.0, 1.0);
    let cx = p1.x + t * dx;
    let cy = p1.y + t * dy;
    cx * cx + cy * cy >= limit * limit
}

/// Visibility between an orbiting point and a ground point
pub fn is_visible_from_surface(height: f64, position: Angle, ground_position: Angle) -> bool {
    is_visible(height, position, RADIUS_OF_JUPITER, ground_position)
}

/// Node-level line of sight; two ground devices never see each other
pub fn line_of_sight(a: &Placement, b: &Placement) -> bool {
    match (a.grounded, b.grounded) {
        (true, true) => false,
        (true, false) => is_visible_from_surface(b.height, b.position, a.position),
        (false, true) => is_visible_from_surface(a.height, a.position, b.position),
        (false, false) => is_visible(a.height, a.position, b.height, b.position),
    }
}

/// Chord length between two placements
pub fn placement_distance(a: &Placement, b: &Placement) -> f64 {
    distance(a.height, a.position, b.height, b.position)
}
