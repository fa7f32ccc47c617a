//! Node model
//!
//! A node is a ground device or an orbiting satellite. The kind is a closed
//! sum type; support rules, motion profile selection and storage capability
//! are all exhaustive matches over it.
//!
//! # Catalogue
//!
//! | Kind | Range (km) | Speed (km/min) | Store | Bandwidth up/down |
//! |---|---|---|---|---|
//! | Handheld | 50 000 | 0 (50 mobile) | unbounded | unlimited |
//! | Laptop | 100 000 | 0 (30 mobile) | unbounded | unlimited |
//! | Desktop | 200 000 | 0 (20 mobile) | unbounded | unlimited |
//! | Standard | 150 000 | 2 500 | 3 files / 80 bytes | 1 / 1 |
//! | Teleporting | 200 000 | 1 000 | 200 bytes | 10 / 15 |
//! | Relay | 300 000 | 1 500 | none | none |

use crate::geometry::{Angle, Placement, RADIUS_OF_JUPITER};
use crate::models::bandwidth::{Bandwidth, BandwidthProfile};
use crate::models::file::{FileStore, StoreLimits};
use crate::movement::{MotionProfile, Step};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ground device models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Handheld,
    Laptop,
    Desktop,
}

/// Satellite models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatelliteKind {
    Standard,
    Teleporting,
    Relay,
}

/// Every kind of node in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Device(DeviceKind),
    Satellite(SatelliteKind),
}

impl NodeKind {
    pub fn is_device(self) -> bool {
        matches!(self, NodeKind::Device(_))
    }

    /// Relay-capable nodes extend reachability but hold no files
    pub fn is_relay(self) -> bool {
        matches!(self, NodeKind::Satellite(SatelliteKind::Relay))
    }

    /// Whether this kind will exchange data with `other`
    ///
    /// Devices talk only to satellites; standard satellites refuse desktops.
    pub fn supports(self, other: NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Device(_), NodeKind::Device(_)) => false,
            (NodeKind::Device(_), NodeKind::Satellite(_)) => true,
            (NodeKind::Satellite(SatelliteKind::Standard), NodeKind::Device(DeviceKind::Desktop)) => false,
            (NodeKind::Satellite(_), _) => true,
        }
    }

    /// Communication range in km
    pub fn range(self) -> f64 {
        match self {
            NodeKind::Device(DeviceKind::Handheld) => 50_000.0,
            NodeKind::Device(DeviceKind::Laptop) => 100_000.0,
            NodeKind::Device(DeviceKind::Desktop) => 200_000.0,
            NodeKind::Satellite(SatelliteKind::Standard) => 150_000.0,
            NodeKind::Satellite(SatelliteKind::Teleporting) => 200_000.0,
            NodeKind::Satellite(SatelliteKind::Relay) => 300_000.0,
        }
    }

    /// Storage limits, or `None` for kinds that cannot hold files
    pub fn store_limits(self) -> Option<StoreLimits> {
        match self {
            NodeKind::Device(_) => Some(StoreLimits::unbounded()),
            NodeKind::Satellite(SatelliteKind::Standard) => Some(StoreLimits::new(Some(3), Some(80))),
            NodeKind::Satellite(SatelliteKind::Teleporting) => Some(StoreLimits::new(None, Some(200))),
            NodeKind::Satellite(SatelliteKind::Relay) => None,
        }
    }

    /// Bandwidth profile, or `None` for kinds that never transfer
    pub fn bandwidth_profile(self) -> Option<BandwidthProfile> {
        match self {
            NodeKind::Device(_) => Some(BandwidthProfile::unlimited()),
            NodeKind::Satellite(SatelliteKind::Standard) => Some(BandwidthProfile::new(Some(1), Some(1))),
            NodeKind::Satellite(SatelliteKind::Teleporting) => Some(BandwidthProfile::new(Some(10), Some(15))),
            NodeKind::Satellite(SatelliteKind::Relay) => None,
        }
    }
}

impl DeviceKind {
    /// Surface speed in km/min when the device is mobile
    pub fn mobile_speed(self) -> f64 {
        match self {
            DeviceKind::Handheld => 50.0,
            DeviceKind::Laptop => 30.0,
            DeviceKind::Desktop => 20.0,
        }
    }
}

impl SatelliteKind {
    /// Orbital speed in km/min
    pub fn speed(self) -> f64 {
        match self {
            SatelliteKind::Standard => 2_500.0,
            SatelliteKind::Teleporting => 1_000.0,
            SatelliteKind::Relay => 1_500.0,
        }
    }

    pub fn motion_profile(self) -> MotionProfile {
        match self {
            SatelliteKind::Standard => MotionProfile::Clockwise,
            SatelliteKind::Teleporting => MotionProfile::teleporting(),
            SatelliteKind::Relay => MotionProfile::oscillating(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Device(DeviceKind::Handheld) => "HandheldDevice",
            NodeKind::Device(DeviceKind::Laptop) => "LaptopDevice",
            NodeKind::Device(DeviceKind::Desktop) => "DesktopDevice",
            NodeKind::Satellite(SatelliteKind::Standard) => "StandardSatellite",
            NodeKind::Satellite(SatelliteKind::Teleporting) => "TeleportingSatellite",
            NodeKind::Satellite(SatelliteKind::Relay) => "RelaySatellite",
        };
        f.write_str(name)
    }
}

/// A device or satellite participating in the simulation
///
/// # Example
/// ```
/// use orbital_relay_sim::geometry::Angle;
/// use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind};
///
/// let phone = Node::device("phone", DeviceKind::Handheld, Angle::from_degrees(30.0), false);
/// let relay = Node::satellite("r1", SatelliteKind::Relay, 80_000.0, Angle::from_degrees(150.0));
///
/// assert!(phone.store().is_some());
/// assert!(relay.store().is_none());
/// assert!(relay.is_relay());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    kind: NodeKind,
    position: Angle,
    /// Distance from the body centre (km), always > 0
    height: f64,
    range: f64,
    /// Linear speed in km/min
    linear_speed: f64,
    motion: MotionProfile,
    store: Option<FileStore>,
    bandwidth: Option<Bandwidth>,
}

impl Node {
    /// A ground device on the surface; mobile devices creep anticlockwise
    pub fn device(id: impl Into<String>, kind: DeviceKind, position: Angle, mobile: bool) -> Self {
        let node_kind = NodeKind::Device(kind);
        let (linear_speed, motion) = if mobile {
            (kind.mobile_speed(), MotionProfile::Anticlockwise)
        } else {
            (0.0, MotionProfile::Fixed)
        };
        Self::assemble(id.into(), node_kind, position, RADIUS_OF_JUPITER, linear_speed, motion)
    }

    /// An orbiting satellite at `height` km from the body centre
    pub fn satellite(id: impl Into<String>, kind: SatelliteKind, height: f64, position: Angle) -> Self {
        Self::assemble(
            id.into(),
            NodeKind::Satellite(kind),
            position,
            height,
            kind.speed(),
            kind.motion_profile(),
        )
    }

    fn assemble(
        id: String,
        kind: NodeKind,
        position: Angle,
        height: f64,
        linear_speed: f64,
        motion: MotionProfile,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            height,
            range: kind.range(),
            linear_speed,
            motion,
            store: kind.store_limits().map(FileStore::new),
            bandwidth: kind.bandwidth_profile().map(Bandwidth::new),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Angle {
        self.position
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn linear_speed(&self) -> f64 {
        self.linear_speed
    }

    pub fn motion(&self) -> &MotionProfile {
        &self.motion
    }

    pub fn is_device(&self) -> bool {
        self.kind.is_device()
    }

    pub fn is_relay(&self) -> bool {
        self.kind.is_relay()
    }

    /// Radians per minute
    pub fn angular_velocity(&self) -> f64 {
        self.linear_speed / self.height
    }

    pub fn placement(&self) -> Placement {
        if self.is_device() {
            Placement::on_surface(self.position)
        } else {
            Placement::orbiting(self.height, self.position)
        }
    }

    pub fn store(&self) -> Option<&FileStore> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut FileStore> {
        self.store.as_mut()
    }

    pub fn bandwidth(&self) -> Option<&Bandwidth> {
        self.bandwidth.as_ref()
    }

    pub fn bandwidth_mut(&mut self) -> Option<&mut Bandwidth> {
        self.bandwidth.as_mut()
    }

    /// Move one simulated minute according to the motion profile
    pub fn advance(&mut self) -> Step {
        let step = self.motion.advance(self.position, self.angular_velocity());
        self.position = step.position;
        step
    }
}
