//! # Localisation module
//!
//! Holds the geometric primitives of the autopilot and the per-cycle snapshot of the vehicle's
//! state.
//!
//! All positions are in the simulator's world frame. Bearings and headings are in degrees in the
//! range [0, 360), measured counter-clockwise from the world +X axis in the XY plane; the Z
//! coordinate never affects an angle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::telem::TelemFrame;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use util::maths::{map_pi_to_2pi, wrap_360_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point in 3D space, used for the vehicle position and for lane waypoints.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Snapshot of the vehicle, rebuilt from the telemetry at the start of every cycle.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct VehicleState {
    /// Position in the world frame.
    ///
    /// Units: meters
    pub position: Point3D,

    /// Heading of the vehicle.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Units: miles per hour
    pub speed_mph: f64,

    /// Signed lateral offset from the lane centre.
    ///
    /// Units: meters
    pub lat_offset_m: f64,

    /// True while the vehicle is within the lane boundaries.
    pub in_lane: bool,

    /// Legal speed on the current road, used as the desired speed.
    ///
    /// Units: miles per hour
    pub speed_limit_mph: f64,

    /// Brake pedal position as read back from the vehicle.
    pub brake_pedal: f64,

    /// Lane point count reported by the simulator.
    pub num_lane_points: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Bearing of this point as seen from `from`, in degrees.
    ///
    /// Coincident points (in XY) have a bearing of 0.
    pub fn direction_from(&self, from: &Point3D) -> f64 {
        let d = self.to_vector() - from.to_vector();

        wrap_360_deg(map_pi_to_2pi(d[1].atan2(d[0])).to_degrees())
    }

    /// Euclidian distance between two points.
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<&TelemFrame> for VehicleState {
    fn from(frame: &TelemFrame) -> Self {
        Self {
            position: Point3D::from(frame.position_m),
            heading_deg: frame.heading_deg,
            speed_mph: frame.speed_mph,
            lat_offset_m: frame.lane_offset_m,
            in_lane: frame.in_lane,
            speed_limit_mph: frame.speed_limit_mph,
            brake_pedal: frame.brake_pedal,
            num_lane_points: frame.num_lane_points,
        }
    }
}
