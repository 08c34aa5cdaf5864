//! # Telemetry frames
//!
//! One [`TelemFrame`] is pulled from the simulator per control cycle. It groups every feedback
//! item the autopilot reads: heading, velocity, lane position, pedal state, speed limit, vehicle
//! location and the lane geometry summary.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single cycle's worth of feedback from the simulator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TelemFrame {
    /// Time the frame was sampled by the simulator, if it reports one.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Vehicle heading.
    ///
    /// Units: degrees, measured counter-clockwise from the world +X axis.
    pub heading_deg: f64,

    /// Vehicle speed.
    ///
    /// Units: miles per hour
    pub speed_mph: f64,

    /// True if the vehicle is inside the lane boundaries.
    pub in_lane: bool,

    /// Signed lateral distance of the vehicle from the lane centre.
    ///
    /// Units: meters
    pub lane_offset_m: f64,

    /// Current brake pedal position, in the range [0, 1].
    #[serde(default)]
    pub brake_pedal: f64,

    /// Legal speed limit of the current road.
    ///
    /// Units: miles per hour
    pub speed_limit_mph: f64,

    /// Vehicle position in the world frame.
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Number of lane points the simulator holds for the current lane.
    #[serde(default)]
    pub num_lane_points: u32,

    /// Name of the lane the vehicle is currently in.
    pub lane_name: String,

    /// Raw lane point batch, see [`crate::eqpt::lane_points`].
    ///
    /// Only needs to be present when the lane name has changed since the previous frame.
    #[serde(default)]
    pub lane_points: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while parsing a telemetry frame.
#[derive(Debug, Error)]
pub enum TelemParseError {
    #[error("Telemetry frame contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Telemetry frame contains a non-finite value in {0}")]
    NonFinite(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelemFrame {
    /// Parse a frame from a JSON string.
    ///
    /// Frames holding NaN or infinite numbers are rejected, since they cannot be acted upon.
    pub fn from_json(json_str: &str) -> Result<Self, TelemParseError> {
        let frame: TelemFrame =
            serde_json::from_str(json_str).map_err(TelemParseError::InvalidJson)?;

        frame.validate()?;

        Ok(frame)
    }

    /// Check that every numeric field is finite.
    pub fn validate(&self) -> Result<(), TelemParseError> {
        let fields = [
            ("heading_deg", self.heading_deg),
            ("speed_mph", self.speed_mph),
            ("lane_offset_m", self.lane_offset_m),
            ("brake_pedal", self.brake_pedal),
            ("speed_limit_mph", self.speed_limit_mph),
            ("position_m[0]", self.position_m[0]),
            ("position_m[1]", self.position_m[1]),
            ("position_m[2]", self.position_m[2]),
        ];

        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(TelemParseError::NonFinite(*name)),
            None => Ok(()),
        }
    }
}
