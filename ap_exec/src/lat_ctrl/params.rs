//! Lateral control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lateral control
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Proportional gain on the lane offset.
    ///
    /// Units: degrees/meter
    pub offset_k_p: f64,

    /// Gain on the change in lane offset since the last steering demand, scaled by speed.
    ///
    /// Units: degrees/(meter * mph)
    pub offset_k_d: f64,

    /// Gain on the angle between the heading and the bearing to the lookahead waypoint.
    pub lookahead_k: f64,

    /// Steering is only computed above this speed.
    ///
    /// Units: miles per hour
    pub min_speed_mph: f64,

    /// Limit on the absolute steering demand.
    ///
    /// Units: degrees
    pub max_steer_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            offset_k_p: 50.0,
            offset_k_d: 15.0,
            lookahead_k: 0.38,
            min_speed_mph: 1.0,
            max_steer_deg: comms_if::eqpt::act::MAX_STEER_ANGLE_DEG,
        }
    }
}
