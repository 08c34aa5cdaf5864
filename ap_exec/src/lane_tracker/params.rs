//! Lane tracker parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the lane tracker
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Waypoints whose bearing differs from the vehicle heading by more than this are behind the
    /// vehicle and get pruned.
    ///
    /// Units: degrees
    pub prune_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            prune_angle_deg: 90.0,
        }
    }
}
