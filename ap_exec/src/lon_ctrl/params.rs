//! Longitudinal control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Band thresholds and pedal demands for longitudinal control.
///
/// Thresholds are upper bounds (exclusive) on the speed gap in mph.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    // ---- UNDER DESIRED SPEED ----
    /// Below this gap the vehicle coasts.
    pub under_coast_gap_mph: f64,

    /// Below this gap the low throttle demand is used, above it the high one.
    pub under_low_gap_mph: f64,

    pub throttle_low: f64,

    pub throttle_high: f64,

    // ---- OVER DESIRED SPEED ----
    /// Below this gap the pedals are left as they are.
    pub over_hold_gap_mph: f64,

    /// Below this gap the low brake demand is used.
    pub over_low_gap_mph: f64,

    /// Below this gap the mid brake demand is used, above it the high one.
    pub over_mid_gap_mph: f64,

    pub brake_low: f64,

    pub brake_mid: f64,

    pub brake_high: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            under_coast_gap_mph: 1.0,
            under_low_gap_mph: 5.0,
            throttle_low: 0.3,
            throttle_high: 0.5,
            over_hold_gap_mph: 1.0,
            over_low_gap_mph: 3.0,
            over_mid_gap_mph: 5.0,
            brake_low: 0.3,
            brake_mid: 0.5,
            brake_high: 0.7,
        }
    }
}
