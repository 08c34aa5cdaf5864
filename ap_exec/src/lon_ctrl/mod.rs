//! # Longitudinal control module
//!
//! Speed is held near the legal limit with a band controller: the gap between the current and the
//! desired speed selects one of seven bands, each mapped to a fixed pedal demand.
//!
//! | Side           | Gap (mph)  | Band           | Throttle | Brake |
//! |----------------|------------|----------------|----------|-------|
//! | under desired  | < 1        | `Coast`        | 0        | 0     |
//! | under desired  | < 5        | `ThrottleLow`  | 0.3      | 0     |
//! | under desired  | >= 5       | `ThrottleHigh` | 0.5      | 0     |
//! | over or equal  | < 1        | `Hold`         | -        | -     |
//! | over or equal  | < 3        | `BrakeLow`     | 0        | 0.3   |
//! | over or equal  | < 5        | `BrakeMid`     | 0        | 0.5   |
//! | over or equal  | >= 5       | `BrakeHigh`    | 0        | 0.7   |
//!
//! `Hold` leaves both pedals where they are.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pedal demands for one cycle. `None` means the pedal is not commanded.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LonCtrlOutput {
    pub band: LonBand,
    pub throttle: Option<f64>,
    pub brake: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The speed bands of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LonBand {
    Coast,
    ThrottleLow,
    ThrottleHigh,
    Hold,
    BrakeLow,
    BrakeMid,
    BrakeHigh,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the band for the current speed.
pub fn select_band(desired_speed_mph: f64, current_speed_mph: f64, params: &Params) -> LonBand {
    if desired_speed_mph > current_speed_mph {
        let gap = desired_speed_mph - current_speed_mph;

        if gap < params.under_coast_gap_mph {
            LonBand::Coast
        } else if gap < params.under_low_gap_mph {
            LonBand::ThrottleLow
        } else {
            LonBand::ThrottleHigh
        }
    } else {
        let gap = current_speed_mph - desired_speed_mph;

        if gap < params.over_hold_gap_mph {
            LonBand::Hold
        } else if gap < params.over_low_gap_mph {
            LonBand::BrakeLow
        } else if gap < params.over_mid_gap_mph {
            LonBand::BrakeMid
        } else {
            LonBand::BrakeHigh
        }
    }
}

/// Calculate the pedal demands for the current speed.
pub fn calc_pedals(
    desired_speed_mph: f64,
    current_speed_mph: f64,
    params: &Params,
) -> LonCtrlOutput {
    let band = select_band(desired_speed_mph, current_speed_mph, params);

    let (throttle, brake) = match band {
        LonBand::Coast => (Some(0.0), Some(0.0)),
        LonBand::ThrottleLow => (Some(params.throttle_low), Some(0.0)),
        LonBand::ThrottleHigh => (Some(params.throttle_high), Some(0.0)),
        LonBand::Hold => (None, None),
        LonBand::BrakeLow => (Some(0.0), Some(params.brake_low)),
        LonBand::BrakeMid => (Some(0.0), Some(params.brake_mid)),
        LonBand::BrakeHigh => (Some(0.0), Some(params.brake_high)),
    };

    LonCtrlOutput {
        band,
        throttle,
        brake,
    }
}
