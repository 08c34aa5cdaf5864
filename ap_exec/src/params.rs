//! # Autopilot Executable Parameters
//!
//! This module provides parameters for the autopilot executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest accepted cycle period.
///
/// Units: seconds
pub const MAX_CYCLE_PERIOD_S: f64 = 60.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive cycles without feedback after which an error is raised.
    pub max_consec_feedback_errors: u64,

    /// Sleep for the remainder of each cycle. When false a replay runs as fast as possible.
    pub realtime: bool,

    /// Write the supervisor status report and actuator demands to the session archives.
    pub archive_enabled: bool,

    /// Show the display line every cycle.
    pub display_enabled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ApExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            max_consec_feedback_errors: 5,
            realtime: true,
            archive_enabled: true,
            display_enabled: true,
        }
    }
}

impl ApExecParams {
    /// The cycle period, or `None` if it is not a finite value in (0, `MAX_CYCLE_PERIOD_S`].
    pub fn cycle_period(&self) -> Option<Duration> {
        let p = self.cycle_period_s;

        if p.is_finite() && p > 0.0 && p <= MAX_CYCLE_PERIOD_S {
            Some(Duration::from_secs_f64(p))
        } else {
            None
        }
    }
}
