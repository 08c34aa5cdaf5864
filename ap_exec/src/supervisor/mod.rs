//! # Autopilot supervisor
//!
//! The supervisor runs one control cycle per telemetry frame. It owns the lane tracker and the
//! only state carried between cycles (the previous lane offset and the autopilot mode), calls the
//! lateral and longitudinal controllers, and delivers their demands to the actuators.
//!
//! ## Modes
//!
//! The autopilot starts `Engaged`. When the vehicle leaves its lane the supervisor releases every
//! actuator once and becomes `Disengaged`, issuing nothing further until the vehicle is back in
//! lane, at which point control resumes.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::telem_client::TelemClientError;
use comms_if::eqpt::telem::TelemParseError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command issued to the vehicle by the supervisor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum ControlCommand {
    /// Steer to the given wheel angle, within [-188, 188] degrees.
    Steer { angle_deg: f64 },

    /// Set the accelerator pedal to a fraction of its travel.
    Throttle { fraction: f64 },

    /// Set the brake pedal to a fraction of its travel.
    Brake { fraction: f64 },

    /// Leave the pedals where they are.
    Hold,

    /// Hand every actuator back to the default driver.
    ReleaseAll,
}

/// Whether the autopilot is in control of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum AutopilotMode {
    Engaged,
    Disengaged,
}

/// Possible errors raised by the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("Could not load the supervisor parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not create the supervisor archive directory: {0}")]
    ArchiveDirError(util::session::SessionError),

    #[error("Could not open the supervisor archive: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("Feedback unavailable, cycle skipped: {0}")]
    FeedbackUnavailable(TelemClientError),

    #[error("Feedback contains invalid data, cycle skipped: {0}")]
    InvalidFeedback(TelemParseError),

    #[error("No more feedback is available")]
    EndOfFeedback,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AutopilotMode {
    fn default() -> Self {
        AutopilotMode::Engaged
    }
}

impl From<TelemClientError> for SupervisorError {
    fn from(e: TelemClientError) -> Self {
        match e {
            TelemClientError::EndOfReplay => SupervisorError::EndOfFeedback,
            e => SupervisorError::FeedbackUnavailable(e),
        }
    }
}
