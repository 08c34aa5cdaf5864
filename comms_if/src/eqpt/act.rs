//! # Actuator Equipment Demands
//!
//! The simulated vehicle exposes three actuators: the steering wheel and the two pedals. Each one
//! can be driven to a value or released back to the default (human) driver.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum absolute steering wheel angle accepted by the vehicle.
///
/// Units: degrees
pub const MAX_STEER_ANGLE_DEG: f64 = 188.0;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the actuators available on the vehicle
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// Steering wheel angle in degrees
    Steering,
    /// Accelerator pedal position in [0, 1]
    Throttle,
    /// Brake pedal position in [0, 1]
    Brake,
}

/// A single demand sent to an actuator.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum ActDem {
    /// Drive the actuator to the given value
    Set(f64),

    /// Hand the actuator back to the default driver
    Release,
}

/// Response from the vehicle to a demand.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ActDemResponse {
    /// Demand was valid and will be executed
    DemOk,

    /// Demand was invalid and has been rejected
    DemInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActId {
    /// The closed range of values the actuator accepts.
    pub fn range(&self) -> (f64, f64) {
        match self {
            ActId::Steering => (-MAX_STEER_ANGLE_DEG, MAX_STEER_ANGLE_DEG),
            ActId::Throttle | ActId::Brake => (0.0, 1.0),
        }
    }

    /// Check a demand against the actuator's range.
    pub fn check(&self, dem: ActDem) -> ActDemResponse {
        match dem {
            ActDem::Release => ActDemResponse::DemOk,
            ActDem::Set(v) => {
                let (min, max) = self.range();
                if v.is_finite() && v >= min && v <= max {
                    ActDemResponse::DemOk
                } else {
                    ActDemResponse::DemInvalid
                }
            }
        }
    }
}
