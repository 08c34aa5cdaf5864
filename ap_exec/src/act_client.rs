//! # Actuator Client
//!
//! The autopilot drives three actuators: steering, throttle and brake. Each is reached through
//! the [`Actuator`] capability trait so that the supervisor does not depend on how demands reach
//! the vehicle.
//!
//! [`LoggedActuator`] is the implementation used when running from a replay: demands are checked
//! against the actuator's range, logged, and optionally archived to CSV in the session.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::act::{ActDem, ActDemResponse, ActId};
use log::{debug, warn};
use serde::Serialize;

use util::{
    archive::{self, Archiver},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An actuator which accepts demands from the autopilot.
pub trait Actuator {
    /// The actuator driven by this capability.
    fn id(&self) -> ActId;

    /// Drive the actuator to the given value.
    fn set(&mut self, value: f64) -> Result<(), ActuatorError>;

    /// Hand the actuator back to the default driver.
    fn release(&mut self) -> Result<(), ActuatorError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The full set of actuators used by the autopilot.
pub struct ActuatorSet {
    pub steering: Box<dyn Actuator>,
    pub throttle: Box<dyn Actuator>,
    pub brake: Box<dyn Actuator>,
}

/// An actuator which logs the demands it receives.
pub struct LoggedActuator {
    id: ActId,

    last_dem: Option<ActDem>,

    num_rejected: u64,

    arch: Archiver,
}

/// A single archived demand.
#[derive(Serialize)]
struct DemRecord {
    time_s: f64,
    actuator: ActId,
    released: bool,
    value: Option<f64>,
    response: ActDemResponse,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("{id:?} rejected the demand {value} ({response:?})")]
    Rejected {
        id: ActId,
        value: f64,
        response: ActDemResponse,
    },

    #[error("{0:?} could not be released: {1}")]
    ReleaseFailed(ActId, String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActuatorSet {
    /// Build a set of logged actuators, archiving demands if a session is given.
    pub fn logged(session: Option<&Session>) -> Result<Self, archive::ArchiveError> {
        let build = |id| match session {
            Some(s) => LoggedActuator::with_archive(id, s),
            None => Ok(LoggedActuator::new(id)),
        };

        Ok(Self {
            steering: Box::new(build(ActId::Steering)?),
            throttle: Box::new(build(ActId::Throttle)?),
            brake: Box::new(build(ActId::Brake)?),
        })
    }

    /// Release every actuator, returning the errors from those which failed.
    ///
    /// All three are released even if one fails.
    pub fn release_all(&mut self) -> Vec<ActuatorError> {
        vec![
            self.steering.release(),
            self.throttle.release(),
            self.brake.release(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}

impl LoggedActuator {
    /// Create an actuator which only logs its demands.
    pub fn new(id: ActId) -> Self {
        Self {
            id,
            last_dem: None,
            num_rejected: 0,
            arch: Archiver::default(),
        }
    }

    /// Create an actuator which also archives its demands in `act_<id>.csv` of the session.
    pub fn with_archive(id: ActId, session: &Session) -> Result<Self, archive::ArchiveError> {
        let file_name = format!("act_{:?}.csv", id).to_lowercase();

        Ok(Self {
            arch: Archiver::from_path(session, file_name)?,
            ..Self::new(id)
        })
    }

    /// The last demand accepted by the actuator.
    pub fn last_dem(&self) -> Option<ActDem> {
        self.last_dem
    }

    /// Number of demands rejected since creation.
    pub fn num_rejected(&self) -> u64 {
        self.num_rejected
    }

    fn demand(&mut self, dem: ActDem) -> ActDemResponse {
        let response = self.id.check(dem);

        debug!("{:?} <- {:?}: {:?}", self.id, dem, response);

        if self.arch.is_init() {
            let (released, value) = match dem {
                ActDem::Set(v) => (false, Some(v)),
                ActDem::Release => (true, None),
            };

            let record = DemRecord {
                time_s: archive::stamp(),
                actuator: self.id,
                released,
                value,
                response,
            };

            // Archive failures do not reject the demand
            if let Err(e) = self.arch.serialise(record) {
                warn!("Could not archive {:?} demand: {}", self.id, e);
            }
        }

        match response {
            ActDemResponse::DemOk => self.last_dem = Some(dem),
            _ => self.num_rejected += 1,
        }

        response
    }
}

impl Actuator for LoggedActuator {
    fn id(&self) -> ActId {
        self.id
    }

    fn set(&mut self, value: f64) -> Result<(), ActuatorError> {
        match self.demand(ActDem::Set(value)) {
            ActDemResponse::DemOk => Ok(()),
            response => Err(ActuatorError::Rejected {
                id: self.id,
                value,
                response,
            }),
        }
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        match self.demand(ActDem::Release) {
            ActDemResponse::DemOk => Ok(()),
            response => Err(ActuatorError::ReleaseFailed(
                self.id,
                format!("{:?}", response),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_logged_actuator() {
        let mut steer = LoggedActuator::new(ActId::Steering);
        assert_eq!(steer.id(), ActId::Steering);
        assert_eq!(steer.last_dem(), None);

        steer.set(-10.0).unwrap();
        assert_eq!(steer.last_dem(), Some(ActDem::Set(-10.0)));

        match steer.set(200.0) {
            Err(ActuatorError::Rejected { id, value, response }) => {
                assert_eq!(id, ActId::Steering);
                assert_eq!(value, 200.0);
                assert_eq!(response, ActDemResponse::DemInvalid);
            }
            r => panic!("Expected rejection, got {:?}", r),
        }

        // A rejected demand leaves the last accepted one in place
        assert_eq!(steer.last_dem(), Some(ActDem::Set(-10.0)));
        assert_eq!(steer.num_rejected(), 1);

        steer.release().unwrap();
        assert_eq!(steer.last_dem(), Some(ActDem::Release));
    }

    #[test]
    fn test_pedal_range() {
        let mut brake = LoggedActuator::new(ActId::Brake);
        assert!(brake.set(0.7).is_ok());
        assert!(brake.set(1.5).is_err());
        assert!(brake.set(-0.1).is_err());
        assert_eq!(brake.num_rejected(), 2);
    }

    #[test]
    fn test_release_all() {
        let mut set = ActuatorSet::logged(None).unwrap();
        set.steering.set(5.0).unwrap();
        set.throttle.set(0.3).unwrap();

        assert!(set.release_all().is_empty());
    }
}
