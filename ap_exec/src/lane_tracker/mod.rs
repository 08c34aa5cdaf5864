//! # Lane tracking module
//!
//! The lane tracker keeps the ordered list of upcoming waypoints of the lane the vehicle is
//! driving in. The list is refreshed wholesale whenever the simulator reports a new lane name, and
//! is pruned every cycle so that only points in front of the vehicle remain. The first remaining
//! point is the lookahead target used by lateral control.

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
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by the lane tracker.
#[derive(Debug, thiserror::Error)]
pub enum LaneTrackerError {
    /// The raw batch for a new lane could not be decoded. The previous waypoints are kept.
    #[error("Malformed waypoint batch for lane \"{0}\": {1}")]
    MalformedWaypointBatch(String, comms_if::eqpt::lane_points::LanePointsError),
}

/// Outcome of offering a lane batch to the tracker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LaneUpdate {
    /// The lane has not changed, the batch was ignored.
    Unchanged,

    /// The waypoints were replaced with this many new points.
    Replaced(usize),
}
