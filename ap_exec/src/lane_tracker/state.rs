//! Lane tracker state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{LaneTrackerError, LaneUpdate, Params};
use crate::loc::Point3D;
use comms_if::eqpt::lane_points;
use util::maths::abs_ang_diff_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The lane currently being tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneState {
    /// Name of the lane as reported by the simulator.
    pub name: String,

    /// Upcoming waypoints of the lane, nearest first.
    pub waypoints: Vec<Point3D>,

    /// Set when the reported lane name differs from `name`, meaning a new batch of waypoints must
    /// be requested and decoded. Cleared once the new batch has been decoded.
    pub is_dirty: bool,
}

/// Lane tracker.
///
/// The waypoint list is only ever replaced as a whole, from a freshly decoded batch, or shortened
/// by [`LaneTracker::prune`].
#[derive(Debug, Clone, Default)]
pub struct LaneTracker {
    params: Params,
    state: LaneState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneTracker {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            state: LaneState::default(),
        }
    }

    pub fn state(&self) -> &LaneState {
        &self.state
    }

    pub fn num_waypoints(&self) -> usize {
        self.state.waypoints.len()
    }

    /// Compare the lane name reported this cycle against the tracked one.
    ///
    /// Returns `true` if a new waypoint batch is needed, in which case the caller should fetch one
    /// and pass it to [`LaneTracker::on_lane_changed`].
    pub fn observe_lane_name(&mut self, name: &str) -> bool {
        if name != self.state.name {
            if !self.state.is_dirty {
                debug!("Lane changed from \"{}\" to \"{}\"", self.state.name, name);
            }
            self.state.is_dirty = true;
        }

        self.state.is_dirty
    }

    /// Offer a raw waypoint batch for the lane `new_name`.
    ///
    /// If the lane differs from the tracked one (or a refresh is pending) the batch is decoded and
    /// replaces the current waypoints. On a decoding failure nothing is changed apart from the
    /// dirty flag, which stays set so that the batch is requested again.
    pub fn on_lane_changed(
        &mut self,
        new_name: &str,
        raw_batch: &str,
    ) -> Result<LaneUpdate, LaneTrackerError> {
        if new_name == self.state.name && !self.state.is_dirty {
            return Ok(LaneUpdate::Unchanged);
        }

        let points = match lane_points::decode(raw_batch) {
            Ok(p) => p,
            Err(e) => {
                self.state.is_dirty = true;
                return Err(LaneTrackerError::MalformedWaypointBatch(
                    new_name.to_string(),
                    e,
                ));
            }
        };

        let num_points = points.len();

        self.state = LaneState {
            name: new_name.to_string(),
            waypoints: points.into_iter().map(Point3D::from).collect(),
            is_dirty: false,
        };

        debug!(
            "Loaded {} waypoints for lane \"{}\"",
            num_points, self.state.name
        );

        Ok(LaneUpdate::Replaced(num_points))
    }

    /// Remove the waypoints which are behind the vehicle.
    ///
    /// A waypoint is behind when the unsigned angle between the vehicle heading and the bearing
    /// from the vehicle to the point is greater than the prune angle. Returns the number of points
    /// removed.
    pub fn prune(&mut self, position: &Point3D, heading_deg: f64) -> usize {
        let num_before = self.state.waypoints.len();
        let limit_deg = self.params.prune_angle_deg;

        self.state
            .waypoints
            .retain(|wp| abs_ang_diff_deg(wp.direction_from(position), heading_deg) <= limit_deg);

        let num_removed = num_before - self.state.waypoints.len();

        if num_removed > 0 {
            trace!(
                "Pruned {} waypoints, {} remain",
                num_removed,
                self.state.waypoints.len()
            );
        }

        num_removed
    }

    /// The nearest waypoint still ahead of the vehicle, if any.
    pub fn nearest(&self) -> Option<Point3D> {
        self.state.waypoints.first().copied()
    }
}
