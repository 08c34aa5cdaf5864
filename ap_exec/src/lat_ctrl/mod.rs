//! # Lateral control module
//!
//! Lateral control keeps the vehicle centred in its lane. The steering demand is the sum of three
//! terms:
//!
//! - a proportional term on the lane offset,
//! - a differential term on the change in offset since the previous demand, scaled by speed so
//!   that drift is corrected harder the faster the vehicle goes,
//! - a lookahead term proportional to the angle between the vehicle heading and the bearing to
//!   the nearest waypoint ahead, which anticipates curves.
//!
//! ```text
//! angle = -k_p * offset - k_d * (offset - prev_offset) * speed + k_la * ((bearing - heading) % 360)
//! ```
//!
//! The lookahead angle is the plain truncated remainder of the difference. It is not folded into
//! [-180, 180], so a waypoint straight ahead whose bearing wraps past 0 while the heading is just
//! below 360 contributes a large correction rather than a small one. This matches the behaviour
//! the simulator setups have been tuned against.
//!
//! Control is a pure function of the cycle's inputs: the previous offset is carried by the
//! caller, which must only update it when a demand is produced.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

use crate::loc::{Point3D, VehicleState};
use util::maths::clamp;

pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input to lateral control for one cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatCtrlInput {
    /// Units: meters
    pub lat_offset_m: f64,

    /// Lane offset at the last cycle a steering demand was produced.
    ///
    /// Units: meters
    pub prev_lat_offset_m: f64,

    /// Units: miles per hour
    pub speed_mph: f64,

    /// Units: degrees
    pub heading_deg: f64,

    pub position: Point3D,

    /// The nearest waypoint ahead of the vehicle, if the lane tracker has one.
    pub lookahead: Option<Point3D>,
}

/// Steering demand produced by lateral control.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LatCtrlOutput {
    /// Saturated steering angle demand.
    ///
    /// Units: degrees
    pub steer_angle_deg: f64,

    /// Contribution of the lookahead term before saturation, `None` if no waypoint was available.
    ///
    /// Units: degrees
    pub lookahead_term_deg: Option<f64>,

    /// True if the demand was saturated.
    pub limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LatCtrlInput {
    /// Build the input from the vehicle state and the carried previous offset.
    pub fn new(vehicle: &VehicleState, prev_lat_offset_m: f64, lookahead: Option<Point3D>) -> Self {
        Self {
            lat_offset_m: vehicle.lat_offset_m,
            prev_lat_offset_m,
            speed_mph: vehicle.speed_mph,
            heading_deg: vehicle.heading_deg,
            position: vehicle.position,
            lookahead,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the steering demand.
///
/// Returns `None` when the vehicle is not moving faster than the minimum speed, in which case no
/// steering demand should be issued and the previous offset must not be updated.
pub fn calc_steer(input: &LatCtrlInput, params: &Params) -> Option<LatCtrlOutput> {
    if !(input.speed_mph > params.min_speed_mph) {
        return None;
    }

    let offset_rate = input.lat_offset_m - input.prev_lat_offset_m;

    let mut angle_deg =
        -params.offset_k_p * input.lat_offset_m - params.offset_k_d * offset_rate * input.speed_mph;

    let lookahead_term_deg = input.lookahead.map(|wp| {
        let bearing_deg = wp.direction_from(&input.position);
        params.lookahead_k * ((bearing_deg - input.heading_deg) % 360.0)
    });

    if let Some(t) = lookahead_term_deg {
        angle_deg += t;
    }

    let steer_angle_deg = clamp(angle_deg, -params.max_steer_deg, params.max_steer_deg);

    trace!(
        "LatCtrl: offset {:.3} m, rate {:.3} m, lookahead {:?} deg, demand {:.2} deg",
        input.lat_offset_m,
        offset_rate,
        lookahead_term_deg,
        steer_angle_deg
    );

    Some(LatCtrlOutput {
        steer_angle_deg,
        lookahead_term_deg,
        limited: steer_angle_deg != angle_deg,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn input(offset: f64, prev: f64, speed: f64) -> LatCtrlInput {
        LatCtrlInput {
            lat_offset_m: offset,
            prev_lat_offset_m: prev,
            speed_mph: speed,
            heading_deg: 0.0,
            position: Point3D::default(),
            lookahead: None,
        }
    }

    #[test]
    fn test_pd_example() {
        let out = calc_steer(&input(0.02, 0.0, 30.0), &Params::default()).unwrap();

        assert_abs_diff_eq!(out.steer_angle_deg, -10.0, epsilon = 1e-9);
        assert_eq!(out.lookahead_term_deg, None);
        assert!(!out.limited);
    }

    #[test]
    fn test_pd_matches_formula() {
        let params = Params::default();

        for &o in &[-3.0, -0.4, -0.01, 0.0, 0.05, 0.9, 4.0] {
            for &prev in &[-0.5, 0.0, 0.3] {
                for &s in &[1.01, 10.0, 55.0, 80.0] {
                    let expected: f64 = (-50.0_f64 * o - 15.0 * (o - prev) * s)
                        .max(-188.0)
                        .min(188.0);
                    let out = calc_steer(&input(o, prev, s), &params).unwrap();
                    assert_abs_diff_eq!(out.steer_angle_deg, expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_speed_gate() {
        let params = Params::default();

        assert_eq!(calc_steer(&input(0.5, 0.0, 1.0), &params), None);
        assert_eq!(calc_steer(&input(0.5, 0.0, 0.0), &params), None);
        assert!(calc_steer(&input(0.5, 0.0, 1.0001), &params).is_some());
    }

    #[test]
    fn test_saturation() {
        let out = calc_steer(&input(5.0, 0.0, 60.0), &Params::default()).unwrap();
        assert_eq!(out.steer_angle_deg, -188.0);
        assert!(out.limited);

        let out = calc_steer(&input(-5.0, 0.0, 60.0), &Params::default()).unwrap();
        assert_eq!(out.steer_angle_deg, 188.0);
        assert!(out.limited);
    }

    #[test]
    fn test_lookahead_term() {
        // Waypoint at 45 deg to the left of a vehicle heading along +X
        let mut i = input(0.0, 0.0, 20.0);
        i.lookahead = Some(Point3D::new(10.0, 10.0, 0.0));

        let out = calc_steer(&i, &Params::default()).unwrap();
        assert_abs_diff_eq!(out.lookahead_term_deg.unwrap(), 0.38 * 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.steer_angle_deg, 17.1, epsilon = 1e-9);
    }

    #[test]
    fn test_lookahead_not_folded() {
        // Heading just below 360, waypoint just left of +X: the bearing has wrapped to a small
        // value so the difference is close to -360 rather than close to 0.
        let mut i = input(0.0, 0.0, 20.0);
        i.heading_deg = 359.0;
        i.lookahead = Some(Point3D::new(100.0, 100.0 * 1f64.to_radians().tan(), 0.0));

        let out = calc_steer(&i, &Params::default()).unwrap();
        assert_abs_diff_eq!(
            out.lookahead_term_deg.unwrap(),
            0.38 * (1.0 - 359.0),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(out.steer_angle_deg, -136.04, epsilon = 1e-6);
    }
}
