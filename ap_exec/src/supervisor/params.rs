//! Supervisor parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{lane_tracker, lat_ctrl, lon_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the supervisor, one table per controlled module.
///
/// Any missing table or key takes its default value.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Params {
    pub lat_ctrl: lat_ctrl::Params,
    pub lon_ctrl: lon_ctrl::Params,
    pub lane_tracker: lane_tracker::Params,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params() {
        let p: Params = util::params::from_str(
            r#"
            [lat_ctrl]
            max_steer_deg = 90.0

            [lon_ctrl]
            brake_high = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(p.lat_ctrl.max_steer_deg, 90.0);
        assert_eq!(p.lat_ctrl.offset_k_p, 50.0);
        assert_eq!(p.lon_ctrl.brake_high, 0.8);
        assert_eq!(p.lon_ctrl.throttle_low, 0.3);
        assert_eq!(p.lane_tracker.prune_angle_deg, 90.0);
    }
}
