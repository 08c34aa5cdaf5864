//! # Display
//!
//! Presents the state of the autopilot to the driver. The displayed values are for presentation
//! only and are never read back by the control loop.
//!
//! Numbers are truncated at the decimal point of their printed form rather than rounded, so
//! `-0.5` is shown as `-0`. The lane offset keeps one decimal digit.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use owo_colors::OwoColorize;

use crate::supervisor::{AutopilotMode, ControlCommand, OutputData};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Text shown in place of a value which is not available.
pub const NOT_AVAILABLE: &str = "---";

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A sink for display frames.
pub trait DisplaySink {
    fn show(&mut self, frame: &DisplayFrame);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One cycle's worth of display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub engaged: bool,
    pub speed: String,
    pub lane_offset: String,
    pub steering: String,
    pub brake: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub num_lane_points: String,
}

/// Display sink writing a status line to the log.
#[derive(Default)]
pub struct TermDisplay {
    /// Steering angle of the last steering command, shown until a new one is issued.
    last_steer_deg: f64,

    num_frames: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DisplayFrame {
    /// Build the frame for a cycle.
    ///
    /// `steer_angle_deg` is the last steering angle commanded, and the brake shown is the one
    /// commanded this cycle, or the pedal position read back if none was.
    pub fn new(output: &OutputData, steer_angle_deg: f64) -> Self {
        let vehicle = &output.vehicle;
        let engaged = output.mode == AutopilotMode::Engaged;

        let brake = output
            .cmds
            .iter()
            .find_map(|c| match c {
                ControlCommand::Brake { fraction } => Some(*fraction),
                _ => None,
            })
            .unwrap_or(vehicle.brake_pedal);

        let if_engaged = |s: String| {
            if engaged {
                s
            } else {
                String::from(NOT_AVAILABLE)
            }
        };

        Self {
            engaged,
            speed: truncate(vehicle.speed_mph, 0),
            lane_offset: if vehicle.in_lane {
                truncate(vehicle.lat_offset_m, 1)
            } else {
                String::from(NOT_AVAILABLE)
            },
            steering: if_engaged(truncate(steer_angle_deg, 0)),
            brake: if_engaged(format!("{:?}", brake)),
            x: if_engaged(truncate(vehicle.position.x, 0)),
            y: if_engaged(truncate(vehicle.position.y, 0)),
            z: if_engaged(truncate(vehicle.position.z, 0)),
            num_lane_points: if_engaged(vehicle.num_lane_points.to_string()),
        }
    }
}

impl TermDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and show the frame for a cycle, tracking the last steering angle.
    pub fn update(&mut self, output: &OutputData) -> DisplayFrame {
        if let Some(lat) = output.lat {
            self.last_steer_deg = lat.steer_angle_deg;
        }

        let frame = DisplayFrame::new(output, self.last_steer_deg);
        self.show(&frame);
        frame
    }
}

impl DisplaySink for TermDisplay {
    fn show(&mut self, frame: &DisplayFrame) {
        self.num_frames += 1;

        let mode = if frame.engaged {
            format!("{}", "ENGAGED".green().bold())
        } else {
            format!("{}", "MANUAL".yellow().bold())
        };

        info!(
            "{} | speed {} mph | lane {} m | steer {} deg | brake {} | pos ({}, {}, {}) | pts {}",
            mode,
            frame.speed,
            frame.lane_offset,
            frame.steering,
            frame.brake,
            frame.x,
            frame.y,
            frame.z,
            frame.num_lane_points
        );
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Print `value` and cut the text `decimals` digits after the decimal point.
///
/// Whole numbers are given a `.0` first so that a requested digit is always present.
fn truncate(value: f64, decimals: usize) -> String {
    // Display never switches to exponent notation for f64
    let mut s = format!("{}", value);

    if s.find('.').is_none() && value.is_finite() {
        s.push_str(".0");
    }

    match s.find('.') {
        Some(i) => {
            let end = if decimals == 0 { i } else { i + 1 + decimals };
            s.truncate(end.min(s.len()));
            s
        }
        None => s,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::{Point3D, VehicleState};

    fn output(in_lane: bool, mode: AutopilotMode) -> OutputData {
        OutputData {
            vehicle: VehicleState {
                position: Point3D::new(12.9, -3.2, 0.4),
                heading_deg: 0.0,
                speed_mph: 47.8,
                lat_offset_m: -0.27,
                in_lane,
                speed_limit_mph: 50.0,
                brake_pedal: 0.0,
                num_lane_points: 42,
            },
            mode,
            cmds: vec![
                ControlCommand::Steer { angle_deg: -10.0 },
                ControlCommand::Throttle { fraction: 0.0 },
                ControlCommand::Brake { fraction: 0.3 },
            ],
            ..OutputData::default()
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(47.8, 0), "47");
        assert_eq!(truncate(-0.5, 0), "-0");
        assert_eq!(truncate(-10.0, 0), "-10");
        assert_eq!(truncate(0.27, 1), "0.2");
        assert_eq!(truncate(-0.27, 1), "-0.2");
        assert_eq!(truncate(0.0, 1), "0.0");
        assert_eq!(truncate(3.0, 1), "3.0");

        // Tiny and huge magnitudes are never printed with an exponent
        assert_eq!(truncate(1.5e-5, 1), "0.0");
        assert_eq!(truncate(-1.5e-5, 1), "-0.0");
        assert_eq!(truncate(2.5e-6, 0), "0");
        assert_eq!(truncate(5e-5, 0), "0");
        assert_eq!(truncate(1e17, 0), "100000000000000000");
    }

    #[test]
    fn test_engaged_frame() {
        let f = DisplayFrame::new(&output(true, AutopilotMode::Engaged), -10.0);

        assert!(f.engaged);
        assert_eq!(f.speed, "47");
        assert_eq!(f.lane_offset, "-0.2");
        assert_eq!(f.steering, "-10");
        assert_eq!(f.brake, "0.3");
        assert_eq!(f.x, "12");
        assert_eq!(f.y, "-3");
        assert_eq!(f.z, "0");
        assert_eq!(f.num_lane_points, "42");
    }

    #[test]
    fn test_disengaged_frame() {
        let f = DisplayFrame::new(&output(false, AutopilotMode::Disengaged), -10.0);

        // Speed is always shown
        assert_eq!(f.speed, "47");
        for s in [
            &f.lane_offset,
            &f.steering,
            &f.brake,
            &f.x,
            &f.y,
            &f.z,
            &f.num_lane_points,
        ]
        .iter()
        {
            assert_eq!(s.as_str(), NOT_AVAILABLE);
        }
    }

    #[test]
    fn test_brake_readback() {
        let mut o = output(true, AutopilotMode::Engaged);
        o.cmds = vec![ControlCommand::Hold];
        o.vehicle.brake_pedal = 0.5;

        assert_eq!(DisplayFrame::new(&o, 0.0).brake, "0.5");
    }

    #[test]
    fn test_last_steer_kept() {
        let mut d = TermDisplay::new();
        let mut o = output(true, AutopilotMode::Engaged);
        o.lat = None;

        // No steering yet
        assert_eq!(d.update(&o).steering, "0");

        o.lat = Some(crate::lat_ctrl::LatCtrlOutput {
            steer_angle_deg: -15.1,
            lookahead_term_deg: None,
            limited: false,
        });
        assert_eq!(d.update(&o).steering, "-15");

        // Speed gated cycles keep showing the last demand
        o.lat = None;
        assert_eq!(d.update(&o).steering, "-15");
        assert_eq!(d.num_frames, 3);
    }
}
