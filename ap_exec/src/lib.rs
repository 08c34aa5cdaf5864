//! # Autopilot library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the autopilot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator client - delivers steering and pedal demands to the vehicle
pub mod act_client;

/// Global data store for the executable
pub mod data_store;

/// Display - presents the autopilot state to the driver
pub mod display;

/// Lane tracker - keeps the upcoming waypoints of the current lane
pub mod lane_tracker;

/// Lateral control module - steers the vehicle towards the lane centre
pub mod lat_ctrl;

/// Localisation - vehicle state and points in the world frame
pub mod loc;

/// Longitudinal control module - holds the vehicle at the speed limit
pub mod lon_ctrl;

/// Executable parameters
pub mod params;

/// Autopilot supervisor - runs the control cycle and decides when the autopilot is in control
pub mod supervisor;

/// Telemetry client - provides feedback from the vehicle
pub mod telem_client;
