//! # Communications interface crate.
//!
//! Provides the boundary types exchanged between the autopilot and the driving simulator:
//! telemetry frames coming in, actuator demands going out, and the lane-point batch wire format.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telemetry and actuator definitions for the simulated vehicle equipment
pub mod eqpt;
