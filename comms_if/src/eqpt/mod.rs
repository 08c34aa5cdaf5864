//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the vehicle's equipment, i.e. the
//! simulator's telemetry feed and its steering wheel and pedals.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod lane_points;
pub mod telem;
