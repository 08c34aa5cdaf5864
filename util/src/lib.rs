//! Utility library for the autopilot software
//!
//! Provides the ambient services shared by every executable in the workspace: sessions, logging,
//! parameter loading, archiving and a handful of angle/maths helpers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod time;
