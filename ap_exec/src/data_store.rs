//! # Data Store

use log::error;

use crate::supervisor;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub session_time_s: f64,

    // Supervisor
    pub sup_output: supervisor::OutputData,
    pub sup_status_rpt: supervisor::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles where no feedback could be read
    pub num_consec_feedback_errors: u64,

    /// Total number of cycles where no feedback could be read
    pub num_feedback_errors: u64,

    /// Total number of demands refused by the actuators
    pub num_act_rejections: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycles_per_second: u64) {
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second.max(1) == 0;

        self.sup_status_rpt = supervisor::StatusReport::default();

        self.session_time_s = util::session::get_elapsed_seconds();
    }

    /// Record a cycle whose feedback was processed.
    pub fn feedback_ok(&mut self) {
        self.num_consec_feedback_errors = 0;
        self.num_act_rejections += self.sup_status_rpt.num_act_rejections as u64;
    }

    /// Record a cycle without feedback.
    ///
    /// Raises an error the first time the number of consecutive failures goes above `limit`, and
    /// returns true while it stays above.
    pub fn feedback_error(&mut self, limit: u64) -> bool {
        self.num_consec_feedback_errors += 1;
        self.num_feedback_errors += 1;

        if self.num_consec_feedback_errors == limit + 1 {
            error!(
                "Maximum number of consecutive feedback errors ({}) has been exceeded",
                limit
            );
        }

        self.num_consec_feedback_errors > limit
    }
}
