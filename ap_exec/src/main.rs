//! Main autopilot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Feedback acquisition from the telemetry source
//!         - Supervisor processing:
//!             - Lane tracking
//!             - Lateral control
//!             - Longitudinal control
//!             - Actuator demands
//!         - Display
//!         - Archiving
//!
//! # Usage
//!
//! ```text
//! ap_exec [--log-level <level>] <replay>
//! ```
//!
//! The `AP_SW_ROOT` environment variable must point at the directory containing `params/`, in
//! which the session directory will also be created.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ap_lib::{
    act_client::ActuatorSet,
    data_store::DataStore,
    display::TermDisplay,
    params::{ApExecParams, MAX_CYCLE_PERIOD_S},
    supervisor::{Supervisor, SupervisorError},
    telem_client::ReplayClient,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
    time::cycles_per_second,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Lane keeping autopilot.
#[derive(Debug, StructOpt)]
#[structopt(name = "ap_exec")]
struct Opt {
    /// Replay file of telemetry frames (JSON lines) to drive the autopilot with.
    #[structopt(parse(from_os_str))]
    replay: PathBuf,

    /// Minimum level of log messages (error, warn, info, debug or trace).
    #[structopt(short, long, default_value = "info")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let min_level = parse_level(&opt.log_level)
        .ok_or_else(|| eyre!("Unknown log level \"{}\"", opt.log_level))?;

    // Initialise session
    let session = Session::new("ap_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Lane Keeping Autopilot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: ApExecParams =
        util::params::load("ap_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    let cycle_period = exec_params.cycle_period().ok_or_else(|| {
        eyre!(
            "The cycle period must be finite and in (0, {}] s, found {}",
            MAX_CYCLE_PERIOD_S,
            exec_params.cycle_period_s
        )
    })?;
    let cycles_per_s = cycles_per_second(exec_params.cycle_period_s);

    // ---- INITIALISE FEEDBACK SOURCE ----

    let mut replay = ReplayClient::new(&opt.replay).wrap_err("Failed to load the replay")?;

    info!(
        "Loaded replay {:?} contains {} cycles ({:.02} s)\n",
        replay.path(),
        replay.num_frames(),
        replay.num_frames() as f64 * exec_params.cycle_period_s
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let actuators = ActuatorSet::logged(if exec_params.archive_enabled {
        Some(&session)
    } else {
        None
    })
    .wrap_err("Failed to initialise the actuators")?;
    info!("Actuators initialised");

    let mut supervisor = Supervisor::new(Default::default(), actuators);
    supervisor
        .init("supervisor.toml", &session)
        .wrap_err("Failed to initialise the Supervisor")?;
    info!("Supervisor init complete");

    let mut display = TermDisplay::new();

    let mut ds = DataStore::default();

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycles_per_s);

        // ---- SUPERVISOR PROCESSING ----

        match supervisor.cycle(&mut replay) {
            Ok((o, r)) => {
                ds.sup_output = o;
                ds.sup_status_rpt = r;
                ds.feedback_ok();

                // ---- DISPLAY ----

                if exec_params.display_enabled {
                    display.update(&ds.sup_output);
                }

                // ---- WRITE ARCHIVES ----

                if exec_params.archive_enabled {
                    if let Err(e) = supervisor.write() {
                        warn!("Could not write the supervisor archive: {}", e);
                    }
                }
            }
            Err(SupervisorError::EndOfFeedback) => {
                info!("End of replay reached, stopping");
                break;
            }
            Err(e) => {
                // Previous demands stay in place on the vehicle, so just warn and continue
                warn!("{}", e);
                ds.feedback_error(exec_params.max_consec_feedback_errors);
            }
        }

        if ds.is_1_hz_cycle {
            debug!(
                "Cycle {} ({:.1} s): {:?}, {} waypoints, {} actuator rejections so far",
                ds.num_cycles,
                ds.session_time_s,
                ds.sup_output.mode,
                ds.sup_output.num_waypoints,
                ds.num_act_rejections
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                if exec_params.realtime {
                    thread::sleep(d);
                }
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!(
        "Ran {} cycles, {} without feedback, {} actuator rejections",
        ds.num_cycles, ds.num_feedback_errors, ds.num_act_rejections
    );
    info!("End of execution");

    Ok(())
}
