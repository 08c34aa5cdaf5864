//! Implementations for the Supervisor state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::telem::TelemFrame;
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{AutopilotMode, ControlCommand, Params, SupervisorError};
use crate::{
    act_client::{ActuatorError, ActuatorSet},
    lane_tracker::{LaneTracker, LaneUpdate},
    lat_ctrl::{self, LatCtrlInput, LatCtrlOutput},
    loc::VehicleState,
    lon_ctrl::{self, LonBand, LonCtrlOutput},
    telem_client::FeedbackSource,
};
use util::{
    archive::{self, ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Autopilot supervisor state
pub struct Supervisor {
    params: Params,

    actuators: ActuatorSet,

    lane_tracker: LaneTracker,

    /// Lane offset at the last cycle a steering demand was issued.
    prev_lat_offset_m: f64,

    mode: AutopilotMode,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to the supervisor.
#[derive(Debug, Clone)]
pub struct InputData {
    /// This cycle's telemetry frame.
    pub frame: TelemFrame,

    /// Raw lane point batch for the lane named in the frame, if one was fetched.
    pub lane_batch: Option<String>,
}

/// Output of one supervisor cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputData {
    /// The vehicle snapshot the cycle ran on.
    pub vehicle: VehicleState,

    /// Mode at the end of the cycle.
    pub mode: AutopilotMode,

    /// Commands issued this cycle, in the order they were sent.
    pub cmds: Vec<ControlCommand>,

    /// Lateral control output, `None` if no steering demand was produced.
    pub lat: Option<LatCtrlOutput>,

    /// Longitudinal control output, `None` if the vehicle is out of lane.
    pub lon: Option<LonCtrlOutput>,

    /// Number of waypoints left after pruning.
    pub num_waypoints: usize,
}

/// Status report for supervisor processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub time_s: f64,
    pub mode: AutopilotMode,

    /// A new lane's waypoints were loaded this cycle.
    pub lane_replaced: bool,

    /// The lane changed but its waypoint batch could not be decoded.
    pub lane_parse_error: bool,

    pub num_pruned: usize,
    pub num_waypoints: usize,

    pub lookahead_used: bool,

    /// Distance to the lookahead waypoint, if there is one.
    ///
    /// Units: meters
    pub lookahead_dist_m: Option<f64>,

    pub steer_limited: bool,

    pub lon_band: Option<LonBand>,

    /// Number of demands refused by the actuators this cycle.
    pub num_act_rejections: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Supervisor {
    /// Create a new supervisor driving the given actuators.
    pub fn new(params: Params, actuators: ActuatorSet) -> Self {
        Self {
            lane_tracker: LaneTracker::new(params.lane_tracker.clone()),
            params,
            actuators,
            prev_lat_offset_m: 0.0,
            mode: AutopilotMode::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    pub fn mode(&self) -> AutopilotMode {
        self.mode
    }

    pub fn lane_tracker(&self) -> &LaneTracker {
        &self.lane_tracker
    }

    pub fn prev_lat_offset_m(&self) -> f64 {
        self.prev_lat_offset_m
    }

    /// Pull the next frame from the source and run one cycle on it.
    ///
    /// The lane point batch is only requested when the tracker needs one. If it cannot be read
    /// the whole cycle is skipped as for any other missing feedback, and the batch is requested
    /// again on the next cycle.
    pub fn cycle<F>(&mut self, source: &mut F) -> Result<(OutputData, StatusReport), SupervisorError>
    where
        F: FeedbackSource + ?Sized,
    {
        let frame = source.pull_feedback()?;

        // A bad frame is rejected before the lane is observed
        frame
            .validate()
            .map_err(SupervisorError::InvalidFeedback)?;

        let lane_batch = if self.lane_tracker.observe_lane_name(&frame.lane_name) {
            match source.pull_lane_points() {
                Ok(b) => Some(b),
                Err(e) => {
                    warn!(
                        "Could not get the waypoints for lane \"{}\"",
                        frame.lane_name
                    );
                    return Err(SupervisorError::FeedbackUnavailable(e));
                }
            }
        } else {
            None
        };

        self.proc(&InputData { frame, lane_batch })
    }

    /// Update the lane tracker from this cycle's frame.
    fn update_lane(&mut self, input: &InputData, vehicle: &VehicleState) {
        let name = &input.frame.lane_name;

        if self.lane_tracker.observe_lane_name(name) {
            match input.lane_batch {
                Some(ref raw) => match self.lane_tracker.on_lane_changed(name, raw) {
                    Ok(LaneUpdate::Replaced(n)) => {
                        info!("Now tracking lane \"{}\" with {} waypoints", name, n);
                        self.report.lane_replaced = true;
                    }
                    Ok(LaneUpdate::Unchanged) => (),
                    Err(e) => {
                        warn!("{}", e);
                        self.report.lane_parse_error = true;
                    }
                },
                None => debug!("No waypoint batch given for lane \"{}\"", name),
            }
        }

        self.report.num_pruned = self
            .lane_tracker
            .prune(&vehicle.position, vehicle.heading_deg);
        self.report.num_waypoints = self.lane_tracker.num_waypoints();
        self.report.lookahead_dist_m = self
            .lane_tracker
            .nearest()
            .map(|wp| wp.distance_to(&vehicle.position));
    }

    /// Send a command to the actuators, returning the errors of those which refused it.
    fn emit(&mut self, cmd: &ControlCommand) -> Vec<ActuatorError> {
        let result = match *cmd {
            ControlCommand::Steer { angle_deg } => self.actuators.steering.set(angle_deg),
            ControlCommand::Throttle { fraction } => self.actuators.throttle.set(fraction),
            ControlCommand::Brake { fraction } => self.actuators.brake.set(fraction),
            ControlCommand::Hold => Ok(()),
            ControlCommand::ReleaseAll => return self.actuators.release_all(),
        };

        result.err().into_iter().collect()
    }
}

impl State for Supervisor {
    type InitData = &'static str;
    type InitError = SupervisorError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SupervisorError;

    /// Initialise the supervisor.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(SupervisorError::ParamLoadError)?;
        self.lane_tracker = LaneTracker::new(self.params.lane_tracker.clone());

        // Create the arch folder for the supervisor
        session
            .arch_subdir("supervisor")
            .map_err(SupervisorError::ArchiveDirError)?;

        self.arch_report = Archiver::from_path(session, "supervisor/status_report.csv")
            .map_err(SupervisorError::ArchiveError)?;

        Ok(())
    }

    /// Run one control cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // A bad frame is rejected before any state is changed
        input_data
            .frame
            .validate()
            .map_err(SupervisorError::InvalidFeedback)?;

        self.report = StatusReport {
            time_s: archive::stamp(),
            ..StatusReport::default()
        };

        let vehicle = VehicleState::from(&input_data.frame);

        self.update_lane(input_data, &vehicle);

        let mut output = OutputData {
            vehicle,
            num_waypoints: self.report.num_waypoints,
            ..OutputData::default()
        };

        if vehicle.in_lane {
            if self.mode == AutopilotMode::Disengaged {
                info!("Vehicle back in lane, autopilot engaged");
            }
            self.mode = AutopilotMode::Engaged;

            // Lateral
            let lat_input =
                LatCtrlInput::new(&vehicle, self.prev_lat_offset_m, self.lane_tracker.nearest());

            if let Some(lat) = lat_ctrl::calc_steer(&lat_input, &self.params.lat_ctrl) {
                self.prev_lat_offset_m = vehicle.lat_offset_m;
                self.report.lookahead_used = lat.lookahead_term_deg.is_some();
                self.report.steer_limited = lat.limited;

                output.cmds.push(ControlCommand::Steer {
                    angle_deg: lat.steer_angle_deg,
                });
                output.lat = Some(lat);
            }

            // Longitudinal
            let lon = lon_ctrl::calc_pedals(
                vehicle.speed_limit_mph,
                vehicle.speed_mph,
                &self.params.lon_ctrl,
            );
            self.report.lon_band = Some(lon.band);

            if lon.band == LonBand::Hold {
                output.cmds.push(ControlCommand::Hold);
            } else {
                if let Some(fraction) = lon.throttle {
                    output.cmds.push(ControlCommand::Throttle { fraction });
                }
                if let Some(fraction) = lon.brake {
                    output.cmds.push(ControlCommand::Brake { fraction });
                }
            }
            output.lon = Some(lon);
        } else if self.mode == AutopilotMode::Engaged {
            info!("Vehicle left the lane, releasing control");
            self.mode = AutopilotMode::Disengaged;
            output.cmds.push(ControlCommand::ReleaseAll);
        }

        output.mode = self.mode;
        self.report.mode = self.mode;

        for cmd in output.cmds.iter() {
            for e in self.emit(cmd) {
                warn!("{}", e);
                self.report.num_act_rejections += 1;
            }
        }

        trace!("Supervisor output: {:?}", output.cmds);

        Ok((output, self.report))
    }
}

impl Archived for Supervisor {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if self.arch_report.is_init() {
            self.arch_report.serialise(self.report)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_client::Actuator;
    use crate::telem_client::ReplayClient;
    use comms_if::eqpt::{
        act::{ActDem, ActId},
        lane_points::encode,
    };
    use std::{cell::RefCell, rc::Rc};

    type DemLog = Rc<RefCell<Vec<(ActId, ActDem)>>>;

    /// Actuator recording every demand into a shared log, optionally refusing all of them.
    struct RecordingActuator {
        id: ActId,
        log: DemLog,
        refuse: bool,
    }

    impl Actuator for RecordingActuator {
        fn id(&self) -> ActId {
            self.id
        }

        fn set(&mut self, value: f64) -> Result<(), ActuatorError> {
            self.log.borrow_mut().push((self.id, ActDem::Set(value)));
            if self.refuse {
                Err(ActuatorError::Rejected {
                    id: self.id,
                    value,
                    response: comms_if::eqpt::act::ActDemResponse::EqptInvalid,
                })
            } else {
                Ok(())
            }
        }

        fn release(&mut self) -> Result<(), ActuatorError> {
            self.log.borrow_mut().push((self.id, ActDem::Release));
            Ok(())
        }
    }

    fn recording_set(refuse_steering: bool) -> (ActuatorSet, DemLog) {
        let log = DemLog::default();
        let act = |id, refuse| {
            Box::new(RecordingActuator {
                id,
                log: log.clone(),
                refuse,
            })
        };

        let set = ActuatorSet {
            steering: act(ActId::Steering, refuse_steering),
            throttle: act(ActId::Throttle, false),
            brake: act(ActId::Brake, false),
        };

        (set, log)
    }

    fn frame(in_lane: bool, offset: f64, speed: f64) -> TelemFrame {
        TelemFrame {
            timestamp: None,
            heading_deg: 0.0,
            speed_mph: speed,
            in_lane,
            lane_offset_m: offset,
            brake_pedal: 0.0,
            speed_limit_mph: 50.0,
            position_m: [0.0, 0.0, 0.0],
            num_lane_points: 0,
            lane_name: String::from("L0"),
            lane_points: None,
        }
    }

    fn input(frame: TelemFrame) -> InputData {
        InputData {
            frame,
            lane_batch: None,
        }
    }

    #[test]
    fn test_release_once() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let mut num_release_all = 0;
        for &in_lane in [true, false, false, true].iter() {
            let (out, _) = sup.proc(&input(frame(in_lane, 0.0, 30.0))).unwrap();
            num_release_all += out
                .cmds
                .iter()
                .filter(|c| **c == ControlCommand::ReleaseAll)
                .count();

            let num_steer = out
                .cmds
                .iter()
                .filter(|c| matches!(c, ControlCommand::Steer { .. }))
                .count();

            // Steering stops while out of lane and resumes once back in
            if in_lane {
                assert_eq!(out.mode, AutopilotMode::Engaged);
                assert_eq!(num_steer, 1);
            } else {
                assert_eq!(out.mode, AutopilotMode::Disengaged);
                assert_eq!(num_steer, 0);
            }
        }
        assert_eq!(num_release_all, 1);

        // Every actuator was released exactly once
        let releases: Vec<ActId> = log
            .borrow()
            .iter()
            .filter(|(_, d)| *d == ActDem::Release)
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(releases, vec![ActId::Steering, ActId::Throttle, ActId::Brake]);
    }

    #[test]
    fn test_no_commands_out_of_lane() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        sup.proc(&input(frame(false, 0.5, 30.0))).unwrap();
        let num_dems = log.borrow().len();

        let (out, report) = sup.proc(&input(frame(false, 0.5, 30.0))).unwrap();
        assert!(out.cmds.is_empty());
        assert!(out.lat.is_none());
        assert!(out.lon.is_none());
        assert_eq!(report.lon_band, None);
        assert_eq!(log.borrow().len(), num_dems);
    }

    #[test]
    fn test_in_lane_cycle() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        // 50 mph limit at 47 mph is the low throttle band
        let (out, report) = sup.proc(&input(frame(true, 0.02, 47.0))).unwrap();

        let steer = match out.cmds[0] {
            ControlCommand::Steer { angle_deg } => angle_deg,
            c => panic!("Expected steering first, got {:?}", c),
        };
        approx::assert_relative_eq!(steer, -50.0 * 0.02 - 15.0 * 0.02 * 47.0, epsilon = 1e-9);
        assert_eq!(
            &out.cmds[1..],
            &[
                ControlCommand::Throttle { fraction: 0.3 },
                ControlCommand::Brake { fraction: 0.0 }
            ]
        );
        assert_eq!(report.lon_band, Some(LonBand::ThrottleLow));
        assert!(!report.lookahead_used);
        assert_eq!(sup.prev_lat_offset_m(), 0.02);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_speed_gate_keeps_offset() {
        let (set, _) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        sup.proc(&input(frame(true, 0.1, 30.0))).unwrap();
        assert_eq!(sup.prev_lat_offset_m(), 0.1);

        // Stationary, no steering and the carried offset is untouched
        let (out, _) = sup.proc(&input(frame(true, 0.3, 0.5))).unwrap();
        assert!(out.lat.is_none());
        assert!(!out
            .cmds
            .iter()
            .any(|c| matches!(c, ControlCommand::Steer { .. })));
        assert_eq!(sup.prev_lat_offset_m(), 0.1);
    }

    #[test]
    fn test_hold_band() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let (out, _) = sup.proc(&input(frame(true, 0.0, 50.5))).unwrap();
        assert_eq!(out.cmds.last(), Some(&ControlCommand::Hold));

        // Only the steering actuator was driven
        assert!(log.borrow().iter().all(|(id, _)| *id == ActId::Steering));
    }

    #[test]
    fn test_lane_batches() {
        let (set, _) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let points: Vec<[f64; 3]> = (1..=5).map(|i| [i as f64 * 10.0, 0.0, 0.0]).collect();

        let mut i = InputData {
            frame: frame(true, 0.0, 30.0),
            lane_batch: Some(encode(&points)),
        };
        let (out, report) = sup.proc(&i).unwrap();
        assert!(report.lane_replaced);
        assert!(report.lookahead_used);
        assert_eq!(out.num_waypoints, 5);
        approx::assert_abs_diff_eq!(report.lookahead_dist_m.unwrap(), 10.0, epsilon = 1e-9);

        // A malformed batch for a new lane keeps the old waypoints and is retried
        i.frame.lane_name = String::from("L1");
        i.lane_batch = Some(String::from("2 1 2 3 4 x"));
        let (out, report) = sup.proc(&i).unwrap();
        assert!(report.lane_parse_error);
        assert_eq!(out.num_waypoints, 5);
        assert_eq!(sup.lane_tracker().state().name, "L0");
        assert!(sup.lane_tracker().state().is_dirty);

        i.lane_batch = Some(encode(&points[..2]));
        let (out, report) = sup.proc(&i).unwrap();
        assert!(report.lane_replaced);
        assert!(!report.lane_parse_error);
        assert_eq!(out.num_waypoints, 2);
        assert_eq!(sup.lane_tracker().state().name, "L1");
    }

    #[test]
    fn test_actuator_rejection() {
        let (set, log) = recording_set(true);
        let mut sup = Supervisor::new(Params::default(), set);

        let (out, report) = sup.proc(&input(frame(true, 0.1, 30.0))).unwrap();
        assert_eq!(report.num_act_rejections, 1);

        // The pedals were still driven
        assert_eq!(out.cmds.len(), 3);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_invalid_frame() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        match sup.proc(&input(frame(true, std::f64::NAN, 30.0))) {
            Err(SupervisorError::InvalidFeedback(_)) => (),
            r => panic!("Expected invalid feedback, got {:?}", r),
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_cycle_from_replay() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let mut f = frame(true, 0.0, 30.0);
        f.lane_points = Some(encode(&[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]));
        let first = serde_json::to_string(&f).unwrap();
        let second = serde_json::to_string(&frame(true, 0.0, 30.0)).unwrap();

        let mut replay =
            ReplayClient::from_str(&format!("{}\nnull\n{}\n", first, second)).unwrap();

        let (out, _) = sup.cycle(&mut replay).unwrap();
        assert_eq!(out.num_waypoints, 2);
        let num_dems = log.borrow().len();

        // A dropped frame changes nothing
        match sup.cycle(&mut replay) {
            Err(SupervisorError::FeedbackUnavailable(_)) => (),
            r => panic!("Expected unavailable feedback, got {:?}", r),
        }
        assert_eq!(log.borrow().len(), num_dems);
        assert_eq!(sup.lane_tracker().num_waypoints(), 2);

        // Same lane, so no batch is needed
        let (out, _) = sup.cycle(&mut replay).unwrap();
        assert_eq!(out.num_waypoints, 2);

        match sup.cycle(&mut replay) {
            Err(SupervisorError::EndOfFeedback) => (),
            r => panic!("Expected end of feedback, got {:?}", r),
        }
    }

    #[test]
    fn test_sample_replay() {
        let (set, _) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let mut replay =
            ReplayClient::from_str(include_str!("../../../replays/straight_lane.jsonl")).unwrap();

        let mut num_release_all = 0;
        let mut num_dropped = 0;
        let mut last_num_waypoints = 0;

        loop {
            match sup.cycle(&mut replay) {
                Ok((out, report)) => {
                    num_release_all += out
                        .cmds
                        .iter()
                        .filter(|c| **c == ControlCommand::ReleaseAll)
                        .count();
                    assert!(!report.lane_parse_error);
                    assert_eq!(report.num_act_rejections, 0);
                    last_num_waypoints = out.num_waypoints;
                }
                Err(SupervisorError::FeedbackUnavailable(_)) => num_dropped += 1,
                Err(SupervisorError::EndOfFeedback) => break,
                Err(e) => panic!("Unexpected error: {}", e),
            }
        }

        assert_eq!(num_release_all, 1);
        assert_eq!(num_dropped, 1);
        assert_eq!(sup.mode(), AutopilotMode::Engaged);
        assert_eq!(sup.lane_tracker().state().name, "L1");

        // Points of the new lane already passed have been pruned
        assert!(last_num_waypoints > 0 && last_num_waypoints < 30);
    }

    #[test]
    fn test_missing_lane_batch_skips_cycle() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        let mut f = frame(true, 0.0, 30.0);
        f.lane_points = Some(encode(&[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]));
        let first = serde_json::to_string(&f).unwrap();

        // New lane with no batch, then the same lane with its batch
        let mut f = frame(true, 0.0, 30.0);
        f.lane_name = String::from("L1");
        let second = serde_json::to_string(&f).unwrap();
        f.lane_points = Some(encode(&[[15.0, 1.0, 0.0]]));
        let third = serde_json::to_string(&f).unwrap();

        let mut replay =
            ReplayClient::from_str(&format!("{}\n{}\n{}\n", first, second, third)).unwrap();

        sup.cycle(&mut replay).unwrap();
        let num_dems = log.borrow().len();

        match sup.cycle(&mut replay) {
            Err(SupervisorError::FeedbackUnavailable(_)) => (),
            r => panic!("Expected unavailable feedback, got {:?}", r),
        }
        assert_eq!(log.borrow().len(), num_dems);
        assert_eq!(sup.lane_tracker().state().name, "L0");
        assert!(sup.lane_tracker().state().is_dirty);

        let (out, report) = sup.cycle(&mut replay).unwrap();
        assert!(report.lane_replaced);
        assert_eq!(out.num_waypoints, 1);
        assert_eq!(sup.lane_tracker().state().name, "L1");
    }

    #[test]
    fn test_cycle_invalid_frame_keeps_lane() {
        let (set, log) = recording_set(false);
        let mut sup = Supervisor::new(Params::default(), set);

        // Non-finite numbers cannot be written in a JSON replay
        struct BadSource;
        impl FeedbackSource for BadSource {
            fn pull_feedback(&mut self) -> Result<TelemFrame, crate::telem_client::TelemClientError> {
                let mut f = frame(true, 0.0, 30.0);
                f.speed_mph = std::f64::INFINITY;
                Ok(f)
            }

            fn pull_lane_points(&mut self) -> Result<String, crate::telem_client::TelemClientError> {
                panic!("Lane points must not be requested for an invalid frame")
            }
        }

        match sup.cycle(&mut BadSource) {
            Err(SupervisorError::InvalidFeedback(_)) => (),
            r => panic!("Expected invalid feedback, got {:?}", r),
        }
        assert!(!sup.lane_tracker().state().is_dirty);
        assert!(log.borrow().is_empty());
    }
}
