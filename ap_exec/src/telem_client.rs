//! # Telemetry Client
//!
//! The [`FeedbackSource`] trait is the boundary through which the autopilot pulls feedback from
//! the simulator: one telemetry frame per cycle, plus a raw lane point batch when the lane has
//! changed.
//!
//! [`ReplayClient`] implements the source from a recorded replay file, allowing the autopilot to
//! be run without the simulator. Replay files are JSON-lines: each non-empty line not starting with
//! `#` is either a [`TelemFrame`] or the literal `null`, which stands for a cycle where the
//! feedback could not be read.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use comms_if::eqpt::telem::{TelemFrame, TelemParseError};
use log::debug;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of vehicle feedback.
///
/// Both calls block until the data is available or the read has failed.
pub trait FeedbackSource {
    /// Read this cycle's telemetry frame.
    fn pull_feedback(&mut self) -> Result<TelemFrame, TelemClientError>;

    /// Read the raw lane point batch of the current lane.
    fn pull_lane_points(&mut self) -> Result<String, TelemClientError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Feedback source replaying a recorded file.
pub struct ReplayClient {
    path: PathBuf,

    /// Frames still to be replayed, `None` for a dropped cycle.
    frames: VecDeque<Option<TelemFrame>>,

    /// The frame returned by the last successful `pull_feedback`.
    current: Option<TelemFrame>,

    num_frames: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TelemClientError {
    #[error("Could not load the replay file: {0}")]
    LoadError(std::io::Error),

    #[error("Line {0} of the replay is not a valid telemetry frame: {1}")]
    InvalidFrame(usize, TelemParseError),

    #[error("The replay contains no frames")]
    ReplayEmpty,

    #[error("Feedback unavailable: {0}")]
    FeedbackUnavailable(String),

    #[error("End of replay reached")]
    EndOfReplay,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ReplayClient {
    /// Load a replay from the given file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, TelemClientError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(TelemClientError::LoadError)?;

        let mut client = Self::from_str(&contents)?;
        client.path = path.as_ref().to_path_buf();

        Ok(client)
    }

    /// Build a replay from the contents of a replay file.
    pub fn from_str(contents: &str) -> Result<Self, TelemClientError> {
        let mut frames = VecDeque::new();

        for (i, line) in contents.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line == "null" {
                frames.push_back(None);
                continue;
            }

            // Line numbers are reported from 1 to match editors
            let frame =
                TelemFrame::from_json(line).map_err(|e| TelemClientError::InvalidFrame(i + 1, e))?;
            frames.push_back(Some(frame));
        }

        if frames.is_empty() {
            return Err(TelemClientError::ReplayEmpty);
        }

        let num_frames = frames.len();

        Ok(Self {
            path: PathBuf::new(),
            frames,
            current: None,
            num_frames,
        })
    }

    /// Path the replay was loaded from, empty if it was built from a string.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of cycles in the replay, including dropped ones.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of cycles left to replay.
    pub fn num_remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FeedbackSource for ReplayClient {
    fn pull_feedback(&mut self) -> Result<TelemFrame, TelemClientError> {
        match self.frames.pop_front() {
            Some(Some(frame)) => {
                self.current = Some(frame.clone());
                Ok(frame)
            }
            Some(None) => {
                self.current = None;
                debug!("Replay cycle has no feedback");
                Err(TelemClientError::FeedbackUnavailable(String::from(
                    "frame dropped in replay",
                )))
            }
            None => Err(TelemClientError::EndOfReplay),
        }
    }

    fn pull_lane_points(&mut self) -> Result<String, TelemClientError> {
        self.current
            .as_ref()
            .and_then(|f| f.lane_points.clone())
            .ok_or_else(|| {
                TelemClientError::FeedbackUnavailable(String::from(
                    "no lane point batch in the current frame",
                ))
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const REPLAY: &str = r#"
# two frames and a dropout
{"heading_deg": 0.0, "speed_mph": 30.0, "in_lane": true, "lane_offset_m": 0.0, "speed_limit_mph": 50.0, "position_m": [0.0, 0.0, 0.0], "lane_name": "L0", "lane_points": "1 10 0 0"}
null

{"heading_deg": 0.0, "speed_mph": 30.0, "in_lane": true, "lane_offset_m": 0.1, "speed_limit_mph": 50.0, "position_m": [1.0, 0.0, 0.0], "lane_name": "L0"}
"#;

    #[test]
    fn test_replay_sequence() {
        let mut c = ReplayClient::from_str(REPLAY).unwrap();
        assert_eq!(c.num_frames(), 3);

        let f = c.pull_feedback().unwrap();
        assert_eq!(f.lane_name, "L0");
        assert_eq!(c.pull_lane_points().unwrap(), "1 10 0 0");

        match c.pull_feedback() {
            Err(TelemClientError::FeedbackUnavailable(_)) => (),
            r => panic!("Expected unavailable feedback, got {:?}", r),
        }
        assert!(c.pull_lane_points().is_err());

        let f = c.pull_feedback().unwrap();
        assert_eq!(f.lane_offset_m, 0.1);
        match c.pull_lane_points() {
            Err(TelemClientError::FeedbackUnavailable(_)) => (),
            r => panic!("Expected no lane points, got {:?}", r),
        }

        assert_eq!(c.num_remaining(), 0);
        match c.pull_feedback() {
            Err(TelemClientError::EndOfReplay) => (),
            r => panic!("Expected end of replay, got {:?}", r),
        }
    }

    #[test]
    fn test_replay_errors() {
        match ReplayClient::from_str("# nothing here\n\n") {
            Err(TelemClientError::ReplayEmpty) => (),
            r => panic!("Expected empty replay, got {:?}", r.err()),
        }

        match ReplayClient::from_str("null\n{\"heading_deg\": 1.0}\n") {
            Err(TelemClientError::InvalidFrame(2, _)) => (),
            r => panic!("Expected invalid frame on line 2, got {:?}", r.err()),
        }

        match ReplayClient::new("/no/such/replay.jsonl") {
            Err(TelemClientError::LoadError(_)) => (),
            r => panic!("Expected load error, got {:?}", r.err()),
        }
    }
}
