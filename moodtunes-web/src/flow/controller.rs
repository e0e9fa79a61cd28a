//! Flow controller
//!
//! Owns the mood -> artist -> songs state machine:
//!
//! ```text
//!  [mood] --select_mood--> [artist] --select_artist(+lookup)--> [songs]
//!    ^                         |                                   |
//!    +-----------go_back-------+                 <--go_back--------+
//! ```
//!
//! Transitions are synchronous. The controller never performs a lookup
//! itself: `select_artist` and `refresh` hand back a [`LookupTicket`] and the
//! caller reports the outcome through [`FlowController::complete_lookup`].
//! Every ticket carries a sequence number; only the latest one is ever
//! applied, so a lookup abandoned by `go_back`, `reset` or a newer lookup
//! cannot overwrite current state.

use moodtunes_common::{ArtistSelection, FlowStep, MoodSelection, SongResult};
use serde::Serialize;
use thiserror::Error;

use crate::services::LookupOutcome;

/// Rejected flow transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Empty or whitespace-only mood; state unchanged
    #[error("Mood must not be empty")]
    EmptyMood,

    #[error("Cannot {action} during the {actual} step (expected {expected})")]
    StepOutOfOrder {
        action: &'static str,
        expected: FlowStep,
        actual: FlowStep,
    },

    #[error("No completed selection to refresh")]
    NothingToRefresh,
}

/// Current step plus accumulated selections
///
/// `step == Artist` implies `mood` is set; `step == Songs` implies both are.
/// `artist` is never set without `mood`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowState {
    pub step: FlowStep,
    pub mood: Option<MoodSelection>,
    pub artist: Option<ArtistSelection>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            step: FlowStep::Mood,
            mood: None,
            artist: None,
        }
    }
}

/// Progress of the latest lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Pending { seq: u64 },
    Ready { seq: u64, outcome: LookupOutcome },
    Failed { seq: u64, message: String },
}

/// A lookup the caller must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub mood: MoodSelection,
    pub artist: ArtistSelection,
}

/// Serializable view for the API and page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    pub step: FlowStep,
    pub mood: Option<MoodSelection>,
    pub artist: Option<ArtistSelection>,
    pub is_loading: bool,
    pub songs: Vec<SongResult>,
    /// One of `idle`, `pending`, `results`, `no_results`, `error`
    pub outcome: &'static str,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FlowController {
    state: FlowState,
    lookup: LookupState,
    last_seq: u64,
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            state: FlowState::default(),
            lookup: LookupState::Idle,
            last_seq: 0,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn step(&self) -> FlowStep {
        self.state.step
    }

    /// Sequence number of the most recently issued ticket (0 before any)
    pub fn latest_seq(&self) -> u64 {
        self.last_seq
    }

    /// True while the latest lookup has not completed
    pub fn is_loading(&self) -> bool {
        matches!(self.lookup, LookupState::Pending { .. })
    }

    fn expect_step(&self, action: &'static str, expected: FlowStep) -> Result<(), FlowError> {
        if self.state.step == expected {
            Ok(())
        } else {
            Err(FlowError::StepOutOfOrder {
                action,
                expected,
                actual: self.state.step,
            })
        }
    }

    fn issue_ticket(&mut self, mood: MoodSelection, artist: ArtistSelection) -> LookupTicket {
        self.last_seq += 1;
        self.lookup = LookupState::Pending { seq: self.last_seq };
        LookupTicket {
            seq: self.last_seq,
            mood,
            artist,
        }
    }

    /// Record the mood and move to artist selection
    ///
    /// The label is trimmed; case is preserved.
    pub fn select_mood(&mut self, label: &str) -> Result<&MoodSelection, FlowError> {
        let mood = MoodSelection::new(label).ok_or(FlowError::EmptyMood)?;
        self.expect_step("select a mood", FlowStep::Mood)?;

        self.state.step = FlowStep::Artist;
        self.state.artist = None;
        Ok(&*self.state.mood.insert(mood))
    }

    /// Record the artist, move to songs and request a lookup
    pub fn select_artist(&mut self, artist: ArtistSelection) -> Result<LookupTicket, FlowError> {
        self.expect_step("select an artist", FlowStep::Artist)?;
        let mood = match &self.state.mood {
            Some(mood) => mood.clone(),
            None => {
                return Err(FlowError::StepOutOfOrder {
                    action: "select an artist",
                    expected: FlowStep::Artist,
                    actual: FlowStep::Mood,
                })
            }
        };

        self.state.step = FlowStep::Songs;
        self.state.artist = Some(artist.clone());
        Ok(self.issue_ticket(mood, artist))
    }

    /// Step back one stage, clearing the abandoned selection
    ///
    /// songs -> artist clears the artist; artist -> mood clears both;
    /// mood is a no-op. Any in-flight lookup becomes stale.
    pub fn go_back(&mut self) -> FlowStep {
        match self.state.step {
            FlowStep::Mood => {}
            FlowStep::Artist => {
                self.state = FlowState::default();
                self.lookup = LookupState::Idle;
            }
            FlowStep::Songs => {
                self.state.step = FlowStep::Artist;
                self.state.artist = None;
                self.lookup = LookupState::Idle;
            }
        }
        self.state.step
    }

    /// Return to the mood step with no selections
    pub fn reset(&mut self) {
        self.state = FlowState::default();
        self.lookup = LookupState::Idle;
    }

    /// Repeat the lookup for the current (mood, artist) pair
    ///
    /// Supersedes any lookup still in flight.
    pub fn refresh(&mut self) -> Result<LookupTicket, FlowError> {
        self.expect_step("refresh", FlowStep::Songs)?;
        match (&self.state.mood, &self.state.artist) {
            (Some(mood), Some(artist)) => {
                let (mood, artist) = (mood.clone(), artist.clone());
                Ok(self.issue_ticket(mood, artist))
            }
            _ => Err(FlowError::NothingToRefresh),
        }
    }

    /// Apply a finished lookup if it is still the latest one
    ///
    /// Returns `false` (and changes nothing) for a stale sequence number.
    pub fn complete_lookup(&mut self, seq: u64, result: Result<LookupOutcome, String>) -> bool {
        let current = matches!(self.lookup, LookupState::Pending { seq: pending } if pending == seq);
        if !current || self.state.step != FlowStep::Songs {
            return false;
        }

        self.lookup = match result {
            Ok(outcome) => LookupState::Ready { seq, outcome },
            Err(message) => LookupState::Failed { seq, message },
        };
        true
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let (songs, outcome, error) = match &self.lookup {
            LookupState::Idle => (Vec::new(), "idle", None),
            LookupState::Pending { .. } => (Vec::new(), "pending", None),
            LookupState::Ready {
                outcome: LookupOutcome::Results(songs),
                ..
            } => (songs.clone(), "results", None),
            LookupState::Ready {
                outcome: LookupOutcome::NoResults,
                ..
            } => (Vec::new(), "no_results", None),
            LookupState::Failed { message, .. } => (Vec::new(), "error", Some(message.clone())),
        };

        FlowSnapshot {
            step: self.state.step,
            mood: self.state.mood.clone(),
            artist: self.state.artist.clone(),
            is_loading: self.is_loading(),
            songs,
            outcome,
            error,
        }
    }
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}
