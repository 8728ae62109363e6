//! Tournament, TournamentDetails, and TournamentState.

use crate::models::fixture::{Bracket, BracketError};
use crate::models::participant::{Participant, ParticipantId, Registration};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Largest pool a tournament may be created with.
pub const MAX_POOL_SIZE: usize = 64;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    #[error("Tournament is {state:?}; this action is not allowed")]
    InvalidState { state: TournamentState },
    /// A required detail field is empty.
    #[error("Tournament {0} is required")]
    MissingField(&'static str),
    /// Capacity must be a power of two between 2 and [`MAX_POOL_SIZE`].
    #[error("Capacity {0} must be a power of two between 2 and {max}", max = MAX_POOL_SIZE)]
    InvalidCapacity(usize),
    #[error("Tournament is full")]
    TournamentFull,
    /// Not enough free places for a bulk registration.
    #[error("Only {available} places left, {requested} requested")]
    NotEnoughPlaces { available: usize, requested: usize },
    #[error("Participant {0} is already registered")]
    AlreadyRegistered(ParticipantId),
    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    #[error(transparent)]
    Bracket(#[from] BracketError),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament. Bracket generation only happens on the Full → BracketBuilt edge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Taking registrations.
    #[default]
    Open,
    /// Pool at capacity; bracket not yet generated.
    Full,
    /// Fixtures exist; results are being reported.
    BracketBuilt,
    /// The final has a winner.
    Completed,
}

/// Public-facing status shown on event listings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Completed,
}

/// Descriptive fields of an event (everything the listing and detail pages show).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetails {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    /// Start time as entered by the organizer (e.g. "14:00").
    pub time: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub registration_fee: Option<String>,
    #[serde(default)]
    pub prize_pool: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<String>,
}

impl TournamentDetails {
    /// Trim text fields and check the required ones are present.
    pub fn normalized(mut self) -> Result<Self, TournamentError> {
        self.title = self.title.trim().to_string();
        self.location = self.location.trim().to_string();
        self.time = self.time.trim().to_string();
        if self.title.is_empty() {
            return Err(TournamentError::MissingField("title"));
        }
        if self.location.is_empty() {
            return Err(TournamentError::MissingField("location"));
        }
        if self.time.is_empty() {
            return Err(TournamentError::MissingField("time"));
        }
        self.rules.retain(|r| !r.trim().is_empty());
        self.schedule.retain(|s| !s.trim().is_empty());
        Ok(self)
    }
}

/// A tournament: event details, registrations, lifecycle state, and (once full) the bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub details: TournamentDetails,
    /// Pool size; the bracket is built when this many participants have registered.
    pub max_participants: usize,
    pub registrations: Vec<Registration>,
    pub state: TournamentState,
    /// Present from BracketBuilt onwards.
    pub bracket: Option<Bracket>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Open state with no participants.
    pub fn new(details: TournamentDetails, max_participants: usize) -> Result<Self, TournamentError> {
        if !is_valid_capacity(max_participants) {
            return Err(TournamentError::InvalidCapacity(max_participants));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            details: details.normalized()?,
            max_participants,
            registrations: Vec::new(),
            state: TournamentState::Open,
            bracket: None,
            created_at: Utc::now(),
        })
    }

    pub fn status(&self) -> TournamentStatus {
        match self.state {
            TournamentState::Open | TournamentState::Full => TournamentStatus::Upcoming,
            TournamentState::BracketBuilt => TournamentStatus::Ongoing,
            TournamentState::Completed => TournamentStatus::Completed,
        }
    }

    pub fn is_full(&self) -> bool {
        self.registrations.len() >= self.max_participants
    }

    pub fn places_left(&self) -> usize {
        self.max_participants.saturating_sub(self.registrations.len())
    }

    pub fn is_registered(&self, id: ParticipantId) -> bool {
        self.registrations.iter().any(|r| r.participant.id == id)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.registrations
            .iter()
            .map(|r| &r.participant)
            .find(|p| p.id == id)
    }

    /// Participant ids in registration order (the pool handed to the bracket builder).
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.registrations.iter().map(|r| r.participant.id).collect()
    }

    /// Fail with InvalidState unless the tournament is in one of `allowed`.
    pub(crate) fn require_state(&self, allowed: &[TournamentState]) -> Result<(), TournamentError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TournamentError::InvalidState { state: self.state })
        }
    }
}

/// A valid pool size: power of two in `2..=MAX_POOL_SIZE`.
pub fn is_valid_capacity(n: usize) -> bool {
    (2..=MAX_POOL_SIZE).contains(&n) && n.is_power_of_two()
}
