//! Data structures for cue-sports tournaments: participants, fixtures, brackets, tournament state.

mod fixture;
mod participant;
mod tournament;

pub use fixture::{Bracket, BracketError, Fixture, FixtureKey, FixtureStatus, Slot};
pub use participant::{Participant, ParticipantId, Registration};
pub use tournament::{
    is_valid_capacity, Tournament, TournamentDetails, TournamentError, TournamentId,
    TournamentState, TournamentStatus, MAX_POOL_SIZE,
};
