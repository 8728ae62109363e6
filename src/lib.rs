//! Cue-sports tournament web app: library with models, bracket engine, and registration logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod notify;

pub use config::{ConfigError, ServerConfig};
pub use logic::{
    build_bracket, generate_fixtures, read_participants, record_result, register_participant,
    register_participants, report_result, reset_bracket, seed_bracket, tournaments_for_participant,
    withdraw_participant, ImportError, RegistrationOutcome, ResultOutcome,
};
pub use models::{
    is_valid_capacity, Bracket, BracketError, Fixture, FixtureKey, FixtureStatus, Participant,
    ParticipantId, Registration, Slot, Tournament, TournamentDetails, TournamentError,
    TournamentId, TournamentState, TournamentStatus, MAX_POOL_SIZE,
};
pub use notify::{LogNotifier, Notification, Notifier};
