//! Tournament business logic: bracket building, result propagation, registration, import.

mod bracket;
mod import;
mod propagation;
mod registration;

pub use bracket::{build_bracket, seed_bracket};
pub use import::{read_participants, ImportError};
pub use propagation::{report_result, ResultOutcome};
pub use registration::{
    generate_fixtures, record_result, register_participant, register_participants, reset_bracket,
    tournaments_for_participant, withdraw_participant, RegistrationOutcome,
};
