//! Participant and Registration data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant. The bracket engine treats it as opaque.
pub type ParticipantId = Uuid;

/// A registered player (identity itself is owned by the external auth provider).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Contact address for notifications, if known.
    #[serde(default)]
    pub email: Option<String>,
}

impl Participant {
    /// Create a participant with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// A participant's entry into one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub participant: Participant,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            registered_at: Utc::now(),
        }
    }
}
