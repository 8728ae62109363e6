//! Notifications raised by tournament events. Delivery (SMTP etc.) lives outside this crate;
//! the bundled [`LogNotifier`] only writes them to the log.

use crate::models::{Participant, Tournament, TournamentId};
use serde::Serialize;

/// Something participants should hear about.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A new tournament was published.
    TournamentAnnounced { tournament_id: TournamentId, title: String },
    RegistrationConfirmed {
        tournament_id: TournamentId,
        title: String,
        participant: Participant,
    },
    RegistrationCancelled {
        tournament_id: TournamentId,
        title: String,
        participant: Participant,
    },
    /// Bracket generated; every registered participant receives their first-round fixture.
    FixturesPublished {
        tournament_id: TournamentId,
        title: String,
        recipients: Vec<Participant>,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        title: String,
        champion: Option<Participant>,
    },
}

impl Notification {
    pub fn announced(t: &Tournament) -> Self {
        Self::TournamentAnnounced {
            tournament_id: t.id,
            title: t.details.title.clone(),
        }
    }

    pub fn registration_confirmed(t: &Tournament, participant: Participant) -> Self {
        Self::RegistrationConfirmed {
            tournament_id: t.id,
            title: t.details.title.clone(),
            participant,
        }
    }

    pub fn registration_cancelled(t: &Tournament, participant: Participant) -> Self {
        Self::RegistrationCancelled {
            tournament_id: t.id,
            title: t.details.title.clone(),
            participant,
        }
    }

    pub fn fixtures_published(t: &Tournament) -> Self {
        Self::FixturesPublished {
            tournament_id: t.id,
            title: t.details.title.clone(),
            recipients: t.registrations.iter().map(|r| r.participant.clone()).collect(),
        }
    }

    pub fn completed(t: &Tournament) -> Self {
        let champion = t
            .bracket
            .as_ref()
            .and_then(|b| b.champion())
            .and_then(|id| t.participant(id))
            .cloned();
        Self::TournamentCompleted {
            tournament_id: t.id,
            title: t.details.title.clone(),
            champion,
        }
    }

    /// Subject line for an email rendering of this notification.
    pub fn subject(&self) -> String {
        match self {
            Self::TournamentAnnounced { title, .. } => format!("New Snooker Tournament: {title}"),
            Self::RegistrationConfirmed { title, .. } => format!("Registration Confirmed: {title}"),
            Self::RegistrationCancelled { title, .. } => format!("Registration Cancelled: {title}"),
            Self::FixturesPublished { title, .. } => format!("Fixtures: {title}"),
            Self::TournamentCompleted { title, .. } => format!("Results: {title}"),
        }
    }
}

/// Sink for notifications. Implementations must not fail the originating request.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match serde_json::to_string(notification) {
            Ok(body) => log::info!("[notify] {} {}", notification.subject(), body),
            Err(e) => log::warn!("[notify] {} (unserializable: {})", notification.subject(), e),
        }
    }
}
