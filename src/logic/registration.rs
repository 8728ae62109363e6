//! Registration and bracket lifecycle: Open → Full → BracketBuilt → Completed.

use crate::logic::bracket::seed_bracket;
use crate::logic::propagation::{report_result, ResultOutcome};
use crate::models::{
    Participant, ParticipantId, Registration, Tournament, TournamentError, TournamentState,
};
use rand::Rng;

/// Result of a successful registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistrationOutcome {
    /// Participant added; places are still open.
    Registered,
    /// Participant took the last place and the bracket has been generated.
    BracketBuilt,
}

/// Register one participant (Open only). Filling the last place builds the bracket.
pub fn register_participant<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    participant: Participant,
    rng: &mut R,
) -> Result<RegistrationOutcome, TournamentError> {
    if tournament.is_full() {
        return Err(TournamentError::TournamentFull);
    }
    tournament.require_state(&[TournamentState::Open])?;
    if tournament.is_registered(participant.id) {
        return Err(TournamentError::AlreadyRegistered(participant.id));
    }
    log::info!(
        "Registering {} for {} ({}/{})",
        participant.name,
        tournament.details.title,
        tournament.registrations.len() + 1,
        tournament.max_participants
    );
    tournament.registrations.push(Registration::new(participant));
    fill_if_complete(tournament, rng)
}

/// Register several participants at once. Either all are added or none.
pub fn register_participants<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    participants: Vec<Participant>,
    rng: &mut R,
) -> Result<RegistrationOutcome, TournamentError> {
    tournament.require_state(&[TournamentState::Open])?;
    let available = tournament.places_left();
    if participants.len() > available {
        return Err(TournamentError::NotEnoughPlaces {
            available,
            requested: participants.len(),
        });
    }
    for (i, p) in participants.iter().enumerate() {
        let repeated = participants[..i].iter().any(|q| q.id == p.id);
        if repeated || tournament.is_registered(p.id) {
            return Err(TournamentError::AlreadyRegistered(p.id));
        }
    }
    tournament
        .registrations
        .extend(participants.into_iter().map(Registration::new));
    fill_if_complete(tournament, rng)
}

/// Withdraw a participant before the pool closes.
pub fn withdraw_participant(
    tournament: &mut Tournament,
    participant_id: ParticipantId,
) -> Result<Participant, TournamentError> {
    tournament.require_state(&[TournamentState::Open])?;
    let idx = tournament
        .registrations
        .iter()
        .position(|r| r.participant.id == participant_id)
        .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
    Ok(tournament.registrations.remove(idx).participant)
}

/// Generate the bracket for a full pool (Full → BracketBuilt). The only place brackets are built.
pub fn generate_fixtures<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.require_state(&[TournamentState::Full])?;
    let bracket = seed_bracket(&tournament.participant_ids(), rng)?;
    log::info!(
        "Generated {} fixtures over {} rounds for {}",
        bracket.fixtures().len(),
        bracket.rounds(),
        tournament.details.title
    );
    tournament.bracket = Some(bracket);
    tournament.state = TournamentState::BracketBuilt;
    Ok(())
}

/// Report a match result. Deciding the final moves the tournament to Completed.
pub fn record_result(
    tournament: &mut Tournament,
    round: u32,
    match_number: u32,
    winner: ParticipantId,
) -> Result<ResultOutcome, TournamentError> {
    tournament.require_state(&[TournamentState::BracketBuilt, TournamentState::Completed])?;
    let state = tournament.state;
    let bracket = tournament
        .bracket
        .as_mut()
        .ok_or(TournamentError::InvalidState { state })?;
    let outcome = report_result(bracket, round, match_number, winner)?;
    if let ResultOutcome::TournamentComplete { .. } = outcome {
        tournament.state = TournamentState::Completed;
    }
    Ok(outcome)
}

/// Discard the bracket and all recorded results (BracketBuilt/Completed → Full).
pub fn reset_bracket(tournament: &mut Tournament) -> Result<(), TournamentError> {
    tournament.require_state(&[TournamentState::BracketBuilt, TournamentState::Completed])?;
    log::warn!("Resetting bracket for {}", tournament.details.title);
    tournament.bracket = None;
    tournament.state = TournamentState::Full;
    Ok(())
}

/// Tournaments the participant is registered for (the personal dashboard).
pub fn tournaments_for_participant<'a, I>(
    tournaments: I,
    participant_id: ParticipantId,
) -> Vec<&'a Tournament>
where
    I: IntoIterator<Item = &'a Tournament>,
{
    let mut found: Vec<&Tournament> = tournaments
        .into_iter()
        .filter(|t| t.is_registered(participant_id))
        .collect();
    found.sort_by_key(|t| (t.details.date, t.created_at));
    found
}

fn fill_if_complete<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RegistrationOutcome, TournamentError> {
    if !tournament.is_full() {
        return Ok(RegistrationOutcome::Registered);
    }
    tournament.state = TournamentState::Full;
    generate_fixtures(tournament, rng)?;
    Ok(RegistrationOutcome::BracketBuilt)
}
