//! Result propagation: record a match winner and advance them into the next round.

use crate::models::{Bracket, BracketError, FixtureKey, ParticipantId, Slot};
use serde::Serialize;

/// What a reported result did to the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResultOutcome {
    /// Winner recorded and placed into `slot` of the fixture at `next`.
    Advanced { next: FixtureKey, slot: Slot },
    /// The final was decided; nothing left to propagate.
    TournamentComplete { champion: ParticipantId },
    /// Same winner reported again for a completed fixture; nothing changed.
    AlreadyRecorded,
}

/// Record `winner` for the fixture at (`round`, `match_number`) and propagate it.
///
/// Match 2k-1 and 2k of round r feed match k of round r+1; the odd (earlier) match always
/// fills player 1, so the next fixture's layout does not depend on the order results arrive.
/// All checks run before anything is written, so an error leaves the bracket untouched.
pub fn report_result(
    bracket: &mut Bracket,
    round: u32,
    match_number: u32,
    winner: ParticipantId,
) -> Result<ResultOutcome, BracketError> {
    let key = FixtureKey::new(round, match_number);
    let fixture = bracket.get(key).ok_or(BracketError::FixtureNotFound(key))?;

    if let Some(recorded) = fixture.winner {
        return if recorded == winner {
            Ok(ResultOutcome::AlreadyRecorded)
        } else {
            Err(BracketError::FixtureAlreadyCompleted { key, recorded })
        };
    }
    if !fixture.has_player(winner) {
        return Err(BracketError::InvalidWinner { key, winner });
    }

    if bracket.is_final(key) {
        if let Some(f) = bracket.get_mut(key) {
            f.complete(winner);
        }
        log::info!("Final decided: {} wins", winner);
        return Ok(ResultOutcome::TournamentComplete { champion: winner });
    }

    let next = key.next();
    let slot = key.next_slot();
    let occupant = bracket
        .get(next)
        .ok_or(BracketError::FixtureNotFound(next))?
        .player(slot);
    if let Some(other) = occupant {
        return Err(BracketError::Malformed(format!(
            "{:?} of fixture at {} already holds {}",
            slot, next, other
        )));
    }

    if let Some(f) = bracket.get_mut(key) {
        f.complete(winner);
    }
    if let Some(f) = bracket.get_mut(next) {
        *f.player_mut(slot) = Some(winner);
    }
    log::debug!("Result at {}: {} advances to {} ({:?})", key, winner, next, slot);
    Ok(ResultOutcome::Advanced { next, slot })
}
