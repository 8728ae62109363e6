//! Bracket builder: random seeding into a single-elimination fixture tree.

use crate::models::{Bracket, BracketError, Fixture, ParticipantId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Build every fixture of a single-elimination bracket for `participants`.
///
/// 1. Reject pools that are not a power of two ≥ 2, or that list someone twice.
/// 2. Shuffle (Fisher–Yates, so every seeding is equally likely).
/// 3. Pair consecutive players into round 1: pair i → match i + 1.
/// 4. Add empty placeholders for rounds 2..=log2(n), n / 2^r matches each.
///
/// Returned round-major, then by match number. Nothing is stored; the caller owns persistence.
pub fn build_bracket<R: Rng + ?Sized>(
    participants: &[ParticipantId],
    rng: &mut R,
) -> Result<Vec<Fixture>, BracketError> {
    let size = participants.len();
    if size < 2 || !size.is_power_of_two() {
        return Err(BracketError::InvalidPoolSize { size });
    }
    let mut seen = HashSet::with_capacity(size);
    if let Some(&dup) = participants.iter().find(|&&id| !seen.insert(id)) {
        return Err(BracketError::DuplicateParticipant(dup));
    }

    let mut seeding = participants.to_vec();
    seeding.shuffle(rng);

    let rounds = size.trailing_zeros();
    let mut fixtures: Vec<Fixture> = seeding
        .chunks_exact(2)
        .zip(1u32..)
        .map(|(pair, match_number)| Fixture::seeded(match_number, pair[0], pair[1]))
        .collect();

    for round in 2..=rounds {
        let matches_in_round = (size >> round) as u32;
        fixtures.extend((1..=matches_in_round).map(|m| Fixture::placeholder(round, m)));
    }

    log::debug!("Built bracket: {} participants, {} rounds, {} fixtures", size, rounds, fixtures.len());
    Ok(fixtures)
}

/// [`build_bracket`], wrapped in an indexed [`Bracket`].
pub fn seed_bracket<R: Rng + ?Sized>(
    participants: &[ParticipantId],
    rng: &mut R,
) -> Result<Bracket, BracketError> {
    Bracket::from_fixtures(build_bracket(participants, rng)?)
}
