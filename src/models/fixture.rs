//! Fixture, FixtureKey, and the Bracket collection that owns them.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by the bracket engine (building and result propagation).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    /// Pool size is not a power of two, or smaller than 2.
    #[error("Pool size {size} is not a power of two of at least 2")]
    InvalidPoolSize { size: usize },
    /// The same participant was handed to the builder twice.
    #[error("Participant {0} appears more than once in the pool")]
    DuplicateParticipant(ParticipantId),
    #[error("No fixture at {0}")]
    FixtureNotFound(FixtureKey),
    /// The fixture already has a different winner recorded.
    #[error("Fixture at {key} is already completed with a different winner")]
    FixtureAlreadyCompleted { key: FixtureKey, recorded: ParticipantId },
    /// The reported winner is not one of the fixture's two players.
    #[error("Participant {winner} is not playing in the fixture at {key}")]
    InvalidWinner { key: FixtureKey, winner: ParticipantId },
    /// A stored fixture list does not describe a single-elimination bracket.
    #[error("Malformed bracket: {0}")]
    Malformed(String),
}

/// Address of one fixture: round (1 = earliest) and 1-indexed match number within it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FixtureKey {
    pub round: u32,
    pub match_number: u32,
}

impl FixtureKey {
    pub fn new(round: u32, match_number: u32) -> Self {
        Self {
            round,
            match_number,
        }
    }

    /// The fixture in the next round that this match's winner feeds into.
    pub fn next(self) -> Self {
        Self {
            round: self.round + 1,
            match_number: self.match_number.div_ceil(2),
        }
    }

    /// Slot the winner takes in [`FixtureKey::next`]: odd matches fill player 1, even fill player 2.
    pub fn next_slot(self) -> Slot {
        if self.match_number % 2 == 1 {
            Slot::Player1
        } else {
            Slot::Player2
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {}, match {}", self.round, self.match_number)
    }
}

/// One of the two player positions in a fixture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    #[default]
    Pending,
    Completed,
}

/// A single scheduled (or resolved) match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub round: u32,
    pub match_number: u32,
    /// None until filled (rounds after the first start empty).
    pub player1: Option<ParticipantId>,
    pub player2: Option<ParticipantId>,
    /// Set only when the fixture is completed.
    pub winner: Option<ParticipantId>,
    pub status: FixtureStatus,
}

impl Fixture {
    /// A first-round fixture with both players present.
    pub fn seeded(match_number: u32, player1: ParticipantId, player2: ParticipantId) -> Self {
        Self {
            round: 1,
            match_number,
            player1: Some(player1),
            player2: Some(player2),
            winner: None,
            status: FixtureStatus::Pending,
        }
    }

    /// A later-round placeholder, filled in by result propagation.
    pub fn placeholder(round: u32, match_number: u32) -> Self {
        Self {
            round,
            match_number,
            player1: None,
            player2: None,
            winner: None,
            status: FixtureStatus::Pending,
        }
    }

    pub fn key(&self) -> FixtureKey {
        FixtureKey::new(self.round, self.match_number)
    }

    pub fn is_completed(&self) -> bool {
        self.status == FixtureStatus::Completed
    }

    /// Both players known and no result yet.
    pub fn is_ready(&self) -> bool {
        !self.is_completed() && self.player1.is_some() && self.player2.is_some()
    }

    pub fn has_player(&self, id: ParticipantId) -> bool {
        self.player1 == Some(id) || self.player2 == Some(id)
    }

    pub fn player(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::Player1 => self.player1,
            Slot::Player2 => self.player2,
        }
    }

    pub(crate) fn player_mut(&mut self, slot: Slot) -> &mut Option<ParticipantId> {
        match slot {
            Slot::Player1 => &mut self.player1,
            Slot::Player2 => &mut self.player2,
        }
    }

    /// Record the winner and mark completed. Caller has validated the winner.
    pub(crate) fn complete(&mut self, winner: ParticipantId) {
        self.winner = Some(winner);
        self.status = FixtureStatus::Completed;
    }
}

/// The full fixture tree of one single-elimination tournament.
///
/// Fixtures are stored round-major, then by match number, and looked up through a
/// `(round, match_number)` index. Serialized as the plain fixture list; deserializing
/// re-validates the bracket shape.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Fixture>", into = "Vec<Fixture>")]
pub struct Bracket {
    fixtures: Vec<Fixture>,
    index: HashMap<FixtureKey, usize>,
    rounds: u32,
}

impl Bracket {
    /// Wrap a fixture list, checking that it forms a complete single-elimination tree.
    pub fn from_fixtures(mut fixtures: Vec<Fixture>) -> Result<Self, BracketError> {
        let pool_size = fixtures.len() + 1;
        if pool_size < 2 || !pool_size.is_power_of_two() {
            return Err(BracketError::Malformed(format!(
                "{} fixtures cannot form a single-elimination bracket",
                fixtures.len()
            )));
        }
        let rounds = pool_size.trailing_zeros();

        fixtures.sort_by_key(Fixture::key);
        let mut index = HashMap::with_capacity(fixtures.len());
        for (i, f) in fixtures.iter().enumerate() {
            let in_round = (pool_size >> f.round.min(rounds)) as u32;
            if f.round == 0 || f.round > rounds || f.match_number == 0 || f.match_number > in_round {
                return Err(BracketError::Malformed(format!("fixture at {} is out of range", f.key())));
            }
            if index.insert(f.key(), i).is_some() {
                return Err(BracketError::Malformed(format!("duplicate fixture at {}", f.key())));
            }
            match (f.status, f.winner) {
                (FixtureStatus::Completed, Some(w))
                    if f.has_player(w) && f.player1.is_some() && f.player2.is_some() => {}
                (FixtureStatus::Pending, None) => {}
                _ => {
                    return Err(BracketError::Malformed(format!(
                        "fixture at {} has an inconsistent result",
                        f.key()
                    )))
                }
            }
        }

        // Every key is now indexed. Round 1 is fully seeded; later slots hold exactly the
        // winner of their feeding match (None while it is unplayed).
        for f in &fixtures {
            if f.round == 1 {
                if f.player1.is_none() || f.player2.is_none() {
                    return Err(BracketError::Malformed(format!(
                        "fixture at {} is missing a player",
                        f.key()
                    )));
                }
                continue;
            }
            for (slot, feeder) in [
                (Slot::Player1, 2 * f.match_number - 1),
                (Slot::Player2, 2 * f.match_number),
            ] {
                let expected = index
                    .get(&FixtureKey::new(f.round - 1, feeder))
                    .and_then(|&i| fixtures[i].winner);
                if f.player(slot) != expected {
                    return Err(BracketError::Malformed(format!(
                        "{:?} of fixture at {} does not match the winner of round {}, match {}",
                        slot,
                        f.key(),
                        f.round - 1,
                        feeder
                    )));
                }
            }
        }

        Ok(Self {
            fixtures,
            index,
            rounds,
        })
    }

    /// Number of rounds (log2 of the pool size). The last round is the final.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn pool_size(&self) -> usize {
        self.fixtures.len() + 1
    }

    /// All fixtures, round-major then by match number.
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn get(&self, key: FixtureKey) -> Option<&Fixture> {
        self.index.get(&key).map(|&i| &self.fixtures[i])
    }

    pub(crate) fn get_mut(&mut self, key: FixtureKey) -> Option<&mut Fixture> {
        let i = *self.index.get(&key)?;
        self.fixtures.get_mut(i)
    }

    /// Fixtures of one round in match order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(move |f| f.round == round)
    }

    pub fn is_final(&self, key: FixtureKey) -> bool {
        key.round == self.rounds
    }

    pub fn final_fixture(&self) -> Option<&Fixture> {
        self.get(FixtureKey::new(self.rounds, 1))
    }

    /// Winner of the final, once it has been played.
    pub fn champion(&self) -> Option<ParticipantId> {
        self.final_fixture().and_then(|f| f.winner)
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// Fixtures with both players known and no result yet.
    pub fn ready_fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|f| f.is_ready())
    }

    /// Display name for a round ("Final", "Semi-finals", ...).
    pub fn round_label(&self, round: u32) -> String {
        match self.rounds.saturating_sub(round) {
            0 => "Final".to_string(),
            1 => "Semi-finals".to_string(),
            2 => "Quarter-finals".to_string(),
            n => format!("Round of {}", 2u64 << n),
        }
    }
}

impl TryFrom<Vec<Fixture>> for Bracket {
    type Error = BracketError;

    fn try_from(fixtures: Vec<Fixture>) -> Result<Self, Self::Error> {
        Self::from_fixtures(fixtures)
    }
}

impl From<Bracket> for Vec<Fixture> {
    fn from(bracket: Bracket) -> Self {
        bracket.fixtures
    }
}
