//! Integration tests for the tournament lifecycle: registration, bracket generation, results, reset.

use chrono::NaiveDate;
use cue_tournament_web::{
    generate_fixtures, record_result, register_participant, register_participants, reset_bracket,
    tournaments_for_participant, withdraw_participant, BracketError, FixtureKey, Notification,
    Participant, RegistrationOutcome, ResultOutcome, Tournament, TournamentDetails,
    TournamentError, TournamentState, TournamentStatus,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn details(title: &str) -> TournamentDetails {
    TournamentDetails {
        title: title.to_string(),
        description: None,
        location: "Crucible Club".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
        time: "14:00".to_string(),
        image: None,
        registration_fee: Some("20".to_string()),
        prize_pool: Some("500".to_string()),
        rules: vec!["Best of 5 frames".to_string(), "  ".to_string()],
        schedule: Vec::new(),
    }
}

fn players(n: usize) -> Vec<Participant> {
    (0..n).map(|i| Participant::new(format!("P{}", i + 1))).collect()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(99)
}

/// A tournament with every place taken, so the bracket has been built.
fn full_tournament(n: usize) -> Tournament {
    let mut t = Tournament::new(details("Winter Open"), n).unwrap();
    register_participants(&mut t, players(n), &mut rng()).unwrap();
    t
}

#[test]
fn new_tournament_validates_capacity_and_details() {
    for bad in [0, 1, 6, 128] {
        assert_eq!(
            Tournament::new(details("Cup"), bad).err(),
            Some(TournamentError::InvalidCapacity(bad))
        );
    }
    assert_eq!(
        Tournament::new(details("   "), 8).err(),
        Some(TournamentError::MissingField("title"))
    );
    let t = Tournament::new(details(" Cup "), 8).unwrap();
    assert_eq!(t.details.title, "Cup");
    assert_eq!(t.details.rules.len(), 1);
    assert_eq!(t.state, TournamentState::Open);
    assert_eq!(t.status(), TournamentStatus::Upcoming);
    assert_eq!(t.places_left(), 8);
}

#[test]
fn filling_the_pool_builds_the_bracket_once() {
    let mut t = Tournament::new(details("Cup"), 8).unwrap();
    let mut r = rng();
    let ps = players(8);
    for p in &ps[..7] {
        assert_eq!(
            register_participant(&mut t, p.clone(), &mut r),
            Ok(RegistrationOutcome::Registered)
        );
        assert!(t.bracket.is_none());
    }
    assert_eq!(
        register_participant(&mut t, ps[7].clone(), &mut r),
        Ok(RegistrationOutcome::BracketBuilt)
    );
    assert_eq!(t.state, TournamentState::BracketBuilt);
    assert_eq!(t.status(), TournamentStatus::Ongoing);
    let bracket = t.bracket.as_ref().unwrap();
    assert_eq!(bracket.fixtures().len(), 7);
    for p in &ps {
        assert_eq!(bracket.round(1).filter(|f| f.has_player(p.id)).count(), 1);
    }

    assert_eq!(
        generate_fixtures(&mut t, &mut r),
        Err(TournamentError::InvalidState { state: TournamentState::BracketBuilt })
    );
    assert_eq!(
        register_participant(&mut t, Participant::new("Late"), &mut r),
        Err(TournamentError::TournamentFull)
    );
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut t = Tournament::new(details("Cup"), 4).unwrap();
    let p = Participant::new("Ronnie").with_email("ronnie@example.com");
    register_participant(&mut t, p.clone(), &mut rng()).unwrap();
    assert_eq!(
        register_participant(&mut t, p.clone(), &mut rng()),
        Err(TournamentError::AlreadyRegistered(p.id))
    );
    assert!(TournamentError::AlreadyRegistered(p.id).to_string().contains(&p.id.to_string()));
    assert_eq!(t.registrations.len(), 1);
    assert_eq!(t.participant(p.id).and_then(|p| p.email.as_deref()), Some("ronnie@example.com"));
}

#[test]
fn bulk_registration_is_all_or_nothing() {
    let mut t = Tournament::new(details("Cup"), 4).unwrap();
    register_participant(&mut t, Participant::new("First"), &mut rng()).unwrap();

    assert_eq!(
        register_participants(&mut t, players(4), &mut rng()),
        Err(TournamentError::NotEnoughPlaces { available: 3, requested: 4 })
    );
    let mut batch = players(2);
    batch.push(batch[0].clone());
    assert_eq!(
        register_participants(&mut t, batch.clone(), &mut rng()),
        Err(TournamentError::AlreadyRegistered(batch[0].id))
    );
    assert_eq!(t.registrations.len(), 1);

    assert_eq!(
        register_participants(&mut t, players(3), &mut rng()),
        Ok(RegistrationOutcome::BracketBuilt)
    );
    assert_eq!(t.state, TournamentState::BracketBuilt);
}

#[test]
fn withdraw_only_while_open() {
    let mut t = Tournament::new(details("Cup"), 4).unwrap();
    let ps = players(3);
    register_participants(&mut t, ps.clone(), &mut rng()).unwrap();

    let removed = withdraw_participant(&mut t, ps[1].id).unwrap();
    assert_eq!(removed.id, ps[1].id);
    assert_eq!(t.places_left(), 2);
    assert_eq!(
        withdraw_participant(&mut t, ps[1].id),
        Err(TournamentError::ParticipantNotFound(ps[1].id))
    );
    assert_eq!(
        TournamentError::ParticipantNotFound(ps[1].id).to_string(),
        format!("Participant {} not found", ps[1].id)
    );

    register_participants(&mut t, players(2), &mut rng()).unwrap();
    assert_eq!(
        withdraw_participant(&mut t, ps[0].id),
        Err(TournamentError::InvalidState { state: TournamentState::BracketBuilt })
    );
}

#[test]
fn results_cannot_be_recorded_before_the_bracket_exists() {
    let mut t = Tournament::new(details("Cup"), 4).unwrap();
    let p = Participant::new("Solo");
    register_participant(&mut t, p.clone(), &mut rng()).unwrap();
    assert_eq!(
        record_result(&mut t, 1, 1, p.id),
        Err(TournamentError::InvalidState { state: TournamentState::Open })
    );
    assert_eq!(
        generate_fixtures(&mut t, &mut rng()),
        Err(TournamentError::InvalidState { state: TournamentState::Open })
    );
}

#[test]
fn playing_every_match_completes_the_tournament() {
    let mut t = full_tournament(8);
    loop {
        let next = t
            .bracket
            .as_ref()
            .unwrap()
            .ready_fixtures()
            .next()
            .map(|f| (f.round, f.match_number, f.player1.unwrap()));
        let Some((round, m, winner)) = next else { break };
        let outcome = record_result(&mut t, round, m, winner).unwrap();
        if round == 3 {
            assert_eq!(outcome, ResultOutcome::TournamentComplete { champion: winner });
        }
    }
    assert_eq!(t.state, TournamentState::Completed);
    assert_eq!(t.status(), TournamentStatus::Completed);

    let champion = t.bracket.as_ref().unwrap().champion().unwrap();
    assert_eq!(record_result(&mut t, 3, 1, champion), Ok(ResultOutcome::AlreadyRecorded));
    assert_eq!(t.state, TournamentState::Completed);

    match Notification::completed(&t) {
        Notification::TournamentCompleted { champion: Some(p), title, .. } => {
            assert_eq!(p.id, champion);
            assert_eq!(title, "Winter Open");
        }
        other => panic!("unexpected notification {other:?}"),
    }
}

#[test]
fn bracket_errors_surface_through_the_tournament() {
    let mut t = full_tournament(4);
    let outsider = Participant::new("Outsider");
    assert_eq!(
        record_result(&mut t, 1, 1, outsider.id),
        Err(TournamentError::Bracket(BracketError::InvalidWinner {
            key: FixtureKey::new(1, 1),
            winner: outsider.id,
        }))
    );
    assert!(matches!(
        record_result(&mut t, 5, 1, outsider.id),
        Err(TournamentError::Bracket(BracketError::FixtureNotFound(_)))
    ));
}

#[test]
fn reset_returns_to_full_and_allows_a_new_draw() {
    let mut t = full_tournament(4);
    let first = t.bracket.as_ref().unwrap().fixtures()[0].clone();
    record_result(&mut t, 1, 1, first.player1.unwrap()).unwrap();

    reset_bracket(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::Full);
    assert!(t.bracket.is_none());
    assert_eq!(
        reset_bracket(&mut t),
        Err(TournamentError::InvalidState { state: TournamentState::Full })
    );

    generate_fixtures(&mut t, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(t.state, TournamentState::BracketBuilt);
    let bracket = t.bracket.as_ref().unwrap();
    assert!(bracket.fixtures().iter().all(|f| f.winner.is_none()));
}

#[test]
fn dashboard_lists_only_the_participants_tournaments() {
    let me = Participant::new("Me");
    let mut a = Tournament::new(details("A"), 4).unwrap();
    let mut b = Tournament::new(details("B"), 4).unwrap();
    b.details.date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
    let c = Tournament::new(details("C"), 4).unwrap();
    register_participant(&mut a, me.clone(), &mut rng()).unwrap();
    register_participant(&mut b, me.clone(), &mut rng()).unwrap();

    let all = [a, b, c];
    let mine = tournaments_for_participant(all.iter(), me.id);
    let titles: Vec<&str> = mine.iter().map(|t| t.details.title.as_str()).collect();
    assert_eq!(titles, vec!["B", "A"]);
}

#[test]
fn notifications_carry_subjects_and_recipients() {
    let t = full_tournament(4);
    assert_eq!(Notification::announced(&t).subject(), "New Snooker Tournament: Winter Open");
    match Notification::fixtures_published(&t) {
        Notification::FixturesPublished { recipients, .. } => assert_eq!(recipients.len(), 4),
        other => panic!("unexpected notification {other:?}"),
    }
    let p = t.registrations[0].participant.clone();
    assert_eq!(
        Notification::registration_cancelled(&t, p).subject(),
        "Registration Cancelled: Winter Open"
    );
}
