//! Single binary web server: JSON API under /api, the built client served from STATIC_DIR.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env (or .env): HOST, PORT, STATIC_DIR,
//! INACTIVITY_TIMEOUT_HOURS, DEFAULT_MAX_PARTICIPANTS.

use actix_files::Files;
use actix_web::{
    delete, get, http::StatusCode, patch, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use cue_tournament_web::{
    generate_fixtures, read_participants, record_result, register_participant,
    register_participants, reset_bracket, tournaments_for_participant, withdraw_participant,
    BracketError, LogNotifier, Notification, Notifier, Participant, ParticipantId,
    RegistrationOutcome, ResultOutcome, ServerConfig, Tournament, TournamentDetails,
    TournamentError, TournamentId, TournamentState, TournamentStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// Shared state. The write lock is the single writer for every tournament mutation.
struct AppData {
    tournaments: RwLock<HashMap<TournamentId, TournamentEntry>>,
    notifier: Box<dyn Notifier>,
    default_max_participants: usize,
}

type AppState = Data<AppData>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament as returned by the API: stored fields plus derived status.
#[derive(Serialize)]
struct TournamentView<'a> {
    #[serde(flatten)]
    tournament: &'a Tournament,
    status: TournamentStatus,
    places_left: usize,
}

impl<'a> From<&'a Tournament> for TournamentView<'a> {
    fn from(tournament: &'a Tournament) -> Self {
        Self {
            tournament,
            status: tournament.status(),
            places_left: tournament.places_left(),
        }
    }
}

#[derive(Serialize)]
struct ResultResponse<'a> {
    result: ResultOutcome,
    tournament: TournamentView<'a>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(flatten)]
    details: TournamentDetails,
    #[serde(default)]
    max_participants: Option<usize>,
}

#[derive(Deserialize)]
struct RegisterBody {
    /// Id issued by the identity provider; a fresh one is minted when absent.
    #[serde(default)]
    participant_id: Option<ParticipantId>,
    name: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    winner: ParticipantId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id.
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

#[derive(Deserialize)]
struct FixturePath {
    id: TournamentId,
    round: u32,
    match_number: u32,
}

#[derive(Deserialize)]
struct ParticipantPath {
    participant_id: ParticipantId,
}

fn error_json(status: StatusCode, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": message.to_string() }))
}

/// Map a domain error to a status: missing things 404, conflicts with current state 409.
fn error_response(e: &TournamentError) -> HttpResponse {
    use TournamentError::*;
    let status = match e {
        ParticipantNotFound(_) | Bracket(BracketError::FixtureNotFound(_)) => StatusCode::NOT_FOUND,
        InvalidState { .. }
        | TournamentFull
        | NotEnoughPlaces { .. }
        | AlreadyRegistered(_)
        | Bracket(BracketError::FixtureAlreadyCompleted { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    error_json(status, e)
}

/// Look up a tournament under the write lock, refresh its activity time, and run `f`.
fn with_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament, &dyn Notifier) -> HttpResponse,
{
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.tournament, state.notifier.as_ref())
        }
        None => error_json(StatusCode::NOT_FOUND, "No tournament"),
    }
}

/// Apply a mutation; on success dispatch its notifications and return the tournament.
fn update<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<Vec<Notification>, TournamentError>,
{
    with_tournament(state, id, |t, notifier| match f(t) {
        Ok(notifications) => {
            for n in &notifications {
                notifier.notify(n);
            }
            HttpResponse::Ok().json(TournamentView::from(&*t))
        }
        Err(e) => error_response(&e),
    })
}

/// Notifications after a registration: confirmation, plus fixtures if it filled the pool.
fn registration_notifications(
    t: &Tournament,
    participants: Vec<Participant>,
    outcome: RegistrationOutcome,
) -> Vec<Notification> {
    let mut out: Vec<Notification> = participants
        .into_iter()
        .map(|p| Notification::registration_confirmed(t, p))
        .collect();
    if outcome == RegistrationOutcome::BracketBuilt {
        out.push(Notification::fixtures_published(t));
    }
    out
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "cue-tournament-web",
    })
}

#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// List all tournaments, soonest first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    let g = match state.tournaments.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut list: Vec<&Tournament> = g.values().map(|e| &e.tournament).collect();
    list.sort_by_key(|t| (t.details.date, t.created_at));
    let views: Vec<TournamentView> = list.into_iter().map(TournamentView::from).collect();
    HttpResponse::Ok().json(views)
}

/// Create a tournament (Open) and announce it.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let max = body.max_participants.unwrap_or(state.default_max_participants);
    let tournament = match Tournament::new(body.details, max) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {} ({})", tournament.details.title, tournament.id);
    state.notifier.notify(&Notification::announced(&tournament));
    let response = HttpResponse::Created().json(TournamentView::from(&tournament));
    g.insert(
        tournament.id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t, _| HttpResponse::Ok().json(TournamentView::from(&*t)))
}

/// Register a participant (Open only). Taking the last place generates the bracket.
#[post("/api/tournaments/{id}/register")]
async fn api_register(state: AppState, path: Path<TournamentPath>, body: Json<RegisterBody>) -> HttpResponse {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "Name is required");
    }
    let participant = Participant {
        id: body.participant_id.unwrap_or_else(Uuid::new_v4),
        name: name.to_string(),
        email: body.email.filter(|e| !e.trim().is_empty()),
    };
    update(&state, path.id, |t| {
        let outcome = register_participant(t, participant.clone(), &mut rand::thread_rng())?;
        Ok(registration_notifications(t, vec![participant], outcome))
    })
}

/// Register every participant in a CSV body (`name,email` header). All or nothing.
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    let participants = match read_participants(body.as_bytes()) {
        Ok(p) => p,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, e),
    };
    update(&state, path.id, |t| {
        let outcome = register_participants(t, participants.clone(), &mut rand::thread_rng())?;
        Ok(registration_notifications(t, participants, outcome))
    })
}

/// Withdraw a participant (Open only).
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_withdraw(state: AppState, path: Path<TournamentParticipantPath>) -> HttpResponse {
    update(&state, path.id, |t| {
        let participant = withdraw_participant(t, path.participant_id)?;
        Ok(vec![Notification::registration_cancelled(t, participant)])
    })
}

/// Generate the bracket for a full tournament (Full only, e.g. after a reset).
#[post("/api/tournaments/{id}/fixtures/generate")]
async fn api_generate_fixtures(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t| {
        generate_fixtures(t, &mut rand::thread_rng())?;
        Ok(vec![Notification::fixtures_published(t)])
    })
}

/// Report the winner of one fixture and advance them.
#[patch("/api/tournaments/{id}/fixtures/{round}/{match_number}")]
async fn api_report_result(
    state: AppState,
    path: Path<FixturePath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t, notifier| {
        match record_result(t, path.round, path.match_number, body.winner) {
            Ok(result) => {
                if let ResultOutcome::TournamentComplete { .. } = result {
                    notifier.notify(&Notification::completed(t));
                }
                HttpResponse::Ok().json(ResultResponse {
                    result,
                    tournament: TournamentView::from(&*t),
                })
            }
            Err(e) => error_response(&e),
        }
    })
}

/// Throw away the bracket and its results (back to Full).
#[post("/api/tournaments/{id}/bracket/reset")]
async fn api_reset_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t| {
        reset_bracket(t)?;
        Ok(Vec::new())
    })
}

/// Dashboard: tournaments a participant is registered for.
#[get("/api/participants/{participant_id}/tournaments")]
async fn api_participant_tournaments(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    let g = match state.tournaments.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let found = tournaments_for_participant(g.values().map(|e| &e.tournament), path.participant_id);
    let views: Vec<TournamentView> = found.into_iter().map(TournamentView::from).collect();
    HttpResponse::Ok().json(views)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(AppData {
        tournaments: RwLock::new(HashMap::new()),
        notifier: Box::new(LogNotifier),
        default_max_participants: config.default_max_participants,
    });

    // Background task: every 30 minutes, drop tournaments idle past the timeout.
    // Tournaments still taking results are kept.
    if let Some(timeout) = config.inactivity_timeout {
        let state_cleanup = state.clone();
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
            loop {
                interval.tick().await;
                let mut g = match state_cleanup.tournaments.write() {
                    Ok(guard) => guard,
                    Err(_) => continue,
                };
                let before = g.len();
                g.retain(|_, entry| {
                    entry.tournament.state == TournamentState::BracketBuilt
                        || entry.last_activity.elapsed() < timeout
                });
                let removed = before - g.len();
                if removed > 0 {
                    log::info!("Cleaned up {} inactive tournament(s)", removed);
                }
            }
        });
    }

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_register)
            .service(api_import_participants)
            .service(api_withdraw)
            .service(api_generate_fixtures)
            .service(api_report_result)
            .service(api_reset_bracket)
            .service(api_participant_tournaments)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
