//! Single binary web server: bracket engine JSON API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, BRACKET_SWEEP_LIMIT.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use arcade_bracket::{
    BracketService, BracketType, Config, MatchId, MemoryStore, ParticipantId, SeedingPolicy,
    TournamentError, TournamentId, Zone,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

/// Shared engine over the in-memory store.
type AppState = Data<BracketService<MemoryStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    bracket_type: BracketType,
}

#[derive(Deserialize)]
struct AddParticipantBody {
    name: String,
    #[serde(default)]
    seed: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    #[serde(default)]
    seeding: SeedingPolicy,
    /// Fixed seed for a reproducible shuffle.
    #[serde(default)]
    rng_seed: Option<u64>,
}

#[derive(Deserialize)]
struct ReportWinnerBody {
    winner_id: ParticipantId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

/// Path segments: tournament id, stored round number and position
#[derive(Deserialize)]
struct MatchSlotPath {
    id: TournamentId,
    round: u32,
    position: u32,
}

#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let mut builder = match e {
        TournamentError::TournamentNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::ParticipantNotFound(_) => HttpResponse::NotFound(),
        TournamentError::Store(_) => HttpResponse::InternalServerError(),
        _ => HttpResponse::BadRequest(),
    };
    builder.json(serde_json::json!({ "error": e.to_string() }))
}

/// Current tournament data, or the error that prevented reading it.
fn data_response(state: &AppState, id: TournamentId) -> HttpResponse {
    match state.get_tournament_data(id) {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "arcade-bracket",
    })
}

/// Create a new tournament in draft status.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    match state.create_tournament(&body.name, body.bracket_type) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Tournament with participants, ordered matches and champion.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    data_response(&state, path.id)
}

/// Add a participant (tournament must be in draft).
#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    match state.add_participant(path.id, &body.name, body.seed) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(e),
    }
}

/// Remove a participant by id (tournament must be in draft).
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(state: AppState, path: Path<TournamentParticipantPath>) -> HttpResponse {
    match state.remove_participant(path.id, path.participant_id) {
        Ok(()) => data_response(&state, path.id),
        Err(e) => error_response(e),
    }
}

/// Import participants from a CSV body (`name,seed` header).
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    match state.import_participants(path.id, body.as_bytes()) {
        Ok(added) => HttpResponse::Ok().json(added),
        Err(e) => error_response(e),
    }
}

/// Generate (or regenerate) the bracket.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<GenerateBracketBody>>,
) -> HttpResponse {
    let (seeding, rng_seed) = match body {
        Some(body) => {
            let body = body.into_inner();
            (body.seeding, body.rng_seed)
        }
        None => (SeedingPolicy::default(), None),
    };
    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    match state.generate_bracket(path.id, &seeding, &mut rng) {
        Ok(_) => data_response(&state, path.id),
        Err(e) => error_response(e),
    }
}

/// Sweep byes; normally a no-op since every report already sweeps.
#[post("/api/tournaments/{id}/auto-advance")]
async fn api_auto_advance(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.auto_advance(path.id) {
        Ok(advanced) => {
            log::info!("Auto-advanced {} matches in tournament {}", advanced, path.id);
            data_response(&state, path.id)
        }
        Err(e) => error_response(e),
    }
}

/// One match by stored round number (1.., 100.., 1000, 1001) and position.
#[get("/api/tournaments/{id}/matches/{round}/{position}")]
async fn api_find_match(state: AppState, path: Path<MatchSlotPath>) -> HttpResponse {
    let Some(zone) = Zone::from_round_number(path.round) else {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Invalid round number" }));
    };
    match state.find_match(path.id, zone, path.position) {
        Ok(Some(m)) => HttpResponse::Ok().json(m),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "No match at that position" })),
        Err(e) => error_response(e),
    }
}

/// Report the winner of a match.
#[put("/api/matches/{match_id}/winner")]
async fn api_report_winner(state: AppState, path: Path<MatchPath>, body: Json<ReportWinnerBody>) -> HttpResponse {
    match state.report_winner(path.match_id, body.winner_id) {
        Ok(m) => data_response(&state, m.tournament_id),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(BracketService::new(MemoryStore::new()).with_sweep_limit(config.sweep_limit));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_participant)
            .service(api_remove_participant)
            .service(api_import_participants)
            .service(api_generate_bracket)
            .service(api_auto_advance)
            .service(api_find_match)
            .service(api_report_winner)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
