//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use beach_tennis_web::{
    compute_standings, Event, EventError, EventId, SchedulingError, SortCriterion,
    TournamentFormat, DEFAULT_CRITERIA,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-event entry: event data + last activity time (for auto-cleanup).
struct EventEntry {
    event: Event,
    last_activity: Instant,
}

/// In-memory state: many events by ID. Entries are removed after inactivity.
type AppState = Data<RwLock<HashMap<EventId, EventEntry>>>;

/// Inactivity threshold: events not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Event plus derived completion state. `completion_notice` is true exactly
/// once, on the response where completion was first observed.
#[derive(Serialize)]
struct EventResponse<'a> {
    #[serde(flatten)]
    event: &'a Event,
    tournament_complete: bool,
    completion_notice: bool,
}

impl<'a> EventResponse<'a> {
    fn of(event: &'a mut Event) -> EventResponse<'a> {
        let completion_notice = event.take_completion_notice();
        EventResponse {
            tournament_complete: event.is_complete(),
            completion_notice,
            event,
        }
    }
}

/// Compact event info for the browse list.
#[derive(Serialize)]
struct EventSummary {
    id: EventId,
    name: String,
    code: String,
    format: TournamentFormat,
    player_count: usize,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl EventSummary {
    fn of(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            code: event.code.clone(),
            format: event.format,
            player_count: event.players.len(),
            created_at: event.created_at,
        }
    }
}

#[derive(Deserialize)]
struct CreateEventBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct PlayerNameBody {
    name: String,
}

#[derive(Deserialize)]
struct ScoreBody {
    match_id: Uuid,
    score_1: u32,
    score_2: u32,
}

#[derive(Deserialize)]
struct StandingsQuery {
    /// Comma-separated criteria, e.g. "wins,gameBalance".
    criteria: Option<String>,
}

/// Path segment: event id (e.g. /api/events/{id})
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

/// Path segments: event id and player id.
#[derive(Deserialize)]
struct EventPlayerPath {
    id: EventId,
    player_id: Uuid,
}

fn error_json(msg: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": msg.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" }))
}

/// Look up an event, refresh its last_activity, and run `f` on it.
fn with_event<F>(state: &AppState, id: EventId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Event) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.event)
        }
        None => not_found(),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "beach-tennis-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new event (returns it with id and share code).
#[post("/api/events")]
async fn api_create_event(state: AppState, body: Json<CreateEventBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return error_json("Event name cannot be empty");
    }
    let event = Event::new(name, body.format, &mut rand::thread_rng());
    let id = event.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        EventEntry {
            event,
            last_activity: Instant::now(),
        },
    );
    match g.get_mut(&id) {
        Some(entry) => HttpResponse::Ok().json(EventResponse::of(&mut entry.event)),
        None => not_found(),
    }
}

/// List all events (newest first).
#[get("/api/events")]
async fn api_list_events(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut summaries: Vec<EventSummary> = g.values().map(|e| EventSummary::of(&e.event)).collect();
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    HttpResponse::Ok().json(summaries)
}

/// Get an event by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/events/{id}")]
async fn api_get_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    with_event(&state, path.id, |e| {
        HttpResponse::Ok().json(EventResponse::of(e))
    })
}

/// Find an event by its share code (case-insensitive).
#[get("/api/events/code/{code}")]
async fn api_get_event_by_code(state: AppState, path: Path<String>) -> HttpResponse {
    let code = path.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let found = g
        .values_mut()
        .find(|entry| entry.event.code.eq_ignore_ascii_case(code.trim()));
    match found {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(EventResponse::of(&mut entry.event))
        }
        None => not_found(),
    }
}

/// Add a player to the roster.
#[post("/api/events/{id}/players")]
async fn api_add_player(
    state: AppState,
    path: Path<EventPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    with_event(&state, path.id, |e| match e.add_player(body.name.trim()) {
        Ok(_) => HttpResponse::Ok().json(EventResponse::of(e)),
        Err(err) => error_json(err),
    })
}

/// Remove a player (only while no match references them).
#[delete("/api/events/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<EventPlayerPath>) -> HttpResponse {
    with_event(&state, path.id, |e| match e.remove_player(path.player_id) {
        Ok(()) => HttpResponse::Ok().json(EventResponse::of(e)),
        Err(err) => error_json(err),
    })
}

/// Rename a player (identity and match references unchanged).
#[put("/api/events/{id}/players/{player_id}/name")]
async fn api_rename_player(
    state: AppState,
    path: Path<EventPlayerPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    with_event(&state, path.id, |e| {
        match e.rename_player(path.player_id, body.name.trim()) {
            Ok(()) => HttpResponse::Ok().json(EventResponse::of(e)),
            Err(err) => error_json(err),
        }
    })
}

/// Map a generation result to a response. `Exhausted` is the terminal success
/// state (tournament complete), not a request error.
fn generation_response(event: &mut Event, result: Result<(), EventError>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Ok().json(EventResponse::of(event)),
        Err(EventError::Scheduling(SchedulingError::Exhausted)) => {
            HttpResponse::Ok().json(serde_json::json!({
                "tournament_complete": true,
                "message": SchedulingError::Exhausted.to_string(),
            }))
        }
        Err(err) => error_json(err),
    }
}

/// Draw the next round of matches.
#[post("/api/events/{id}/rounds/next")]
async fn api_generate_next_round(state: AppState, path: Path<EventPath>) -> HttpResponse {
    with_event(&state, path.id, |e| {
        let result = e.generate_next_round(&mut rand::thread_rng()).map(|_| ());
        generation_response(e, result)
    })
}

/// Draw all remaining rounds at once.
#[post("/api/events/{id}/rounds/all")]
async fn api_generate_all_rounds(state: AppState, path: Path<EventPath>) -> HttpResponse {
    with_event(&state, path.id, |e| {
        let result = e.generate_all_rounds(&mut rand::thread_rng()).map(|_| ());
        generation_response(e, result)
    })
}

/// Submit (or edit) a match score.
#[put("/api/events/{id}/matches/score")]
async fn api_record_score(
    state: AppState,
    path: Path<EventPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    with_event(&state, path.id, |e| {
        match e.record_score(body.match_id, body.score_1, body.score_2) {
            Ok(()) => HttpResponse::Ok().json(EventResponse::of(e)),
            Err(err) => error_json(err),
        }
    })
}

/// Current standings, optionally sorted by a custom criteria list.
#[get("/api/events/{id}/standings")]
async fn api_standings(
    state: AppState,
    path: Path<EventPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    let criteria = match &query.criteria {
        Some(raw) => match parse_criteria(raw) {
            Ok(c) => c,
            Err(bad) => return error_json(format!("Unknown sort criterion: {bad}")),
        },
        None => DEFAULT_CRITERIA.to_vec(),
    };
    with_event(&state, path.id, |e| {
        let all = e.all_matches();
        HttpResponse::Ok().json(compute_standings(&e.players, &all, &criteria))
    })
}

fn parse_criteria(raw: &str) -> Result<Vec<SortCriterion>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "wins" => Ok(SortCriterion::Wins),
            "gameBalance" => Ok(SortCriterion::GameBalance),
            "totalGamesWon" => Ok(SortCriterion::TotalGamesWon),
            "totalGamesLost" => Ok(SortCriterion::TotalGamesLost),
            other => Err(other.to_string()),
        })
        .collect()
}

/// Reset the event: clears schedule and history, keeps the roster.
#[post("/api/events/{id}/reset")]
async fn api_reset_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    with_event(&state, path.id, |e| {
        e.reset();
        HttpResponse::Ok().json(EventResponse::of(e))
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<EventId, EventEntry>::new()));

    // Background task: every 30 minutes, remove events inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive event(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_event)
            .service(api_list_events)
            .service(api_get_event_by_code)
            .service(api_get_event)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_rename_player)
            .service(api_generate_next_round)
            .service(api_generate_all_rounds)
            .service(api_record_score)
            .service(api_standings)
            .service(api_reset_event)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
