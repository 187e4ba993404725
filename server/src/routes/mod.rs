use std::sync::Arc;

use dashmap::Entry;
use mine_web_common::{
    models::{Difficulty, Preset, Snapshot, StartParams},
    protocol::{
        CellTarget, ErrorKind, ErrorResponse, FlagResponse, HintResponse, RevealResponse,
        StartResponse,
    },
};
use nanoid::nanoid;
use rocket::{
    Request, State, catch, get,
    http::{Cookie, CookieJar, SameSite, Status},
    post,
    request::{self, FromRequest},
    response::{self, Responder},
    serde::json::Json,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Settings,
    data::target_pos,
    error::EngineError,
    logic::{GameSession, Sessions},
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
};

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Rejection sent back to the client as `ErrorResponse` JSON.
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    body: ErrorResponse,
}

impl ApiError {
    fn rate_limited() -> Self {
        Self {
            status: Status::TooManyRequests,
            body: ErrorResponse {
                error: ErrorKind::RateLimited,
                message: "Too many games started, try again later".to_string(),
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let (status, kind) = match err {
            EngineError::InvalidConfiguration(_) => {
                (Status::UnprocessableEntity, ErrorKind::InvalidConfiguration)
            }
            EngineError::OutOfBounds(..) => (Status::BadRequest, ErrorKind::OutOfBounds),
            EngineError::IllegalAction(_) => (Status::Conflict, ErrorKind::IllegalAction),
            EngineError::NoActiveSession => (Status::NotFound, ErrorKind::NoActiveSession),
        };
        Self {
            status,
            body: ErrorResponse {
                error: kind,
                message: err.to_string(),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.body)).respond_to(request)
    }
}

/// Session id of the caller, taken from the `X-Session-Id` header or the
/// session cookie.
#[derive(Debug)]
pub struct SessionKey(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionKey {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let key = req
            .headers()
            .get_one(SESSION_HEADER)
            .map(str::to_string)
            .or_else(|| {
                req.cookies()
                    .get(SESSION_COOKIE)
                    .map(|cookie| cookie.value().to_string())
            });

        request::Outcome::Success(SessionKey(key))
    }
}

fn lookup(sessions: &Sessions, key: &SessionKey) -> Result<Arc<Mutex<GameSession>>, EngineError> {
    key.0
        .as_deref()
        .and_then(|id| sessions.get(id).map(|entry| entry.value().clone()))
        .ok_or(EngineError::NoActiveSession)
}

/// Stores `session` under the caller's id when it names a live session,
/// otherwise under a fresh one.
#[instrument(level = "trace", skip(sessions, session))]
fn install_session(sessions: &Sessions, key: Option<String>, session: GameSession) -> String {
    if let Some(id) = key
        && let Entry::Occupied(mut entry) = sessions.entry(id)
    {
        entry.insert(Arc::new(Mutex::new(session)));
        info!("Replaced game in session {}", entry.key());
        return entry.key().clone();
    }

    let mut id_length = 10;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match sessions.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Session ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(session)));
                    info!("Created new session with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

#[post("/start", data = "<params>")]
#[instrument(level = "trace", skip(cookies, sessions, settings, rate_limiter), fields(client_ip = %client_ip.0))]
pub fn start_game(
    params: Json<StartParams>,
    key: SessionKey,
    client_ip: ClientIp,
    cookies: &CookieJar<'_>,
    sessions: &State<Sessions>,
    settings: &State<Settings>,
    rate_limiter: &State<RateLimiter>,
) -> Result<Json<StartResponse>, ApiError> {
    let (rows, cols, mines) = params.resolve();
    info!(
        "Start request from {}: {}x{} with {} mines",
        client_ip.0, rows, cols, mines
    );

    // Rejected boards do not count against the quota
    let config = settings.board_config(rows, cols, mines).inspect_err(|e| {
        warn!("Rejected start from {}: {}", client_ip.0, e);
    })?;

    if !check_rate_limit(
        rate_limiter,
        &client_ip.0,
        settings.rate_limit_games_per_minute,
    ) {
        return Err(ApiError::rate_limited());
    }

    let session = GameSession::start(config, settings.safe_first_click)?;
    let snapshot = session.snapshot();
    let id = install_session(sessions, key.0, session);

    cookies.add(
        Cookie::build((SESSION_COOKIE, id.clone()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true),
    );

    Ok(Json(StartResponse {
        session: id,
        snapshot,
    }))
}

#[post("/reveal", data = "<target>")]
#[instrument(level = "trace", skip(sessions), fields(x = target.x, y = target.y))]
pub async fn reveal_cell(
    target: Json<CellTarget>,
    key: SessionKey,
    sessions: &State<Sessions>,
) -> Result<Json<RevealResponse>, ApiError> {
    let session = lookup(sessions, &key)?;
    let mut session = session.lock().await;

    let report = target_pos(target.0)
        .and_then(|pos| session.reveal(pos))
        .inspect_err(|e| {
            debug!("Rejected reveal at ({}, {}): {}", target.x, target.y, e);
        })?;
    let result = report.result();

    Ok(Json(RevealResponse {
        result,
        newly_revealed: report.newly_revealed,
        snapshot: session.snapshot(),
    }))
}

#[post("/flag", data = "<target>")]
#[instrument(level = "trace", skip(sessions), fields(x = target.x, y = target.y))]
pub async fn flag_cell(
    target: Json<CellTarget>,
    key: SessionKey,
    sessions: &State<Sessions>,
) -> Result<Json<FlagResponse>, ApiError> {
    let session = lookup(sessions, &key)?;
    let mut session = session.lock().await;

    let state = target_pos(target.0)
        .and_then(|pos| session.flag(pos))
        .inspect_err(|e| {
            debug!("Rejected flag at ({}, {}): {}", target.x, target.y, e);
        })?;

    Ok(Json(FlagResponse {
        cell: state.marker(),
        snapshot: session.snapshot(),
    }))
}

#[get("/state")]
#[instrument(level = "trace", skip(sessions))]
pub async fn game_state(
    key: SessionKey,
    sessions: &State<Sessions>,
) -> Result<Json<Snapshot>, ApiError> {
    let session = lookup(sessions, &key)?;
    let mut session = session.lock().await;
    // A client that only polls is still playing
    session.touch();
    Ok(Json(session.snapshot()))
}

/// Suggests a hidden, unflagged cell to try next. Not a solver: any such
/// cell may hold a mine.
#[get("/hint")]
#[instrument(level = "trace", skip(sessions))]
pub async fn hint(
    key: SessionKey,
    sessions: &State<Sessions>,
) -> Result<Json<HintResponse>, ApiError> {
    let session = lookup(sessions, &key)?;
    let mut session = session.lock().await;

    let pos = session.suggest().inspect_err(|e| {
        debug!("Rejected hint: {}", e);
    })?;

    Ok(Json(HintResponse { pos }))
}

#[get("/difficulties")]
pub fn difficulties() -> Json<Vec<Preset>> {
    Json(Difficulty::ALL.into_iter().map(Preset::from).collect())
}

#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: ErrorKind::MalformedRequest,
            message: status.reason().unwrap_or("Request failed").to_string(),
        }),
    )
}
