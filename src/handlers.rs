// handlers.rs

use crate::{
    commands::BulbCommand,
    dispatch::sequence::{
        DANCE_PALETTE, UKRAINE_BLUE, UKRAINE_YELLOW, paint_by_index, random_from,
        run_timed_sequence, two_tone,
    },
    docs::ApiDoc,
    models::AppState,
    utils,
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tower_http::{normalize_path::NormalizePath, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::{IntoParams, OpenApi};
use validator::Validate;

/// Raw query pairs in request order. A repeated key keeps every value and
/// lookups take the first one.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn first_param(query: QueryPairs, key: &str) -> Option<String> {
    let Query(pairs) = query.ok()?;
    pairs
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LevelQuery {
    /// Level passed through to the bulb as is.
    pub level: i64,
}

impl LevelQuery {
    fn from_pairs(query: QueryPairs) -> Option<Self> {
        let level = first_param(query, "level")?.parse().ok()?;
        Some(Self { level })
    }
}

#[derive(Debug, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HexQuery {
    /// Color as hex digits without `#`, e.g. `ffd500`.
    #[validate(length(min = 1))]
    pub hex: String,
}

impl HexQuery {
    fn from_pairs(query: QueryPairs) -> Option<Self> {
        first_param(query, "hex").map(|hex| Self { hex })
    }
}

/// Routes with trailing slashes trimmed before matching.
pub fn app(state: Arc<AppState>) -> NormalizePath<Router> {
    let bulbs = Router::new()
        .route("/on", get(bulbs_on))
        .route("/off", get(bulbs_off))
        .route("/toggle", get(bulbs_toggle))
        .route("/brightness", get(bulbs_brightness))
        .route("/temperature", get(bulbs_temperature))
        .route("/color", get(bulbs_color))
        .route("/ukraine", get(bulbs_ukraine))
        .route("/dance", get(bulbs_dance));

    let mut router = Router::new().nest("/mi/bulbs", bulbs);
    if state.api_docs {
        router = router.route("/api-doc/openapi.json", get(openapi));
    }

    let router = router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}

async fn run_command(state: &AppState, command: BulbCommand) -> StatusCode {
    let (cancel, _guard) = utils::request_scope(state);
    info!(command = command.name(), "control bulbs");

    state
        .dispatcher
        .dispatch_bulbs(&cancel, move |_, handle| command.clone().apply(handle))
        .await;

    StatusCode::OK
}

#[utoipa::path(get, path = "/mi/bulbs/on", responses((status = 200, description = "All bulbs were sent `on`")))]
pub async fn bulbs_on(State(state): State<Arc<AppState>>) -> StatusCode {
    run_command(&state, BulbCommand::On).await
}

#[utoipa::path(get, path = "/mi/bulbs/off", responses((status = 200, description = "All bulbs were sent `off`")))]
pub async fn bulbs_off(State(state): State<Arc<AppState>>) -> StatusCode {
    run_command(&state, BulbCommand::Off).await
}

#[utoipa::path(get, path = "/mi/bulbs/toggle", responses((status = 200, description = "All bulbs were toggled")))]
pub async fn bulbs_toggle(State(state): State<Arc<AppState>>) -> StatusCode {
    run_command(&state, BulbCommand::Toggle).await
}

#[utoipa::path(
    get,
    path = "/mi/bulbs/brightness",
    params(LevelQuery),
    responses(
        (status = 200, description = "Brightness sent to all bulbs"),
        (status = 400, description = "Missing or non-integer `level`")
    )
)]
pub async fn bulbs_brightness(
    State(state): State<Arc<AppState>>,
    query: QueryPairs,
) -> StatusCode {
    let Some(LevelQuery { level }) = LevelQuery::from_pairs(query) else {
        return StatusCode::BAD_REQUEST;
    };
    run_command(&state, BulbCommand::Brightness(level)).await
}

#[utoipa::path(
    get,
    path = "/mi/bulbs/temperature",
    params(LevelQuery),
    responses(
        (status = 200, description = "Color temperature sent to all bulbs"),
        (status = 400, description = "Missing or non-integer `level`")
    )
)]
pub async fn bulbs_temperature(
    State(state): State<Arc<AppState>>,
    query: QueryPairs,
) -> StatusCode {
    let Some(LevelQuery { level }) = LevelQuery::from_pairs(query) else {
        return StatusCode::BAD_REQUEST;
    };
    run_command(&state, BulbCommand::Temperature(level)).await
}

#[utoipa::path(
    get,
    path = "/mi/bulbs/color",
    params(HexQuery),
    responses(
        (status = 200, description = "Color sent to all bulbs"),
        (status = 400, description = "Missing or empty `hex`")
    )
)]
pub async fn bulbs_color(
    State(state): State<Arc<AppState>>,
    query: QueryPairs,
) -> StatusCode {
    let Some(params) = HexQuery::from_pairs(query) else {
        return StatusCode::BAD_REQUEST;
    };
    if let Err(e) = params.validate() {
        warn!(error = %e, "rejecting color request");
        return StatusCode::BAD_REQUEST;
    }
    run_command(&state, BulbCommand::Color(params.hex)).await
}

#[utoipa::path(get, path = "/mi/bulbs/ukraine", responses((status = 200, description = "First three bulbs painted yellow, yellow, blue")))]
pub async fn bulbs_ukraine(State(state): State<Arc<AppState>>) -> StatusCode {
    let (cancel, _guard) = utils::request_scope(&state);
    info!(mode = "ukraine", "control bulbs");

    paint_by_index(
        state.dispatcher.bulbs(),
        &cancel,
        two_tone(UKRAINE_YELLOW, UKRAINE_BLUE),
    )
    .await;

    StatusCode::OK
}

#[utoipa::path(get, path = "/mi/bulbs/dance", responses((status = 200, description = "Random palette animation finished or was cancelled")))]
pub async fn bulbs_dance(State(state): State<Arc<AppState>>) -> StatusCode {
    let (cancel, _guard) = utils::request_scope(&state);
    info!(mode = "dance", duration = ?state.dance.duration, "control bulbs");

    let ticks = run_timed_sequence(
        state.dispatcher.bulbs(),
        state.dance,
        &cancel,
        random_from(DANCE_PALETTE.to_vec()),
    )
    .await;

    info!(mode = "dance", ticks, "dance finished");
    StatusCode::OK
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
