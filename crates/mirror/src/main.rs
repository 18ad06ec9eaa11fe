use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use shared::{
    domain::PlayerName,
    error::ApiError,
    protocol::{
        check_for_new_game_route, expire_game_route, game_route, install_placeholder_route,
        new_game_route, shut_down_route, update_notification_route, GameUpdateForm, NewGameForm,
        NotificationForm, PlayerForm,
    },
};
use tokio::sync::Notify;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

mod app_state;
mod config;
mod presentation;

use app_state::AppState;
use config::load_settings;
use presentation::{MirrorError, PlaceholderView, PlayerSummary, View};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let addr = settings.bind_addr()?;
    let state = AppState::default();
    let shutdown = Arc::clone(&state.shutdown);
    let app = build_router(state, settings.body_limit_bytes);

    info!(%addr, "render mirror listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    info!("render mirror stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: Arc<Notify>) {
    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested over http"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("interrupt received"),
            Err(error) => warn!(%error, "failed to listen for interrupt"),
        },
    }
}

fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route(game_route(), get(poll_game).post(record_guess))
        .route(check_for_new_game_route(), get(check_for_new_game))
        .route(install_placeholder_route(), post(install_placeholder))
        .route(new_game_route(), post(new_game))
        .route(update_notification_route(), post(update_notification))
        .route(expire_game_route(), post(expire_game))
        .route(shut_down_route(), post(shut_down))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn mirror_error(error: MirrorError) -> (StatusCode, Json<ApiError>) {
    warn!(%error, "mirror request rejected");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(error.code(), error.to_string())),
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Json<Vec<PlayerSummary>> {
    Json(state.mirror.summaries().await)
}

async fn poll_game(
    State(state): State<AppState>,
    Query(query): Query<PlayerForm>,
) -> ApiResult<Json<View>> {
    let player = PlayerName::new(query.display_name);
    state
        .mirror
        .poll(&player)
        .await
        .map(Json)
        .map_err(mirror_error)
}

async fn check_for_new_game(State(state): State<AppState>) -> Json<View> {
    Json(
        state
            .mirror
            .find_unrendered()
            .await
            .unwrap_or_else(|| View::Placeholder(PlaceholderView::default())),
    )
}

async fn install_placeholder(
    State(state): State<AppState>,
    Query(query): Query<PlayerForm>,
) -> ApiResult<Json<View>> {
    let player = PlayerName::new(query.display_name);
    state
        .mirror
        .install_placeholder(&player)
        .await
        .map(Json)
        .map_err(mirror_error)
}

async fn new_game(
    State(state): State<AppState>,
    Form(form): Form<NewGameForm>,
) -> ApiResult<&'static str> {
    state.mirror.start_game(form).await.map_err(mirror_error)?;
    Ok("OK")
}

async fn record_guess(
    State(state): State<AppState>,
    Form(form): Form<GameUpdateForm>,
) -> ApiResult<&'static str> {
    state.mirror.record_guess(form).await.map_err(mirror_error)?;
    Ok("OK")
}

async fn update_notification(
    State(state): State<AppState>,
    Form(form): Form<NotificationForm>,
) -> &'static str {
    state.mirror.update_notification(form).await;
    "OK"
}

async fn expire_game(
    State(state): State<AppState>,
    Form(form): Form<PlayerForm>,
) -> ApiResult<&'static str> {
    let player = PlayerName::new(form.display_name);
    state.mirror.expire(&player).await.map_err(mirror_error)?;
    Ok("OK")
}

async fn shut_down(State(state): State<AppState>) -> &'static str {
    state.shutdown.notify_one();
    "OK"
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
