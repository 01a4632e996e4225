use crate::config::Config;
use crate::discover::Discover;
use crate::events::{Controller, Event};
use crate::page::{Page, Region};
use crate::render;
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024; // events carry no meaningful body

#[derive(Clone)]
pub struct AppState {
    pub page: Arc<Page>,
    pub controller: Arc<Controller>,
}

impl AppState {
    pub fn new(tmdb: Arc<dyn TmdbApi>, page: Arc<Page>, config: &Config) -> Self {
        let discover = Discover::new(tmdb, page.clone());
        let controller = Arc::new(Controller::new(
            discover,
            config.search_debounce,
            config.blur_grace,
        ));
        Self { page, controller }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(
        config.tmdb_base_url.clone(),
        config.tmdb_api_key.clone(),
    ));
    info!("Using TMDB at {}", config.tmdb_base_url);
    let state = AppState::new(tmdb, Arc::new(Page::full()), &config);

    let discover = state.controller.discover().clone();
    tokio::spawn(async move { discover.startup().await });

    let app = build_router(state);

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/regions/:region", get(region))
        .route("/events/genres/:id", post(select_genre))
        .route("/events/movies/:id", post(open_details))
        .route("/events/modal/dismiss", post(dismiss_modal))
        .route("/events/search", post(search_input))
        .route("/events/search/blur", post(search_blur))
        .route("/events/dropdown/:id", post(select_dropdown_item))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let (version, snapshot) = state.page.versioned_snapshot().await;
    Html(render::document(&snapshot, version))
}

/// Page script polls this to learn that a region changed after an event.
async fn version(State(state): State<AppState>) -> String {
    state.page.version().to_string()
}

async fn region(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let region = Region::from_slug(&slug).ok_or(StatusCode::NOT_FOUND)?;
    let current = state.page.get(region).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(current.html))
}

async fn select_genre(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    state.controller.dispatch(Event::SelectGenre(id));
    StatusCode::ACCEPTED
}

async fn open_details(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    state.controller.dispatch(Event::OpenDetails(id));
    StatusCode::ACCEPTED
}

async fn dismiss_modal(State(state): State<AppState>) -> StatusCode {
    state.controller.dispatch(Event::DismissModal);
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_input(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> StatusCode {
    state.controller.dispatch(Event::SearchInput(params.q));
    StatusCode::ACCEPTED
}

async fn search_blur(State(state): State<AppState>) -> StatusCode {
    state.controller.dispatch(Event::SearchBlur);
    StatusCode::ACCEPTED
}

async fn select_dropdown_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> StatusCode {
    state.controller.dispatch(Event::SelectDropdownItem(id));
    StatusCode::ACCEPTED
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("cinedeck cannot listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                warn!("cinedeck cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let cause = tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    };
    info!("cinedeck shutting down on {cause}, draining open requests");
}
