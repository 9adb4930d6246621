use std::{net::SocketAddr, sync::Arc, time::Duration};

use attendance::{AttendanceBoard, IngestOutcome};
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::{
    domain::CompanyId,
    error::{ApiError, ErrorCode},
    protocol::{BoardEvent, BoardSnapshot, Company, Summary},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info};

mod app_state;
mod config;
mod relay;

use app_state::AppState;
use config::load_settings;

const MAX_SNAPSHOT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct IngestResponse {
    accepted: usize,
    rejected: usize,
    changed: Vec<CompanyId>,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(value: IngestOutcome) -> Self {
        Self {
            accepted: value.accepted,
            rejected: value.rejected,
            changed: value.changed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let board = Arc::new(AttendanceBoard::new(Duration::from_millis(
        settings.highlight_ms,
    )));

    match settings.upstream_ws_url.clone() {
        Some(url) => {
            info!(%url, channel = %settings.channel, "relaying upstream channel");
            tokio::spawn(relay::run(
                url,
                settings.channel.clone(),
                Arc::clone(&board),
                Duration::from_millis(settings.relay_retry_ms),
            ));
        }
        None => info!("no upstream channel configured; accepting snapshots on POST /snapshots"),
    }

    let app = build_router(Arc::new(AppState { board }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "dashboard server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/board", get(http_board))
        .route("/companies", get(http_list_companies))
        .route("/companies/:company_id", get(http_company))
        .route("/summary", get(http_summary))
        .route(
            "/snapshots",
            post(http_ingest_snapshot).layer(RequestBodyLimitLayer::new(MAX_SNAPSHOT_BYTES)),
        )
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_board(State(state): State<Arc<AppState>>) -> Json<BoardSnapshot> {
    Json(state.board.snapshot().await)
}

async fn http_list_companies(State(state): State<Arc<AppState>>) -> Json<Vec<Company>> {
    Json(state.board.companies().await)
}

async fn http_company(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Company>, (StatusCode, Json<ApiError>)> {
    let company_id: i64 = raw_id.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!("company id must be an integer: {raw_id}"),
            )),
        )
    })?;
    state
        .board
        .company(CompanyId(company_id))
        .await
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(
                    ErrorCode::NotFound,
                    format!("company {company_id} not in current snapshot"),
                )),
            )
        })
}

async fn http_summary(State(state): State<Arc<AppState>>) -> Json<Summary> {
    Json(state.board.summary().await)
}

async fn http_ingest_snapshot(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<IngestResponse>, (StatusCode, Json<ApiError>)> {
    let outcome = state.board.ingest_text(&body).await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, e.to_string())),
        )
    })?;
    Ok(Json(outcome.into()))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};
    use tokio_stream::wrappers::BroadcastStream;

    let (mut sender, mut receiver) = socket.split();
    let events = BroadcastStream::new(state.board.subscribe());
    let initial = BoardEvent::CompaniesUpdated {
        snapshot: state.board.snapshot().await,
        changed: Vec::new(),
    };

    let send_task = tokio::spawn(async move {
        let updates = events.filter_map(|event| async move {
            match event {
                Ok(event) => Some(event),
                Err(lagged) => {
                    debug!(%lagged, "dashboard socket fell behind; skipping events");
                    None
                }
            }
        });
        let mut outgoing = std::pin::pin!(futures::stream::once(async { initial }).chain(updates));
        while let Some(event) = outgoing.next().await {
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
