//! WebSocket frame server.
//!
//! `GET /ws` upgrades to a session that receives encoded frames and answers
//! each with an `emotion_data` event (plus an `alert` when one applies).
//! `GET /health` answers `ok`. Frames within a session are analyzed one at a
//! time on the blocking pool, so a slow frame delays the next one.

mod protocol;
mod session;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use engage_core::FramePipeline;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub use protocol::{ClientEvent, Connected, ProtocolError, ServerEvent};
pub use session::{process_frame, Session, SessionAction};

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Send `alert` events after frame results.
    pub alerts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            alerts: true,
        }
    }
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<FramePipeline>,
    alerts: bool,
    next_session: Arc<AtomicU64>,
}

/// Builds the HTTP router.
pub fn router(pipeline: Arc<FramePipeline>, alerts: bool) -> Router {
    let state = AppState {
        pipeline,
        alerts,
        next_session: Arc::new(AtomicU64::new(1)),
    };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Binds `config.host:config.port` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig, pipeline: Arc<FramePipeline>) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local: SocketAddr = listener.local_addr()?;
    info!("listening on ws://{local}/ws");

    axum::serve(listener, router(pipeline, config.alerts))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let id = state.next_session.fetch_add(1, Ordering::Relaxed);
    let mut session = Session::new(id, state.alerts);
    info!(session = id, "client connected");

    if send(&mut socket, &ServerEvent::connected()).await.is_ok() {
        run_session(&mut socket, &mut session, &state.pipeline).await;
    }

    info!(session = id, "client disconnected");
}

async fn run_session(socket: &mut WebSocket, session: &mut Session, pipeline: &Arc<FramePipeline>) {
    while let Some(message) = socket.recv().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => return,
            Ok(_) => continue,
            Err(e) => {
                debug!(session = session.id(), "socket error: {e}");
                return;
            }
        };

        let SessionAction::Analyze(payload) = session.on_text(&text) else {
            continue;
        };

        let pipeline = Arc::clone(pipeline);
        let source = session.frame_source();
        let outcome =
            tokio::task::spawn_blocking(move || process_frame(&pipeline, source, &payload)).await;

        match outcome {
            Ok(Ok(result)) => {
                for event in session.on_result(result) {
                    if send(socket, &event).await.is_err() {
                        return;
                    }
                }
            }
            Ok(Err(e)) => session.on_dropped(&e),
            Err(e) => warn!(session = session.id(), "frame task failed: {e}"),
        }
    }
}

async fn send(socket: &mut WebSocket, event: &ServerEvent) -> Result<()> {
    let text = event.to_json().context("failed to encode event")?;
    socket.send(Message::Text(text)).await.context("failed to send")
}
