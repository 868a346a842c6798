//! HTTP boundary for a shared simulation.
//!
//! | Method | Path | Body | Effect |
//! |---|---|---|---|
//! | POST | `/api/simulation/init` | `ModelConfig` fields | build a new model |
//! | POST | `/api/simulation/step` | | advance one day |
//! | GET | `/api/simulation/state` | | snapshot |
//! | POST | `/api/simulation/start` | `{"speed": steps/sec}` | start auto-advance |
//! | POST | `/api/simulation/pause` | | stop auto-advance |
//! | POST | `/api/simulation/reset` | `ModelConfig` fields | pause, then build a new model |
//! | POST | `/api/simulation/outbreak` | | attempt to trigger an outbreak |
//!
//! Bodies are optional; missing fields take their defaults. Every response carries a `status` of
//! `"success"` or `"error"`. Using the simulation before it is initialized is a `400`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::auto_advance::AutoAdvance;
use crate::config::ModelConfig;
use crate::error::SentinelError;
use crate::handle::SimulationHandle;

type ApiResponse = (StatusCode, Json<Value>);

#[derive(Clone)]
struct ApiState {
    handle: SimulationHandle,
    auto_advance: Arc<AutoAdvance>,
}

#[derive(Deserialize)]
#[serde(default)]
struct StartArgs {
    /// Steps per second
    speed: f64,
}

impl Default for StartArgs {
    fn default() -> Self {
        StartArgs { speed: 1.0 }
    }
}

fn success(body: Value) -> ApiResponse {
    let mut body = body;
    body["status"] = json!("success");
    (StatusCode::OK, Json(body))
}

fn failure(err: &SentinelError) -> ApiResponse {
    let code = match err {
        SentinelError::NotInitialized
        | SentinelError::InvalidConfig(_)
        | SentinelError::JsonError(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("rejecting request ({code}): {err}");
    (
        code,
        Json(json!({
            "status": "error",
            "message": err.to_string(),
        })),
    )
}

// An empty or `null` body means "use the defaults".
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, SentinelError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value)?)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, SentinelError> {
    Ok(serde_json::to_value(value)?)
}

async fn init_simulation(State(api): State<ApiState>, body: Bytes) -> ApiResponse {
    let result = parse_body::<ModelConfig>(&body)
        .and_then(|config| api.handle.initialize(config))
        .and_then(|state| to_value(&state));
    match result {
        Ok(state) => success(json!({
            "message": "Simulation initialized",
            "state": state,
        })),
        Err(err) => failure(&err),
    }
}

async fn step_simulation(State(api): State<ApiState>) -> ApiResponse {
    match api.handle.step().and_then(|state| to_value(&state)) {
        Ok(state) => success(json!({ "state": state })),
        Err(err) => failure(&err),
    }
}

async fn get_state(State(api): State<ApiState>) -> ApiResponse {
    match api.handle.state().and_then(|state| to_value(&state)) {
        Ok(state) => success(json!({ "state": state })),
        Err(err) => failure(&err),
    }
}

async fn start_simulation(State(api): State<ApiState>, body: Bytes) -> ApiResponse {
    let result = parse_body::<StartArgs>(&body)
        .and_then(|args| api.auto_advance.start(api.handle.clone(), args.speed));
    match result {
        Ok(()) => success(json!({ "message": "Simulation started" })),
        Err(err) => failure(&err),
    }
}

async fn pause_simulation(State(api): State<ApiState>) -> ApiResponse {
    api.auto_advance.pause();
    success(json!({ "message": "Simulation paused" }))
}

async fn reset_simulation(State(api): State<ApiState>, body: Bytes) -> ApiResponse {
    api.auto_advance.pause();
    let result = parse_body::<ModelConfig>(&body)
        .and_then(|config| api.handle.reset(config))
        .and_then(|state| to_value(&state));
    match result {
        Ok(state) => success(json!({
            "message": "Simulation reset",
            "state": state,
        })),
        Err(err) => failure(&err),
    }
}

async fn trigger_outbreak(State(api): State<ApiState>) -> ApiResponse {
    let result = api.handle.with_model(|model| {
        let already_active = model.outbreak_active();
        (model.trigger_outbreak(), already_active)
    });
    match result {
        Ok((triggered, already_active)) => {
            let message = if triggered {
                "Outbreak triggered"
            } else if already_active {
                "Outbreak already active"
            } else {
                "Outbreak not triggered"
            };
            success(json!({
                "triggered": triggered,
                "message": message,
            }))
        }
        Err(err) => failure(&err),
    }
}

/// Builds the API router around `handle`. The router owns its own auto-advance runner.
pub fn router(handle: SimulationHandle) -> Router {
    let state = ApiState {
        handle,
        auto_advance: Arc::new(AutoAdvance::new()),
    };
    Router::new()
        .route("/api/simulation/init", post(init_simulation))
        .route("/api/simulation/step", post(step_simulation))
        .route("/api/simulation/state", get(get_state))
        .route("/api/simulation/start", post(start_simulation))
        .route("/api/simulation/pause", post(pause_simulation))
        .route("/api/simulation/reset", post(reset_simulation))
        .route("/api/simulation/outbreak", post(trigger_outbreak))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API on `addr` until the server fails.
///
/// # Errors
/// Returns `SentinelError::ServerError` if the address cannot be bound, or an I/O error if the
/// server stops with one.
pub async fn serve(addr: SocketAddr, handle: SimulationHandle) -> Result<(), SentinelError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| SentinelError::ServerError(format!("could not bind to {addr}: {e}")))?;
    info!("serving simulation API on http://{}", listener.local_addr()?);
    axum::serve(listener, router(handle)).await?;
    Ok(())
}

#[tokio::main]
async fn serve_on_thread(
    handle: SimulationHandle,
    port: u16,
    ready: std::sync::mpsc::Sender<Result<(), SentinelError>>,
) {
    let listener = match TcpListener::bind(("127.0.0.1", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            let _ = ready.send(Err(SentinelError::ServerError(format!(
                "could not bind to {port}: {e}"
            ))));
            return;
        }
    };

    // Notify the caller that we are ready.
    let _ = ready.send(Ok(()));
    if let Err(e) = axum::serve(listener, router(handle)).await {
        error!("simulation API server stopped: {e}");
    }
}

/// Starts the API on a background thread bound to `127.0.0.1:port` and returns once it is
/// accepting connections.
///
/// # Errors
/// Returns `SentinelError::ServerError` if the port cannot be bound.
pub fn spawn_server(handle: SimulationHandle, port: u16) -> Result<(), SentinelError> {
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), SentinelError>>();
    thread::spawn(move || serve_on_thread(handle, port, ready_tx));
    ready_rx.recv().map_err(|_| {
        SentinelError::ServerError("server thread exited before starting".to_string())
    })?
}
