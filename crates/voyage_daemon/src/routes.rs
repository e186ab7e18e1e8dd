use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use voyage_core::{
    Alert, Command, CommandEnvelope, CommandId, EventEnvelope, PanelId, Player, SystemPenalties,
};

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let origin = cors_origin
        .parse::<axum::http::HeaderValue>()
        .unwrap_or_else(|_| axum::http::HeaderValue::from_static("http://localhost:5173"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/alerts", get(alerts_handler))
        .route("/api/v1/penalties", get(penalties_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/command", post(command_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let state = &sim.game_state;
    let paused = app_state.paused.load(Ordering::Relaxed);
    Json(serde_json::json!({
        "clock": state.clock.to_string(),
        "tick": state.clock.total_seconds(),
        "seed": state.meta.seed,
        "content_version": state.meta.content_version,
        "ticks_per_sec": app_state.ticks_per_sec,
        "paused": paused,
        "local_player": state.meta.local_player,
        "quadrant": state.navigation.stage,
        "on_break": state.ship.on_break,
        "arrived": state.meta.arrived,
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let sim = app_state.sim.lock();
    match serde_json::to_string(&sim.game_state) {
        Ok(json) => {
            drop(sim);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            drop(sim);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn alerts_handler(State(app_state): State<AppState>) -> Json<Vec<Alert>> {
    let sim = app_state.sim.lock();
    Json(sim.game_state.alerts.active().into_iter().cloned().collect())
}

#[derive(Debug, Serialize)]
pub struct PanelReport {
    pub panel: PanelId,
    pub incorrect: u32,
}

#[derive(Debug, Serialize)]
pub struct PenaltyReport {
    pub player: Player,
    pub penalties: SystemPenalties,
    pub panels: Vec<PanelReport>,
}

pub async fn penalties_handler(State(app_state): State<AppState>) -> Json<PenaltyReport> {
    let sim = app_state.sim.lock();
    let state = &sim.game_state;
    let player = state.active_player();
    let penalties =
        SystemPenalties::derive(Some(&state.engineering), player, &sim.content.constants);
    let panels = state
        .engineering
        .panels
        .iter()
        .map(|(id, panel)| PanelReport {
            panel: id.clone(),
            incorrect: panel.incorrect_count(player),
        })
        .collect();
    Json(PenaltyReport {
        player,
        penalties,
        panels,
    })
}

pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Json<VecDeque<voyage_core::MetricsSnapshot>> {
    let sim = app_state.sim.lock();
    Json(sim.metrics_history.clone())
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Defaults to the seated player.
    #[serde(default)]
    pub player: Option<Player>,
    pub command: Command,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub accepted: bool,
    pub events: Vec<EventEnvelope>,
}

/// Applies a player command immediately, between ticks. A rejected command
/// answers `accepted: false` with no events; it is not an HTTP error.
pub async fn command_handler(
    State(app_state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Json<CommandResponse> {
    let events = {
        let mut sim = app_state.sim.lock();
        let player = request
            .player
            .unwrap_or_else(|| sim.game_state.active_player());
        let envelope = CommandEnvelope {
            id: CommandId(format!("cmd_{:06}", sim.next_command_id)),
            issued_by: player,
            issued_at: sim.game_state.clock.total_seconds(),
            command: request.command,
        };
        sim.next_command_id += 1;
        let crate::state::SimState {
            game_state,
            content,
            ..
        } = &mut *sim;
        voyage_core::apply_command(game_state, &envelope, content)
    };

    if events.is_empty() {
        tracing::debug!("command rejected");
    } else {
        let _ = app_state.event_tx.send(events.clone());
    }
    Json(CommandResponse {
        accepted: !events.is_empty(),
        events,
    })
}

pub async fn pause_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(true, Ordering::Relaxed);
    Json(serde_json::json!({"paused": true}))
}

pub async fn resume_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(false, Ordering::Relaxed);
    Json(serde_json::json!({"paused": false}))
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) if !events.is_empty() => {
                            let data = serde_json::to_string(&events).unwrap_or_default();
                            heartbeat.reset();
                            yield Ok(Event::default().data(data));
                        }
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let tick = sim.lock().game_state.clock.total_seconds();
                    let hb = serde_json::json!({"heartbeat": true, "tick": tick});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimState;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tower::ServiceExt;
    use voyage_core::test_fixtures::{base_content, base_state};

    fn make_test_state() -> AppState {
        let content = base_content();
        let game_state = base_state(&content);
        let sim = SimState::new(game_state, content, ChaCha8Rng::seed_from_u64(0), None, 1);
        AppState::new(sim, 1.0)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> serde_json::Value {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_meta_reports_clock_and_quadrant() {
        let (status, json) = get_json(make_router(make_test_state()), "/api/v1/meta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tick"], 0);
        assert_eq!(json["clock"], "0:00");
        assert_eq!(json["quadrant"], "Alpha");
        assert_eq!(json["paused"], false);
        assert_eq!(json["local_player"], "Albatross");
    }

    #[tokio::test]
    async fn test_snapshot_is_valid_json() {
        let (status, json) = get_json(make_router(make_test_state()), "/api/v1/snapshot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["meta"]["seed"], 42);
    }

    #[tokio::test]
    async fn test_alerts_start_empty() {
        let (_, json) = get_json(make_router(make_test_state()), "/api/v1/alerts").await;
        assert_eq!(json.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_penalties_list_every_panel() {
        let (_, json) = get_json(make_router(make_test_state()), "/api/v1/penalties").await;
        assert_eq!(json["player"], "Albatross");
        assert_eq!(json["panels"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["penalties"]["weapons"], 1.0);
    }

    #[tokio::test]
    async fn test_command_applies_immediately() {
        let app_state = make_test_state();
        let json = post_json(
            make_router(app_state.clone()),
            "/api/v1/command",
            serde_json::json!({
                "command": { "SetNavigationAxis": { "axis": "Roll", "value": 7.0 } }
            }),
        )
        .await;
        assert_eq!(json["accepted"], true);
        assert_eq!(json["events"].as_array().map(Vec::len), Some(1));

        let sim = app_state.sim.lock();
        assert!((sim.game_state.navigation.current.roll - 7.0).abs() < 1e-9);
        assert_eq!(sim.next_command_id, 1);
    }

    #[tokio::test]
    async fn test_invalid_command_is_rejected_without_error() {
        let json = post_json(
            make_router(make_test_state()),
            "/api/v1/command",
            serde_json::json!({ "player": "Kestrel", "command": "ResumeJourney" }),
        )
        .await;
        assert_eq!(json["accepted"], false);
        assert_eq!(json["events"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_pause_and_resume_toggle_flag() {
        let app_state = make_test_state();
        let json = post_json(
            make_router(app_state.clone()),
            "/api/v1/pause",
            serde_json::json!({}),
        )
        .await;
        assert_eq!(json["paused"], true);
        assert!(app_state.paused.load(Ordering::Relaxed));

        post_json(
            make_router(app_state.clone()),
            "/api/v1/resume",
            serde_json::json!({}),
        )
        .await;
        assert!(!app_state.paused.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_metrics_returns_history() {
        let app_state = make_test_state();
        {
            let mut sim = app_state.sim.lock();
            crate::tick_loop::step(&mut sim);
        }
        let (_, json) = get_json(make_router(app_state), "/api/v1/metrics").await;
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["tick"], 1);
    }
}
