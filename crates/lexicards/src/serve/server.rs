// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use lexicards_core::Clock;
use lexicards_core::Fallible;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;

use crate::cmd::AppEngine;
use crate::serve::get::due_handler;
use crate::serve::get::health_handler;
use crate::serve::get::insights_handler;
use crate::serve::get::stats_handler;
use crate::serve::get::sync_preview_handler;
use crate::serve::post::review_handler;
use crate::serve::post::sweep_handler;
use crate::serve::post::sync_handler;
use crate::serve::state::ServerState;

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(health_handler));
    let app = app.route("/users/{id}/due", get(due_handler));
    let app = app.route("/users/{id}/stats", get(stats_handler));
    let app = app.route("/users/{id}/insights", get(insights_handler));
    let app = app.route("/users/{id}/sweep", post(sweep_handler));
    let app = app.route("/cards/{id}/review", post(review_handler));
    let app = app.route(
        "/folders/{id}/sync",
        get(sync_preview_handler).post(sync_handler),
    );
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

pub async fn start_server(engine: AppEngine, port: u16) -> Fallible<()> {
    let started_at = engine.clock().now();
    let state = ServerState::new(engine, started_at);
    let app = router(state);
    let bind = format!("127.0.0.1:{port}");
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "kind": "notFound", "message": "no such route." })),
    )
}
