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
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use lexicards_core::Card;
use lexicards_core::Clock;
use lexicards_core::FolderId;
use lexicards_core::LearningReport;
use lexicards_core::StudyStats;
use lexicards_core::SyncPreview;
use lexicards_core::Timestamp;
use lexicards_core::UserId;
use serde::Deserialize;
use serde::Serialize;

use crate::serve::error::ApiResult;
use crate::serve::state::ServerState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    started_at: Timestamp,
    now: Timestamp,
}

pub async fn health_handler(State(state): State<ServerState>) -> ApiResult<Health> {
    let mutable = state.acquire()?;
    Ok(Json(Health {
        started_at: state.started_at,
        now: mutable.engine.clock().now(),
    }))
}

#[derive(Deserialize)]
pub struct DueQuery {
    limit: Option<usize>,
}

pub async fn due_handler(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DueQuery>,
) -> ApiResult<Vec<Card>> {
    let mutable = state.acquire()?;
    let cards = mutable.engine.due_queue(UserId::new(user_id), query.limit)?;
    Ok(Json(cards))
}

pub async fn sync_preview_handler(
    State(state): State<ServerState>,
    Path(folder_id): Path<i64>,
) -> ApiResult<SyncPreview> {
    let mutable = state.acquire()?;
    let preview = mutable.engine.preview_folder_sync(FolderId::new(folder_id))?;
    Ok(Json(preview))
}

pub async fn stats_handler(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> ApiResult<StudyStats> {
    let mutable = state.acquire()?;
    let stats = mutable.engine.stats(UserId::new(user_id))?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct InsightsQuery {
    days: Option<u32>,
}

pub async fn insights_handler(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<InsightsQuery>,
) -> ApiResult<LearningReport> {
    let mutable = state.acquire()?;
    let report = mutable
        .engine
        .insights(UserId::new(user_id), query.days.unwrap_or(30))?;
    Ok(Json(report))
}
