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
use axum::extract::State;
use lexicards_core::CardId;
use lexicards_core::FolderId;
use lexicards_core::OutcomeInput;
use lexicards_core::ReviewResult;
use lexicards_core::SweptCard;
use lexicards_core::SyncResult;
use lexicards_core::UserId;

use crate::serve::error::ApiResult;
use crate::serve::state::ServerState;

pub async fn review_handler(
    State(state): State<ServerState>,
    Path(card_id): Path<i64>,
    Json(input): Json<OutcomeInput>,
) -> ApiResult<ReviewResult> {
    let mutable = state.acquire()?;
    let result = mutable.engine.submit_review(CardId::new(card_id), &input)?;
    log::debug!(
        "Reviewed card {card_id}: level {} due {}",
        result.receipt.evaluation.new_level,
        result.receipt.evaluation.next_due
    );
    Ok(Json(result))
}

pub async fn sync_handler(
    State(state): State<ServerState>,
    Path(folder_id): Path<i64>,
) -> ApiResult<SyncResult> {
    let mutable = state.acquire()?;
    let result = mutable.engine.apply_folder_sync(FolderId::new(folder_id))?;
    Ok(Json(result))
}

pub async fn sweep_handler(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<SweptCard>> {
    let mutable = state.acquire()?;
    let swept = mutable.engine.sweep_user(UserId::new(user_id))?;
    Ok(Json(swept))
}
