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
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use lexicards_core::ErrorKind;
use lexicards_core::ErrorReport;
use serde::Serialize;

/// An engine error on its way to an HTTP client.
pub struct ApiError(pub ErrorReport);

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        Self(value)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: &'a str,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidOutcome => StatusCode::BAD_REQUEST,
        ErrorKind::CardNotFound | ErrorKind::FolderNotFound => StatusCode::NOT_FOUND,
        ErrorKind::RepositoryFailure | ErrorKind::Config | ErrorKind::Io | ErrorKind::Other => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            log::error!("{}", self.0);
        }
        let body = ErrorBody {
            kind: self.0.kind(),
            message: self.0.message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
