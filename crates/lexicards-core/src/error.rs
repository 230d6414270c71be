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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::types::ids::CardId;
use crate::types::ids::FolderId;

/// The broad category of an error, so callers at the API boundary can react
/// to it without parsing messages.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// A review outcome was missing a required field.
    InvalidOutcome,
    /// A card ID could not be resolved.
    CardNotFound,
    /// A folder ID could not be resolved.
    FolderNotFound,
    /// The persistence layer failed. Never swallowed.
    RepositoryFailure,
    /// A configuration file could not be read or parsed.
    Config,
    Io,
    Other,
}

#[derive(Debug)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Other, message)
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_outcome(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InvalidOutcome, message)
    }

    pub fn card_not_found(card_id: CardId) -> Self {
        Self::with_kind(ErrorKind::CardNotFound, format!("card {card_id} not found."))
    }

    pub fn folder_not_found(folder_id: FolderId) -> Self {
        Self::with_kind(
            ErrorKind::FolderNotFound,
            format!("folder {folder_id} not found."),
        )
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::RepositoryFailure, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Config, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        Self::with_kind(ErrorKind::Io, value.to_string())
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        Self::new(value.to_string())
    }
}

impl From<chrono::ParseError> for ErrorReport {
    fn from(value: chrono::ParseError) -> Self {
        Self::new(format!("invalid timestamp: {value}"))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for ErrorReport {
    fn from(value: rusqlite::Error) -> Self {
        Self::repository(value.to_string())
    }
}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}
