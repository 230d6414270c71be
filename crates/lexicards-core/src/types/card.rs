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

use std::fmt::Display;
use std::fmt::Formatter;

#[cfg(feature = "sqlite")]
use rusqlite::ToSql;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSql;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSqlError;
#[cfg(feature = "sqlite")]
use rusqlite::types::FromSqlResult;
#[cfg(feature = "sqlite")]
use rusqlite::types::ToSqlOutput;
#[cfg(feature = "sqlite")]
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::ids::CardId;
use crate::types::ids::FolderId;
use crate::types::ids::UserId;
use crate::types::ids::VocabId;
use crate::types::level::Level;
use crate::types::timestamp::Timestamp;

/// The stored status of a card, written by the review evaluator.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    Available,
    Waiting,
    Mastered,
    /// The card missed its overdue deadline.
    Failed,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Available => "AVAILABLE",
            CardStatus::Waiting => "WAITING",
            CardStatus::Mastered => "MASTERED",
            CardStatus::Failed => "FAILED",
        }
    }
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for CardStatus {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "AVAILABLE" => Ok(CardStatus::Available),
            "WAITING" => Ok(CardStatus::Waiting),
            "MASTERED" => Ok(CardStatus::Mastered),
            "FAILED" => Ok(CardStatus::Failed),
            _ => fail(format!("Invalid card status: {}", value)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for CardStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for CardStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        CardStatus::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// One learner's relationship to one vocabulary item.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: CardId,
    pub user_id: UserId,
    pub vocab_id: VocabId,
    /// The subfolder the card belongs to.
    pub folder_id: FolderId,

    /// Coarse progression counter, drives the day-based waiting schedule.
    pub stage: u32,
    /// Fine-grained strength, drives the minute-based interval table.
    pub level: Level,
    pub status: CardStatus,
    pub next_due: Timestamp,
    pub waiting_until: Option<Timestamp>,
    /// An externally imposed pause. Overrides every other timer.
    pub frozen_until: Option<Timestamp>,
    pub overdue_deadline: Option<Timestamp>,
    pub is_overdue: bool,
    /// Whether the current wait is the short incorrect-answer cooldown.
    pub is_from_wrong_answer: bool,

    pub study_count: u32,
    pub correct_count: u32,
    /// Consecutive incorrect answers.
    pub wrong_streak: u32,
    /// Seconds.
    pub total_study_time: u64,
    /// Milliseconds.
    pub total_response_time: u64,
    pub last_studied: Option<Timestamp>,
}

impl Card {
    /// A card on first exposure to its vocabulary item: stage 0, level 1,
    /// reviewable immediately.
    pub fn new(
        card_id: CardId,
        user_id: UserId,
        vocab_id: VocabId,
        folder_id: FolderId,
        now: Timestamp,
    ) -> Self {
        Self {
            card_id,
            user_id,
            vocab_id,
            folder_id,
            stage: 0,
            level: Level::min(),
            status: CardStatus::Available,
            next_due: now,
            waiting_until: None,
            frozen_until: None,
            overdue_deadline: None,
            is_overdue: false,
            is_from_wrong_answer: false,
            study_count: 0,
            correct_count: 0,
            wrong_streak: 0,
            total_study_time: 0,
            total_response_time: 0,
            last_studied: None,
        }
    }

    /// Fraction of reviews answered correctly, 0 for an unstudied card.
    pub fn accuracy(&self) -> f64 {
        self.correct_count as f64 / self.study_count.max(1) as f64
    }

    pub fn is_mastered(&self) -> bool {
        self.status == CardStatus::Mastered
    }
}
