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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parses a difficulty label. Unrecognised labels are treated as medium.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => {
                log::warn!("Unknown difficulty {other:?}, treating as medium.");
                Difficulty::Medium
            }
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A review outcome as submitted by a caller, before validation.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeInput {
    pub correct: Option<bool>,
    pub difficulty: Option<String>,
    /// How long the learner took to answer.
    pub response_time_ms: Option<u64>,
    /// How long the learner spent on the card overall.
    pub study_time_secs: Option<u64>,
}

impl OutcomeInput {
    pub fn answered(correct: bool, difficulty: Difficulty) -> Self {
        Self {
            correct: Some(correct),
            difficulty: Some(difficulty.as_str().to_string()),
            response_time_ms: None,
            study_time_secs: None,
        }
    }
}

/// The validated input to one scheduling decision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReviewOutcome {
    pub correct: bool,
    pub difficulty: Difficulty,
    pub response_time_ms: u64,
    pub study_time_secs: u64,
}

impl ReviewOutcome {
    pub fn new(correct: bool, difficulty: Difficulty) -> Self {
        Self {
            correct,
            difficulty,
            response_time_ms: 0,
            study_time_secs: 0,
        }
    }
}

impl TryFrom<&OutcomeInput> for ReviewOutcome {
    type Error = ErrorReport;

    fn try_from(input: &OutcomeInput) -> Result<Self, Self::Error> {
        let correct = input
            .correct
            .ok_or_else(|| ErrorReport::invalid_outcome("review outcome is missing `correct`."))?;
        let difficulty = match &input.difficulty {
            Some(label) => Difficulty::parse_lenient(label),
            None => Difficulty::Medium,
        };
        Ok(Self {
            correct,
            difficulty,
            response_time_ms: input.response_time_ms.unwrap_or(0),
            study_time_secs: input.study_time_secs.unwrap_or(0),
        })
    }
}
