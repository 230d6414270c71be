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

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::schedule::base_interval;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::level::Level;
use crate::types::outcome::Difficulty;
use crate::types::outcome::ReviewOutcome;
use crate::types::timestamp::Timestamp;

/// The result of one scheduling decision.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub next_due: Timestamp,
    pub new_level: Level,
    pub new_status: CardStatus,
    /// Minutes.
    pub interval: i64,
}

/// Computes a card's next level, status, and due time. Out-of-range values
/// are clamped, never rejected.
pub fn evaluate(
    config: &SchedulerConfig,
    card: &Card,
    outcome: &ReviewOutcome,
    now: Timestamp,
) -> Evaluation {
    let level = card.level.value();
    let (min_interval, max_interval) = config.interval_bounds();
    let (new_level, interval) = if outcome.correct {
        let new_level = Level::new(raised_level(level, outcome.difficulty));
        (new_level, interval_for(config, new_level, outcome.difficulty))
    } else {
        (Level::new(lowered_level(level)), min_interval)
    };
    let interval = interval.clamp(min_interval, max_interval);
    Evaluation {
        next_due: now.plus_minutes(interval),
        new_level,
        new_status: card_status(config, new_level, outcome.correct),
        interval,
    }
}

/// Derives a card's status from its level and the correctness of the last
/// answer.
pub fn card_status(config: &SchedulerConfig, level: Level, correct: bool) -> CardStatus {
    let level = level.value();
    if !correct {
        if level <= 2.0 {
            return CardStatus::Available;
        }
        return CardStatus::Waiting;
    }
    if level >= config.mastery_threshold {
        CardStatus::Mastered
    } else if level >= 5.0 {
        CardStatus::Waiting
    } else {
        CardStatus::Available
    }
}

fn raised_level(level: f64, difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => level + 2.0,
        Difficulty::Medium => level + 1.0,
        Difficulty::Hard => level + 0.5,
    }
}

/// Well-advanced cards lose two levels on a miss.
fn lowered_level(level: f64) -> f64 {
    if level <= 1.0 {
        1.0
    } else if level >= 5.0 {
        level - 2.0
    } else {
        level - 1.0
    }
}

fn interval_for(config: &SchedulerConfig, level: Level, difficulty: Difficulty) -> i64 {
    let base = base_interval(level) as f64;
    let scaled = match difficulty {
        Difficulty::Easy => base * config.easy_factor,
        Difficulty::Medium => base,
        Difficulty::Hard => base * config.hard_factor,
    };
    scaled.floor() as i64
}
