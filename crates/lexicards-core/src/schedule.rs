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

//! The fixed interval tables.
//!
//! Two schedules run side by side. The level table gives minute-scale
//! intervals for the review evaluator. The stage table gives the day-scale
//! forgetting curve, which is split into a waiting phase followed by a
//! 24-hour overdue grace period.

use chrono::TimeDelta;

use crate::types::level::Level;
use crate::types::timestamp::Timestamp;

/// Base wait per level, in minutes: 1m, 5m, 15m, 1h, 1d, 3d, 1w, 2w, 1mo, 2mo.
pub const LEVEL_INTERVALS: [i64; 10] = [1, 5, 15, 60, 1440, 4320, 10080, 20160, 43200, 87600];

/// Review delay per stage (stages 1 to 6), in days.
pub const STAGE_DELAY_DAYS: [i64; 6] = [3, 7, 14, 30, 60, 120];

/// The highest stage a card can reach.
pub const MAX_STAGE: u32 = STAGE_DELAY_DAYS.len() as u32;

pub const OVERDUE_GRACE_HOURS: i64 = 24;

pub const WRONG_ANSWER_COOLDOWN_HOURS: i64 = 24;

/// The base interval for a level, in minutes.
pub fn base_interval(level: Level) -> i64 {
    LEVEL_INTERVALS[level.table_index()]
}

/// The full forgetting-curve delay for a stage, in days. Stage 0 uses the
/// first entry and stages past the table use the last.
pub fn stage_delay_days(stage: u32) -> i64 {
    let index = (stage.max(1) as usize - 1).min(STAGE_DELAY_DAYS.len() - 1);
    STAGE_DELAY_DAYS[index]
}

pub fn overdue_grace() -> TimeDelta {
    TimeDelta::hours(OVERDUE_GRACE_HOURS)
}

/// The part of a stage's delay during which the card is not reviewable.
pub fn waiting_window(stage: u32) -> TimeDelta {
    TimeDelta::days(stage_delay_days(stage)) - overdue_grace()
}

pub fn waiting_until(start: Timestamp, stage: u32) -> Timestamp {
    start + waiting_window(stage)
}

pub fn overdue_deadline(waiting_until: Timestamp) -> Timestamp {
    waiting_until + overdue_grace()
}

pub fn wrong_answer_waiting_until(start: Timestamp) -> Timestamp {
    start + TimeDelta::hours(WRONG_ANSWER_COOLDOWN_HOURS)
}
