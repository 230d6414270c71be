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

use clap::ValueEnum;
use lexicards_core::CardRepository;
use lexicards_core::Clock;
use lexicards_core::Engine;
use lexicards_core::Fallible;
use lexicards_core::LearningReport;
use lexicards_core::UserId;
use lexicards_core::UserLevel;
use serde::Serialize;

use crate::cmd::print_json;

#[derive(ValueEnum, Clone, Copy)]
pub enum LevelArg {
    /// Half a card per minute, at most 15.
    Beginner,
    /// Three cards every four minutes, at most 25.
    Intermediate,
    /// A card per minute, at most 40.
    Advanced,
}

impl Display for LevelArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", UserLevel::from(*self))
    }
}

impl From<LevelArg> for UserLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Beginner => UserLevel::Beginner,
            LevelArg::Intermediate => UserLevel::Intermediate,
            LevelArg::Advanced => UserLevel::Advanced,
        }
    }
}

pub fn print_stats<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
) -> Fallible<()> {
    let stats = engine.stats(user_id)?;
    print_json(&stats)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    #[serde(flatten)]
    report: LearningReport,
    session_size: usize,
    user_level: UserLevel,
    minutes: u32,
}

pub fn print_insights<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
    days: u32,
    level: LevelArg,
    minutes: u32,
) -> Fallible<()> {
    let user_level = UserLevel::from(level);
    let insights = Insights {
        report: engine.insights(user_id, days)?,
        session_size: engine.session_size(user_id, user_level, minutes)?,
        user_level,
        minutes,
    };
    print_json(&insights)
}
