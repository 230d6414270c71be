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
use rusqlite::types::FromSqlResult;
#[cfg(feature = "sqlite")]
use rusqlite::types::ToSqlOutput;
#[cfg(feature = "sqlite")]
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

pub const MIN_LEVEL: f64 = 1.0;

pub const MAX_LEVEL: f64 = 10.0;

/// A card's fine-grained strength, always within `[MIN_LEVEL, MAX_LEVEL]`.
///
/// Levels advance by half a step on a hard answer, so the value is not always
/// a whole number. The interval table is indexed by the whole part.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Level(f64);

impl Level {
    /// Creates a level, clamping out-of-range values. NaN maps to the
    /// minimum.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(MIN_LEVEL);
        }
        Self(value.clamp(MIN_LEVEL, MAX_LEVEL))
    }

    pub fn min() -> Self {
        Self(MIN_LEVEL)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Zero-based position in a ten-entry, level-indexed table.
    pub fn table_index(self) -> usize {
        (self.0.floor() as usize).saturating_sub(1).min(9)
    }
}

impl From<f64> for Level {
    fn from(value: f64) -> Self {
        Level::new(value)
    }
}

impl From<Level> for f64 {
    fn from(value: Level) -> Self {
        value.0
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{:.1}", self.0)
        }
    }
}

#[cfg(feature = "sqlite")]
impl ToSql for Level {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

#[cfg(feature = "sqlite")]
impl FromSql for Level {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: f64 = FromSql::column_result(value)?;
        Ok(Level::new(value))
    }
}
