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

//! Engine configuration. Plain values, passed explicitly into every function
//! that needs them.

use chrono::TimeDelta;
use serde::Deserialize;
use serde::Serialize;

use crate::types::ids::FolderId;

/// The hard ceiling on a synchronization span, in minutes.
pub const MAX_SYNC_SPAN_MINUTES: i64 = 60;

/// The hard ceiling on a review interval: ten years, in minutes.
pub const MAX_INTERVAL_MINUTES: i64 = 10 * 365 * 24 * 60;

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub sync: SyncConfig,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Interval multiplier for an easy correct answer.
    pub easy_factor: f64,
    /// Interval multiplier for a hard correct answer.
    pub hard_factor: f64,
    /// Minutes.
    pub min_interval: i64,
    /// Minutes.
    pub max_interval: i64,
    /// The level at which a correctly answered card is mastered.
    pub mastery_threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            easy_factor: 2.5,
            hard_factor: 1.3,
            min_interval: 1,
            max_interval: 365 * 24 * 60,
            mastery_threshold: 7.0,
        }
    }
}

impl SchedulerConfig {
    /// The configured interval bounds, each held between one minute and
    /// `MAX_INTERVAL_MINUTES`.
    pub fn interval_bounds(&self) -> (i64, i64) {
        let min = self.min_interval.clamp(1, MAX_INTERVAL_MINUTES);
        let max = self.max_interval.clamp(min, MAX_INTERVAL_MINUTES);
        (min, max)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SyncConfig {
    /// Whether synchronization runs automatically after a review.
    pub enabled: bool,
    /// The largest span a group may have and still be synchronized. Values
    /// above `MAX_SYNC_SPAN_MINUTES` are capped.
    pub max_span_minutes: i64,
    /// Subfolders never synchronized automatically.
    pub exclude_folders: Vec<FolderId>,
    /// Run synchronization over the reviewed card's folder after each review
    /// that changed its schedule.
    pub after_review: bool,
}

impl SyncConfig {
    pub fn max_span(&self) -> TimeDelta {
        let minutes = self.max_span_minutes.clamp(0, MAX_SYNC_SPAN_MINUTES);
        TimeDelta::minutes(minutes)
    }

    pub fn is_excluded(&self, folder_id: FolderId) -> bool {
        self.exclude_folders.contains(&folder_id)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_span_minutes: MAX_SYNC_SPAN_MINUTES,
            exclude_folders: Vec::new(),
            after_review: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_is_capped() {
        let config = SyncConfig {
            max_span_minutes: 240,
            ..SyncConfig::default()
        };
        assert_eq!(config.max_span(), TimeDelta::minutes(60));
        let config = SyncConfig {
            max_span_minutes: 15,
            ..SyncConfig::default()
        };
        assert_eq!(config.max_span(), TimeDelta::minutes(15));
        let config = SyncConfig {
            max_span_minutes: -5,
            ..SyncConfig::default()
        };
        assert_eq!(config.max_span(), TimeDelta::zero());
    }

    #[test]
    fn test_interval_bounds() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_bounds(), (1, 365 * 24 * 60));
        let config = SchedulerConfig {
            min_interval: 0,
            max_interval: i64::MAX,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.interval_bounds(), (1, MAX_INTERVAL_MINUTES));
        let config = SchedulerConfig {
            min_interval: 30,
            max_interval: 10,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.interval_bounds(), (30, 30));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"scheduler": {"easy_factor": 3.0}}"#).unwrap();
        assert_eq!(config.scheduler.easy_factor, 3.0);
        assert_eq!(config.scheduler.mastery_threshold, 7.0);
        assert!(config.sync.enabled);
    }
}
