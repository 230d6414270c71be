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

//! lexicards-core: the scheduling engine behind lexicards.
//!
//! Everything here is deterministic and takes the current time as an
//! argument. The library provides:
//! - The level and stage interval tables
//! - The review evaluator and derived card state
//! - Due-queue selection
//! - Folder timer synchronization, with a non-mutating preview
//! - Study statistics and learning reports
//! - An `Engine` over a `CardRepository` and a `Clock`

pub mod analytics;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod lifecycle;
pub mod repository;
pub mod schedule;
pub mod select;
pub mod state;
pub mod sync;
pub mod types;

// Re-exports for convenience
pub use analytics::{LearningReport, StudyStats, UserLevel};
#[cfg(feature = "clock")]
pub use clock::SystemClock;
pub use clock::{Clock, FixedClock, OffsetClock};
pub use config::{Config, SchedulerConfig, SyncConfig};
pub use engine::{Engine, ReviewResult, SweptCard};
pub use error::{ErrorKind, ErrorReport, Fallible, fail};
pub use evaluate::{Evaluation, evaluate};
pub use lifecycle::{ReviewReceipt, Transition};
pub use repository::{CardRepository, MemoryRepository};
pub use select::select_due;
pub use state::{CardState, card_state};
pub use sync::{SyncPreview, SyncResult, SyncSkip};
pub use types::card::{Card, CardStatus};
pub use types::folder::Folder;
pub use types::ids::{CardId, FolderId, UserId, VocabId};
pub use types::level::Level;
pub use types::outcome::{Difficulty, OutcomeInput, ReviewOutcome};
pub use types::timestamp::Timestamp;
