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

pub mod due;
pub mod folder;
pub mod review;
pub mod stats;
pub mod sweep;
pub mod sync;

use lexicards_core::Engine;
use lexicards_core::Fallible;
use lexicards_core::OffsetClock;
use lexicards_core::SystemClock;
use serde::Serialize;

use crate::db::Database;

/// The engine as the binary runs it: SQLite storage and the system clock,
/// optionally shifted.
pub type AppEngine = Engine<Database, OffsetClock<SystemClock>>;

pub fn print_json<T: Serialize>(value: &T) -> Fallible<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
