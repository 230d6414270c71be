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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use lexicards_core::ErrorReport;
use lexicards_core::Fallible;
use lexicards_core::Timestamp;

use crate::cmd::AppEngine;

#[derive(Clone)]
pub struct ServerState {
    pub started_at: Timestamp,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    /// Every request goes through this one engine, so card writes are
    /// serialized.
    pub engine: AppEngine,
}

impl ServerState {
    pub fn new(engine: AppEngine, started_at: Timestamp) -> Self {
        Self {
            started_at,
            mutable: Arc::new(Mutex::new(MutableState { engine })),
        }
    }

    pub fn acquire(&self) -> Fallible<MutexGuard<'_, MutableState>> {
        self.mutable
            .lock()
            .map_err(|_| ErrorReport::new("server state lock poisoned."))
    }
}
