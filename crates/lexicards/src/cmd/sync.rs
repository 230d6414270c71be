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

use lexicards_core::CardRepository;
use lexicards_core::Clock;
use lexicards_core::Engine;
use lexicards_core::Fallible;
use lexicards_core::FolderId;

use crate::cmd::print_json;

pub fn preview_sync<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    folder_id: FolderId,
) -> Fallible<()> {
    let preview = engine.preview_folder_sync(folder_id)?;
    for group in preview.groups.iter().filter(|group| !group.eligible) {
        log::debug!(
            "Stage {} ({}) spans {} minutes and will not be synchronized.",
            group.key.stage,
            group.key.state,
            group.span_minutes
        );
    }
    print_json(&preview)
}

pub fn apply_sync<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    folder_id: FolderId,
) -> Fallible<()> {
    let result = engine.apply_folder_sync(folder_id)?;
    print_json(&result)
}
