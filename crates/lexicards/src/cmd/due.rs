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

use lexicards_core::Card;
use lexicards_core::CardId;
use lexicards_core::CardRepository;
use lexicards_core::CardState;
use lexicards_core::Clock;
use lexicards_core::Engine;
use lexicards_core::Fallible;
use lexicards_core::FolderId;
use lexicards_core::Level;
use lexicards_core::Timestamp;
use lexicards_core::UserId;
use lexicards_core::VocabId;
use lexicards_core::card_state;
use lexicards_core::select::due_at;
use serde::Serialize;

use crate::cmd::print_json;

/// One entry of the review queue, as printed.
#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DueEntry {
    pub card_id: CardId,
    pub vocab_id: VocabId,
    pub folder_id: FolderId,
    pub level: Level,
    pub state: CardState,
    pub overdue_minutes: i64,
}

pub fn due_entries(cards: &[Card], now: Timestamp) -> Vec<DueEntry> {
    cards
        .iter()
        .map(|card| DueEntry {
            card_id: card.card_id,
            vocab_id: card.vocab_id,
            folder_id: card.folder_id,
            level: card.level,
            state: card_state(card, now),
            overdue_minutes: now.minutes_since(due_at(card)),
        })
        .collect()
}

pub fn print_due<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
    limit: Option<usize>,
) -> Fallible<()> {
    let cards = engine.due_queue(user_id, limit)?;
    if cards.is_empty() {
        println!("No cards due.");
        return Ok(());
    }
    let entries = due_entries(&cards, engine.clock().now());
    print_json(&entries)
}
