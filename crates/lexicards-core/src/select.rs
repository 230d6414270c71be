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

use crate::state::CardState;
use crate::state::card_state;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::timestamp::Timestamp;

/// The moment a card became (or will become) reviewable: the later of its
/// due date and the end of its wait.
pub fn due_at(card: &Card) -> Timestamp {
    match card.waiting_until {
        Some(until) => card.next_due.max(until),
        None => card.next_due,
    }
}

pub fn is_due(card: &Card, now: Timestamp) -> bool {
    if card.status == CardStatus::Mastered {
        return false;
    }
    match card_state(card, now) {
        CardState::Overdue => true,
        CardState::Ready => card.next_due <= now,
        CardState::Frozen | CardState::WaitingWrong | CardState::WaitingCorrect => false,
    }
}

/// Builds a review queue: the most overdue cards first, and among equally
/// overdue cards the weakest first.
pub fn select_due(cards: &[Card], now: Timestamp, limit: Option<usize>) -> Vec<&Card> {
    let mut due: Vec<(i64, &Card)> = cards
        .iter()
        .filter(|card| is_due(card, now))
        .map(|card| (now.minutes_since(due_at(card)), card))
        .collect();
    // `sort_by` is stable, so input order breaks the remaining ties.
    due.sort_by(|(a_overdue, a), (b_overdue, b)| {
        b_overdue
            .cmp(a_overdue)
            .then_with(|| a.level.value().total_cmp(&b.level.value()))
    });
    let queue = due.into_iter().map(|(_, card)| card);
    match limit {
        Some(limit) => queue.take(limit).collect(),
        None => queue.collect(),
    }
}
