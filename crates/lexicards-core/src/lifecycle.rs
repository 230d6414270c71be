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

//! Card mutations over time: applying a review, and moving cards whose wait
//! has elapsed into the overdue window (or past it).

use chrono::TimeDelta;
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::evaluate::Evaluation;
use crate::evaluate::evaluate;
use crate::schedule::MAX_STAGE;
use crate::schedule::overdue_deadline;
use crate::schedule::overdue_grace;
use crate::schedule::waiting_until;
use crate::schedule::wrong_answer_waiting_until;
use crate::state::CardState;
use crate::state::card_state;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::ids::CardId;
use crate::types::outcome::ReviewOutcome;
use crate::types::timestamp::Timestamp;

/// How long a card stays frozen after missing its overdue deadline, in hours.
pub const MISSED_DEADLINE_FREEZE_HOURS: i64 = 24;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReceipt {
    pub card_id: CardId,
    pub evaluation: Evaluation,
    /// False when the review was free practice: history was recorded, but the
    /// schedule was left alone.
    pub scheduled: bool,
    pub state_before: CardState,
    pub stage: u32,
    pub waiting_until: Option<Timestamp>,
    pub overdue_deadline: Option<Timestamp>,
}

/// Whether a review in this state may change the card's schedule.
pub fn is_review_window(state: CardState) -> bool {
    match state {
        CardState::Ready | CardState::Overdue => true,
        CardState::Frozen | CardState::WaitingWrong | CardState::WaitingCorrect => false,
    }
}

/// Records a review on a card. Inside the review window the evaluation and
/// the stage timers are applied. Outside it, only history changes.
pub fn apply_review(
    config: &SchedulerConfig,
    card: &mut Card,
    outcome: &ReviewOutcome,
    now: Timestamp,
) -> ReviewReceipt {
    let state_before = card_state(card, now);
    let evaluation = evaluate(config, card, outcome, now);
    let scheduled = is_review_window(state_before);

    record_history(card, outcome, now);
    if scheduled {
        card.level = evaluation.new_level;
        card.status = evaluation.new_status;
        card.next_due = evaluation.next_due;
        advance_stage(card, outcome.correct, now);
    } else {
        log::debug!(
            "card {} reviewed while {state_before}; schedule unchanged",
            card.card_id
        );
    }

    ReviewReceipt {
        card_id: card.card_id,
        evaluation,
        scheduled,
        state_before,
        stage: card.stage,
        waiting_until: card.waiting_until,
        overdue_deadline: card.overdue_deadline,
    }
}

fn record_history(card: &mut Card, outcome: &ReviewOutcome, now: Timestamp) {
    card.study_count = card.study_count.saturating_add(1);
    if outcome.correct {
        card.correct_count = card.correct_count.saturating_add(1);
        card.wrong_streak = 0;
    } else {
        card.wrong_streak = card.wrong_streak.saturating_add(1);
    }
    card.total_study_time = card.total_study_time.saturating_add(outcome.study_time_secs);
    card.total_response_time = card
        .total_response_time
        .saturating_add(outcome.response_time_ms);
    card.last_studied = Some(now);
}

fn advance_stage(card: &mut Card, correct: bool, now: Timestamp) {
    card.is_overdue = false;
    card.frozen_until = None;
    let until = if correct {
        card.stage = (card.stage + 1).min(MAX_STAGE);
        card.is_from_wrong_answer = false;
        waiting_until(now, card.stage)
    } else if card.stage == 0 {
        card.stage = 1;
        card.is_from_wrong_answer = false;
        waiting_until(now, card.stage)
    } else {
        card.stage = 0;
        card.is_from_wrong_answer = true;
        wrong_answer_waiting_until(now)
    };
    card.waiting_until = Some(until);
    card.overdue_deadline = Some(overdue_deadline(until));
}

/// A state change made by `sweep`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Transition {
    /// The wait elapsed and the card entered its grace period.
    BecameOverdue { deadline: Timestamp },
    /// The grace period elapsed without a review.
    MissedDeadline { frozen_until: Timestamp },
}

/// Moves a card through the overdue window. Frozen and mastered cards are
/// left alone.
pub fn sweep(card: &mut Card, now: Timestamp) -> Option<Transition> {
    if card.status == CardStatus::Mastered {
        return None;
    }
    match card_state(card, now) {
        CardState::Frozen | CardState::WaitingWrong | CardState::WaitingCorrect => None,
        CardState::Overdue => match card.overdue_deadline {
            Some(deadline) if deadline <= now => Some(freeze_missed(card, now)),
            Some(_) => None,
            None => {
                let deadline = now + overdue_grace();
                card.overdue_deadline = Some(deadline);
                Some(Transition::BecameOverdue { deadline })
            }
        },
        CardState::Ready => {
            let waited = card.waiting_until?;
            let deadline = card
                .overdue_deadline
                .unwrap_or_else(|| overdue_deadline(waited));
            if deadline > now {
                card.is_overdue = true;
                card.overdue_deadline = Some(deadline);
                Some(Transition::BecameOverdue { deadline })
            } else {
                Some(freeze_missed(card, now))
            }
        }
    }
}

fn freeze_missed(card: &mut Card, now: Timestamp) -> Transition {
    let frozen_until = now + TimeDelta::hours(MISSED_DEADLINE_FREEZE_HOURS);
    card.frozen_until = Some(frozen_until);
    card.is_overdue = false;
    card.overdue_deadline = None;
    card.waiting_until = None;
    card.status = CardStatus::Failed;
    Transition::MissedDeadline { frozen_until }
}

/// Pauses a card until the given time. A later freeze replaces an earlier
/// one; an earlier one is ignored.
pub fn freeze(card: &mut Card, until: Timestamp) -> bool {
    match card.frozen_until {
        Some(current) if current >= until => false,
        _ => {
            card.frozen_until = Some(until);
            true
        }
    }
}
