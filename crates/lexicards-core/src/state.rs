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

//! Derived card state. Never stored: always recomputed from the card's
//! fields and an explicit `now`.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Frozen,
    Overdue,
    /// Cooling down after an incorrect answer.
    WaitingWrong,
    /// Waiting out the stage delay after a correct answer.
    WaitingCorrect,
    Ready,
}

impl CardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::Frozen => "frozen",
            CardState::Overdue => "overdue",
            CardState::WaitingWrong => "waiting_wrong",
            CardState::WaitingCorrect => "waiting_correct",
            CardState::Ready => "ready",
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, CardState::WaitingWrong | CardState::WaitingCorrect)
    }

    /// The timer that decides when a card in this state is next reviewed.
    /// Frozen cards have none.
    pub fn active_timer(&self) -> Option<TimerField> {
        match self {
            CardState::Frozen => None,
            CardState::Overdue => Some(TimerField::OverdueDeadline),
            CardState::WaitingWrong | CardState::WaitingCorrect => Some(TimerField::WaitingUntil),
            CardState::Ready => Some(TimerField::NextDue),
        }
    }
}

impl Display for CardState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves a card's state. Precedence: frozen, then overdue, then waiting,
/// then ready. A frozen card is never ready, whatever its other timers say.
pub fn card_state(card: &Card, now: Timestamp) -> CardState {
    if card.frozen_until.is_some_and(|until| until > now) {
        return CardState::Frozen;
    }
    if card.is_overdue {
        return CardState::Overdue;
    }
    if card.waiting_until.is_some_and(|until| until > now) {
        if card.is_from_wrong_answer {
            return CardState::WaitingWrong;
        }
        return CardState::WaitingCorrect;
    }
    CardState::Ready
}

/// One of a card's timestamp fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerField {
    NextDue,
    WaitingUntil,
    OverdueDeadline,
}

impl TimerField {
    pub fn get(self, card: &Card) -> Option<Timestamp> {
        match self {
            TimerField::NextDue => Some(card.next_due),
            TimerField::WaitingUntil => card.waiting_until,
            TimerField::OverdueDeadline => card.overdue_deadline,
        }
    }

    pub fn set(self, card: &mut Card, value: Timestamp) {
        match self {
            TimerField::NextDue => card.next_due = value,
            TimerField::WaitingUntil => card.waiting_until = Some(value),
            TimerField::OverdueDeadline => card.overdue_deadline = Some(value),
        }
    }
}

/// Field combinations the state precedence resolves, but which should not
/// occur in well-formed data.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Anomaly {
    /// Both the overdue flag and a running wait are set.
    OverdueWhileWaiting { waiting_until: Timestamp },
    /// A running freeze hides an overdue flag or a running wait.
    FrozenOverActiveTimer,
    /// The overdue deadline falls before the end of the waiting period.
    DeadlineBeforeWaiting {
        waiting_until: Timestamp,
        overdue_deadline: Timestamp,
    },
    /// The card is marked overdue but has no deadline.
    OverdueWithoutDeadline,
    /// The card is mastered at a level below the mastery threshold.
    MasteredBelowThreshold { level: f64 },
}

pub fn state_anomalies(config: &SchedulerConfig, card: &Card, now: Timestamp) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    let waiting = card.waiting_until.filter(|until| *until > now);
    let frozen = card.frozen_until.is_some_and(|until| until > now);
    if let Some(waiting_until) = waiting {
        if card.is_overdue {
            anomalies.push(Anomaly::OverdueWhileWaiting { waiting_until });
        }
    }
    if frozen && (card.is_overdue || waiting.is_some()) {
        anomalies.push(Anomaly::FrozenOverActiveTimer);
    }
    if let (Some(waiting_until), Some(overdue_deadline)) =
        (card.waiting_until, card.overdue_deadline)
    {
        if overdue_deadline < waiting_until {
            anomalies.push(Anomaly::DeadlineBeforeWaiting {
                waiting_until,
                overdue_deadline,
            });
        }
    }
    if card.is_overdue && card.overdue_deadline.is_none() {
        anomalies.push(Anomaly::OverdueWithoutDeadline);
    }
    if card.status == CardStatus::Mastered && card.level.value() < config.mastery_threshold {
        anomalies.push(Anomaly::MasteredBelowThreshold {
            level: card.level.value(),
        });
    }
    anomalies
}
