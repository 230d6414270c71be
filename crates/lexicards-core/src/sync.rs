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

//! Folder timer synchronization.
//!
//! Sibling cards in the same subfolder, at the same stage and in the same
//! state, often end up due a few minutes apart because they were studied a
//! few minutes apart. Synchronization collapses such a group onto its
//! earliest timer so the learner can review the group as one batch.
//!
//! Timers only ever move earlier. A group whose timers span more than
//! `MAX_SYNC_SPAN_MINUTES` is left untouched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SyncConfig;
use crate::schedule::overdue_grace;
use crate::state::CardState;
use crate::state::TimerField;
use crate::state::card_state;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::ids::CardId;
use crate::types::ids::FolderId;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupKey {
    pub folder_id: FolderId,
    pub stage: u32,
    pub state: CardState,
}

/// How far one card's active timer moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardShift {
    pub card_id: CardId,
    pub from: Timestamp,
    pub to: Timestamp,
    /// Minutes earlier. Never negative.
    pub minutes: i64,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    #[serde(flatten)]
    pub key: GroupKey,
    /// The timer the group is aligned on.
    pub field: TimerField,
    pub card_ids: Vec<CardId>,
    pub span_minutes: i64,
    /// The earliest timer in the group.
    pub target: Timestamp,
    /// Whether the span is within the configured bound.
    pub eligible: bool,
    /// Cards whose timer is not already on the target.
    pub shifts: Vec<CardShift>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPreview {
    pub groups: Vec<GroupReport>,
}

impl SyncPreview {
    pub fn eligible_groups(&self) -> impl Iterator<Item = &GroupReport> {
        self.groups.iter().filter(|group| group.eligible)
    }
}

/// Why a synchronization changed nothing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SyncSkip {
    /// Automatic synchronization is turned off.
    Disabled,
    /// The folder is on the exclusion list.
    FolderExcluded,
    /// No group has more than one card.
    NoCandidates,
    /// Every candidate group spans more than the bound. Carries the smallest
    /// measured span.
    Ineligible { span_minutes: i64 },
    /// Every eligible group is already on its target.
    AlreadyAligned,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub synced: bool,
    pub groups: Vec<GroupReport>,
    /// Cards that were modified, to be persisted together.
    pub changed: Vec<CardId>,
    pub reason: Option<SyncSkip>,
}

impl SyncResult {
    pub fn skipped(reason: SyncSkip) -> Self {
        Self {
            synced: false,
            groups: Vec::new(),
            changed: Vec::new(),
            reason: Some(reason),
        }
    }
}

struct PlannedGroup {
    report: GroupReport,
    /// Positions of the group's cards in the input slice.
    members: Vec<usize>,
}

fn plan(config: &SyncConfig, cards: &[Card], now: Timestamp) -> Vec<PlannedGroup> {
    let mut groups: BTreeMap<GroupKey, (TimerField, Vec<(usize, Timestamp)>)> = BTreeMap::new();
    for (index, card) in cards.iter().enumerate() {
        if card.status == CardStatus::Mastered {
            continue;
        }
        let state = card_state(card, now);
        let Some(field) = state.active_timer() else {
            continue;
        };
        let Some(due) = field.get(card) else {
            log::debug!(
                "card {} is {state} without an active timer; skipping",
                card.card_id
            );
            continue;
        };
        let key = GroupKey {
            folder_id: card.folder_id,
            stage: card.stage,
            state,
        };
        groups
            .entry(key)
            .or_insert_with(|| (field, Vec::new()))
            .1
            .push((index, due));
    }

    let max_span = config.max_span();
    let mut planned = Vec::new();
    for (key, (field, members)) in groups {
        if members.len() < 2 {
            continue;
        }
        let (Some(target), Some(latest)) = (
            members.iter().map(|(_, due)| *due).min(),
            members.iter().map(|(_, due)| *due).max(),
        ) else {
            continue;
        };
        let span = latest - target;
        let eligible = span <= max_span;
        let shifts = members
            .iter()
            .filter(|(_, due)| *due != target)
            .map(|(index, due)| CardShift {
                card_id: cards[*index].card_id,
                from: *due,
                to: target,
                minutes: due.minutes_since(target),
            })
            .collect();
        let report = GroupReport {
            key,
            field,
            card_ids: members.iter().map(|(index, _)| cards[*index].card_id).collect(),
            span_minutes: span.num_minutes(),
            target,
            eligible,
            shifts,
        };
        if eligible {
            log::debug!(
                "folder {} stage {} ({}): {} cards within {} minutes, target {}",
                key.folder_id,
                key.stage,
                key.state,
                members.len(),
                report.span_minutes,
                target
            );
        } else {
            log::debug!(
                "folder {} stage {} ({}): span of {} minutes exceeds the bound",
                key.folder_id,
                key.stage,
                key.state,
                report.span_minutes
            );
        }
        planned.push(PlannedGroup {
            report,
            members: members.into_iter().map(|(index, _)| index).collect(),
        });
    }
    planned
}

/// Reports what `synchronize` would do, without changing anything.
pub fn preview(config: &SyncConfig, cards: &[Card], now: Timestamp) -> SyncPreview {
    SyncPreview {
        groups: plan(config, cards, now)
            .into_iter()
            .map(|group| group.report)
            .collect(),
    }
}

/// Collapses every eligible group onto its earliest timer.
pub fn synchronize(config: &SyncConfig, cards: &mut [Card], now: Timestamp) -> SyncResult {
    let planned = plan(config, cards, now);

    // Compute every new card before writing any of them back.
    let mut updates: Vec<(usize, Card)> = Vec::new();
    for group in planned.iter().filter(|group| group.report.eligible) {
        let field = group.report.field;
        let target = group.report.target;
        for &index in &group.members {
            let original = &cards[index];
            let mut card = original.clone();
            field.set(&mut card, target);
            if group.report.key.state.is_waiting() {
                card.next_due = card.next_due.min(target);
                if let Some(deadline) = card.overdue_deadline {
                    card.overdue_deadline = Some(deadline.min(target + overdue_grace()));
                }
            }
            if card != *original {
                updates.push((index, card));
            }
        }
    }

    let changed: Vec<CardId> = updates.iter().map(|(_, card)| card.card_id).collect();
    for (index, card) in updates {
        cards[index] = card;
    }

    let reason = if !changed.is_empty() {
        None
    } else if planned.is_empty() {
        Some(SyncSkip::NoCandidates)
    } else if planned.iter().any(|group| group.report.eligible) {
        Some(SyncSkip::AlreadyAligned)
    } else {
        let span_minutes = planned
            .iter()
            .map(|group| group.report.span_minutes)
            .min()
            .unwrap_or_default();
        Some(SyncSkip::Ineligible { span_minutes })
    };

    SyncResult {
        synced: !changed.is_empty(),
        groups: planned.into_iter().map(|group| group.report).collect(),
        changed,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::error::Fallible;
    use crate::schedule::overdue_deadline;
    use crate::types::ids::UserId;
    use crate::types::ids::VocabId;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    /// A stage-1 card waiting until the given time.
    fn waiting_card(id: i64, until: Timestamp) -> Card {
        let mut card = Card::new(
            CardId::new(id),
            UserId::new(1),
            VocabId::new(id),
            FolderId::new(10),
            ts("2025-01-01T08:00:00Z"),
        );
        card.stage = 1;
        card.waiting_until = Some(until);
        card.overdue_deadline = Some(overdue_deadline(until));
        card
    }

    fn timers(cards: &[Card]) -> Vec<Option<Timestamp>> {
        cards.iter().map(|c| c.waiting_until).collect()
    }

    #[test]
    fn test_close_timers_collapse_to_the_earliest() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:00:00Z")),
            waiting_card(2, ts("2025-01-01T10:20:00Z")),
            waiting_card(3, ts("2025-01-01T10:45:00Z")),
        ];
        let result = synchronize(&config, &mut cards, now);
        assert!(result.synced);
        assert_eq!(result.reason, None);
        assert_eq!(result.changed, vec![CardId::new(2), CardId::new(3)]);
        assert_eq!(result.groups.len(), 1);
        let group = &result.groups[0];
        assert_eq!(group.span_minutes, 45);
        assert_eq!(group.field, TimerField::WaitingUntil);
        assert_eq!(group.key.state, CardState::WaitingCorrect);
        let target = ts("2025-01-01T10:00:00Z");
        for card in &cards {
            assert_eq!(card.waiting_until, Some(target));
            assert_eq!(card.overdue_deadline, Some(target + TimeDelta::hours(24)));
        }
        Ok(())
    }

    #[test]
    fn test_wide_span_is_left_untouched() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:00:00Z")),
            waiting_card(2, ts("2025-01-01T11:05:00Z")),
        ];
        let before = cards.clone();
        let result = synchronize(&config, &mut cards, now);
        assert!(!result.synced);
        assert_eq!(result.reason, Some(SyncSkip::Ineligible { span_minutes: 65 }));
        assert!(result.changed.is_empty());
        assert!(!result.groups[0].eligible);
        assert_eq!(cards, before);
        Ok(())
    }

    #[test]
    fn test_span_bound_is_inclusive() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let target = ts("2025-01-01T10:00:00Z");

        let mut cards = vec![waiting_card(1, target), waiting_card(2, ts("2025-01-01T11:00:00Z"))];
        let result = synchronize(&config, &mut cards, now);
        assert!(result.synced);
        assert_eq!(timers(&cards), vec![Some(target), Some(target)]);

        // Thirty seconds past the bound still reports 60 whole minutes.
        let mut cards = vec![waiting_card(1, target), waiting_card(2, ts("2025-01-01T11:00:30Z"))];
        let before = cards.clone();
        let result = synchronize(&config, &mut cards, now);
        assert!(!result.synced);
        assert!(!result.groups[0].eligible);
        assert_eq!(cards, before);
        Ok(())
    }

    #[test]
    fn test_overdue_group_aligns_deadlines() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-02T11:00:00Z")?;
        let overdue = |id: i64, deadline: Timestamp| {
            let mut card = waiting_card(id, deadline - TimeDelta::hours(24));
            card.is_overdue = true;
            card
        };
        let target = ts("2025-01-02T12:00:00Z");
        let mut cards = vec![overdue(1, ts("2025-01-02T12:30:00Z")), overdue(2, target)];
        let before = cards.clone();
        let result = synchronize(&config, &mut cards, now);
        assert!(result.synced);
        assert_eq!(result.changed, vec![CardId::new(1)]);
        let group = &result.groups[0];
        assert_eq!(group.key.state, CardState::Overdue);
        assert_eq!(group.field, TimerField::OverdueDeadline);
        for (old, new) in before.iter().zip(&cards) {
            assert_eq!(new.overdue_deadline, Some(target));
            assert_eq!(new.waiting_until, old.waiting_until);
            assert_eq!(new.next_due, old.next_due);
            assert!(new.is_overdue);
        }
        Ok(())
    }

    #[test]
    fn test_second_run_is_a_no_op() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:30:00Z")),
            waiting_card(2, ts("2025-01-01T10:00:00Z")),
        ];
        assert!(synchronize(&config, &mut cards, now).synced);
        let once = cards.clone();
        let result = synchronize(&config, &mut cards, now);
        assert!(!result.synced);
        assert_eq!(result.reason, Some(SyncSkip::AlreadyAligned));
        assert_eq!(result.groups[0].span_minutes, 0);
        assert_eq!(cards, once);
        Ok(())
    }

    #[test]
    fn test_timers_never_move_later() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:59:00Z")),
            waiting_card(2, ts("2025-01-01T10:00:00Z")),
            waiting_card(3, ts("2025-01-01T10:30:00Z")),
            waiting_card(4, ts("2025-01-01T14:00:00Z")),
        ];
        let before = cards.clone();
        synchronize(&config, &mut cards, now);
        for (old, new) in before.iter().zip(&cards) {
            assert!(new.waiting_until <= old.waiting_until);
            assert!(new.overdue_deadline <= old.overdue_deadline);
            assert!(new.next_due <= old.next_due);
        }
        // The 14:00 card spans the group past the bound, so nothing moves.
        assert_eq!(cards, before);
        Ok(())
    }

    #[test]
    fn test_groups_split_by_folder_stage_and_state() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let a = waiting_card(1, ts("2025-01-01T10:00:00Z"));
        let mut b = waiting_card(2, ts("2025-01-01T10:10:00Z"));
        b.folder_id = FolderId::new(11);
        let mut c = waiting_card(3, ts("2025-01-01T10:10:00Z"));
        c.stage = 2;
        let mut d = waiting_card(4, ts("2025-01-01T10:10:00Z"));
        d.is_from_wrong_answer = true;
        let mut cards = vec![a, b, c, d];
        let result = synchronize(&config, &mut cards, now);
        assert!(!result.synced);
        assert_eq!(result.reason, Some(SyncSkip::NoCandidates));
        assert!(result.groups.is_empty());
        Ok(())
    }

    #[test]
    fn test_mastered_and_frozen_cards_are_excluded() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let a = waiting_card(1, ts("2025-01-01T10:00:00Z"));
        let mut b = waiting_card(2, ts("2025-01-01T10:10:00Z"));
        b.status = CardStatus::Mastered;
        let mut c = waiting_card(3, ts("2025-01-01T10:20:00Z"));
        c.frozen_until = Some(now + TimeDelta::hours(1));
        let mut d = waiting_card(4, ts("2025-01-01T10:30:00Z"));
        d.frozen_until = Some(now + TimeDelta::hours(1));
        let mut cards = vec![a, b, c, d];
        let before = cards.clone();
        let result = synchronize(&config, &mut cards, now);
        assert_eq!(result.reason, Some(SyncSkip::NoCandidates));
        assert_eq!(cards, before);
        Ok(())
    }

    #[test]
    fn test_ready_cards_align_on_next_due() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T12:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:00:00Z")),
            waiting_card(2, ts("2025-01-01T10:00:00Z")),
        ];
        cards[0].next_due = ts("2025-01-01T12:30:00Z");
        cards[1].next_due = ts("2025-01-01T12:05:00Z");
        let result = synchronize(&config, &mut cards, now);
        assert!(result.synced);
        assert_eq!(result.groups[0].field, TimerField::NextDue);
        assert_eq!(cards[0].next_due, ts("2025-01-01T12:05:00Z"));
        // The elapsed wait is not touched.
        assert_eq!(timers(&cards), vec![Some(ts("2025-01-01T10:00:00Z")); 2]);
        Ok(())
    }

    #[test]
    fn test_lower_configured_bound() -> Fallible<()> {
        let config = SyncConfig {
            max_span_minutes: 15,
            ..SyncConfig::default()
        };
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let mut cards = vec![
            waiting_card(1, ts("2025-01-01T10:00:00Z")),
            waiting_card(2, ts("2025-01-01T10:20:00Z")),
        ];
        let result = synchronize(&config, &mut cards, now);
        assert_eq!(result.reason, Some(SyncSkip::Ineligible { span_minutes: 20 }));
        Ok(())
    }

    #[test]
    fn test_preview_does_not_mutate() -> Fallible<()> {
        let config = SyncConfig::default();
        let now = Timestamp::parse("2025-01-01T09:00:00Z")?;
        let cards = vec![
            waiting_card(1, ts("2025-01-01T10:00:00Z")),
            waiting_card(2, ts("2025-01-01T10:20:00Z")),
            waiting_card(3, ts("2025-01-01T10:45:00Z")),
        ];
        let before = cards.clone();
        let preview = preview(&config, &cards, now);
        assert_eq!(cards, before);
        assert_eq!(preview.eligible_groups().count(), 1);
        let group = &preview.groups[0];
        assert_eq!(group.target, ts("2025-01-01T10:00:00Z"));
        let minutes: Vec<i64> = group.shifts.iter().map(|s| s.minutes).collect();
        assert_eq!(minutes, vec![20, 45]);
        Ok(())
    }
}
