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

//! The engine ties the pure scheduling functions to a repository and a
//! clock. Every operation reads the time once, loads what it needs, and
//! writes its changes back in a single `save_cards` call.

use serde::Serialize;

use crate::analytics::LearningReport;
use crate::analytics::StudyStats;
use crate::analytics::UserLevel;
use crate::analytics::analyze_learning_pattern;
use crate::analytics::recommend_study_session_size;
use crate::analytics::study_stats;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Fallible;
use crate::lifecycle::ReviewReceipt;
use crate::lifecycle::Transition;
use crate::lifecycle::apply_review;
use crate::lifecycle::freeze;
use crate::lifecycle::sweep;
use crate::repository::CardRepository;
use crate::select::select_due;
use crate::state::state_anomalies;
use crate::sync::SyncPreview;
use crate::sync::SyncResult;
use crate::sync::SyncSkip;
use crate::sync::preview;
use crate::sync::synchronize;
use crate::types::card::Card;
use crate::types::folder::Folder;
use crate::types::ids::CardId;
use crate::types::ids::FolderId;
use crate::types::ids::UserId;
use crate::types::ids::VocabId;
use crate::types::outcome::OutcomeInput;
use crate::types::outcome::ReviewOutcome;
use crate::types::timestamp::Timestamp;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    #[serde(flatten)]
    pub receipt: ReviewReceipt,
    /// The synchronization run over the card's folder after the review, if
    /// one was attempted.
    pub auto_sync: Option<SyncResult>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweptCard {
    pub card_id: CardId,
    pub transition: Transition,
}

pub struct Engine<R, C> {
    repository: R,
    clock: C,
    config: Config,
}

impl<R: CardRepository, C: Clock> Engine<R, C> {
    pub fn new(repository: R, clock: C, config: Config) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn create_folder(
        &self,
        user_id: UserId,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Fallible<Folder> {
        let folder = self.repository.create_folder(user_id, name, parent_id)?;
        log::debug!("Created folder {} ({})", folder.folder_id, folder.name);
        Ok(folder)
    }

    pub fn create_card(
        &self,
        user_id: UserId,
        vocab_id: VocabId,
        folder_id: FolderId,
    ) -> Fallible<Card> {
        let card = self
            .repository
            .create_card(user_id, vocab_id, folder_id, self.clock.now())?;
        log::debug!("Created card {} for vocab {}", card.card_id, vocab_id);
        Ok(card)
    }

    /// Records a review. When the review changed the card's schedule and
    /// automatic synchronization applies, the card's folder is synchronized
    /// too, and everything is saved together.
    pub fn submit_review(&self, card_id: CardId, input: &OutcomeInput) -> Fallible<ReviewResult> {
        let outcome = ReviewOutcome::try_from(input)?;
        let now = self.clock.now();
        let mut card = self.repository.load_card(card_id)?;
        for anomaly in state_anomalies(&self.config.scheduler, &card, now) {
            log::warn!("card {card_id} has inconsistent timers: {anomaly:?}");
        }
        let receipt = apply_review(&self.config.scheduler, &mut card, &outcome, now);

        if !(receipt.scheduled && self.config.sync.after_review) {
            self.repository.save_cards(&[card])?;
            return Ok(ReviewResult {
                receipt,
                auto_sync: None,
            });
        }
        if let Some(reason) = self.auto_sync_skip(card.folder_id) {
            self.repository.save_cards(&[card])?;
            return Ok(ReviewResult {
                receipt,
                auto_sync: Some(SyncResult::skipped(reason)),
            });
        }

        let mut siblings = self.repository.load_cards_by_folder(card.folder_id, None)?;
        match siblings.iter_mut().find(|c| c.card_id == card_id) {
            Some(slot) => *slot = card,
            None => siblings.push(card),
        }
        let result = synchronize(&self.config.sync, &mut siblings, now);
        let to_save: Vec<Card> = siblings
            .into_iter()
            .filter(|c| c.card_id == card_id || result.changed.contains(&c.card_id))
            .collect();
        self.repository.save_cards(&to_save)?;
        Ok(ReviewResult {
            receipt,
            auto_sync: Some(result),
        })
    }

    fn auto_sync_skip(&self, folder_id: FolderId) -> Option<SyncSkip> {
        if !self.config.sync.enabled {
            Some(SyncSkip::Disabled)
        } else if self.config.sync.is_excluded(folder_id) {
            Some(SyncSkip::FolderExcluded)
        } else {
            None
        }
    }

    pub fn due_queue(&self, user_id: UserId, limit: Option<usize>) -> Fallible<Vec<Card>> {
        let cards = self.repository.load_cards_by_user(user_id)?;
        let now = self.clock.now();
        Ok(select_due(&cards, now, limit).into_iter().cloned().collect())
    }

    pub fn preview_folder_sync(&self, folder_id: FolderId) -> Fallible<SyncPreview> {
        self.repository.load_folder(folder_id)?;
        let cards = self.repository.load_cards_by_folder(folder_id, None)?;
        Ok(preview(&self.config.sync, &cards, self.clock.now()))
    }

    /// Synchronizes a folder on request. Unlike the automatic run, this
    /// ignores the `enabled` and `exclude_folders` settings.
    pub fn apply_folder_sync(&self, folder_id: FolderId) -> Fallible<SyncResult> {
        self.repository.load_folder(folder_id)?;
        let mut cards = self.repository.load_cards_by_folder(folder_id, None)?;
        let result = synchronize(&self.config.sync, &mut cards, self.clock.now());
        if result.synced {
            let changed: Vec<Card> = cards
                .into_iter()
                .filter(|c| result.changed.contains(&c.card_id))
                .collect();
            self.repository.save_cards(&changed)?;
            log::debug!(
                "Synchronized {} cards in folder {folder_id}",
                result.changed.len()
            );
        }
        Ok(result)
    }

    /// Moves a user's cards through the overdue window.
    pub fn sweep_user(&self, user_id: UserId) -> Fallible<Vec<SweptCard>> {
        let now = self.clock.now();
        let mut swept = Vec::new();
        let mut changed = Vec::new();
        for mut card in self.repository.load_cards_by_user(user_id)? {
            if let Some(transition) = sweep(&mut card, now) {
                swept.push(SweptCard {
                    card_id: card.card_id,
                    transition,
                });
                changed.push(card);
            }
        }
        if !changed.is_empty() {
            self.repository.save_cards(&changed)?;
        }
        log::debug!("Sweep of user {user_id} changed {} cards", changed.len());
        Ok(swept)
    }

    pub fn freeze_card(&self, card_id: CardId, until: Timestamp) -> Fallible<Card> {
        let mut card = self.repository.load_card(card_id)?;
        if freeze(&mut card, until) {
            self.repository.save_cards(std::slice::from_ref(&card))?;
        }
        Ok(card)
    }

    pub fn stats(&self, user_id: UserId) -> Fallible<StudyStats> {
        let cards = self.repository.load_cards_by_user(user_id)?;
        Ok(study_stats(&cards))
    }

    pub fn insights(&self, user_id: UserId, days: u32) -> Fallible<LearningReport> {
        let cards = self.repository.load_cards_by_user(user_id)?;
        Ok(analyze_learning_pattern(&cards, self.clock.now(), days))
    }

    /// How many of the user's due cards fit in a session of this length.
    pub fn session_size(&self, user_id: UserId, level: UserLevel, minutes: u32) -> Fallible<usize> {
        let due = self.due_queue(user_id, None)?;
        Ok(recommend_study_session_size(due.len(), level, minutes))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::SyncConfig;
    use crate::error::ErrorKind;
    use crate::repository::MemoryRepository;
    use crate::state::CardState;
    use crate::state::card_state;
    use crate::types::card::CardStatus;
    use crate::types::outcome::Difficulty;

    type TestEngine = Engine<MemoryRepository, FixedClock>;

    fn engine_with(config: Config) -> Fallible<TestEngine> {
        let start = Timestamp::parse("2025-01-01T09:00:00Z")?;
        Ok(Engine::new(
            MemoryRepository::new(),
            FixedClock::new(start),
            config,
        ))
    }

    fn folder_of(engine: &TestEngine) -> Fallible<FolderId> {
        let user = UserId::new(1);
        let parent = engine.create_folder(user, "Japanese", None)?;
        let folder = engine.create_folder(user, "Animals", Some(parent.folder_id))?;
        Ok(folder.folder_id)
    }

    fn correct() -> OutcomeInput {
        OutcomeInput::answered(true, Difficulty::Medium)
    }

    #[test]
    fn test_review_updates_and_persists() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        let result = engine.submit_review(card.card_id, &correct())?;
        assert!(result.receipt.scheduled);
        assert_eq!(result.receipt.stage, 1);
        let stored = engine.repository().load_card(card.card_id)?;
        assert_eq!(stored.level.value(), 2.0);
        assert_eq!(stored.study_count, 1);
        assert_eq!(stored.waiting_until, result.receipt.waiting_until);
        // Alone in its folder, so nothing to synchronize.
        let sync = result.auto_sync.unwrap();
        assert_eq!(sync.reason, Some(SyncSkip::NoCandidates));
        Ok(())
    }

    #[test]
    fn test_invalid_outcome_and_unknown_card() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        let err = engine
            .submit_review(card.card_id, &OutcomeInput::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOutcome);
        assert_eq!(engine.repository().load_card(card.card_id)?, card);
        let err = engine.submit_review(CardId::new(404), &correct()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CardNotFound);
        Ok(())
    }

    #[test]
    fn test_repository_failure_propagates() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        engine.repository().fail_saves(true)?;
        let err = engine.submit_review(card.card_id, &correct()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RepositoryFailure);
        Ok(())
    }

    #[test]
    fn test_review_auto_syncs_siblings() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let user = UserId::new(1);
        let a = engine.create_card(user, VocabId::new(1), folder)?;
        let b = engine.create_card(user, VocabId::new(2), folder)?;
        engine.submit_review(a.card_id, &correct())?;
        engine.clock().advance(TimeDelta::minutes(20));
        let result = engine.submit_review(b.card_id, &correct())?;
        let sync = result.auto_sync.unwrap();
        assert!(sync.synced);
        assert_eq!(sync.changed, vec![b.card_id]);
        let a = engine.repository().load_card(a.card_id)?;
        let b = engine.repository().load_card(b.card_id)?;
        assert_eq!(a.waiting_until, b.waiting_until);
        assert_eq!(a.overdue_deadline, b.overdue_deadline);
        Ok(())
    }

    #[test]
    fn test_auto_sync_settings() -> Fallible<()> {
        let config = Config {
            sync: SyncConfig {
                enabled: false,
                ..SyncConfig::default()
            },
            ..Config::default()
        };
        let engine = engine_with(config)?;
        let folder = folder_of(&engine)?;
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        let result = engine.submit_review(card.card_id, &correct())?;
        assert_eq!(result.auto_sync.unwrap().reason, Some(SyncSkip::Disabled));

        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let engine = Engine::new(
            engine.repository,
            engine.clock,
            Config {
                sync: SyncConfig {
                    exclude_folders: vec![folder],
                    ..SyncConfig::default()
                },
                ..Config::default()
            },
        );
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        let result = engine.submit_review(card.card_id, &correct())?;
        assert_eq!(
            result.auto_sync.unwrap().reason,
            Some(SyncSkip::FolderExcluded)
        );
        Ok(())
    }

    #[test]
    fn test_practice_review_skips_sync() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let card = engine.create_card(UserId::new(1), VocabId::new(1), folder)?;
        engine.submit_review(card.card_id, &correct())?;
        let result = engine.submit_review(card.card_id, &correct())?;
        assert!(!result.receipt.scheduled);
        assert!(result.auto_sync.is_none());
        assert_eq!(engine.repository().load_card(card.card_id)?.study_count, 2);
        Ok(())
    }

    #[test]
    fn test_due_queue() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let user = UserId::new(1);
        let a = engine.create_card(user, VocabId::new(1), folder)?;
        let b = engine.create_card(user, VocabId::new(2), folder)?;
        engine.clock().advance(TimeDelta::minutes(1));
        engine.submit_review(a.card_id, &correct())?;
        let queue = engine.due_queue(user, None)?;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].card_id, b.card_id);
        assert!(engine.due_queue(user, Some(0))?.is_empty());
        assert_eq!(engine.session_size(user, UserLevel::Beginner, 30)?, 1);
        Ok(())
    }

    #[test]
    fn test_manual_sync() -> Fallible<()> {
        let config = Config {
            sync: SyncConfig {
                after_review: false,
                ..SyncConfig::default()
            },
            ..Config::default()
        };
        let engine = engine_with(config)?;
        let folder = folder_of(&engine)?;
        let user = UserId::new(1);
        let a = engine.create_card(user, VocabId::new(1), folder)?;
        let b = engine.create_card(user, VocabId::new(2), folder)?;
        engine.submit_review(a.card_id, &correct())?;
        engine.clock().advance(TimeDelta::minutes(30));
        let result = engine.submit_review(b.card_id, &correct())?;
        assert!(result.auto_sync.is_none());

        let preview = engine.preview_folder_sync(folder)?;
        assert_eq!(preview.groups.len(), 1);
        assert_eq!(preview.groups[0].span_minutes, 30);
        assert_ne!(
            engine.repository().load_card(a.card_id)?.waiting_until,
            engine.repository().load_card(b.card_id)?.waiting_until
        );

        let result = engine.apply_folder_sync(folder)?;
        assert!(result.synced);
        assert_eq!(
            engine.repository().load_card(a.card_id)?.waiting_until,
            engine.repository().load_card(b.card_id)?.waiting_until
        );
        let again = engine.apply_folder_sync(folder)?;
        assert_eq!(again.reason, Some(SyncSkip::AlreadyAligned));

        let err = engine.apply_folder_sync(FolderId::new(404)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FolderNotFound);
        let err = engine.preview_folder_sync(FolderId::new(404)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FolderNotFound);
        Ok(())
    }

    #[test]
    fn test_sweep_and_freeze() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let user = UserId::new(1);
        let card = engine.create_card(user, VocabId::new(1), folder)?;
        engine.submit_review(card.card_id, &correct())?;
        assert!(engine.sweep_user(user)?.is_empty());

        engine.clock().advance(TimeDelta::hours(49));
        let swept = engine.sweep_user(user)?;
        assert_eq!(swept.len(), 1);
        let stored = engine.repository().load_card(card.card_id)?;
        assert_eq!(card_state(&stored, engine.clock().now()), CardState::Overdue);
        assert_eq!(engine.due_queue(user, None)?.len(), 1);

        engine.clock().advance(TimeDelta::hours(24));
        engine.sweep_user(user)?;
        let stored = engine.repository().load_card(card.card_id)?;
        assert_eq!(stored.status, CardStatus::Failed);
        assert!(engine.due_queue(user, None)?.is_empty());

        let until = engine.clock().now() + TimeDelta::days(10);
        let frozen = engine.freeze_card(card.card_id, until)?;
        assert_eq!(frozen.frozen_until, Some(until));
        assert_eq!(
            engine.repository().load_card(card.card_id)?.frozen_until,
            Some(until)
        );
        Ok(())
    }

    #[test]
    fn test_stats_and_insights() -> Fallible<()> {
        let engine = engine_with(Config::default())?;
        let folder = folder_of(&engine)?;
        let user = UserId::new(1);
        let card = engine.create_card(user, VocabId::new(1), folder)?;
        engine.create_card(user, VocabId::new(2), folder)?;
        engine.submit_review(card.card_id, &OutcomeInput::answered(false, Difficulty::Hard))?;
        let stats = engine.stats(user)?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.retention_rate, 0.0);
        let report = engine.insights(user, 7)?;
        assert_eq!(report.trends.recently_studied, 1);
        assert_eq!(report.trends.difficult_cards.len(), 2);
        Ok(())
    }
}
