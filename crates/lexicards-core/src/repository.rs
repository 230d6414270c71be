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

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::folder::Folder;
use crate::types::ids::CardId;
use crate::types::ids::FolderId;
use crate::types::ids::UserId;
use crate::types::ids::VocabId;
use crate::types::timestamp::Timestamp;

/// Where cards and folders live. Implementations must make `save_cards`
/// atomic: either every card is written or none is.
pub trait CardRepository {
    /// Fails with `CardNotFound` for an unknown ID.
    fn load_card(&self, card_id: CardId) -> Fallible<Card>;

    /// Cards in a folder, optionally restricted to one stage, ordered by ID.
    fn load_cards_by_folder(&self, folder_id: FolderId, stage: Option<u32>)
    -> Fallible<Vec<Card>>;

    /// All of a user's cards, ordered by ID.
    fn load_cards_by_user(&self, user_id: UserId) -> Fallible<Vec<Card>>;

    /// Fails with `FolderNotFound` for an unknown ID.
    fn load_folder(&self, folder_id: FolderId) -> Fallible<Folder>;

    fn create_folder(
        &self,
        user_id: UserId,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Fallible<Folder>;

    /// Creates a card on first exposure to a vocabulary item.
    fn create_card(
        &self,
        user_id: UserId,
        vocab_id: VocabId,
        folder_id: FolderId,
        now: Timestamp,
    ) -> Fallible<Card>;

    /// Overwrites existing cards. Fails with `CardNotFound`, writing nothing,
    /// if any card does not exist.
    fn save_cards(&self, cards: &[Card]) -> Fallible<()>;
}

#[derive(Default)]
struct MemoryStore {
    cards: BTreeMap<CardId, Card>,
    folders: BTreeMap<FolderId, Folder>,
    next_id: i64,
    fail_saves: bool,
}

impl MemoryStore {
    fn fresh_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A repository held in memory. Used in tests, and anywhere persistence is
/// not needed.
#[derive(Default)]
pub struct MemoryRepository {
    store: Mutex<MemoryStore>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save_cards` call fail, to exercise error
    /// propagation.
    pub fn fail_saves(&self, fail: bool) -> Fallible<()> {
        self.acquire()?.fail_saves = fail;
        Ok(())
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, MemoryStore>> {
        self.store
            .lock()
            .map_err(|_| ErrorReport::repository("memory store lock poisoned."))
    }
}

impl CardRepository for MemoryRepository {
    fn load_card(&self, card_id: CardId) -> Fallible<Card> {
        self.acquire()?
            .cards
            .get(&card_id)
            .cloned()
            .ok_or_else(|| ErrorReport::card_not_found(card_id))
    }

    fn load_cards_by_folder(
        &self,
        folder_id: FolderId,
        stage: Option<u32>,
    ) -> Fallible<Vec<Card>> {
        let store = self.acquire()?;
        Ok(store
            .cards
            .values()
            .filter(|card| card.folder_id == folder_id)
            .filter(|card| stage.is_none_or(|stage| card.stage == stage))
            .cloned()
            .collect())
    }

    fn load_cards_by_user(&self, user_id: UserId) -> Fallible<Vec<Card>> {
        let store = self.acquire()?;
        Ok(store
            .cards
            .values()
            .filter(|card| card.user_id == user_id)
            .cloned()
            .collect())
    }

    fn load_folder(&self, folder_id: FolderId) -> Fallible<Folder> {
        self.acquire()?
            .folders
            .get(&folder_id)
            .cloned()
            .ok_or_else(|| ErrorReport::folder_not_found(folder_id))
    }

    fn create_folder(
        &self,
        user_id: UserId,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Fallible<Folder> {
        let mut store = self.acquire()?;
        if let Some(parent_id) = parent_id {
            if !store.folders.contains_key(&parent_id) {
                return Err(ErrorReport::folder_not_found(parent_id));
            }
        }
        let folder = Folder {
            folder_id: FolderId::new(store.fresh_id()),
            user_id,
            name: name.to_string(),
            parent_id,
        };
        store.folders.insert(folder.folder_id, folder.clone());
        Ok(folder)
    }

    fn create_card(
        &self,
        user_id: UserId,
        vocab_id: VocabId,
        folder_id: FolderId,
        now: Timestamp,
    ) -> Fallible<Card> {
        let mut store = self.acquire()?;
        if !store.folders.contains_key(&folder_id) {
            return Err(ErrorReport::folder_not_found(folder_id));
        }
        let card_id = CardId::new(store.fresh_id());
        let card = Card::new(card_id, user_id, vocab_id, folder_id, now);
        store.cards.insert(card_id, card.clone());
        Ok(card)
    }

    fn save_cards(&self, cards: &[Card]) -> Fallible<()> {
        let mut store = self.acquire()?;
        if store.fail_saves {
            return Err(ErrorReport::repository("save rejected."));
        }
        if let Some(missing) = cards.iter().find(|c| !store.cards.contains_key(&c.card_id)) {
            return Err(ErrorReport::card_not_found(missing.card_id));
        }
        for card in cards {
            store.cards.insert(card.card_id, card.clone());
        }
        Ok(())
    }
}
