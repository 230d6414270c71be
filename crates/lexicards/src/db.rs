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

use lexicards_core::Card;
use lexicards_core::CardId;
use lexicards_core::CardRepository;
use lexicards_core::ErrorReport;
use lexicards_core::Fallible;
use lexicards_core::Folder;
use lexicards_core::FolderId;
use lexicards_core::Timestamp;
use lexicards_core::UserId;
use lexicards_core::VocabId;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params;

const CARD_COLUMNS: &str = "card_id, user_id, vocab_id, folder_id, stage, level, status, next_due, waiting_until, frozen_until, overdue_deadline, is_overdue, is_from_wrong_answer, study_count, correct_count, wrong_streak, total_study_time, total_response_time, last_studied";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::repository("database lock poisoned."))
    }

    fn query_cards(&self, sql: &str, params: impl rusqlite::Params) -> Fallible<Vec<Card>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }
}

impl CardRepository for Database {
    fn load_card(&self, card_id: CardId) -> Fallible<Card> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        conn.query_row(&sql, [card_id], card_from_row)
            .optional()?
            .ok_or_else(|| ErrorReport::card_not_found(card_id))
    }

    fn load_cards_by_folder(
        &self,
        folder_id: FolderId,
        stage: Option<u32>,
    ) -> Fallible<Vec<Card>> {
        match stage {
            Some(stage) => {
                let sql = format!(
                    "select {CARD_COLUMNS} from cards where folder_id = ? and stage = ? order by card_id;"
                );
                self.query_cards(&sql, params![folder_id, stage])
            }
            None => {
                let sql = format!(
                    "select {CARD_COLUMNS} from cards where folder_id = ? order by card_id;"
                );
                self.query_cards(&sql, [folder_id])
            }
        }
    }

    fn load_cards_by_user(&self, user_id: UserId) -> Fallible<Vec<Card>> {
        let sql = format!("select {CARD_COLUMNS} from cards where user_id = ? order by card_id;");
        self.query_cards(&sql, [user_id])
    }

    fn load_folder(&self, folder_id: FolderId) -> Fallible<Folder> {
        let conn = self.acquire()?;
        let sql = "select folder_id, user_id, name, parent_id from folders where folder_id = ?;";
        conn.query_row(sql, [folder_id], |row| {
            Ok(Folder {
                folder_id: row.get(0)?,
                user_id: row.get(1)?,
                name: row.get(2)?,
                parent_id: row.get(3)?,
            })
        })
        .optional()?
        .ok_or_else(|| ErrorReport::folder_not_found(folder_id))
    }

    fn create_folder(
        &self,
        user_id: UserId,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Fallible<Folder> {
        if let Some(parent_id) = parent_id {
            self.load_folder(parent_id)?;
        }
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let sql = "insert into folders (user_id, name, parent_id) values (?, ?, ?) returning folder_id;";
        let folder_id: FolderId = tx.query_row(sql, params![user_id, name, parent_id], |row| {
            row.get(0)
        })?;
        tx.commit()?;
        Ok(Folder {
            folder_id,
            user_id,
            name: name.to_string(),
            parent_id,
        })
    }

    fn create_card(
        &self,
        user_id: UserId,
        vocab_id: VocabId,
        folder_id: FolderId,
        now: Timestamp,
    ) -> Fallible<Card> {
        self.load_folder(folder_id)?;
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        // The ID is assigned by the insert, so start from a placeholder.
        let template = Card::new(CardId::new(0), user_id, vocab_id, folder_id, now);
        let card_id = insert_card(&tx, &template)?;
        tx.commit()?;
        Ok(Card { card_id, ..template })
    }

    fn save_cards(&self, cards: &[Card]) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        for card in cards {
            if update_card(&tx, card)? == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Err(ErrorReport::card_not_found(card.card_id));
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    let total_study_time: i64 = row.get(16)?;
    let total_response_time: i64 = row.get(17)?;
    Ok(Card {
        card_id: row.get(0)?,
        user_id: row.get(1)?,
        vocab_id: row.get(2)?,
        folder_id: row.get(3)?,
        stage: row.get(4)?,
        level: row.get(5)?,
        status: row.get(6)?,
        next_due: row.get(7)?,
        waiting_until: row.get(8)?,
        frozen_until: row.get(9)?,
        overdue_deadline: row.get(10)?,
        is_overdue: row.get(11)?,
        is_from_wrong_answer: row.get(12)?,
        study_count: row.get(13)?,
        correct_count: row.get(14)?,
        wrong_streak: row.get(15)?,
        total_study_time: total_study_time.max(0) as u64,
        total_response_time: total_response_time.max(0) as u64,
        last_studied: row.get(18)?,
    })
}

fn insert_card(tx: &Transaction, card: &Card) -> Fallible<CardId> {
    let sql = "insert into cards (user_id, vocab_id, folder_id, stage, level, status, next_due, waiting_until, frozen_until, overdue_deadline, is_overdue, is_from_wrong_answer, study_count, correct_count, wrong_streak, total_study_time, total_response_time, last_studied) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) returning card_id;";
    let card_id: CardId = tx.query_row(
        sql,
        params![
            card.user_id,
            card.vocab_id,
            card.folder_id,
            card.stage,
            card.level,
            card.status,
            card.next_due,
            card.waiting_until,
            card.frozen_until,
            card.overdue_deadline,
            card.is_overdue,
            card.is_from_wrong_answer,
            card.study_count,
            card.correct_count,
            card.wrong_streak,
            card.total_study_time as i64,
            card.total_response_time as i64,
            card.last_studied,
        ],
        |row| row.get(0),
    )?;
    Ok(card_id)
}

/// Overwrites the mutable columns of a card. Returns the number of rows
/// changed.
fn update_card(tx: &Transaction, card: &Card) -> Fallible<usize> {
    let sql = "update cards set folder_id = ?, stage = ?, level = ?, status = ?, next_due = ?, waiting_until = ?, frozen_until = ?, overdue_deadline = ?, is_overdue = ?, is_from_wrong_answer = ?, study_count = ?, correct_count = ?, wrong_streak = ?, total_study_time = ?, total_response_time = ?, last_studied = ? where card_id = ?;";
    let changed = tx.execute(
        sql,
        params![
            card.folder_id,
            card.stage,
            card.level,
            card.status,
            card.next_due,
            card.waiting_until,
            card.frozen_until,
            card.overdue_deadline,
            card.is_overdue,
            card.is_from_wrong_answer,
            card.study_count,
            card.correct_count,
            card.wrong_streak,
            card.total_study_time as i64,
            card.total_response_time as i64,
            card.last_studied,
            card.card_id,
        ],
    )?;
    Ok(changed)
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
