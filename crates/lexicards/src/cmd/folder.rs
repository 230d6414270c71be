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
use lexicards_core::UserId;
use lexicards_core::VocabId;
use lexicards_core::fail;

use crate::cmd::print_json;

pub fn create_folder<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
    name: &str,
    parent_id: Option<FolderId>,
) -> Fallible<()> {
    let name = name.trim();
    if name.is_empty() {
        return fail("folder name is empty.");
    }
    if let Some(parent_id) = parent_id {
        let parent = engine.repository().load_folder(parent_id)?;
        if parent.is_subfolder() {
            return fail("folders nest at most two levels deep.");
        }
    }
    let folder = engine.create_folder(user_id, name, parent_id)?;
    print_json(&folder)
}

pub fn add_card<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
    vocab_id: VocabId,
    folder_id: FolderId,
) -> Fallible<()> {
    let card = engine.create_card(user_id, vocab_id, folder_id)?;
    print_json(&card)
}

#[cfg(test)]
mod tests {
    use lexicards_core::Config;
    use lexicards_core::FixedClock;
    use lexicards_core::MemoryRepository;
    use lexicards_core::Timestamp;

    use super::*;

    #[test]
    fn test_folder_depth_is_limited() -> Fallible<()> {
        let now = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let engine = Engine::new(MemoryRepository::new(), FixedClock::new(now), Config::default());
        let user = UserId::new(1);
        create_folder(&engine, user, "French", None)?;
        let top = FolderId::new(1);
        create_folder(&engine, user, "Travel", Some(top))?;
        let sub = FolderId::new(2);
        assert!(create_folder(&engine, user, "Airport", Some(sub)).is_err());
        assert!(create_folder(&engine, user, "  ", None).is_err());
        add_card(&engine, user, VocabId::new(1), sub)?;
        assert_eq!(engine.repository().load_cards_by_folder(sub, None)?.len(), 1);
        Ok(())
    }
}
