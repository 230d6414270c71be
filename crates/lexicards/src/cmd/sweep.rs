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

use chrono::TimeDelta;
use lexicards_core::CardId;
use lexicards_core::CardRepository;
use lexicards_core::Clock;
use lexicards_core::Engine;
use lexicards_core::ErrorReport;
use lexicards_core::Fallible;
use lexicards_core::UserId;
use lexicards_core::fail;

use crate::cmd::print_json;

pub fn sweep_user<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    user_id: UserId,
) -> Fallible<()> {
    let swept = engine.sweep_user(user_id)?;
    print_json(&swept)
}

pub fn freeze_card<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    card_id: CardId,
    hours: i64,
) -> Fallible<()> {
    if hours <= 0 {
        return fail("freeze duration must be positive.");
    }
    let until = TimeDelta::try_hours(hours)
        .and_then(|delta| engine.clock().now().checked_add(delta))
        .ok_or_else(|| {
            ErrorReport::new(format!("freeze duration of {hours} hours is out of range."))
        })?;
    let card = engine.freeze_card(card_id, until)?;
    print_json(&card)
}

#[cfg(test)]
mod tests {
    use lexicards_core::Config;
    use lexicards_core::FixedClock;
    use lexicards_core::MemoryRepository;
    use lexicards_core::Timestamp;
    use lexicards_core::VocabId;

    use super::*;

    #[test]
    fn test_freeze_card() -> Fallible<()> {
        let now = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let engine = Engine::new(MemoryRepository::new(), FixedClock::new(now), Config::default());
        let user = UserId::new(1);
        let folder = engine.create_folder(user, "Numbers", None)?;
        let card = engine.create_card(user, VocabId::new(1), folder.folder_id)?;
        assert!(freeze_card(&engine, card.card_id, 0).is_err());
        assert!(freeze_card(&engine, card.card_id, i64::MAX).is_err());
        assert_eq!(engine.repository().load_card(card.card_id)?.frozen_until, None);
        freeze_card(&engine, card.card_id, 6)?;
        let stored = engine.repository().load_card(card.card_id)?;
        assert_eq!(stored.frozen_until, Some(now + TimeDelta::hours(6)));
        sweep_user(&engine, user)?;
        Ok(())
    }
}
