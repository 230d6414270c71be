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

use clap::ValueEnum;
use lexicards_core::CardId;
use lexicards_core::CardRepository;
use lexicards_core::Clock;
use lexicards_core::Engine;
use lexicards_core::Fallible;
use lexicards_core::OutcomeInput;

use crate::cmd::print_json;

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Answer {
    /// The learner recalled the word.
    Correct,
    /// The learner did not recall the word.
    Incorrect,
}

/// The difficulty is passed through as given: the engine falls back to
/// medium for anything it does not recognize.
pub fn review_input(
    answer: Answer,
    difficulty: Option<String>,
    response_ms: Option<u64>,
    study_secs: Option<u64>,
) -> OutcomeInput {
    OutcomeInput {
        correct: Some(answer == Answer::Correct),
        difficulty,
        response_time_ms: response_ms,
        study_time_secs: study_secs,
    }
}

pub fn review_card<R: CardRepository, C: Clock>(
    engine: &Engine<R, C>,
    card_id: CardId,
    input: &OutcomeInput,
) -> Fallible<()> {
    let result = engine.submit_review(card_id, input)?;
    if !result.receipt.scheduled {
        log::debug!(
            "Card {card_id} was {}; recorded as practice.",
            result.receipt.state_before
        );
    }
    print_json(&result)
}
