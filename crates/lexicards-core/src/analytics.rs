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

//! Read-only reports over a learner's cards. Nothing here affects scheduling.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::TimeDelta;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::ids::CardId;
use crate::types::ids::VocabId;
use crate::types::level::Level;
use crate::types::timestamp::Timestamp;

/// Cards below this accuracy are reported as difficult.
const DIFFICULT_ACCURACY: f64 = 0.6;

/// Cards above this accuracy are reported as strong.
const STRONG_ACCURACY: f64 = 0.8;

/// How many difficult or strong cards a report lists.
const REPORT_CARD_LIMIT: usize = 10;

/// Percentage of reviews answered correctly. Zero if nothing was studied.
pub fn retention_rate(cards: &[Card]) -> f64 {
    let total: u64 = cards.iter().map(|c| c.study_count as u64).sum();
    let correct: u64 = cards.iter().map(|c| c.correct_count as u64).sum();
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl UserLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserLevel::Beginner => "beginner",
            UserLevel::Intermediate => "intermediate",
            UserLevel::Advanced => "advanced",
        }
    }

    fn cards_per_minute(&self) -> f64 {
        match self {
            UserLevel::Beginner => 0.5,
            UserLevel::Intermediate => 0.75,
            UserLevel::Advanced => 1.0,
        }
    }

    fn max_cards(&self) -> usize {
        match self {
            UserLevel::Beginner => 15,
            UserLevel::Intermediate => 25,
            UserLevel::Advanced => 40,
        }
    }
}

impl Display for UserLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for UserLevel {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "beginner" => Ok(UserLevel::Beginner),
            "intermediate" => Ok(UserLevel::Intermediate),
            "advanced" => Ok(UserLevel::Advanced),
            _ => fail(format!("Invalid user level: {}", value)),
        }
    }
}

/// How many cards to put in a session of the given length.
pub fn recommend_study_session_size(available: usize, level: UserLevel, minutes: u32) -> usize {
    let by_time = (minutes as f64 * level.cards_per_minute()).floor() as usize;
    available.min(by_time).min(level.max_cards())
}

#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total: usize,
    pub available: usize,
    pub waiting: usize,
    pub mastered: usize,
    pub failed: usize,
    pub average_level: f64,
    /// Percent.
    pub retention_rate: f64,
    /// Seconds.
    pub total_study_time: u64,
    /// Milliseconds per review.
    pub average_response_time: f64,
}

pub fn study_stats(cards: &[Card]) -> StudyStats {
    let mut stats = StudyStats {
        total: cards.len(),
        ..StudyStats::default()
    };
    if cards.is_empty() {
        return stats;
    }
    let mut level_sum = 0.0;
    let mut reviews: u64 = 0;
    let mut response_time: u64 = 0;
    for card in cards {
        match card.status {
            CardStatus::Available => stats.available += 1,
            CardStatus::Waiting => stats.waiting += 1,
            CardStatus::Mastered => stats.mastered += 1,
            CardStatus::Failed => stats.failed += 1,
        }
        stats.total_study_time += card.total_study_time;
        level_sum += card.level.value();
        reviews += card.study_count as u64;
        response_time += card.total_response_time;
    }
    stats.average_level = level_sum / cards.len() as f64;
    stats.retention_rate = retention_rate(cards);
    if reviews > 0 {
        stats.average_response_time = response_time as f64 / reviews as f64;
    }
    stats
}

/// A card as it appears in a learning report.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub card_id: CardId,
    pub vocab_id: VocabId,
    pub level: Level,
    pub status: CardStatus,
    pub accuracy: f64,
    pub study_count: u32,
}

impl From<&Card> for CardSummary {
    fn from(card: &Card) -> Self {
        Self {
            card_id: card.card_id,
            vocab_id: card.vocab_id,
            level: card.level,
            status: card.status,
            accuracy: card.accuracy(),
            study_count: card.study_count,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    /// Percent of cards mastered.
    pub mastery_rate: f64,
    pub average_reviews: f64,
    /// Cards studied within the report window.
    pub recently_studied: usize,
    /// Least accurate first.
    pub difficult_cards: Vec<CardSummary>,
    pub strong_cards: Vec<CardSummary>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningReport {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub trends: Trends,
}

/// Summarizes how a learner is doing over the last `days` days.
pub fn analyze_learning_pattern(cards: &[Card], now: Timestamp, days: u32) -> LearningReport {
    let count = cards.len().max(1) as f64;
    let mastered = cards.iter().filter(|c| c.is_mastered()).count();
    let mastery_rate = mastered as f64 / count * 100.0;
    let average_reviews = cards.iter().map(|c| c.study_count as f64).sum::<f64>() / count;

    // A window reaching past the representable range covers all of history.
    let cutoff = TimeDelta::try_days(i64::from(days)).and_then(|window| now.checked_sub(window));
    let recently_studied = cards
        .iter()
        .filter(|c| {
            c.last_studied
                .is_some_and(|at| cutoff.is_none_or(|cutoff| at > cutoff))
        })
        .count();

    let mut difficult: Vec<&Card> = cards
        .iter()
        .filter(|c| c.accuracy() < DIFFICULT_ACCURACY)
        .collect();
    difficult.sort_by(|a, b| a.accuracy().total_cmp(&b.accuracy()));
    let difficult_total = difficult.len();
    let difficult_cards: Vec<CardSummary> = difficult
        .into_iter()
        .take(REPORT_CARD_LIMIT)
        .map(CardSummary::from)
        .collect();
    let strong_cards: Vec<CardSummary> = cards
        .iter()
        .filter(|c| c.is_mastered() || c.accuracy() > STRONG_ACCURACY)
        .take(REPORT_CARD_LIMIT)
        .map(CardSummary::from)
        .collect();

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();
    if mastery_rate > 80.0 {
        insights.push("Excellent mastery rate! You're doing great.".to_string());
    } else if mastery_rate > 60.0 {
        insights.push("Good progress on vocabulary mastery.".to_string());
    } else {
        insights.push("There's room for improvement in vocabulary retention.".to_string());
        recommendations.push("Consider reviewing difficult words more frequently.".to_string());
    }
    if difficult_total as f64 > cards.len() as f64 * 0.3 {
        insights.push("Many cards are showing low retention rates.".to_string());
        recommendations.push("Focus on understanding word context and usage.".to_string());
    }
    if average_reviews < 3.0 {
        recommendations.push("New vocabulary needs more repetition to stick.".to_string());
    }

    LearningReport {
        insights,
        recommendations,
        trends: Trends {
            mastery_rate,
            average_reviews,
            recently_studied,
            difficult_cards,
            strong_cards,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::ids::FolderId;
    use crate::types::ids::UserId;

    fn studied(id: i64, study: u32, correct: u32, now: Timestamp) -> Card {
        let mut card = Card::new(
            CardId::new(id),
            UserId::new(1),
            VocabId::new(id),
            FolderId::new(1),
            now,
        );
        card.study_count = study;
        card.correct_count = correct;
        card
    }

    #[test]
    fn test_retention_rate() -> Fallible<()> {
        let now = Timestamp::parse("2025-01-01T00:00:00Z")?;
        assert_eq!(retention_rate(&[]), 0.0);
        assert_eq!(retention_rate(&[studied(1, 0, 0, now)]), 0.0);
        let cards = [studied(1, 4, 3, now), studied(2, 6, 2, now)];
        assert_eq!(retention_rate(&cards), 50.0);
        Ok(())
    }

    #[test]
    fn test_session_size() {
        assert_eq!(recommend_study_session_size(100, UserLevel::Beginner, 20), 10);
        assert_eq!(recommend_study_session_size(100, UserLevel::Beginner, 60), 15);
        assert_eq!(recommend_study_session_size(100, UserLevel::Intermediate, 30), 22);
        assert_eq!(recommend_study_session_size(100, UserLevel::Advanced, 90), 40);
        assert_eq!(recommend_study_session_size(3, UserLevel::Advanced, 30), 3);
        assert_eq!(recommend_study_session_size(3, UserLevel::Advanced, 0), 0);
    }

    #[test]
    fn test_user_level_parse() -> Fallible<()> {
        assert_eq!(UserLevel::try_from("advanced")?, UserLevel::Advanced);
        assert!(UserLevel::try_from("expert").is_err());
        assert_eq!(UserLevel::default(), UserLevel::Intermediate);
        Ok(())
    }

    #[test]
    fn test_study_stats() -> Fallible<()> {
        let now = Timestamp::parse("2025-01-01T00:00:00Z")?;
        assert_eq!(study_stats(&[]), StudyStats::default());

        let mut a = studied(1, 4, 4, now);
        a.status = CardStatus::Mastered;
        a.level = Level::new(8.0);
        a.total_study_time = 30;
        a.total_response_time = 4000;
        let mut b = studied(2, 4, 0, now);
        b.status = CardStatus::Failed;
        b.level = Level::new(2.0);
        b.total_study_time = 10;
        b.total_response_time = 12000;

        let stats = study_stats(&[a, b]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.average_level, 5.0);
        assert_eq!(stats.retention_rate, 50.0);
        assert_eq!(stats.total_study_time, 40);
        assert_eq!(stats.average_response_time, 2000.0);
        Ok(())
    }

    #[test]
    fn test_struggling_learner() -> Fallible<()> {
        let now = Timestamp::parse("2025-02-01T00:00:00Z")?;
        let mut cards = vec![
            studied(1, 2, 0, now),
            studied(2, 2, 1, now),
            studied(3, 2, 2, now),
        ];
        cards[0].last_studied = Some(now - TimeDelta::days(2));
        cards[1].last_studied = Some(now - TimeDelta::days(45));
        let report = analyze_learning_pattern(&cards, now, 30);
        assert_eq!(
            report.insights,
            vec![
                "There's room for improvement in vocabulary retention.",
                "Many cards are showing low retention rates.",
            ]
        );
        assert_eq!(report.recommendations.len(), 3);
        let difficult: Vec<i64> = report
            .trends
            .difficult_cards
            .iter()
            .map(|c| c.card_id.into_inner())
            .collect();
        assert_eq!(difficult, vec![1, 2]);
        assert_eq!(report.trends.strong_cards.len(), 1);
        assert_eq!(report.trends.recently_studied, 1);
        Ok(())
    }

    #[test]
    fn test_unbounded_window_covers_all_history() -> Fallible<()> {
        let now = Timestamp::parse("2025-02-01T00:00:00Z")?;
        let mut cards = vec![studied(1, 2, 1, now), studied(2, 2, 1, now), studied(3, 0, 0, now)];
        cards[0].last_studied = Some(now - TimeDelta::days(2));
        cards[1].last_studied = Some(now - TimeDelta::days(4000));
        let report = analyze_learning_pattern(&cards, now, u32::MAX);
        assert_eq!(report.trends.recently_studied, 2);
        let report = analyze_learning_pattern(&[], now, u32::MAX);
        assert_eq!(report.trends.recently_studied, 0);
        Ok(())
    }

    #[test]
    fn test_strong_learner() -> Fallible<()> {
        let now = Timestamp::parse("2025-02-01T00:00:00Z")?;
        let cards: Vec<Card> = (1..=5)
            .map(|id| {
                let mut card = studied(id, 5, 5, now);
                card.status = CardStatus::Mastered;
                card
            })
            .collect();
        let report = analyze_learning_pattern(&cards, now, 30);
        assert_eq!(report.trends.mastery_rate, 100.0);
        assert_eq!(
            report.insights,
            vec!["Excellent mastery rate! You're doing great."]
        );
        assert!(report.recommendations.is_empty());
        Ok(())
    }
}
