//! Best-card selection.
//!
//! A card's score for a category is `bonus * reward_multiplier`, where `bonus` comes from
//! the first bonus entry matching the category and defaults to 1 when nothing matches.
//! Ties keep the card seen first.

use serde::Serialize;

use super::domain::{Card, CardId};

/// Bonus applied when a card has no entry for the requested category.
pub const DEFAULT_BONUS: f64 = 1.0;

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Score of `card` for an already normalized category.
pub fn card_score(card: &Card, normalized_category: &str) -> f64 {
    let bonus = card
        .bonus_entry_for(normalized_category)
        .map(|entry| entry.bonus_percent)
        .unwrap_or(DEFAULT_BONUS);
    bonus * card.reward_multiplier
}

/// Highest-scoring card for `category`, or `None` when `cards` is empty.
pub fn select_best<'a>(category: &str, cards: &'a [Card]) -> Option<&'a Card> {
    let target = normalize_category(category);
    let mut best: Option<(&Card, f64)> = None;

    for card in cards {
        let score = card_score(card, &target);
        let improves = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if improves {
            best = Some((card, score));
        }
    }

    best.map(|(card, _)| card)
}

/// Transparent breakdown of how a card scored for a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardScore {
    pub card_id: CardId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_category: Option<String>,
    pub bonus: f64,
    pub reward_multiplier: f64,
    pub score: f64,
}

impl CardScore {
    pub fn for_card(card: &Card, normalized_category: &str) -> Self {
        let entry = card.bonus_entry_for(normalized_category);
        let bonus = entry
            .map(|entry| entry.bonus_percent)
            .unwrap_or(DEFAULT_BONUS);

        Self {
            card_id: card.id.clone(),
            name: card.name.clone(),
            matched_category: entry.map(|entry| entry.category.clone()),
            bonus,
            reward_multiplier: card.reward_multiplier,
            score: bonus * card.reward_multiplier,
        }
    }

    /// Reward earned on `amount` when the score is read as a percentage.
    pub fn estimated_reward(&self, amount: f64) -> f64 {
        amount * self.score / 100.0
    }
}

/// Every card scored for `category`, best first. Equal scores keep input order.
pub fn rank_cards(category: &str, cards: &[Card]) -> Vec<CardScore> {
    let target = normalize_category(category);
    let mut scores: Vec<CardScore> = cards
        .iter()
        .map(|card| CardScore::for_card(card, &target))
        .collect();
    scores.sort_by(|left, right| right.score.total_cmp(&left.score));
    scores
}
