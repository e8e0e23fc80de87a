use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable card identity, generated once when the card is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `(category, bonus percent)` pair. Stored as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct BonusEntry {
    pub category: String,
    pub bonus_percent: f64,
}

impl BonusEntry {
    pub fn new(category: impl Into<String>, bonus_percent: f64) -> Self {
        Self {
            category: category.into(),
            bonus_percent,
        }
    }

    /// Case-insensitive comparison against an already normalized category.
    pub fn matches(&self, normalized_category: &str) -> bool {
        self.category.to_lowercase() == normalized_category
    }
}

impl From<(String, f64)> for BonusEntry {
    fn from((category, bonus_percent): (String, f64)) -> Self {
        Self {
            category,
            bonus_percent,
        }
    }
}

impl From<BonusEntry> for (String, f64) {
    fn from(entry: BonusEntry) -> Self {
        (entry.category, entry.bonus_percent)
    }
}

/// Parses the `CATEGORY=PERCENT` shorthand used on the command line.
impl FromStr for BonusEntry {
    type Err = CardValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (category, bonus) = raw
            .rsplit_once('=')
            .ok_or_else(|| CardValidationError::MalformedBonus(raw.to_string()))?;

        let category = category.trim();
        if category.is_empty() {
            return Err(CardValidationError::BlankBonusCategory);
        }

        let bonus_percent = bonus
            .trim()
            .parse::<f64>()
            .map_err(|_| CardValidationError::MalformedBonus(raw.to_string()))?;

        Ok(Self::new(category, bonus_percent))
    }
}

/// Persisted card record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub category_bonuses: Vec<BonusEntry>,
    pub credit_line: f64,
    pub reward_multiplier: f64,
}

impl Card {
    /// First bonus entry matching the normalized category, if any.
    pub fn bonus_entry_for(&self, normalized_category: &str) -> Option<&BonusEntry> {
        self.category_bonuses
            .iter()
            .find(|entry| entry.matches(normalized_category))
    }
}

/// User input for a new card before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub name: String,
    #[serde(default)]
    pub category_bonuses: Vec<BonusEntry>,
    pub credit_line: f64,
    pub reward_multiplier: f64,
}

impl CardDraft {
    /// Validate the draft and mint a card with a fresh identifier.
    pub fn into_card(self) -> Result<Card, CardValidationError> {
        self.into_card_with_id(CardId::generate())
    }

    pub fn into_card_with_id(self, id: CardId) -> Result<Card, CardValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CardValidationError::EmptyName);
        }
        if self.category_bonuses.is_empty() {
            return Err(CardValidationError::NoBonusCategories);
        }

        let mut category_bonuses = Vec::with_capacity(self.category_bonuses.len());
        for entry in self.category_bonuses {
            let category = entry.category.trim();
            if category.is_empty() {
                return Err(CardValidationError::BlankBonusCategory);
            }
            if !entry.bonus_percent.is_finite() || entry.bonus_percent < 0.0 {
                return Err(CardValidationError::InvalidBonus {
                    category: category.to_string(),
                });
            }
            category_bonuses.push(BonusEntry::new(category, entry.bonus_percent));
        }

        if !self.credit_line.is_finite() || self.credit_line < 0.0 {
            return Err(CardValidationError::InvalidCreditLine);
        }
        if !self.reward_multiplier.is_finite() || self.reward_multiplier <= 0.0 {
            return Err(CardValidationError::InvalidRewardMultiplier);
        }

        Ok(Card {
            id,
            name: name.to_string(),
            category_bonuses,
            credit_line: self.credit_line,
            reward_multiplier: self.reward_multiplier,
        })
    }
}

/// Preset card template offered as a starting point for a new card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPreset {
    pub name: String,
    pub category_bonuses: Vec<BonusEntry>,
    pub reward_multiplier: f64,
}

impl CardPreset {
    pub fn to_draft(&self, credit_line: f64) -> CardDraft {
        CardDraft {
            name: self.name.clone(),
            category_bonuses: self.category_bonuses.clone(),
            credit_line,
            reward_multiplier: self.reward_multiplier,
        }
    }
}

/// Geographic point used for place-type lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CardValidationError {
    #[error("card name cannot be empty")]
    EmptyName,
    #[error("please add at least one category bonus")]
    NoBonusCategories,
    #[error("bonus category cannot be blank")]
    BlankBonusCategory,
    #[error("bonus for '{category}' must be a non-negative number")]
    InvalidBonus { category: String },
    #[error("expected CATEGORY=PERCENT, got '{0}'")]
    MalformedBonus(String),
    #[error("credit line must be a non-negative number")]
    InvalidCreditLine,
    #[error("reward multiplier must be a positive number")]
    InvalidRewardMultiplier,
}
