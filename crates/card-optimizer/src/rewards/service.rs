use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::catalog::CategoryCatalog;
use super::domain::{Card, CardDraft, CardId, CardValidationError, Position};
use super::resolver::{resolve_category, CategorySource, PlaceTypeLookup, ResolvedCategory};
use super::selector::{normalize_category, rank_cards, select_best, CardScore};
use super::storage::{CardRepository, KeyValueStore, StoreError};

/// Inputs for one suggestion: the state the caller owns, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Manually chosen category; the catalog default when omitted.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_use_location")]
    pub use_location: bool,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub amount: Option<f64>,
}

fn default_use_location() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub category: ResolvedCategory,
    /// `None` when no cards are stored.
    pub best: Option<CardScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_reward: Option<f64>,
    pub ranking: Vec<CardScore>,
}

impl Suggestion {
    pub fn best_name(&self) -> Option<&str> {
        self.best.as_ref().map(|score| score.name.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RewardsServiceError {
    #[error(transparent)]
    Validation(#[from] CardValidationError),
    #[error("amount spent must be a non-negative number")]
    InvalidAmount,
    #[error("card {0} not found")]
    NotFound(CardId),
    #[error("unknown card preset '{0}'")]
    UnknownPreset(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Service composing card storage, the place-type lookup and the category catalog.
pub struct RewardsService<S, L: ?Sized> {
    cards: CardRepository<S>,
    lookup: Arc<L>,
    catalog: Arc<CategoryCatalog>,
}

impl<S, L> RewardsService<S, L>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, lookup: Arc<L>, catalog: CategoryCatalog) -> Self {
        Self {
            cards: CardRepository::new(store),
            lookup,
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn cards(&self) -> Result<Vec<Card>, RewardsServiceError> {
        self.cards.load().map_err(storage_failure("load cards"))
    }

    /// Validate a draft and append the resulting card to the stored collection.
    pub fn add_card(&self, draft: CardDraft) -> Result<Card, RewardsServiceError> {
        let card = draft.into_card()?;
        let card = self
            .cards
            .append(card)
            .map_err(storage_failure("save card"))?;
        info!(card_id = %card.id, name = %card.name, "card added");
        Ok(card)
    }

    pub fn add_from_preset(
        &self,
        preset_name: &str,
        credit_line: f64,
    ) -> Result<Card, RewardsServiceError> {
        let draft = self
            .catalog
            .preset(preset_name)
            .ok_or_else(|| RewardsServiceError::UnknownPreset(preset_name.to_string()))?
            .to_draft(credit_line);
        self.add_card(draft)
    }

    pub fn remove_card(&self, id: &CardId) -> Result<Card, RewardsServiceError> {
        let removed = self
            .cards
            .remove(id)
            .map_err(storage_failure("remove card"))?
            .ok_or_else(|| RewardsServiceError::NotFound(id.clone()))?;
        info!(card_id = %removed.id, "card removed");
        Ok(removed)
    }

    pub fn clear_cards(&self) -> Result<(), RewardsServiceError> {
        self.cards.clear().map_err(storage_failure("clear cards"))?;
        info!("all cards removed");
        Ok(())
    }

    /// Resolve the category, read the stored cards, and pick the best one.
    pub fn suggest(&self, request: SuggestionRequest) -> Result<Suggestion, RewardsServiceError> {
        let SuggestionRequest {
            category,
            use_location,
            position,
            amount,
        } = request;

        if let Some(amount) = amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(RewardsServiceError::InvalidAmount);
            }
        }

        // Kept as given; selection does the normalising.
        let manual = category
            .filter(|category| !category.trim().is_empty())
            .unwrap_or_else(|| self.catalog.default_category().to_string());

        let resolved = if use_location {
            resolve_category(&manual, position, self.lookup.as_ref(), &self.catalog)
        } else {
            ResolvedCategory {
                category: manual,
                source: CategorySource::Manual,
                place_type: None,
            }
        };

        let cards = self.cards()?;
        let target = normalize_category(&resolved.category);
        let best = select_best(&resolved.category, &cards)
            .map(|card| CardScore::for_card(card, &target));
        let ranking = rank_cards(&resolved.category, &cards);
        let estimated_reward = best
            .as_ref()
            .zip(amount)
            .map(|(score, amount)| score.estimated_reward(amount));

        info!(
            category = %resolved.category,
            source = ?resolved.source,
            cards = cards.len(),
            best = best.as_ref().map(|score| score.name.as_str()).unwrap_or("none"),
            "suggestion computed"
        );

        Ok(Suggestion {
            category: resolved,
            best,
            estimated_reward,
            ranking,
        })
    }
}

fn storage_failure(action: &'static str) -> impl Fn(StoreError) -> RewardsServiceError {
    move |err| {
        error!(error = %err, "failed to {action}");
        RewardsServiceError::Storage(err)
    }
}
