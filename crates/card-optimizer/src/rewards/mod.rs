//! Card wallet, category resolution and best-card selection.

pub mod catalog;
pub mod domain;
pub mod geocode;
pub mod resolver;
pub mod router;
pub mod selector;
pub mod service;
pub mod storage;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogDocument, CatalogError, CategoryCatalog, ALL_CATEGORIES};
pub use domain::{
    BonusEntry, Card, CardDraft, CardId, CardPreset, CardValidationError, Position,
};
pub use geocode::NominatimClient;
pub use resolver::{
    resolve_category, CategorySource, LookupError, PlaceTypeLookup, ResolvedCategory,
};
pub use router::{rewards_router, CreateCardRequest};
pub use selector::{
    card_score, normalize_category, rank_cards, select_best, CardScore, DEFAULT_BONUS,
};
pub use service::{RewardsService, RewardsServiceError, Suggestion, SuggestionRequest};
pub use storage::{
    CardRepository, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoreError,
    CARDS_KEY,
};
