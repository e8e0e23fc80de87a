use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::rewards::catalog::CategoryCatalog;
use crate::rewards::domain::{BonusEntry, CardDraft, Position};
use crate::rewards::resolver::{LookupError, PlaceTypeLookup};
use crate::rewards::service::{RewardsService, SuggestionRequest};
use crate::rewards::storage::{KeyValueStore, MemoryKeyValueStore, StoreError};

/// Lookup returning a fixed place type, or failing when none is configured.
pub(super) struct StubLookup {
    place_type: Option<&'static str>,
    calls: AtomicUsize,
}

impl StubLookup {
    pub(super) fn returning(place_type: &'static str) -> Self {
        Self {
            place_type: Some(place_type),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn offline() -> Self {
        Self {
            place_type: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceTypeLookup for StubLookup {
    fn place_type(&self, _position: Position) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.place_type
            .map(str::to_string)
            .ok_or_else(|| LookupError::Transport("network unreachable".to_string()))
    }
}

/// Store whose every operation fails, standing in for an unavailable device store.
pub(super) struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

pub(super) type MemoryService = RewardsService<MemoryKeyValueStore, StubLookup>;

pub(super) fn build_service(lookup: StubLookup) -> (MemoryService, Arc<StubLookup>) {
    let lookup = Arc::new(lookup);
    let service = RewardsService::new(
        Arc::new(MemoryKeyValueStore::default()),
        lookup.clone(),
        CategoryCatalog::standard(),
    );
    (service, lookup)
}

pub(super) fn draft(name: &str, bonuses: &[(&str, f64)], multiplier: f64) -> CardDraft {
    CardDraft {
        name: name.to_string(),
        category_bonuses: bonuses
            .iter()
            .map(|(category, bonus)| BonusEntry::new(*category, *bonus))
            .collect(),
        credit_line: 3000.0,
        reward_multiplier: multiplier,
    }
}

/// Card "A" earns 3x on dining; card "B" has a 2x base rate and a token travel bonus.
pub(super) fn seed_scenario(service: &MemoryService) {
    service
        .add_card(draft("A", &[("dining", 3.0)], 1.0))
        .expect("card A saved");
    service
        .add_card(draft("B", &[("travel", 1.0)], 2.0))
        .expect("card B saved");
}

pub(super) fn position() -> Position {
    Position {
        latitude: 40.7128,
        longitude: -74.006,
    }
}

pub(super) fn manual_request(category: &str) -> SuggestionRequest {
    SuggestionRequest {
        category: Some(category.to_string()),
        use_location: false,
        position: None,
        amount: None,
    }
}

pub(super) fn located_request(category: &str) -> SuggestionRequest {
    SuggestionRequest {
        category: Some(category.to_string()),
        use_location: true,
        position: Some(position()),
        amount: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
