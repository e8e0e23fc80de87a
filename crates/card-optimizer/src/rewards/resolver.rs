use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::CategoryCatalog;
use super::domain::Position;

/// Outbound place-type lookup (reverse geocoding) for a position.
pub trait PlaceTypeLookup: Send + Sync {
    fn place_type(&self, position: Position) -> Result<String, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("place lookup transport failed: {0}")]
    Transport(String),
    #[error("place lookup returned status {0}")]
    Status(u16),
    #[error("place lookup response was malformed: {0}")]
    Malformed(String),
}

/// Where a resolved category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Location inference was not requested or no position was available.
    Manual,
    /// The place type mapped onto the vocabulary.
    Location,
    /// The place type had no mapping; the `all` sentinel was used.
    Unmapped,
    /// The lookup failed and the manual category was kept.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCategory {
    pub category: String,
    pub source: CategorySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
}

impl ResolvedCategory {
    fn manual(category: &str, source: CategorySource) -> Self {
        Self {
            category: category.to_string(),
            source,
            place_type: None,
        }
    }
}

/// Turn an optional position into a spending category.
///
/// Lookup failures never escape: they are logged and the manual category is returned.
pub fn resolve_category<L>(
    manual_category: &str,
    position: Option<Position>,
    lookup: &L,
    catalog: &CategoryCatalog,
) -> ResolvedCategory
where
    L: PlaceTypeLookup + ?Sized,
{
    let Some(position) = position else {
        return ResolvedCategory::manual(manual_category, CategorySource::Manual);
    };

    match lookup.place_type(position) {
        Ok(place_type) => {
            let (category, source) = match catalog.category_for_place_type(&place_type) {
                Some(category) => (category.to_string(), CategorySource::Location),
                None => (
                    catalog.resolve_place_type(&place_type).to_string(),
                    CategorySource::Unmapped,
                ),
            };
            debug!(%place_type, %category, "resolved category from location");
            ResolvedCategory {
                category,
                source,
                place_type: Some(place_type),
            }
        }
        Err(err) => {
            warn!(error = %err, "place lookup failed; keeping manual category");
            ResolvedCategory::manual(manual_category, CategorySource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::catalog::ALL_CATEGORIES;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLookup {
        outcome: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl FixedLookup {
        fn returning(place_type: &'static str) -> Self {
            Self {
                outcome: Ok(place_type),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                outcome: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PlaceTypeLookup for FixedLookup {
        fn place_type(&self, _position: Position) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .map(str::to_string)
                .map_err(LookupError::Status)
        }
    }

    fn here() -> Option<Position> {
        Some(Position {
            latitude: 41.5868,
            longitude: -93.625,
        })
    }

    #[test]
    fn missing_position_keeps_manual_category_without_lookup() {
        let lookup = FixedLookup::returning("restaurant");
        let resolved =
            resolve_category("Travel", None, &lookup, &CategoryCatalog::standard());
        assert_eq!(resolved.category, "Travel");
        assert_eq!(resolved.source, CategorySource::Manual);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mapped_place_type_overrides_manual_category() {
        let lookup = FixedLookup::returning("fuel");
        let resolved =
            resolve_category("dining", here(), &lookup, &CategoryCatalog::standard());
        assert_eq!(resolved.category, "gas");
        assert_eq!(resolved.source, CategorySource::Location);
        assert_eq!(resolved.place_type.as_deref(), Some("fuel"));
    }

    #[test]
    fn unmapped_place_type_resolves_to_all() {
        let lookup = FixedLookup::returning("house");
        let resolved =
            resolve_category("dining", here(), &lookup, &CategoryCatalog::standard());
        assert_eq!(resolved.category, ALL_CATEGORIES);
        assert_eq!(resolved.source, CategorySource::Unmapped);
    }

    #[test]
    fn lookup_failure_falls_back_to_manual_category() {
        let lookup = FixedLookup::failing(503);
        let resolved =
            resolve_category("groceries", here(), &lookup, &CategoryCatalog::standard());
        assert_eq!(resolved.category, "groceries");
        assert_eq!(resolved.source, CategorySource::Fallback);
        assert!(resolved.place_type.is_none());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }
}
