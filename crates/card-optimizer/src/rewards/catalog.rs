use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{BonusEntry, CardPreset};

/// Sentinel category used when a place type has no mapping.
pub const ALL_CATEGORIES: &str = "all";

const STANDARD_CATEGORIES: &[&str] = &[
    ALL_CATEGORIES,
    "dining",
    "groceries",
    "gas",
    "travel",
    "transit",
    "entertainment",
    "shopping",
    "pharmacy",
];

const STANDARD_PLACE_TYPES: &[(&str, &str)] = &[
    // Dining
    ("restaurant", "dining"),
    ("fast_food", "dining"),
    ("cafe", "dining"),
    ("bar", "dining"),
    ("pub", "dining"),
    ("food_court", "dining"),
    ("ice_cream", "dining"),
    ("biergarten", "dining"),
    // Groceries
    ("supermarket", "groceries"),
    ("grocery", "groceries"),
    ("greengrocer", "groceries"),
    ("convenience", "groceries"),
    ("bakery", "groceries"),
    ("butcher", "groceries"),
    ("marketplace", "groceries"),
    // Gas
    ("fuel", "gas"),
    ("charging_station", "gas"),
    // Travel
    ("hotel", "travel"),
    ("motel", "travel"),
    ("hostel", "travel"),
    ("guest_house", "travel"),
    ("aerodrome", "travel"),
    ("car_rental", "travel"),
    // Transit
    ("bus_station", "transit"),
    ("station", "transit"),
    ("taxi", "transit"),
    ("ferry_terminal", "transit"),
    ("parking", "transit"),
    // Entertainment
    ("cinema", "entertainment"),
    ("theatre", "entertainment"),
    ("nightclub", "entertainment"),
    ("arts_centre", "entertainment"),
    ("theme_park", "entertainment"),
    ("stadium", "entertainment"),
    // Shopping
    ("mall", "shopping"),
    ("department_store", "shopping"),
    ("clothes", "shopping"),
    ("electronics", "shopping"),
    ("hardware", "shopping"),
    ("books", "shopping"),
    // Pharmacy
    ("pharmacy", "pharmacy"),
    ("chemist", "pharmacy"),
];

fn standard_presets() -> Vec<CardPreset> {
    vec![
        CardPreset {
            name: "Dining Plus".to_string(),
            category_bonuses: vec![
                BonusEntry::new("dining", 4.0),
                BonusEntry::new("groceries", 3.0),
            ],
            reward_multiplier: 1.0,
        },
        CardPreset {
            name: "Voyager".to_string(),
            category_bonuses: vec![
                BonusEntry::new("travel", 5.0),
                BonusEntry::new("transit", 3.0),
                BonusEntry::new("dining", 2.0),
            ],
            reward_multiplier: 1.0,
        },
        CardPreset {
            name: "Road Runner".to_string(),
            category_bonuses: vec![
                BonusEntry::new("gas", 3.0),
                BonusEntry::new("pharmacy", 2.0),
            ],
            reward_multiplier: 1.0,
        },
        CardPreset {
            name: "Flat Cashback".to_string(),
            category_bonuses: vec![BonusEntry::new(ALL_CATEGORIES, 1.0)],
            reward_multiplier: 1.5,
        },
    ]
}

/// Static configuration: category vocabulary, place-type mapping and card presets.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCatalog {
    categories: Vec<String>,
    place_types: HashMap<String, String>,
    presets: Vec<CardPreset>,
}

/// On-disk representation of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub categories: Vec<String>,
    #[serde(default)]
    pub place_types: HashMap<String, String>,
    #[serde(default)]
    pub presets: Vec<CardPreset>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read category catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid category catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category catalog must list at least one category")]
    EmptyVocabulary,
    #[error("place type '{place_type}' maps to unknown category '{category}'")]
    UnknownCategory { place_type: String, category: String },
}

impl CategoryCatalog {
    pub fn standard() -> Self {
        Self {
            categories: STANDARD_CATEGORIES
                .iter()
                .map(|category| category.to_string())
                .collect(),
            place_types: STANDARD_PLACE_TYPES
                .iter()
                .map(|(place_type, category)| (place_type.to_string(), category.to_string()))
                .collect(),
            presets: standard_presets(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let categories: Vec<String> = document
            .categories
            .into_iter()
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(CatalogError::EmptyVocabulary);
        }

        let mut place_types = HashMap::with_capacity(document.place_types.len());
        for (place_type, category) in document.place_types {
            let category = category.trim().to_string();
            let known = category.eq_ignore_ascii_case(ALL_CATEGORIES)
                || categories
                    .iter()
                    .any(|label| label.eq_ignore_ascii_case(&category));
            if !known {
                return Err(CatalogError::UnknownCategory {
                    place_type,
                    category,
                });
            }
            place_types.insert(normalize_place_type(&place_type), category);
        }

        Ok(Self {
            categories,
            place_types,
            presets: document.presets,
        })
    }

    /// Load the catalog file when configured, otherwise the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category preselected before the user picks one.
    pub fn default_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(ALL_CATEGORIES)
    }

    pub fn presets(&self) -> &[CardPreset] {
        &self.presets
    }

    pub fn preset(&self, name: &str) -> Option<&CardPreset> {
        let wanted = name.trim();
        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(wanted))
    }

    pub fn category_for_place_type(&self, place_type: &str) -> Option<&str> {
        self.place_types
            .get(&normalize_place_type(place_type))
            .map(String::as_str)
    }

    /// Mapped category, or the `all` sentinel when the place type is unknown.
    pub fn resolve_place_type(&self, place_type: &str) -> &str {
        self.category_for_place_type(place_type)
            .unwrap_or(ALL_CATEGORIES)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_place_type(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
