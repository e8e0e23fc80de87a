use card_optimizer::rewards::{
    card_score, normalize_category, resolve_category, select_best, BonusEntry, Card, CardId,
    CategoryCatalog, CategorySource, LookupError, PlaceTypeLookup, Position, ALL_CATEGORIES,
};

fn card(name: &str, bonuses: &[(&str, f64)], multiplier: f64) -> Card {
    Card {
        id: CardId(format!("id-{name}")),
        name: name.to_string(),
        category_bonuses: bonuses
            .iter()
            .map(|(category, bonus)| BonusEntry::new(*category, *bonus))
            .collect(),
        credit_line: 2000.0,
        reward_multiplier: multiplier,
    }
}

fn wallet() -> Vec<Card> {
    vec![
        card("A", &[("dining", 3.0)], 1.0),
        card("B", &[], 2.0),
    ]
}

struct Geocoder(Result<&'static str, &'static str>);

impl PlaceTypeLookup for Geocoder {
    fn place_type(&self, _position: Position) -> Result<String, LookupError> {
        self.0
            .map(str::to_string)
            .map_err(|reason| LookupError::Transport(reason.to_string()))
    }
}

fn somewhere() -> Option<Position> {
    Some(Position {
        latitude: 51.5074,
        longitude: -0.1278,
    })
}

#[test]
fn dining_purchase_picks_bonus_card() {
    let cards = wallet();
    assert_eq!(select_best("dining", &cards).map(|c| c.name.as_str()), Some("A"));
}

#[test]
fn gas_purchase_picks_higher_base_rate() {
    let cards = wallet();
    assert_eq!(select_best("gas", &cards).map(|c| c.name.as_str()), Some("B"));
}

#[test]
fn no_cards_means_no_suggestion() {
    assert!(select_best("dining", &[]).is_none());
}

#[test]
fn padded_and_capitalised_categories_match_the_same_entry() {
    let cards = wallet();
    let padded = select_best(" Dining ", &cards).expect("winner");
    let plain = select_best("dining", &cards).expect("winner");
    assert_eq!(padded.id, plain.id);
    assert_eq!(
        card_score(&cards[0], &normalize_category(" Dining ")),
        card_score(&cards[0], "dining")
    );
}

#[test]
fn equal_scores_prefer_earlier_cards() {
    let cards = vec![
        card("early", &[("gas", 4.0)], 1.0),
        card("late", &[("gas", 2.0)], 2.0),
    ];
    assert_eq!(select_best("gas", &cards).map(|c| c.name.as_str()), Some("early"));

    let reversed: Vec<Card> = cards.into_iter().rev().collect();
    assert_eq!(select_best("gas", &reversed).map(|c| c.name.as_str()), Some("late"));
}

#[test]
fn failed_lookup_feeds_manual_category_into_selection() {
    let catalog = CategoryCatalog::standard();
    let resolved = resolve_category("dining", somewhere(), &Geocoder(Err("timeout")), &catalog);
    assert_eq!(resolved.category, "dining");
    assert_eq!(resolved.source, CategorySource::Fallback);

    let cards = wallet();
    assert_eq!(
        select_best(&resolved.category, &cards).map(|c| c.name.as_str()),
        Some("A")
    );
}

#[test]
fn unknown_place_type_feeds_all_sentinel_into_selection() {
    let catalog = CategoryCatalog::standard();
    let resolved = resolve_category("dining", somewhere(), &Geocoder(Ok("bus_stop")), &catalog);
    assert_eq!(resolved.category, ALL_CATEGORIES);

    let cards = wallet();
    assert_eq!(
        select_best(&resolved.category, &cards).map(|c| c.name.as_str()),
        Some("B")
    );
}
