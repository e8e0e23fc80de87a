use crate::infra::parse_bonus;
use card_optimizer::error::AppError;
use card_optimizer::rewards::{
    BonusEntry, Card, CardDraft, CardId, KeyValueStore, PlaceTypeLookup, Position,
    RewardsService, Suggestion, SuggestionRequest,
};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct AddCardArgs {
    /// Display name of the card
    #[arg(long, required_unless_present = "preset")]
    pub(crate) name: Option<String>,
    /// Category bonus as CATEGORY=PERCENT; repeat for several categories
    #[arg(long = "bonus", value_parser = parse_bonus)]
    pub(crate) bonuses: Vec<BonusEntry>,
    /// Available credit line
    #[arg(long)]
    pub(crate) credit_line: f64,
    /// Base reward multiplier applied to every purchase
    #[arg(long, required_unless_present = "preset")]
    pub(crate) reward_multiplier: Option<f64>,
    /// Start from a preset card instead of explicit values
    #[arg(long, conflicts_with_all = ["name", "bonuses", "reward_multiplier"])]
    pub(crate) preset: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    /// Manually chosen spending category (defaults to the first catalog category)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Latitude of the purchase location
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the purchase location
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub(crate) lon: Option<f64>,
    /// Skip location-based category detection
    #[arg(long)]
    pub(crate) no_location: bool,
    /// Amount spent, used to estimate the reward
    #[arg(long)]
    pub(crate) amount: Option<f64>,
    /// Print the suggestion as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl SuggestArgs {
    fn into_request(self) -> SuggestionRequest {
        let position = self
            .lat
            .zip(self.lon)
            .map(|(latitude, longitude)| Position {
                latitude,
                longitude,
            });

        SuggestionRequest {
            category: self.category,
            use_location: !self.no_location,
            position,
            amount: self.amount,
        }
    }
}

pub(crate) fn run_list_cards<S, L>(service: &RewardsService<S, L>) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let cards = service.cards()?;
    if cards.is_empty() {
        println!("No cards saved yet. Add one with `cards add`.");
        return Ok(());
    }

    for card in &cards {
        render_card(card);
    }
    Ok(())
}

pub(crate) fn run_add_card<S, L>(
    service: &RewardsService<S, L>,
    args: AddCardArgs,
) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let AddCardArgs {
        name,
        bonuses,
        credit_line,
        reward_multiplier,
        preset,
    } = args;

    let card = match preset {
        Some(preset) => service.add_from_preset(&preset, credit_line)?,
        None => service.add_card(CardDraft {
            name: name.unwrap_or_default(),
            category_bonuses: bonuses,
            credit_line,
            // clap requires the multiplier here; zero fails validation if it is ever absent.
            reward_multiplier: reward_multiplier.unwrap_or(0.0),
        })?,
    };

    println!("Card added successfully!");
    render_card(&card);
    Ok(())
}

pub(crate) fn run_remove_card<S, L>(
    service: &RewardsService<S, L>,
    id: String,
) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let removed = service.remove_card(&CardId(id))?;
    println!("Removed {} ({})", removed.name, removed.id);
    Ok(())
}

pub(crate) fn run_clear_cards<S, L>(service: &RewardsService<S, L>) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    service.clear_cards()?;
    println!("All cards deleted.");
    Ok(())
}

pub(crate) fn run_suggest<S, L>(
    service: &RewardsService<S, L>,
    args: SuggestArgs,
) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let as_json = args.json;
    let suggestion = service.suggest(args.into_request())?;

    if as_json {
        let rendered = serde_json::to_string_pretty(&suggestion)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        render_suggestion(&suggestion);
    }
    Ok(())
}

pub(crate) fn run_categories<S, L>(service: &RewardsService<S, L>) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let catalog = service.catalog();
    for category in catalog.categories() {
        let marker = if category == catalog.default_category() {
            " (default)"
        } else {
            ""
        };
        println!("{category}{marker}");
    }
    Ok(())
}

pub(crate) fn run_presets<S, L>(service: &RewardsService<S, L>) -> Result<(), AppError>
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let presets = service.catalog().presets();
    if presets.is_empty() {
        println!("No presets configured.");
        return Ok(());
    }

    for preset in presets {
        println!("{} ({}x base)", preset.name, preset.reward_multiplier);
        for entry in &preset.category_bonuses {
            println!("  - {}: {}%", entry.category, entry.bonus_percent);
        }
    }
    Ok(())
}

fn render_card(card: &Card) {
    println!("{} [{}]", card.name, card.id);
    println!("  Credit line: ${:.2}", card.credit_line);
    println!("  Multiplier: {}x", card.reward_multiplier);
    println!("  Category bonuses:");
    for entry in &card.category_bonuses {
        println!("    - {}: {}%", entry.category, entry.bonus_percent);
    }
}

fn render_suggestion(suggestion: &Suggestion) {
    let resolved = &suggestion.category;
    match &resolved.place_type {
        Some(place_type) => println!(
            "Category: {} ({:?}, place type '{}')",
            resolved.category, resolved.source, place_type
        ),
        None => println!("Category: {} ({:?})", resolved.category, resolved.source),
    }

    let Some(best) = &suggestion.best else {
        println!("Best card: N/A");
        return;
    };

    println!("Best card: {} (score {:.2})", best.name, best.score);
    if let Some(reward) = suggestion.estimated_reward {
        println!("Estimated reward: {reward:.2}");
    }

    if suggestion.ranking.len() > 1 {
        println!("Ranking:");
        for (index, score) in suggestion.ranking.iter().enumerate() {
            let matched = score.matched_category.as_deref().unwrap_or("base rate");
            println!(
                "  {}. {} - {:.2} ({} x {})",
                index + 1,
                score.name,
                score.score,
                matched,
                score.reward_multiplier
            );
        }
    }
}
