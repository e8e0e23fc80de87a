use crate::commands::{
    run_add_card, run_categories, run_clear_cards, run_list_cards, run_presets, run_remove_card,
    run_suggest, AddCardArgs, SuggestArgs,
};
use crate::infra::build_service;
use crate::server;
use card_optimizer::config::AppConfig;
use card_optimizer::error::AppError;
use card_optimizer::telemetry;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Card Optimizer",
    about = "Pick the credit card with the best rewards for a purchase",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Manage the stored card collection
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },
    /// Suggest the best card for a spending category or the current location
    Suggest(SuggestArgs),
    /// List the spending category vocabulary
    Categories,
    /// List preset cards that can seed a new card
    Presets,
}

#[derive(Subcommand, Debug)]
enum CardsCommand {
    /// Show every stored card
    List,
    /// Add a card from explicit values or a preset
    Add(AddCardArgs),
    /// Delete one card by id
    Remove {
        /// Identifier printed by `cards list`
        id: String,
    },
    /// Delete every stored card
    Clear,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::Cards { command } => {
            let service = build_service(&config)?;
            match command {
                CardsCommand::List => run_list_cards(&service),
                CardsCommand::Add(args) => run_add_card(&service, args),
                CardsCommand::Remove { id } => run_remove_card(&service, id),
                CardsCommand::Clear => run_clear_cards(&service),
            }
        }
        Command::Suggest(args) => run_suggest(&build_service(&config)?, args),
        Command::Categories => run_categories(&build_service(&config)?),
        Command::Presets => run_presets(&build_service(&config)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_suggest_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "card-optimizer",
            "suggest",
            "--category",
            "dining",
            "--lat",
            "41.59",
            "--lon",
            "-93.62",
            "--amount",
            "45",
        ])
        .expect("suggest parses");

        match cli.command {
            Some(Command::Suggest(args)) => {
                assert_eq!(args.lon, Some(-93.62));
                assert_eq!(args.amount, Some(45.0));
                assert!(!args.no_location);
            }
            other => panic!("expected suggest command, got {other:?}"),
        }
    }

    #[test]
    fn parses_card_add_bonuses() {
        let cli = Cli::try_parse_from([
            "card-optimizer",
            "cards",
            "add",
            "--name",
            "Sapphire",
            "--bonus",
            "Dining=3",
            "--bonus",
            "Travel=2.5",
            "--credit-line",
            "5000",
            "--reward-multiplier",
            "1",
        ])
        .expect("add parses");

        match cli.command {
            Some(Command::Cards {
                command: CardsCommand::Add(args),
            }) => {
                assert_eq!(args.bonuses.len(), 2);
                assert_eq!(args.bonuses[1].bonus_percent, 2.5);
            }
            other => panic!("expected cards add, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_bonus() {
        let result = Cli::try_parse_from([
            "card-optimizer",
            "cards",
            "add",
            "--name",
            "Sapphire",
            "--bonus",
            "Dining",
            "--credit-line",
            "5000",
            "--reward-multiplier",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn non_numeric_credit_line_is_rejected() {
        let result = Cli::try_parse_from([
            "card-optimizer",
            "cards",
            "add",
            "--preset",
            "Voyager",
            "--credit-line",
            "plenty",
        ]);
        assert!(result.is_err());
    }
}
