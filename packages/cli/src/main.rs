#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line lookup of Austin restaurant health inspections.
//!
//! Run with a subcommand for scripted use, or with none to pick an action
//! from an interactive menu.

mod commands;
mod interactive;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use atx_health_favorites::{FavoritesError, JsonFileFavorites};
use atx_health_socrata::registry::{self, DEFAULT_DATASET_ID};
use atx_health_socrata::{ClientError, SocrataClient};
use clap::{Parser, Subcommand};

use crate::commands::App;

#[derive(Parser)]
#[command(name = "atx_health", about = "Austin restaurant inspection lookup")]
struct Cli {
    /// Dataset to query (see `datasets` for the registered ids)
    #[arg(long, global = true, default_value = DEFAULT_DATASET_ID)]
    dataset: String,

    /// Override the dataset's SODA endpoint
    #[arg(long, global = true, env = "ATX_HEALTH_ENDPOINT")]
    endpoint: Option<String>,

    /// JSON file holding favorite establishment ids
    #[arg(
        long,
        global = true,
        env = "ATX_HEALTH_FAVORITES",
        default_value = "favorites.json"
    )]
    favorites: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search inspections by restaurant name
    Search {
        /// Restaurant name; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Show inspections around a point, grouped by address
    Nearby {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Show the single inspection closest to a point
    Nearest {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Show every inspection of one establishment
    History {
        /// Establishment identifier (see the `search` output)
        establishment_id: String,
    },
    /// List or change favorite establishments
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// List the registered datasets
    Datasets,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite establishment ids
    List,
    /// Add an establishment to favorites, or remove it if already present
    Toggle { establishment_id: String },
}

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Unknown dataset '{id}'")]
    UnknownDataset { id: String },

    #[error("Search cancelled")]
    Cancelled,
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match &e {
            CliError::Client(client) => {
                log::debug!("Request failed: {client}");
                eprintln!("{}", client.user_message());
            }
            CliError::Cancelled => eprintln!("Cancelled."),
            other => eprintln!("Error: {other}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if matches!(cli.command, Some(Commands::Datasets)) {
        output::print_datasets(&registry::all_datasets(), cli.json)?;
        return Ok(());
    }

    let mut dataset = registry::find_dataset(&cli.dataset).ok_or_else(|| {
        CliError::UnknownDataset {
            id: cli.dataset.clone(),
        }
    })?;
    if let Some(endpoint) = cli.endpoint {
        log::info!("Using endpoint override {endpoint}");
        dataset = dataset.with_api_url(endpoint);
    }

    let app = App {
        client: Arc::new(SocrataClient::from_config(&dataset)?),
        favorites: Arc::new(JsonFileFavorites::new(cli.favorites)),
        json: cli.json,
    };

    match cli.command {
        None => interactive::run(&app).await,
        Some(Commands::Search { name }) => app.search(&name.join(" ")).await,
        Some(Commands::Nearby {
            latitude,
            longitude,
        }) => app.nearby(latitude, longitude).await,
        Some(Commands::Nearest {
            latitude,
            longitude,
        }) => app.nearest(latitude, longitude).await,
        Some(Commands::History { establishment_id }) => app.history(&establishment_id).await,
        Some(Commands::Favorites {
            action: FavoritesAction::List,
        }) => app.list_favorites().await,
        Some(Commands::Favorites {
            action: FavoritesAction::Toggle { establishment_id },
        }) => app.toggle_favorite(&establishment_id).await,
        Some(Commands::Datasets) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn nearby_accepts_negative_longitude() {
        let cli = Cli::try_parse_from(["atx_health", "nearby", "30.2672", "-97.7431"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Nearby { latitude, longitude })
                if (latitude - 30.2672).abs() < f64::EPSILON
                    && (longitude + 97.7431).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn search_joins_words() {
        let cli = Cli::try_parse_from(["atx_health", "search", "Joe's", "Diner"]).unwrap();
        let Some(Commands::Search { name }) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(name.join(" "), "Joe's Diner");
    }

    #[test]
    fn search_requires_a_name() {
        assert!(Cli::try_parse_from(["atx_health", "search"]).is_err());
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["atx_health", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.json);
    }
}
