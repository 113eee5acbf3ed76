//! Menu-driven mode, used when no subcommand is given.

use atx_health_socrata::HttpTransport;
use dialoguer::{Input, Select};

use crate::CliError;
use crate::commands::App;

/// Actions offered by the menu.
enum Action {
    SearchByName,
    Nearby,
    Nearest,
    History,
    ListFavorites,
    ToggleFavorite,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::SearchByName,
        Self::Nearby,
        Self::Nearest,
        Self::History,
        Self::ListFavorites,
        Self::ToggleFavorite,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SearchByName => "Search by restaurant name",
            Self::Nearby => "Inspections near a location",
            Self::Nearest => "Closest inspection to a location",
            Self::History => "Inspection history of an establishment",
            Self::ListFavorites => "List favorites",
            Self::ToggleFavorite => "Add or remove a favorite",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the menu until the user quits.
///
/// Request failures print their user-facing message and return to the
/// menu; prompt and storage failures end the session.
pub async fn run<T: HttpTransport + 'static>(app: &App<T>) -> Result<(), CliError> {
    println!("Austin Restaurant Inspections");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match Action::ALL[idx] {
            Action::SearchByName => {
                let name: String = Input::new()
                    .with_prompt("Restaurant name")
                    .interact_text()?;
                app.search(&name).await
            }
            Action::Nearby => {
                let (latitude, longitude) = prompt_location()?;
                app.nearby(latitude, longitude).await
            }
            Action::Nearest => {
                let (latitude, longitude) = prompt_location()?;
                app.nearest(latitude, longitude).await
            }
            Action::History => {
                let id: String = Input::new()
                    .with_prompt("Establishment id")
                    .interact_text()?;
                app.history(&id).await
            }
            Action::ListFavorites => app.list_favorites().await,
            Action::ToggleFavorite => {
                let id: String = Input::new()
                    .with_prompt("Establishment id")
                    .interact_text()?;
                app.toggle_favorite(&id).await
            }
            Action::Quit => return Ok(()),
        };

        match result {
            Ok(()) => {}
            Err(CliError::Client(e)) => {
                log::debug!("Request failed: {e}");
                println!("{}", e.user_message());
            }
            Err(CliError::Cancelled) => println!("Cancelled."),
            Err(e) => return Err(e),
        }
        println!();
    }
}

fn prompt_location() -> Result<(f64, f64), CliError> {
    let latitude: f64 = Input::new()
        .with_prompt("Latitude")
        .default(30.2672)
        .interact_text()?;
    let longitude: f64 = Input::new()
        .with_prompt("Longitude")
        .default(-97.7431)
        .interact_text()?;
    Ok((latitude, longitude))
}
