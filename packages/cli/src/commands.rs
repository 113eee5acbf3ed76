//! Subcommand implementations shared by the scripted and interactive modes.

use std::future::Future;
use std::sync::Arc;

use atx_health_favorites::FavoritesStore;
use atx_health_results::{CameraTarget, filter_old_duplicates, group_by_address, sort_history};
use atx_health_socrata::task::spawn_search;
use atx_health_socrata::transport::ReqwestTransport;
use atx_health_socrata::{ClientError, HttpTransport, SocrataClient};

use crate::{CliError, output};

/// Everything a command needs: the dataset client, the favorites store,
/// and the output mode.
pub struct App<T = ReqwestTransport> {
    pub client: Arc<SocrataClient<T>>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub json: bool,
}

impl<T: HttpTransport + 'static> App<T> {
    /// Latest inspection of every establishment matching `term`.
    pub async fn search(&self, term: &str) -> Result<(), CliError> {
        println!("{}", self.search_report(term).await?);
        Ok(())
    }

    async fn search_report(&self, term: &str) -> Result<String, CliError> {
        let client = Arc::clone(&self.client);
        let term = term.to_string();
        let records = cancellable(async move { client.search_by_name(&term).await }).await?;

        let latest = filter_old_duplicates(&records);
        log::info!(
            "{} rows, {} establishments after dropping older inspections",
            records.len(),
            latest.len()
        );
        let favorites = self.favorites.get().await?;
        output::render_records(&latest, &favorites, self.json)
    }

    /// Latest inspections around a point, grouped by address.
    pub async fn nearby(&self, latitude: f64, longitude: f64) -> Result<(), CliError> {
        println!("{}", self.nearby_report(latitude, longitude).await?);
        Ok(())
    }

    async fn nearby_report(&self, latitude: f64, longitude: f64) -> Result<String, CliError> {
        let client = Arc::clone(&self.client);
        let records =
            cancellable(async move { client.search_in_radius(latitude, longitude).await })
                .await?;

        let groups = group_by_address(&filter_old_duplicates(&records));
        let camera = CameraTarget::for_groups(&groups);
        output::render_groups(&groups, camera, self.json)
    }

    /// The inspection closest to a point.
    pub async fn nearest(&self, latitude: f64, longitude: f64) -> Result<(), CliError> {
        println!("{}", self.nearest_report(latitude, longitude).await?);
        Ok(())
    }

    async fn nearest_report(&self, latitude: f64, longitude: f64) -> Result<String, CliError> {
        let client = Arc::clone(&self.client);
        let record =
            cancellable(async move { client.search_by_location(latitude, longitude).await })
                .await?;

        let favorites = self.favorites.get().await?;
        output::render_nearest(record.as_ref(), &favorites, self.json)
    }

    /// Every inspection of one establishment, newest first.
    pub async fn history(&self, establishment_id: &str) -> Result<(), CliError> {
        println!("{}", self.history_report(establishment_id).await?);
        Ok(())
    }

    async fn history_report(&self, establishment_id: &str) -> Result<String, CliError> {
        let client = Arc::clone(&self.client);
        let id = establishment_id.to_string();
        let records = cancellable(async move { client.inspection_history(&id).await }).await?;

        let favorites = self.favorites.get().await?;
        output::render_records(&sort_history(&records), &favorites, self.json)
    }

    pub async fn list_favorites(&self) -> Result<(), CliError> {
        let favorites = self.favorites.get().await?;
        println!("{}", output::render_favorites(&favorites, self.json)?);
        Ok(())
    }

    pub async fn toggle_favorite(&self, establishment_id: &str) -> Result<(), CliError> {
        let id = establishment_id.trim();
        if id.is_empty() {
            return Err(ClientError::EmptyInput.into());
        }
        let is_favorite = self.favorites.toggle(id).await?;
        println!("{}", output::render_toggle(id, is_favorite, self.json)?);
        Ok(())
    }
}

/// Runs `search` in the background until it finishes or Ctrl-C is
/// pressed, whichever comes first.
async fn cancellable<R, F>(search: F) -> Result<R, CliError>
where
    F: Future<Output = Result<R, ClientError>> + Send + 'static,
    R: Send + 'static,
{
    let handle = spawn_search(search);
    let abort = handle.abort_handle();

    tokio::select! {
        result = handle.join() => Ok(result.ok_or(CliError::Cancelled)??),
        _ = tokio::signal::ctrl_c() => {
            abort.abort();
            log::info!("Search cancelled by user");
            Err(CliError::Cancelled)
        }
    }
}
