//! The inspection search client.
//!
//! [`SocrataClient`] owns a [`QueryBuilder`] and an [`HttpTransport`]. Each
//! search validates its input before any request is issued, builds one
//! bounded query, and classifies the outcome into a [`ClientError`] kind.
//! Results are returned exactly as the endpoint delivered them; collapsing
//! duplicates and grouping by address are left to the caller.

use std::time::Duration;

use atx_health_inspection_models::{Coordinate, InspectionRecord};

use crate::normalize::normalize;
use crate::query::{QueryBuilder, equals_predicate, name_predicate, within_circle_predicate};
use crate::registry::{ColumnConfig, DatasetConfig};
use crate::transport::ReqwestTransport;
use crate::{ClientError, HttpTransport, parsing};

/// Searches an inspection dataset over HTTP.
#[derive(Debug, Clone)]
pub struct SocrataClient<T = ReqwestTransport> {
    transport: T,
    query: QueryBuilder,
    columns: ColumnConfig,
    radius_meters: u32,
}

impl SocrataClient<ReqwestTransport> {
    /// Creates a client for `config` using a `reqwest` transport with the
    /// dataset's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &DatasetConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(transport, config))
    }
}

impl<T: HttpTransport> SocrataClient<T> {
    /// Creates a client for `config` that sends requests through
    /// `transport`.
    #[must_use]
    pub fn new(transport: T, config: &DatasetConfig) -> Self {
        Self {
            transport,
            query: QueryBuilder::from_config(config),
            columns: config.columns.clone(),
            radius_meters: config.radius_meters,
        }
    }

    /// The query builder used for every request.
    #[must_use]
    pub const fn query_builder(&self) -> &QueryBuilder {
        &self.query
    }

    /// The transport requests are sent through.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Finds inspections whose restaurant name contains `term`.
    ///
    /// The term is normalized first (see [`normalize`]), so "The Vincent's
    /// Restaurant" matches rows named "VINCENT RESTAURANT".
    ///
    /// # Errors
    ///
    /// * [`ClientError::EmptyInput`] if `term` is blank (no request is sent)
    /// * any request error documented on [`ClientError`]
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<InspectionRecord>, ClientError> {
        if term.trim().is_empty() {
            return Err(ClientError::EmptyInput);
        }
        let needle = normalize(term);
        if needle.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        log::debug!("Name search: {term:?} -> {needle:?}");
        self.fetch(&name_predicate(&self.columns.name, &needle))
            .await
    }

    /// Returns the inspection nearest to the given point within the search
    /// radius.
    ///
    /// `Ok(None)` means rows were returned but none carried a coordinate.
    ///
    /// # Errors
    ///
    /// * [`ClientError::InvalidLocation`] if the point is out of range (no
    ///   request is sent)
    /// * any request error documented on [`ClientError`]
    pub async fn search_by_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<InspectionRecord>, ClientError> {
        let center = Coordinate::new(latitude, longitude)?;
        let records = self.fetch_in_radius(&center).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let distance = record.coordinate?.distance_meters(&center);
                Some((distance, record))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, record)| record))
    }

    /// Returns every inspection within the search radius of the given
    /// point, for map display.
    ///
    /// # Errors
    ///
    /// * [`ClientError::InvalidLocation`] if the point is out of range (no
    ///   request is sent)
    /// * any request error documented on [`ClientError`]
    pub async fn search_in_radius(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<InspectionRecord>, ClientError> {
        let center = Coordinate::new(latitude, longitude)?;
        self.fetch_in_radius(&center).await
    }

    /// Returns every inspection of one establishment.
    ///
    /// # Errors
    ///
    /// * [`ClientError::EmptyInput`] if `establishment_id` is blank
    /// * any request error documented on [`ClientError`]
    pub async fn inspection_history(
        &self,
        establishment_id: &str,
    ) -> Result<Vec<InspectionRecord>, ClientError> {
        let establishment_id = establishment_id.trim();
        if establishment_id.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        self.fetch(&equals_predicate(
            &self.columns.establishment,
            establishment_id,
        ))
        .await
    }

    async fn fetch_in_radius(
        &self,
        center: &Coordinate,
    ) -> Result<Vec<InspectionRecord>, ClientError> {
        log::debug!(
            "Proximity search: ({}, {}) within {}m",
            center.latitude(),
            center.longitude(),
            self.radius_meters
        );
        self.fetch(&within_circle_predicate(
            &self.columns.location,
            center,
            self.radius_meters,
        ))
        .await
    }

    /// Builds, sends, and decodes one query.
    async fn fetch(&self, predicate: &str) -> Result<Vec<InspectionRecord>, ClientError> {
        let url = self
            .query
            .build(predicate)
            .ok_or(ClientError::InvalidUrl)?;

        log::debug!("GET {url}");
        let response = self.transport.get(&url).await?;

        if !response.is_success() {
            log::warn!("Inspection query returned HTTP {}", response.status);
            return Err(ClientError::InvalidResponse {
                status: response.status,
            });
        }

        let records = parsing::decode_records(&response.body)?;
        if records.is_empty() {
            return Err(ClientError::EmptyResponse);
        }

        log::info!("Fetched {} inspection records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use reqwest::Url;

    use super::*;
    use crate::registry::default_dataset;
    use crate::{ClientErrorKind, HttpResponse, TransportError};

    /// Replays one canned outcome and records every requested URL.
    pub struct FakeTransport {
        outcome: Mutex<Option<Result<HttpResponse, TransportError>>>,
        pub calls: AtomicUsize,
        pub urls: Mutex<Vec<Url>>,
    }

    impl FakeTransport {
        pub fn respond(status: u16, body: &str) -> Self {
            Self::with_outcome(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }))
        }

        pub fn fail(error: TransportError) -> Self {
            Self::with_outcome(Err(error))
        }

        fn with_outcome(outcome: Result<HttpResponse, TransportError>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.clone());
            self.outcome
                .lock()
                .unwrap()
                .take()
                .expect("fake transport called more than once")
        }
    }

    fn client(transport: FakeTransport) -> SocrataClient<FakeTransport> {
        SocrataClient::new(transport, &default_dataset())
    }

    fn where_clause(client: &SocrataClient<FakeTransport>) -> String {
        let urls = client.transport.urls.lock().unwrap();
        urls[0]
            .query_pairs()
            .find(|(k, _)| k == "$where")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    const ROWS: &str = r#"[
        {"restaurant_name": "Joe's Diner", "address": "100 CONGRESS AVE",
         "latitude": "30.2672", "longitude": "-97.7431",
         "score": "85", "inspection_date": "2023-01-01T00:00:00.000",
         "facility_id": "1", "parent_id": "joe"},
        {"restaurant_name": "Joe's Diner", "address": "100 CONGRESS AVE",
         "latitude": "30.2672", "longitude": "-97.7431",
         "score": "90", "inspection_date": "2023-06-01T00:00:00.000",
         "facility_id": "2", "parent_id": "joe"},
        {"restaurant_name": "Taco Deli", "address": "1500 SPYGLASS DR",
         "latitude": "30.2900", "longitude": "-97.7400",
         "score": "97", "inspection_date": "2024-02-10T00:00:00.000",
         "facility_id": "3", "parent_id": "taco"},
        {"restaurant_name": "Food Truck", "address": "MOBILE",
         "score": "100", "inspection_date": "2023-03-03T00:00:00.000",
         "facility_id": "4", "parent_id": "truck"}
    ]"#;

    #[tokio::test]
    async fn empty_name_sends_no_request() {
        let client = client(FakeTransport::respond(200, ROWS));
        let err = client.search_by_name("").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::EmptyInput);
        let err = client.search_by_name(" \t ").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::EmptyInput);
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_location_sends_no_request() {
        let client = client(FakeTransport::respond(200, ROWS));
        let err = client.search_by_location(1000.0, -97.7).await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::InvalidLocation);
        let err = client.search_in_radius(30.0, 200.0).await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::InvalidLocation);
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn name_search_uses_normalized_like_predicate() {
        let client = client(FakeTransport::respond(200, ROWS));
        let records = client.search_by_name("The Joe's Diner ").await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(
            where_clause(&client),
            "lower(restaurant_name) like '%joe diner%'"
        );
    }

    #[tokio::test]
    async fn name_search_escapes_remaining_quotes() {
        let client = client(FakeTransport::respond(200, ROWS));
        client.search_by_name("O'Brien's").await.unwrap();
        assert_eq!(
            where_clause(&client),
            "lower(restaurant_name) like '%o''brien%'"
        );
    }

    #[tokio::test]
    async fn location_search_returns_nearest_record() {
        let client = client(FakeTransport::respond(200, ROWS));
        let nearest = client
            .search_by_location(30.2899, -97.7401)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(nearest.restaurant_name, "Taco Deli");
        assert_eq!(
            where_clause(&client),
            "within_circle(address, 30.2899, -97.7401, 1000)"
        );
    }

    #[tokio::test]
    async fn location_search_without_coordinates_is_none() {
        let body = r#"[{"restaurant_name": "Food Truck", "address": "MOBILE",
            "score": "100", "inspection_date": "2023-03-03", "facility_id": "4"}]"#;
        let client = client(FakeTransport::respond(200, body));
        assert!(client.search_by_location(30.0, -97.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn radius_search_returns_all_rows() {
        let client = client(FakeTransport::respond(200, ROWS));
        let records = client.search_in_radius(30.27, -97.74).await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn history_queries_establishment_column() {
        let client = client(FakeTransport::respond(200, ROWS));
        client.inspection_history(" joe ").await.unwrap();
        assert_eq!(where_clause(&client), "parent_id = 'joe'");
    }

    #[tokio::test]
    async fn blank_history_id_is_empty_input() {
        let client = client(FakeTransport::respond(200, ROWS));
        let err = client.inspection_history("  ").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::EmptyInput);
    }

    #[tokio::test]
    async fn server_error_is_invalid_response() {
        let client = client(FakeTransport::respond(500, ""));
        let err = client.search_by_name("amy").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse { status: 500 }));
    }

    #[tokio::test]
    async fn missing_score_is_decoding_error() {
        let body = r#"[{"restaurant_name": "Joe's Diner", "address": "100 CONGRESS AVE",
            "inspection_date": "2023-06-01T00:00:00.000", "facility_id": "1"}]"#;
        let client = client(FakeTransport::respond(200, body));
        let err = client.search_by_name("joe").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::DecodingError);
    }

    #[tokio::test]
    async fn empty_array_is_empty_response() {
        let client = client(FakeTransport::respond(200, "[]"));
        let err = client.search_by_name("nothing here").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::EmptyResponse);
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let client = client(FakeTransport::fail(TransportError::Timeout));
        let err = client.search_by_name("amy").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn unusable_endpoint_is_invalid_url() {
        let config = default_dataset().with_api_url("");
        let client = SocrataClient::new(FakeTransport::respond(200, ROWS), &config);
        let err = client.search_by_name("amy").await.unwrap_err();
        assert_eq!(err.kind(), ClientErrorKind::InvalidUrl);
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }
}
