//! SODA query construction.
//!
//! A [`QueryBuilder`] combines the dataset endpoint with a `$where`
//! predicate and the fixed response-shape parameters (`$limit`, `$order`,
//! `$select`). Predicates are plain SoQL strings produced by the helpers in
//! this module; every parameter is percent-encoded when the URL is built, so
//! a predicate can never split or terminate the query string.

use atx_health_inspection_models::Coordinate;
use reqwest::Url;

use crate::registry::DatasetConfig;

/// Builds request URLs for one SODA resource endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    base_url: String,
    row_limit: u32,
    order: Option<String>,
    select: Vec<String>,
}

impl QueryBuilder {
    /// Creates a builder for `base_url` with a row limit of 100 and no
    /// ordering or field selection.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            row_limit: 100,
            order: None,
            select: Vec::new(),
        }
    }

    /// Creates a builder from a dataset config, ordering by inspection date
    /// (most recent first).
    #[must_use]
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(config.api_url.clone())
            .with_row_limit(config.row_limit)
            .with_order(format!("{} DESC", config.columns.date))
            .with_select(config.select.clone())
    }

    /// Sets the `$limit` parameter.
    #[must_use]
    pub const fn with_row_limit(mut self, row_limit: u32) -> Self {
        self.row_limit = row_limit;
        self
    }

    /// Sets the `$order` parameter.
    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the `$select` columns. An empty list omits the parameter.
    #[must_use]
    pub fn with_select(mut self, select: Vec<String>) -> Self {
        self.select = select;
        self
    }

    /// The endpoint this builder targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for `predicate`.
    ///
    /// Returns `None` if the base endpoint is empty or not an absolute
    /// `http(s)` URL, or if the predicate is blank or contains control
    /// characters.
    #[must_use]
    pub fn build(&self, predicate: &str) -> Option<Url> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return None;
        }
        if predicate.trim().is_empty() || predicate.chars().any(char::is_control) {
            return None;
        }

        let mut url = Url::parse(base).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return None;
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("$where", predicate);
            pairs.append_pair("$limit", &self.row_limit.to_string());
            if let Some(order) = &self.order {
                pairs.append_pair("$order", order);
            }
            if !self.select.is_empty() {
                pairs.append_pair("$select", &self.select.join(","));
            }
        }

        Some(url)
    }
}

/// Quotes `value` as a SoQL string literal, doubling embedded single quotes.
#[must_use]
pub fn soql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Case-insensitive substring match on `column`.
///
/// `needle` is expected to be lowercase already (see
/// [`normalize`](crate::normalize::normalize)). SoQL `like` has no escape
/// clause, so a `%` or `_` inside `needle` stays a wildcard and can only
/// widen the match. Single quotes are still escaped.
#[must_use]
pub fn name_predicate(column: &str, needle: &str) -> String {
    format!(
        "lower({column}) like {}",
        soql_string_literal(&format!("%{needle}%"))
    )
}

/// Rows whose `column` location lies within `radius_meters` of `center`.
#[must_use]
pub fn within_circle_predicate(column: &str, center: &Coordinate, radius_meters: u32) -> String {
    format!(
        "within_circle({column}, {}, {}, {radius_meters})",
        center.latitude(),
        center.longitude()
    )
}

/// Rows whose `column` equals `value`.
#[must_use]
pub fn equals_predicate(column: &str, value: &str) -> String {
    format!("{column} = {}", soql_string_literal(value))
}
