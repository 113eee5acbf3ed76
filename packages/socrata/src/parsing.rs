//! Decoding of SODA inspection rows.
//!
//! Socrata serializes numbers as strings, timestamps as floating ISO 8601
//! values, and the `address` column either as plain text or as a location
//! object whose `human_address` is itself a JSON string. Everything is
//! normalized here into [`InspectionRecord`] values.

use atx_health_inspection_models::{Coordinate, InspectionRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::ClientError;

/// A scalar that Socrata may emit either as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

/// A Socrata location object.
#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: Option<Scalar>,
    longitude: Option<Scalar>,
    human_address: Option<String>,
}

/// The `address` column, plain or as a location object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Text(String),
    Location(RawLocation),
}

/// The JSON-encoded contents of `human_address`.
#[derive(Debug, Deserialize)]
struct HumanAddress {
    address: Option<String>,
}

/// One row as it appears on the wire.
#[derive(Debug, Deserialize)]
struct RawInspection {
    restaurant_name: String,
    address: RawAddress,
    score: Scalar,
    inspection_date: String,
    facility_id: Scalar,
    #[serde(alias = "establishment_id")]
    parent_id: Option<Scalar>,
    latitude: Option<Scalar>,
    longitude: Option<Scalar>,
    location: Option<RawLocation>,
}

/// Decodes a response body into inspection records.
///
/// # Errors
///
/// Returns [`ClientError::Decoding`] if the body is not a JSON array or any
/// row is missing a required field or carries an invalid value.
pub fn decode_records(body: &str) -> Result<Vec<InspectionRecord>, ClientError> {
    let rows: Vec<RawInspection> = serde_json::from_str(body).map_err(|e| ClientError::Decoding {
        message: e.to_string(),
    })?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            to_record(row).map_err(|message| ClientError::Decoding {
                message: format!("row {i}: {message}"),
            })
        })
        .collect()
}

fn to_record(row: RawInspection) -> Result<InspectionRecord, String> {
    let restaurant_name = row.restaurant_name.trim().to_string();
    if restaurant_name.is_empty() {
        return Err("empty restaurant_name".to_string());
    }

    let score = parse_score(&row.score)?;
    let date = parse_socrata_date(&row.inspection_date)
        .ok_or_else(|| format!("invalid inspection_date {:?}", row.inspection_date))?;

    let facility_id = row.facility_id.as_text();
    if facility_id.is_empty() {
        return Err("empty facility_id".to_string());
    }
    // Datasets without a parent column key establishments by facility.
    let establishment_id = row
        .parent_id
        .as_ref()
        .map(Scalar::as_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| facility_id.clone());

    let (address, address_location) = match row.address {
        RawAddress::Text(text) => (text.trim().to_string(), None),
        RawAddress::Location(location) => (human_address_line(&location)?, Some(location)),
    };
    if address.is_empty() {
        return Err("empty address".to_string());
    }

    let coordinate = match parse_lat_lng(row.latitude.as_ref(), row.longitude.as_ref())? {
        Some(c) => Some(c),
        None => match row.location.as_ref().or(address_location.as_ref()) {
            Some(location) => {
                parse_lat_lng(location.latitude.as_ref(), location.longitude.as_ref())?
            }
            None => None,
        },
    };

    Ok(InspectionRecord {
        restaurant_name,
        address,
        score,
        date,
        coordinate,
        facility_id,
        establishment_id,
    })
}

/// Parses an inspection score. Accepts non-negative integers only.
fn parse_score(score: &Scalar) -> Result<u32, String> {
    let text = score.as_text();
    text.parse::<u32>()
        .map_err(|_| format!("invalid score {text:?}"))
}

/// Extracts the street line from a location object's `human_address`.
fn human_address_line(location: &RawLocation) -> Result<String, String> {
    let raw = location
        .human_address
        .as_deref()
        .ok_or_else(|| "address location has no human_address".to_string())?;
    let human: HumanAddress =
        serde_json::from_str(raw).map_err(|e| format!("invalid human_address: {e}"))?;
    Ok(human.address.unwrap_or_default().trim().to_string())
}

/// Parses a Socrata date or floating timestamp into a calendar date.
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parses an optional latitude/longitude pair.
///
/// Returns `Ok(None)` if either half is missing or the pair is `(0, 0)`,
/// which Socrata uses for rows that were never geocoded. Unparseable or
/// out-of-range values are errors.
fn parse_lat_lng(lat: Option<&Scalar>, lng: Option<&Scalar>) -> Result<Option<Coordinate>, String> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Ok(None);
    };
    let lat_text = lat.as_text();
    let lng_text = lng.as_text();
    let latitude = lat_text
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude {lat_text:?}"))?;
    let longitude = lng_text
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude {lng_text:?}"))?;
    if latitude == 0.0 && longitude == 0.0 {
        return Ok(None);
    }
    Coordinate::new(latitude, longitude)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(row: &serde_json::Value) -> InspectionRecord {
        let body = serde_json::Value::Array(vec![row.clone()]).to_string();
        let mut records = decode_records(&body).unwrap();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    fn is_decoding_error(result: Result<Vec<InspectionRecord>, ClientError>) -> bool {
        matches!(result, Err(ClientError::Decoding { .. }))
    }

    #[test]
    fn decodes_plain_row() {
        let record = decode_one(&serde_json::json!({
            "restaurant_name": "Joe's Diner",
            "address": "100 CONGRESS AVE",
            "score": "90",
            "inspection_date": "2023-06-01T00:00:00.000",
            "latitude": "30.2672",
            "longitude": "-97.7431",
            "facility_id": "2800123",
            "parent_id": "10234"
        }));
        assert_eq!(record.restaurant_name, "Joe's Diner");
        assert_eq!(record.address, "100 CONGRESS AVE");
        assert_eq!(record.score, 90);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        let coordinate = record.coordinate.unwrap();
        assert!((coordinate.latitude() - 30.2672).abs() < 1e-9);
        assert!((coordinate.longitude() - -97.7431).abs() < 1e-9);
        assert_eq!(record.facility_id, "2800123");
        assert_eq!(record.establishment_id, "10234");
    }

    #[test]
    fn decodes_location_object_address() {
        let record = decode_one(&serde_json::json!({
            "restaurant_name": "Taco Deli",
            "address": {
                "latitude": "30.29",
                "longitude": "-97.74",
                "human_address": "{\"address\": \"1500 SPYGLASS DR\", \"city\": \"AUSTIN\", \"state\": \"TX\", \"zip\": \"78746\"}"
            },
            "score": 97,
            "inspection_date": "2024-02-10T00:00:00.000",
            "facility_id": 11,
            "parent_id": 5
        }));
        assert_eq!(record.address, "1500 SPYGLASS DR");
        assert_eq!(record.score, 97);
        assert_eq!(record.facility_id, "11");
        assert_eq!(record.establishment_id, "5");
        assert!((record.coordinate.unwrap().latitude() - 30.29).abs() < 1e-9);
    }

    #[test]
    fn decodes_separate_location_column() {
        let record = decode_one(&serde_json::json!({
            "restaurant_name": "Kerbey Lane",
            "address": "3704 KERBEY LN",
            "location": { "latitude": 30.30, "longitude": -97.75 },
            "score": "88",
            "inspection_date": "2022-11-03",
            "facility_id": "77",
            "establishment_id": "E77"
        }));
        assert!(record.coordinate.is_some());
        assert_eq!(record.establishment_id, "E77");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2022, 11, 3).unwrap());
    }

    #[test]
    fn missing_coordinate_is_valid() {
        let record = decode_one(&serde_json::json!({
            "restaurant_name": "Food Truck",
            "address": "MOBILE",
            "score": "100",
            "inspection_date": "2023-01-01T00:00:00",
            "facility_id": "9"
        }));
        assert!(record.coordinate.is_none());
        assert_eq!(record.establishment_id, "9");
    }

    #[test]
    fn zero_coordinate_is_treated_as_missing() {
        let record = decode_one(&serde_json::json!({
            "restaurant_name": "Nowhere Cafe",
            "address": "1 MAIN ST",
            "latitude": "0",
            "longitude": "0",
            "score": "80",
            "inspection_date": "2023-01-01",
            "facility_id": "1",
            "parent_id": "1"
        }));
        assert!(record.coordinate.is_none());
    }

    #[test]
    fn rejects_missing_score() {
        let body = r#"[{
            "restaurant_name": "Joe's Diner",
            "address": "100 CONGRESS AVE",
            "inspection_date": "2023-06-01T00:00:00.000",
            "facility_id": "1",
            "parent_id": "1"
        }]"#;
        assert!(is_decoding_error(decode_records(body)));
    }

    #[test]
    fn rejects_non_integer_score() {
        let body = r#"[{"restaurant_name": "A", "address": "B", "score": "ninety",
            "inspection_date": "2023-06-01", "facility_id": "1"}]"#;
        assert!(is_decoding_error(decode_records(body)));
        let negative = r#"[{"restaurant_name": "A", "address": "B", "score": -5,
            "inspection_date": "2023-06-01", "facility_id": "1"}]"#;
        assert!(is_decoding_error(decode_records(negative)));
    }

    #[test]
    fn rejects_out_of_range_coordinate() {
        let body = r#"[{"restaurant_name": "A", "address": "B", "score": "90",
            "inspection_date": "2023-06-01", "facility_id": "1",
            "latitude": "1000", "longitude": "-97.7"}]"#;
        assert!(is_decoding_error(decode_records(body)));
    }

    #[test]
    fn rejects_bad_date() {
        let body = r#"[{"restaurant_name": "A", "address": "B", "score": "90",
            "inspection_date": "yesterday", "facility_id": "1"}]"#;
        assert!(is_decoding_error(decode_records(body)));
    }

    #[test]
    fn rejects_non_array_and_non_json() {
        assert!(is_decoding_error(decode_records(r#"{"error": true}"#)));
        assert!(is_decoding_error(decode_records("<html>oops</html>")));
    }

    #[test]
    fn empty_array_decodes_to_nothing() {
        assert!(decode_records("[]").unwrap().is_empty());
    }

    #[test]
    fn parses_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_socrata_date("2024-01-15T14:30:00.000"), expected);
        assert_eq!(parse_socrata_date("2024-01-15T14:30:00"), expected);
        assert_eq!(parse_socrata_date("2024-01-15"), expected);
        assert_eq!(parse_socrata_date("01/15/2024"), None);
    }
}
