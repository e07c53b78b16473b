use crate::model::CountryRecord;
use anyhow::{Context, Result};
use std::time::Duration;

/// Public dataset of per-country case records. GET, no auth.
pub const COUNTRIES_URL: &str = "https://corona.lmao.ninja/v2/countries";

const USER_AGENT: &str = concat!("corona-map/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client. One request per run, but the timeout
/// keeps a dead endpoint from hanging the status bar forever.
pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build http client")
}

/// Fetch the countries dataset. Transport errors and non-success status
/// codes surface as errors; the caller logs and drops them. Malformed
/// bodies are not errors, they decode to an empty vec.
pub async fn fetch_countries(client: &reqwest::Client) -> Result<Vec<CountryRecord>> {
    let body = client
        .get(COUNTRIES_URL)
        .send()
        .await
        .context("request failed")?
        .error_for_status()
        .context("non-success status")?
        .json::<serde_json::Value>()
        .await
        .context("body was not valid json")?;

    Ok(parse_countries(body))
}

/// Decode the response body into country records. A body that is not a
/// JSON array is treated as "no data", not an error. Individual rows
/// that fail to decode are skipped so one bad row cannot blank the map.
pub fn parse_countries(body: serde_json::Value) -> Vec<CountryRecord> {
    let serde_json::Value::Array(rows) = body else {
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<CountryRecord>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("skipping undecodable country row: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array_of_records() {
        let body = json!([
            {"country": "USA", "cases": 100, "countryInfo": {"lat": 38.0, "long": -95.7}},
            {"country": "France", "cases": 200, "countryInfo": {"lat": 46.2, "long": 2.2}},
        ]);
        let records = parse_countries(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country, "USA");
        assert_eq!(records[1].cases, 200);
    }

    #[test]
    fn test_non_array_body_is_no_data() {
        assert!(parse_countries(json!(null)).is_empty());
        assert!(parse_countries(json!({"message": "rate limited"})).is_empty());
        assert!(parse_countries(json!("oops")).is_empty());
    }

    #[test]
    fn test_empty_array_is_no_data() {
        assert!(parse_countries(json!([])).is_empty());
    }

    #[test]
    fn test_bad_row_is_skipped_not_fatal() {
        let body = json!([
            {"country": "USA", "cases": 100},
            42,
            {"country": "France", "cases": 200},
        ]);
        let records = parse_countries(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].country, "France");
    }

    #[test]
    fn test_missing_numeric_fields_default_to_zero() {
        let records = parse_countries(json!([{"country": "Nowhere"}]));
        assert_eq!(records[0].cases, 0);
        assert_eq!(records[0].deaths, 0);
        assert!(records[0].updated.is_none());
        assert!(records[0].coordinates().is_none());
    }
}
