//! Address geocoding through Nominatim.

use geo::Point;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{FootprintError, Result, Upstream};

/// Geocodes free-form addresses against a Nominatim instance
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `/search` URL for a single best match
    pub fn search_url(&self, address: &str) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("q", address), ("format", "json"), ("limit", "1")],
        )
        .map_err(|e| FootprintError::upstream(Upstream::Nominatim, e))
    }

    /// Geocode an address to a lon/lat point
    pub async fn geocode(&self, address: &str) -> Result<Point<f64>> {
        info!("Geocoding: {}", address);

        let url = self.search_url(address)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FootprintError::upstream(Upstream::Nominatim, e))?;

        if !response.status().is_success() {
            return Err(FootprintError::upstream(
                Upstream::Nominatim,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FootprintError::upstream(Upstream::Nominatim, e))?;

        let point = parse_search_response(&body, address)?;
        info!("Found coordinates: {}, {}", point.y(), point.x());
        Ok(point)
    }
}

/// Parse a `/search?format=json` body into the first hit's point
pub fn parse_search_response(body: &str, address: &str) -> Result<Point<f64>> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).map_err(|e| FootprintError::upstream(Upstream::Nominatim, e))?;

    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| FootprintError::AddressNotFound(address.to_string()))?;

    if let Some(name) = &hit.display_name {
        debug!("Nominatim match: {}", name);
    }

    let lat: f64 = hit
        .lat
        .parse()
        .map_err(|_| FootprintError::upstream(Upstream::Nominatim, format!("bad lat '{}'", hit.lat)))?;
    let lon: f64 = hit
        .lon
        .parse()
        .map_err(|_| FootprintError::upstream(Upstream::Nominatim, format!("bad lon '{}'", hit.lon)))?;

    Ok(Point::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_hit() {
        let body = r#"[
            {"place_id": 1, "lat": "52.4101", "lon": "16.9432", "display_name": "Osiedle Rzeczypospolitej 102, Poznań"},
            {"place_id": 2, "lat": "0.0", "lon": "0.0"}
        ]"#;

        let point = parse_search_response(body, "Osiedle Rzeczypospolitej 102").unwrap();
        assert_eq!(point.x(), 16.9432);
        assert_eq!(point.y(), 52.4101);
    }

    #[test]
    fn test_no_hits_is_address_not_found() {
        let err = parse_search_response("[]", "Nowhere 1").unwrap_err();
        match err {
            FootprintError::AddressNotFound(address) => assert_eq!(address, "Nowhere 1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_coordinates() {
        let body = r#"[{"lat": "north", "lon": "16.9"}]"#;
        let err = parse_search_response(body, "x").unwrap_err();
        assert!(matches!(
            err,
            FootprintError::UpstreamFetchFailure {
                service: Upstream::Nominatim,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_search_response("<html>rate limited</html>", "x").unwrap_err();
        assert!(matches!(err, FootprintError::UpstreamFetchFailure { .. }));
    }

    #[test]
    fn test_search_url_encodes_address() {
        let client = NominatimClient::new(Client::new(), "https://nominatim.example.org/");
        let url = client.search_url("Osiedle Rzeczypospolitej 102, Poznań").unwrap();

        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Osiedle Rzeczypospolitej 102, Poznań".to_string()),
                ("format".to_string(), "json".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }
}
