//! Geocoding endpoints
//!
//! Every call goes to the geocoding proxy first, bounded by the proxy
//! timeout. Any proxy failure (timeout, non-2xx, transport error, bad JSON)
//! falls back to the backend callable function with the same parameters plus
//! the provider selector. The callable wraps its reply as `{"result": ...}`.

use crate::client::GigmapClient;
use crate::error::{ApiError, ApiResult};
use gigmap_geo::geocode::{normalize_autocomplete, normalize_reverse};
use gigmap_geo::{Coordinate, Place};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

/// Which endpoint answered a geocoding call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeSource {
    /// The geocoding proxy
    Proxy,
    /// The backend callable function
    Fallback,
}

/// Raw provider response and where it came from
#[derive(Debug, Clone)]
pub struct GeocodeResponse {
    /// Provider response body, not yet normalized
    pub body: Value,
    /// Endpoint that produced it
    pub source: GeocodeSource,
}

#[derive(Deserialize)]
struct CallableReply {
    result: Value,
}

/// Geocoding API interface
#[derive(Clone, Debug)]
pub struct GeocodingApi {
    client: GigmapClient,
}

impl GeocodingApi {
    /// Create a new geocoding API interface
    pub(crate) fn new(client: GigmapClient) -> Self {
        Self { client }
    }

    /// Resolve a position to a place
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> ApiResult<Place> {
        let position = Coordinate::new(latitude, longitude);
        if !position.is_valid() {
            return Err(gigmap_geo::GeoError::InvalidCoordinate(format!("({latitude}, {longitude})")).into());
        }

        let mut params = Map::new();
        params.insert("lat".to_string(), json!(latitude));
        params.insert("lon".to_string(), json!(longitude));

        let response = self.call("reverseGeocode", params).await?;
        Ok(normalize_reverse(self.client.config().provider, &response.body)?)
    }

    /// Suggest places for a partial query
    pub async fn autocomplete(&self, query: &str) -> ApiResult<Vec<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = Map::new();
        params.insert("q".to_string(), json!(query));

        let response = self.call("autocomplete", params).await?;
        Ok(normalize_autocomplete(self.client.config().provider, &response.body)?)
    }

    /// Run one geocoding action with proxy-then-fallback semantics
    #[instrument(skip(self, params))]
    pub async fn call(&self, action: &str, params: Map<String, Value>) -> ApiResult<GeocodeResponse> {
        let config = self.client.config();

        let mut proxy_body = Map::new();
        proxy_body.insert("action".to_string(), json!(action));
        proxy_body.extend(params.clone());

        let proxy_error = match self
            .client
            .post_json::<Value, _>(&config.proxy_url, &proxy_body, Some(config.proxy_timeout))
            .await
        {
            Ok(body) => {
                debug!(action, "geocoding answered by proxy");
                return Ok(GeocodeResponse {
                    body,
                    source: GeocodeSource::Proxy,
                });
            }
            Err(e) => e,
        };

        warn!(action, error = %proxy_error, "geocoding proxy failed, using fallback function");

        let mut data = proxy_body;
        data.insert("provider".to_string(), json!(config.provider.as_str()));

        match self
            .client
            .post_json::<CallableReply, _>(&config.callable_url, &json!({ "data": data }), None)
            .await
        {
            Ok(reply) => Ok(GeocodeResponse {
                body: reply.result,
                source: GeocodeSource::Fallback,
            }),
            Err(e) => Err(ApiError::GeocodingUnavailable {
                proxy: proxy_error.to_string(),
                fallback: Box::new(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use gigmap_geo::GeocodeProvider;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn locationiq_reverse() -> Value {
        json!({
            "lat": "12.9716", "lon": "77.5946",
            "display_name": "Shivajinagar, Bengaluru",
            "address": {"suburb": "Shivajinagar", "city": "Bengaluru", "postcode": "560001", "road": "MG Road"}
        })
    }

    fn client(server: &MockServer) -> GigmapClient {
        let config = ClientConfig::default()
            .with_proxy_url(format!("{}/proxy", server.uri()))
            .with_callable_url(format!("{}/callable", server.uri()))
            .with_proxy_timeout(Duration::from_millis(300));
        GigmapClient::with_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_reverse_via_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .and(body_json(json!({"action": "reverseGeocode", "lat": 12.9716, "lon": 77.5946})))
            .respond_with(ResponseTemplate::new(200).set_body_json(locationiq_reverse()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/callable"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let place = client(&server).geocoding().reverse(12.9716, 77.5946).await.unwrap();
        assert_eq!(place.area, "Shivajinagar");
        assert_eq!(place.pincode, "560001");
        assert_eq!(place.landmark, "MG Road");
    }

    #[tokio::test]
    async fn test_proxy_error_falls_back_with_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/callable"))
            .and(body_json(json!({
                "data": {"action": "reverseGeocode", "lat": 12.9716, "lon": 77.5946, "provider": "locationiq"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": locationiq_reverse()})))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server).geocoding();
        let mut params = Map::new();
        params.insert("lat".into(), json!(12.9716));
        params.insert("lon".into(), json!(77.5946));
        let response = api.call("reverseGeocode", params).await.unwrap();
        assert_eq!(response.source, GeocodeSource::Fallback);
        assert_eq!(response.body["address"]["city"], "Bengaluru");
    }

    #[tokio::test]
    async fn test_slow_proxy_times_out_and_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(locationiq_reverse())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/callable"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": locationiq_reverse()})))
            .expect(1)
            .mount(&server)
            .await;

        let place = client(&server).geocoding().reverse(12.9716, 77.5946).await.unwrap();
        assert_eq!(place.city, "Bengaluru");
    }

    #[tokio::test]
    async fn test_both_failing_reports_both() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client(&server).geocoding().autocomplete("Indiranagar").await.unwrap_err();
        assert!(matches!(err, ApiError::GeocodingUnavailable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_opencage_autocomplete_through_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/callable"))
            .and(body_json(json!({"data": {"action": "autocomplete", "q": "Koramangala", "provider": "opencage"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"results": [{
                    "formatted": "Koramangala, Bengaluru",
                    "geometry": {"lat": 12.9352, "lng": 77.6245},
                    "components": {"suburb": "Koramangala", "city": "Bengaluru", "postcode": "560034"}
                }]}
            })))
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_proxy_url(format!("{}/proxy", server.uri()))
            .with_callable_url(format!("{}/callable", server.uri()))
            .with_provider(GeocodeProvider::OpenCage);
        let places = GigmapClient::with_config(config)
            .unwrap()
            .geocoding()
            .autocomplete(" Koramangala ")
            .await
            .unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].pincode, "560034");
    }

    #[tokio::test]
    async fn test_invalid_position_rejected_before_network() {
        let server = MockServer::start().await;
        let err = client(&server).geocoding().reverse(123.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ApiError::Geocode(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
