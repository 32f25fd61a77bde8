use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_types::{Event, EventsResponse, Location, LocationsResponse};
use thiserror::Error;

use crate::config::MapConfig;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("{0}")]
    Network(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Connectivity problems, as opposed to the server answering with an error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    fn from_transport(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if message.is_empty() {
            Self::Network(GENERIC_ERROR_MESSAGE.to_string())
        } else {
            Self::Network(message)
        }
    }

    fn from_response(status: u16, body: &str) -> Self {
        let message = extract_error_message(body)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self::Http { status, message }
    }
}

/// Pulls the server's explanation out of an error body: `message` first,
/// then `error`, both only when they are strings on a JSON object.
pub fn extract_error_message(body: &str) -> Option<String> {
    let Value::Object(fields) = serde_json::from_str::<Value>(body).ok()? else {
        return None;
    };
    ["message", "error"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// Read-only access to the campus API. Calls are idempotent.
pub trait DataClient {
    fn fetch_locations(&self) -> impl Future<Output = Result<Vec<Location>, ClientError>>;

    fn fetch_events(&self) -> impl Future<Output = Result<Vec<Event>, ClientError>>;

    fn search_locations(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Location>, ClientError>>;
}

#[derive(Debug, Clone)]
pub struct HttpDataClient {
    http: Client,
    base_url: String,
}

impl HttpDataClient {
    pub fn new(config: &MapConfig) -> Result<Self, ClientError> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        let http = builder.build().map_err(ClientError::from_transport)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn locations_url(&self) -> String {
        format!("{}/locations", self.base_url)
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/locations/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let request = self.http.get(url);
        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        let response = request.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

impl DataClient for HttpDataClient {
    async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError> {
        let body: LocationsResponse = self.get_json(&self.locations_url()).await?;
        Ok(body.locations)
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ClientError> {
        let body: EventsResponse = self.get_json(&self.events_url()).await?;
        Ok(body.events)
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, ClientError> {
        self.get_json(&self.search_url(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn server_message_wins_over_error_field() {
        let body = r#"{"message":"Session expired","error":"Unauthorized"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Session expired"));

        let body = r#"{"error":"Forbidden"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Forbidden"));
    }

    #[test]
    fn non_json_or_non_string_bodies_have_no_message() {
        assert_eq!(extract_error_message("<html>502</html>"), None);
        assert_eq!(extract_error_message(r#"{"message":42}"#), None);
        assert_eq!(extract_error_message(r#"["message"]"#), None);
        assert_eq!(extract_error_message(""), None);
    }

    #[test]
    fn http_error_falls_back_to_status_text() {
        let err = ClientError::from_response(503, "upstream down");
        assert_eq!(err.to_string(), "Request failed with status code 503");
        assert!(!err.is_network());

        let err = ClientError::from_response(401, r#"{"message":"Not authorized"}"#);
        assert_eq!(
            err,
            ClientError::Http {
                status: 401,
                message: "Not authorized".to_string()
            }
        );
    }

    #[test]
    fn search_query_is_url_encoded() {
        let config = MapConfig {
            api_base_url: "http://campus.test/api/".to_string(),
            ..MapConfig::default()
        };
        let client = HttpDataClient::new(&config).unwrap();

        assert_eq!(client.locations_url(), "http://campus.test/api/locations");
        assert_eq!(client.events_url(), "http://campus.test/api/events");
        assert_eq!(
            client.search_url("main lib&cafe"),
            "http://campus.test/api/locations/search?q=main%20lib%26cafe"
        );
    }

    #[test]
    fn timeouts_count_as_network_errors() {
        let err = ClientError::Timeout(Duration::from_secs(10));
        assert!(err.is_network());
        assert_eq!(err.to_string(), "request timed out after 10s");
    }
}
