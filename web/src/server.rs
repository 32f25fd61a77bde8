//! Server-side glue. The browser only ever talks to this origin; `/api/*` is
//! relayed to the campus backend so the session cookie stays first-party.

#[cfg(feature = "ssr")]
use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

#[cfg(feature = "ssr")]
use crate::config::MapConfig;

/// Builds the backend URL for a relayed request.
pub fn upstream_url(base: &str, path: &str, query: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base}/{path}?{query}"),
        None => format!("{base}/{path}"),
    }
}

#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct ApiProxy {
    http: reqwest::Client,
    upstream: String,
}

#[cfg(feature = "ssr")]
impl ApiProxy {
    pub fn new(config: &MapConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            upstream: config.api_base_url.clone(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

#[cfg(feature = "ssr")]
pub async fn forward_api(
    State(proxy): State<ApiProxy>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let url = upstream_url(&proxy.upstream, &path, query.as_deref());
    let mut request = proxy.http.get(&url);
    if let Some(cookie) = headers.get(header::COOKIE) {
        request = request.header(header::COOKIE, cookie.clone());
    }

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(err) => return bad_gateway(&url, err),
    };
    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    tracing::debug!(%url, %status, "relayed campus API request");

    match upstream.bytes().await {
        Ok(body) => {
            let mut response = (status, body).into_response();
            if let Some(content_type) = content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            response
        }
        Err(err) => bad_gateway(&url, err),
    }
}

#[cfg(feature = "ssr")]
fn bad_gateway(url: &str, err: reqwest::Error) -> Response {
    tracing::error!(%url, error = %err, "campus API unreachable");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "message": "Campus API is unavailable" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relays_path_and_query() {
        assert_eq!(
            upstream_url("http://backend:5000/api/", "locations/search", Some("q=lib")),
            "http://backend:5000/api/locations/search?q=lib"
        );
        assert_eq!(
            upstream_url("http://backend:5000/api", "/events", Some("")),
            "http://backend:5000/api/events"
        );
        assert_eq!(
            upstream_url("http://backend:5000/api", "locations", None),
            "http://backend:5000/api/locations"
        );
    }
}
