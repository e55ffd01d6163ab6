use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::AppError;

/// Where `/proxy/*` requests go. Only exists when a backend is configured.
pub struct Upstream {
    pub client: reqwest::Client,
    pub backend_url: String,
}

/// Request headers never forwarded upstream: recomputed by the client or hop-by-hop.
const SKIPPED_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    // The upstream body is relayed as-is, so it must not come back compressed.
    "accept-encoding",
];

/// Reissues the request against `<backend>/<path>` and relays the answer untouched.
pub async fn forward(
    State(upstream): State<Arc<Upstream>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    // The raw path keeps percent-encoding intact; a decoded `%3F` would start a query.
    let path = uri.path().strip_prefix("/proxy/").unwrap_or_default();
    let mut url = format!("{}/{}", upstream.backend_url, path);
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }

    tracing::debug!("Proxying {method} {url}");

    let mut req = upstream
        .client
        .request(method.clone(), &url)
        .headers(forwarded_headers(&headers));
    if method != Method::GET && method != Method::HEAD {
        req = req.body(body);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("{method} {url}: {e}")))?;

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = resp
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("reading body of {method} {url}: {e}")))?;

    Ok((
        status,
        [
            (CONTENT_TYPE, content_type),
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        body,
    )
        .into_response())
}

pub fn forwarded_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers: HeaderMap = incoming
        .iter()
        .filter(|(name, _)| !SKIPPED_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers
}
