//! Reverse proxy to the upstream development site
//!
//! Requests are forwarded verbatim except for hop-by-hop headers. HTML
//! responses have the upstream origin rewritten to the local one and the
//! reload client injected before `</body>`.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use regex::Regex;
use reqwest::Url;

use crate::error::{ForgeError, ForgeResult};

use super::ServerState;

/// Request headers not forwarded upstream
const SKIP_REQUEST: &[HeaderName] = &[
    header::HOST,
    header::ACCEPT_ENCODING,
    header::CONNECTION,
    header::CONTENT_LENGTH,
];

/// Response headers not passed back to the browser
const SKIP_RESPONSE: &[HeaderName] = &[
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONTENT_ENCODING,
    header::CONNECTION,
];

/// `scheme://host[:port]` of an upstream URL
pub fn origin_of(url: &Url) -> ForgeResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ForgeError::Server(format!("proxy url '{}' has no host", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Matches a closing body tag, case-insensitive
pub fn body_close_pattern() -> ForgeResult<Regex> {
    Regex::new(r"(?i)</body\s*>").map_err(|e| ForgeError::Server(e.to_string()))
}

/// Insert `snippet` before the last `</body>`, or append it.
pub fn inject_client(html: &str, snippet: &str, body_close: &Regex) -> String {
    match body_close.find_iter(html).last() {
        Some(m) => {
            let mut out = String::with_capacity(html.len() + snippet.len());
            out.push_str(&html[..m.start()]);
            out.push_str(snippet);
            out.push_str(&html[m.start()..]);
            out
        }
        None => format!("{}{}", html, snippet),
    }
}

/// Replace the upstream origin with the local one, plain and JSON-escaped.
pub fn rewrite_origin(text: &str, upstream: &str, local: &str) -> String {
    let escaped_upstream = upstream.replace('/', "\\/");
    let escaped_local = local.replace('/', "\\/");
    text.replace(upstream, local)
        .replace(&escaped_upstream, &escaped_local)
}

pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Fallback handler: forward anything else upstream.
pub(crate) async fn forward(State(state): State<ServerState>, request: Request) -> Response {
    match forward_inner(&state, request).await {
        Ok(response) => response,
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            format!("pressforge: upstream {} unavailable: {}", state.upstream_origin, err),
        )
            .into_response(),
    }
}

async fn forward_inner(state: &ServerState, request: Request) -> ForgeResult<Response> {
    let (parts, body) = request.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", state.upstream_origin, path);

    let body = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ForgeError::Server(e.to_string()))?;

    let mut headers = parts.headers.clone();
    for name in SKIP_REQUEST {
        headers.remove(name);
    }

    let upstream = state
        .client
        .request(parts.method.clone(), target.as_str())
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| ForgeError::Server(e.to_string()))?;

    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ForgeError::Server(e.to_string()))?;

    let body = if is_html(&upstream_headers) {
        let html = String::from_utf8_lossy(&bytes);
        let html = rewrite_origin(&html, &state.upstream_origin, &state.local_origin);
        Body::from(inject_client(&html, &state.snippet, &state.body_close))
    } else {
        Body::from(bytes)
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let out_headers = response.headers_mut();
    for (name, value) in upstream_headers.iter() {
        if SKIP_RESPONSE.contains(name) {
            continue;
        }
        let value = if *name == header::LOCATION {
            rewrite_location(value, &state.upstream_origin, &state.local_origin)
        } else {
            value.clone()
        };
        out_headers.append(name.clone(), value);
    }

    Ok(response)
}

fn rewrite_location(value: &HeaderValue, upstream: &str, local: &str) -> HeaderValue {
    value
        .to_str()
        .ok()
        .map(|v| v.replace(upstream, local))
        .and_then(|v| HeaderValue::from_str(&v).ok())
        .unwrap_or_else(|| value.clone())
}
