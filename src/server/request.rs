use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;

/// Parsed HTTP request data used by `AppService`.
///
/// Everything the routing and dispatch layers need, extracted once from the
/// raw HTTP request.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// HTTP method token as received (GET, POST, ...).
    pub method: String,
    /// Request path with the query string stripped.
    pub path: String,
    /// HTTP headers (lowercase names).
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header.
    pub cookies: HeaderVec,
    /// Query string parameters, URL-decoded.
    pub query_params: ParamVec,
    /// Form fields from an `application/x-www-form-urlencoded` body.
    pub form_params: ParamVec,
    /// Body parsed as JSON when the content type is `application/json`.
    pub body: Option<serde_json::Value>,
}

impl ParsedRequest {
    /// Get a header by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Split a Cookie header into name/value pairs.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    headers
        .iter()
        .find(|(k, _)| k.as_ref() == "cookie")
        .map(|(_, c)| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim();
                    let value = parts.next().unwrap_or("").trim();
                    Some((Arc::from(name), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse query string parameters from a URL path.
///
/// Extracts everything after the `?` character and URL-decodes parameter
/// names and values.
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.find('?') {
        Some(pos) => form_urlencoded(&path[pos + 1..]),
        None => ParamVec::new(),
    }
}

/// URL-decode an `application/x-www-form-urlencoded` payload (query strings
/// and form bodies share the encoding).
fn form_urlencoded(input: &str) -> ParamVec {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
        .collect()
}

/// Extract everything the service needs from a raw HTTP request.
///
/// The body is read exactly once and interpreted by content type: JSON
/// bodies are parsed into a `serde_json::Value`, form bodies into
/// `form_params`, and anything else is ignored.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let content_type = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "content-type")
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut body_str = String::new();
    let mut body = None;
    let mut form_params = ParamVec::new();
    if let Ok(size) = req.body().read_to_string(&mut body_str) {
        if size > 0 {
            if content_type.starts_with("application/json") {
                body = serde_json::from_str(&body_str).ok();
                if body.is_none() {
                    debug!(size_bytes = size, "JSON body parse failed");
                }
            } else if content_type.starts_with("application/x-www-form-urlencoded") {
                form_params = form_urlencoded(&body_str);
            }
        }
    }

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        cookie_count = cookies.len(),
        query_param_count = query_params.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        form_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_vec(pairs: &[(&str, &str)]) -> HeaderVec {
        pairs
            .iter()
            .map(|(k, v)| (Arc::from(*k), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_cookies() {
        let headers = header_vec(&[("cookie", "a=b; session=xyz")]);
        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].0.as_ref(), "a");
        assert_eq!(cookies[0].1, "b");
        assert_eq!(cookies[1].0.as_ref(), "session");
        assert_eq!(cookies[1].1, "xyz");
    }

    #[test]
    fn test_parse_cookies_absent_header() {
        assert!(parse_cookies(&HeaderVec::new()).is_empty());
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=hello%20world");
        assert_eq!(q[0], (Arc::from("x"), "1".to_string()));
        assert_eq!(q[1], (Arc::from("y"), "hello world".to_string()));
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_form_urlencoded_decoding() {
        let f = form_urlencoded("name=wu%20jie&age=18");
        assert_eq!(f[0], (Arc::from("name"), "wu jie".to_string()));
        assert_eq!(f[1], (Arc::from("age"), "18".to_string()));
    }
}
