//! Dispatcher core - hot path for request dispatch.

use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};
use crate::runtime_config::RuntimeConfig;

/// Maximum inline headers/cookies before heap allocation.
/// Most requests carry ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the hot path.
///
/// Header names use `Arc<str>` because they repeat across requests
/// (content-type, cookie, ...): `Arc::clone()` is an O(1) atomic increment.
/// Values remain `String` as per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine.
///
/// Carries everything extracted from the HTTP request (path/query/form
/// parameters, headers, cookies, the parsed JSON body) plus the reply
/// channel the handler must answer on.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for log correlation.
    pub request_id: RequestId,
    /// HTTP method (GET, POST, ...).
    pub method: Method,
    /// Concrete request path (query string stripped).
    pub path: String,
    /// Name of the handler processing this request.
    pub handler_name: String,
    /// Path parameters captured by the router.
    pub path_params: ParamVec,
    /// Query string parameters.
    pub query_params: ParamVec,
    /// Form fields from an `application/x-www-form-urlencoded` body.
    pub form_params: ParamVec,
    /// HTTP headers (lowercase names).
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header.
    pub cookies: HeaderVec,
    /// Request body parsed as JSON (`application/json` only).
    pub body: Option<Value>,
    /// Channel for sending the response back to the dispatcher.
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: with duplicate parameter names at
    /// different path depths, the deepest capture is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last write wins for repeats).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a form field by name (last write wins for repeats).
    #[inline]
    #[must_use]
    pub fn get_form_param(&self, name: &str) -> Option<&str> {
        self.form_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Deserialize the JSON body into a typed value.
    ///
    /// # Errors
    ///
    /// Fails when the request carried no JSON body or the body does not
    /// match `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("request has no JSON body"))?;
        Ok(serde_json::from_value(body.clone())?)
    }

    /// Convert path_params to a HashMap.
    /// Note: this allocates - use get_path_param() in hot paths instead.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// A `Set-Cookie` value under construction.
///
/// Covers the attribute subset handlers actually set; anything more exotic
/// can go through [`HandlerResponse::set_header`] directly.
#[derive(Debug, Clone, Default)]
pub struct SetCookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<i64>,
    http_only: bool,
    secure: bool,
}

impl SetCookie {
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    #[must_use]
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    #[must_use]
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    #[must_use]
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Render the `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if let Some(max_age) = self.max_age {
            out.push_str("; Max-Age=");
            out.push_str(&max_age.to_string());
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// Response data sent back from a handler coroutine.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, ...).
    pub status: u16,
    /// HTTP response headers.
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON.
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header (replaces any existing header with that name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Append a `Set-Cookie` header.
    ///
    /// Appends rather than replaces: a response may set several cookies.
    pub fn set_cookie(&mut self, cookie: &SetCookie) {
        self.headers
            .push((Arc::from("set-cookie"), cookie.to_header_value()));
    }
}

/// Type alias for a channel sender that feeds requests to a handler.
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Dispatcher that routes matched requests to registered handler coroutines.
///
/// Maintains a registry of handler names to their corresponding channel
/// senders. Each handler runs in a pre-spawned `may` coroutine; dispatch is a
/// channel send followed by a blocking receive on the per-request reply
/// channel.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    /// Map of handler names to their channel senders.
    handlers: HashMap<String, HandlerSender>,
}

impl Dispatcher {
    /// Create a new empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
        }
    }

    /// True when a handler with this name has been registered.
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Register a handler function under `name`, spawning its coroutine.
    ///
    /// The coroutine loops over its request channel until the sender is
    /// dropped. Handler panics are caught and converted into 500 responses so
    /// one failing handler cannot take the server down. Registering a second
    /// handler under the same name drops the old sender, which closes its
    /// channel and lets the old coroutine exit.
    ///
    /// # Safety
    ///
    /// Marked unsafe because `may::coroutine::Builder::spawn()` is unsafe in
    /// the `may` runtime; the caller must ensure the runtime is initialized
    /// and that registration happens before serving starts.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let name = name.to_string();
        let coroutine_name = name.clone();
        let stack_size = RuntimeConfig::from_env().stack_size;

        // SAFETY: spawn() is unsafe per the may runtime, not this logic. The
        // handler is Send + 'static and errors travel the reply channel.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %coroutine_name,
                        stack_size = stack_size,
                        "handler coroutine start"
                    );

                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let handler_name = req.handler_name.clone();
                        let request_id = req.request_id;

                        let started = Instant::now();
                        if let Err(panic) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                handler_fn(req);
                            }))
                        {
                            error!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                panic_message = ?panic,
                                "handler panicked"
                            );
                            let _ = reply_tx.send(HandlerResponse::error(500, "handler panicked"));
                        } else {
                            debug!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                execution_time_ms = started.elapsed().as_millis() as u64,
                                "handler execution complete"
                            );
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.remove(&name).is_some() {
            warn!(
                handler_name = %name,
                "replaced existing handler - old coroutine will exit"
            );
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len() + 1,
            "handler registered"
        );
        self.handlers.insert(name, tx);
    }

    /// Dispatch a matched request to its handler and wait for the response.
    ///
    /// Returns `None` when the match carries no handler name or no handler is
    /// registered under it (the service layer turns that into an error
    /// response). A closed reply channel, meaning the handler crashed or its
    /// coroutine died, yields a 503 instead of dropping the connection.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch(
        &self,
        request_id: RequestId,
        method: Method,
        path: &str,
        route_match: RouteMatch,
        body: Option<Value>,
        form_params: ParamVec,
        headers: HeaderVec,
        cookies: HeaderVec,
    ) -> Option<HandlerResponse> {
        let handler_name = route_match.handler_name.as_deref()?.to_string();

        let tx = match self.handlers.get(&handler_name) {
            Some(tx) => tx,
            None => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    available_handlers = self.handlers.len(),
                    "handler not found"
                );
                return None;
            }
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        let request = HandlerRequest {
            request_id,
            method,
            path: path.to_string(),
            handler_name,
            path_params: route_match.path_params,
            query_params: route_match.query_params,
            form_params,
            headers,
            cookies,
            body,
            reply_tx,
        };

        info!(
            request_id = %request_id,
            handler_name = %request.handler_name,
            method = %request.method,
            path = %request.path,
            "request dispatched to handler"
        );

        let start = Instant::now();
        if let Err(e) = tx.send(request.clone()) {
            error!(
                request_id = %request_id,
                handler_name = %request.handler_name,
                error = %e,
                "failed to send request to handler"
            );
            return None;
        }

        match reply_rx.recv() {
            Ok(response) => {
                info!(
                    request_id = %request_id,
                    handler_name = %request.handler_name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    status = response.status,
                    "handler response received"
                );
                Some(response)
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %request.handler_name,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "handler channel closed - handler may have crashed"
                );
                Some(HandlerResponse::error(503, "handler is not responding"))
            }
        }
    }
}
