use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::request::parse_request;
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::error::RouteError;
use crate::ids::RequestId;
use crate::router::Router;

/// The HTTP application: a route table plus its handler registry.
///
/// Routes are registered during startup through [`AppService::register`] (or
/// the verb shorthands); afterwards the service is cloned per server worker
/// and the shared router is only ever read. Registration does two things in
/// lockstep: grows the route tree and spawns the named handler's coroutine.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<RwLock<Router>>,
    pub dispatcher: Arc<RwLock<Dispatcher>>,
}

impl Default for AppService {
    fn default() -> Self {
        Self::new()
    }
}

impl AppService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Arc::new(RwLock::new(Router::new())),
            dispatcher: Arc::new(RwLock::new(Dispatcher::new())),
        }
    }

    /// Register `handler_fn` under `pattern` for `method`.
    ///
    /// `name` is the opaque handler reference stored in the route tree and
    /// used in logs; it must be unique per handler function (reusing a name
    /// rebinds the dispatcher entry for every route pointing at it).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] for malformed patterns and conflicting
    /// registrations. Callers should treat any error as fatal and refuse to
    /// start serving.
    pub fn register<F>(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        handler_fn: F,
    ) -> Result<(), RouteError>
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        self.router
            .write()
            .unwrap()
            .add_route(method, pattern, name)?;
        // SAFETY: handler registration spawns a may coroutine; registration
        // happens during single-threaded startup before serving begins.
        unsafe {
            self.dispatcher
                .write()
                .unwrap()
                .register_handler(name, handler_fn);
        }
        Ok(())
    }

    /// Register a GET route.
    ///
    /// # Errors
    ///
    /// See [`AppService::register`].
    pub fn get<F>(&mut self, pattern: &str, name: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        self.register(Method::GET, pattern, name, handler_fn)
    }

    /// Register a POST route.
    ///
    /// # Errors
    ///
    /// See [`AppService::register`].
    pub fn post<F>(&mut self, pattern: &str, name: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        self.register(Method::POST, pattern, name, handler_fn)
    }

    /// Register a PUT route.
    ///
    /// # Errors
    ///
    /// See [`AppService::register`].
    pub fn put<F>(&mut self, pattern: &str, name: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        self.register(Method::PUT, pattern, name, handler_fn)
    }

    /// Register a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`AppService::register`].
    pub fn delete<F>(&mut self, pattern: &str, name: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        self.register(Method::DELETE, pattern, name, handler_fn)
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let request_id = RequestId::from_header_or_new(parsed.header("x-request-id"));

        let method: Method = match parsed.method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_json_error(
                    res,
                    404,
                    json!({"error": "Not Found", "method": parsed.method, "path": parsed.path}),
                );
                return Ok(());
            }
        };

        let route_match = {
            let router = self.router.read().unwrap();
            router.resolve(&method, &parsed.path)
        };

        // A walk that completes on a handler-less node is answered exactly
        // like a miss: the path is recognized but nothing is bound there.
        let mut route_match = match route_match {
            Some(m) if m.handler_name.is_some() => m,
            other => {
                debug!(
                    request_id = %request_id,
                    method = %method,
                    path = %parsed.path,
                    matched_without_handler = other.is_some(),
                    "no handler bound for request"
                );
                write_json_error(
                    res,
                    404,
                    json!({"error": "Not Found", "method": parsed.method, "path": parsed.path}),
                );
                return Ok(());
            }
        };
        route_match.query_params = parsed.query_params;

        let handler_response = {
            let dispatcher = self.dispatcher.read().unwrap();
            dispatcher.dispatch(
                request_id,
                method,
                &parsed.path,
                route_match,
                parsed.body,
                parsed.form_params,
                parsed.headers,
                parsed.cookies,
            )
        };

        match handler_response {
            Some(hr) => write_handler_response(res, hr.status, &hr.headers, hr.body),
            None => write_json_error(
                res,
                500,
                json!({
                    "error": "Handler failed or not registered",
                    "method": parsed.method,
                    "path": parsed.path
                }),
            ),
        }
        Ok(())
    }
}
