//! Behavior tests for route registration and resolution.
//!
//! Covers the full child-selection policy (static > parameter > wildcard),
//! the registration validation ladder, conflict detection, and the
//! found-without-handler edge that callers must treat like a miss.

use http::Method;
use treeline::router::Router;
use treeline::RouteError;

fn demo_router() -> Router {
    let mut r = Router::new();
    r.add_route(Method::GET, "/", "root").unwrap();
    r.add_route(Method::DELETE, "/", "delete_root").unwrap();
    r.add_route(Method::GET, "/user", "user").unwrap();
    r.add_route(Method::GET, "/user/home", "user_home").unwrap();
    r.add_route(Method::GET, "/order/detail", "order_detail")
        .unwrap();
    r.add_route(Method::GET, "/order/*", "order_any").unwrap();
    r.add_route(Method::POST, "/order/create", "order_create")
        .unwrap();
    r.add_route(Method::POST, "/login/:username", "login").unwrap();
    r
}

fn assert_handler(router: &Router, method: Method, path: &str, expected: &str) {
    let m = router
        .resolve(&method, path)
        .unwrap_or_else(|| panic!("expected {method} {path} to match"));
    assert_eq!(
        m.handler_name.as_deref(),
        Some(expected),
        "handler mismatch for {method} {path}"
    );
}

#[test]
fn test_registered_patterns_resolve_to_their_handlers() {
    let router = demo_router();
    assert_handler(&router, Method::GET, "/", "root");
    assert_handler(&router, Method::GET, "/user", "user");
    assert_handler(&router, Method::GET, "/user/home", "user_home");
    assert_handler(&router, Method::GET, "/order/detail", "order_detail");
    assert_handler(&router, Method::POST, "/order/create", "order_create");
}

#[test]
fn test_static_wins_over_wildcard_at_same_level() {
    let router = demo_router();
    // Both /order/detail and /order/* exist; the literal segment wins.
    assert_handler(&router, Method::GET, "/order/detail", "order_detail");
    assert_handler(&router, Method::GET, "/order/abc", "order_any");
}

#[test]
fn test_static_wins_over_param_at_same_level() {
    let mut router = Router::new();
    router
        .add_route(Method::GET, "/order/detail", "order_detail")
        .unwrap();
    router.add_route(Method::GET, "/order/:id", "order_by_id").unwrap();
    assert_handler(&router, Method::GET, "/order/detail", "order_detail");
    assert_handler(&router, Method::GET, "/order/42", "order_by_id");
}

#[test]
fn test_param_capture() {
    let router = demo_router();
    let m = router.resolve(&Method::POST, "/login/wujie").unwrap();
    assert_eq!(m.handler_name.as_deref(), Some("login"));
    assert_eq!(m.get_path_param("username"), Some("wujie"));
    assert_eq!(
        m.path_params_map(),
        std::collections::HashMap::from([("username".to_string(), "wujie".to_string())])
    );
}

#[test]
fn test_multi_param_capture() {
    let mut router = Router::new();
    router
        .add_route(Method::GET, "/users/:user_id/posts/:post_id", "get_post")
        .unwrap();
    let m = router.resolve(&Method::GET, "/users/7/posts/99").unwrap();
    assert_eq!(m.get_path_param("user_id"), Some("7"));
    assert_eq!(m.get_path_param("post_id"), Some("99"));
}

#[test]
fn test_wildcard_does_not_capture_params() {
    let router = demo_router();
    let m = router.resolve(&Method::GET, "/order/abc").unwrap();
    assert_eq!(m.handler_name.as_deref(), Some("order_any"));
    assert!(m.path_params.is_empty());
}

#[test]
fn test_wildcard_catches_literal_path_when_no_static_sibling() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/order/*", "order_any").unwrap();
    // Without a static `detail` sibling, the wildcard takes the segment and
    // captures nothing.
    let m = router.resolve(&Method::GET, "/order/detail").unwrap();
    assert_eq!(m.handler_name.as_deref(), Some("order_any"));
    assert!(m.path_params.is_empty());
}

#[test]
fn test_wildcard_matches_exactly_one_segment() {
    let router = demo_router();
    // /order/* has no structure beneath the wildcard, so deeper paths miss.
    assert!(router.resolve(&Method::GET, "/order/a/b").is_none());

    // Structure beneath a wildcard node is reachable segment by segment.
    let mut router = Router::new();
    router
        .add_route(Method::GET, "/files/*/download", "download")
        .unwrap();
    assert_handler(&router, Method::GET, "/files/report/download", "download");
    assert!(router.resolve(&Method::GET, "/files/report").unwrap().handler_name.is_none());
    assert!(router.resolve(&Method::GET, "/files/a/b/c").is_none());
}

#[test]
fn test_root_before_and_after_registration() {
    let mut router = Router::new();
    assert!(router.resolve(&Method::GET, "/").is_none());

    router.add_route(Method::GET, "/", "root").unwrap();
    assert_handler(&router, Method::GET, "/", "root");
}

#[test]
fn test_root_found_without_handler() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/user", "user").unwrap();
    // The GET tree exists, so "/" resolves, but nothing is bound at the root.
    let m = router.resolve(&Method::GET, "/").unwrap();
    assert!(m.handler_name.is_none());
}

#[test]
fn test_intermediate_node_found_without_handler() {
    let router = demo_router();
    // /order was never registered directly; only /order/detail and /order/*.
    let m = router.resolve(&Method::POST, "/order").unwrap();
    assert!(m.handler_name.is_none());
    assert!(m.path_params.is_empty());
}

#[test]
fn test_unregistered_method_is_not_found() {
    let router = demo_router();
    assert!(router.resolve(&Method::OPTIONS, "/order/detail").is_none());
    assert!(router.resolve(&Method::PUT, "/").is_none());
}

#[test]
fn test_unknown_path_is_not_found() {
    let router = demo_router();
    assert!(router.resolve(&Method::GET, "/aaaabbbccc").is_none());
    assert!(router.resolve(&Method::GET, "/user/home/deeper").is_none());
}

#[test]
fn test_trailing_slash_on_lookup_is_trimmed() {
    let router = demo_router();
    assert_handler(&router, Method::GET, "/user/home/", "user_home");
    assert_handler(&router, Method::GET, "user/home", "user_home");
}

#[test]
fn test_malformed_patterns_rejected() {
    let mut router = Router::new();
    let cases = [
        ("", RouteError::EmptyPattern),
        (
            "login",
            RouteError::MissingLeadingSlash("login".to_string()),
        ),
        ("/a/b/c/", RouteError::TrailingSlash("/a/b/c/".to_string())),
        ("/a////b", RouteError::EmptySegment("/a////b".to_string())),
        ("//login", RouteError::EmptySegment("//login".to_string())),
    ];
    for (pattern, expected) in cases {
        let err = router
            .add_route(Method::GET, pattern, "h")
            .expect_err(pattern);
        assert_eq!(err, expected);
        assert!(err.is_malformed());
    }
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/a/b/c", "first").unwrap();
    let err = router.add_route(Method::GET, "/a/b/c", "second").unwrap_err();
    assert_eq!(err, RouteError::DuplicateRoute("/a/b/c".to_string()));
    assert!(err.is_conflict());

    // The original binding survives the failed attempt.
    assert_handler(&router, Method::GET, "/a/b/c", "first");
}

#[test]
fn test_duplicate_root_registration_rejected() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/", "root").unwrap();
    let err = router.add_route(Method::GET, "/", "root_again").unwrap_err();
    assert_eq!(err, RouteError::DuplicateRoute("/".to_string()));
}

#[test]
fn test_same_pattern_different_methods_is_fine() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/items", "list_items").unwrap();
    router.add_route(Method::POST, "/items", "create_item").unwrap();
    assert_handler(&router, Method::GET, "/items", "list_items");
    assert_handler(&router, Method::POST, "/items", "create_item");
}

#[test]
fn test_param_then_wildcard_conflict() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/a/:id", "by_id").unwrap();
    let err = router.add_route(Method::GET, "/a/*", "any").unwrap_err();
    assert_eq!(err, RouteError::WildcardAfterParam("/a/*".to_string()));
    assert!(err.is_conflict());
}

#[test]
fn test_wildcard_then_param_conflict() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/a/*", "any").unwrap();
    let err = router.add_route(Method::GET, "/a/:id", "by_id").unwrap_err();
    assert_eq!(err, RouteError::ParamAfterWildcard("/a/:id".to_string()));
    assert!(err.is_conflict());
}

#[test]
fn test_two_param_names_at_same_position_conflict() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/a/:id", "by_id").unwrap();
    let err = router.add_route(Method::GET, "/a/:name", "by_name").unwrap_err();
    assert_eq!(
        err,
        RouteError::ParamNameClash {
            pattern: "/a/:name".to_string(),
            existing: ":id".to_string(),
        }
    );

    // Deepening the existing parameter is not a clash.
    router.add_route(Method::GET, "/a/:id/edit", "edit").unwrap();
    assert_handler(&router, Method::GET, "/a/7/edit", "edit");
}

#[test]
fn test_static_and_dynamic_children_coexist() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/zoo/keepers", "keepers").unwrap();
    router.add_route(Method::GET, "/zoo/:animal", "animal").unwrap();
    router.add_route(Method::GET, "/zoo/:animal/diet", "diet").unwrap();

    assert_handler(&router, Method::GET, "/zoo/keepers", "keepers");
    assert_handler(&router, Method::GET, "/zoo/panda", "animal");
    assert_handler(&router, Method::GET, "/zoo/panda/diet", "diet");
    // First matching branch wins unconditionally: once `keepers` matches the
    // static child, its subtree is the only one considered.
    assert!(router.resolve(&Method::GET, "/zoo/keepers/diet").is_none());
}
