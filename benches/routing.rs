use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use std::hint::black_box;

use treeline::router::Router;

fn build_router() -> Router {
    let mut router = Router::new();
    router.add_route(Method::GET, "/", "root").unwrap();
    router.add_route(Method::GET, "/health", "health").unwrap();
    for (i, resource) in ["pets", "users", "orders", "posts", "tags"]
        .iter()
        .enumerate()
    {
        router
            .add_route(Method::GET, &format!("/{resource}"), &format!("list_{i}"))
            .unwrap();
        router
            .add_route(Method::GET, &format!("/{resource}/:id"), &format!("get_{i}"))
            .unwrap();
        router
            .add_route(
                Method::GET,
                &format!("/{resource}/:id/notes/:note_id"),
                &format!("note_{i}"),
            )
            .unwrap();
        router
            .add_route(
                Method::POST,
                &format!("/{resource}"),
                &format!("create_{i}"),
            )
            .unwrap();
    }
    router.add_route(Method::GET, "/files/*", "file_any").unwrap();
    router
}

fn bench_resolve(c: &mut Criterion) {
    let router = build_router();

    c.bench_function("resolve_static", |b| {
        b.iter(|| router.resolve(black_box(&Method::GET), black_box("/health")))
    });

    c.bench_function("resolve_param", |b| {
        b.iter(|| router.resolve(black_box(&Method::GET), black_box("/users/12345")))
    });

    c.bench_function("resolve_deep_params", |b| {
        b.iter(|| router.resolve(black_box(&Method::GET), black_box("/orders/7/notes/99")))
    });

    c.bench_function("resolve_wildcard", |b| {
        b.iter(|| router.resolve(black_box(&Method::GET), black_box("/files/report.pdf")))
    });

    c.bench_function("resolve_miss", |b| {
        b.iter(|| router.resolve(black_box(&Method::GET), black_box("/does/not/exist")))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
