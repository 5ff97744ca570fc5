use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treeline::dispatcher::{HandlerResponse, SetCookie};
use treeline::server::{AppService, HttpServer};

/// Demo service exercising the router end to end.
#[derive(Parser, Debug)]
#[command(name = "treeline", about = "Run the treeline demo service")]
struct Args {
    /// Address to bind the server to.
    #[arg(long, env = "TREELINE_ADDR", default_value = "127.0.0.1:8087")]
    addr: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct User {
    name: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut app = AppService::new();

    app.get("/", "home", |req| {
        let _ = req
            .reply_tx
            .send(HandlerResponse::json(200, json!({ "service": "treeline" })));
    })?;

    app.get("/order/detail", "order_detail", |req| {
        let _ = req.reply_tx.send(HandlerResponse::json(
            200,
            json!({ "order": "detail view" }),
        ));
    })?;

    // Wildcard: any single segment under /order that is not `detail`.
    app.get("/order/*", "order_any", |req| {
        let _ = req.reply_tx.send(HandlerResponse::json(
            200,
            json!({ "order": req.path.clone() }),
        ));
    })?;

    app.get("/users/:id", "get_user", |req| {
        let id = req.get_path_param("id").unwrap_or("?").to_string();
        let _ = req
            .reply_tx
            .send(HandlerResponse::json(200, json!({ "id": id })));
    })?;

    app.post("/users", "create_user", |req| {
        let response = match req.json_body::<User>() {
            Ok(user) => HandlerResponse::json(201, json!({ "created": user.name })),
            Err(e) => HandlerResponse::error(400, &e.to_string()),
        };
        let _ = req.reply_tx.send(response);
    })?;

    app.post("/login", "login", |req| {
        let username = req.get_form_param("username").unwrap_or("anonymous");
        let mut response = HandlerResponse::json(200, json!({ "user": username }));
        response.set_cookie(&SetCookie::new("session", username).path("/").http_only());
        let _ = req.reply_tx.send(response);
    })?;

    info!(addr = %args.addr, "starting treeline demo service");
    let handle = HttpServer(app).start(&args.addr)?;
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))?;
    Ok(())
}
