use std::env;
use std::net::SocketAddr;
use std::time::SystemTime;

use hyper::header::ORIGIN;
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};

#[macro_use]
mod utils;
#[macro_use]
mod error;
mod authority;
mod campaigns;
mod catalog;
mod characters;
mod context;
mod cors;
mod database;
mod date_format;
mod interface;
mod locations;
mod logger;
mod maps;
mod missions;
mod notes;
mod npcs;
mod pool;
mod session;
mod users;
mod validators;

use database::pool::DbPool;
use interface::AppResult;

async fn router(req: Request<Body>, pool: &DbPool) -> AppResult {
    let path = req.uri().path().to_string();

    if let Some(rest) = path.strip_prefix("/users") {
        return users::handlers::router(req, rest, pool).await;
    }
    if let Some(rest) = path.strip_prefix("/campaigns") {
        return campaigns::handlers::router(req, rest, pool).await;
    }
    if let Some(rest) = path.strip_prefix("/system") {
        return catalog::handlers::router(req, rest, pool).await;
    }
    interface::missing()
}

async fn handler(req: Request<Body>, pool: DbPool) -> Result<Response<Body>, hyper::Error> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = SystemTime::now();
    if context::debug() && method == hyper::Method::OPTIONS {
        return Ok(cors::preflight_requests(req));
    }
    let origin = req.headers().get(ORIGIN).cloned();
    let mut response = router(req, &pool)
        .await
        .unwrap_or_else(|e| interface::error_response(&e));
    if context::debug() {
        response = cors::allow_origin(origin, response);
    }
    if let Ok(elapsed) = SystemTime::now().duration_since(start) {
        log::debug!("{} {} {} {}ms", method, uri, response.status(), elapsed.as_millis());
    }
    Ok(response)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    if let Err(e) = logger::setup_logger(context::debug()) {
        eprintln!("failed to initialize the logger: {}", e);
        return;
    }
    let _sentry = env::var("SENTRY_DSN")
        .ok()
        .map(|dsn| sentry::init((dsn, sentry::ClientOptions::default())));
    // Fail fast when the signing key is absent.
    context::secret();
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let pool = database::pool::init().await;
    let make_svc = make_service_fn::<_, AddrStream, _>(move |_| {
        let pool = pool.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                let pool = pool.clone();
                handler(req, pool)
            }))
        }
    });

    log::info!("listening on {}", addr);
    let server = Server::bind(&addr)
        .serve(make_svc)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        });

    if let Err(e) = server.await {
        log::error!("server error: {}", e);
    }
}
