#![allow(dead_code)]

use axum::{http::StatusCode, response::Html, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const LISTING_FIXTURE: &str = include_str!("fixtures/ukrbonds_sense.html");

/// Local stand-in for the broker site.
///
/// `/ukrbonds` serves the saved listing, `/down` answers 503.
pub async fn spawn_listing_server() -> SocketAddr {
    let app = Router::new()
        .route("/ukrbonds", get(|| async { Html(LISTING_FIXTURE) }))
        .route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listing server");
    let addr = listener.local_addr().expect("listing server has no address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("listing server failed");
    });
    addr
}

/// An address nothing listens on
pub fn unreachable_url() -> String {
    "http://127.0.0.1:1/ukrbonds".to_string()
}
