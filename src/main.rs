use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use hextview::config::Config;
use hextview::extension::TypeTables;
use hextview::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hextview=info,tower_http=info".into()),
        )
        .init();

    let config = Config::parse();
    let state = AppState::new(
        TypeTables::builtin(),
        config.release_delay(),
        config.ticket_ttl(),
    );

    let mut app = hextview::router(state).layer(DefaultBodyLimit::max(config.max_upload_bytes));

    if let Some(origin) = config.cors_origin.clone() {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE]);
        app = app.layer(cors);
    }

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("hextview listening on {addr}");
    axum::serve(listener, app).await
}
