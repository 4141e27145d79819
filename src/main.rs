//! Server binary: env config, tracing, pool setup, schema, serve.

use axum::Router;
use campus_events::{api_routes, apply_schema, connect_pool, routes, AppState};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("campus_events=info".parse()?),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://campus_events.db".into());
    let pool = connect_pool(&database_url).await?;
    apply_schema(&pool).await?;
    let state = AppState { pool };

    let app = Router::new()
        .merge(routes::common_routes_with_ready(state.clone()))
        .merge(api_routes(state))
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
