//! Campus Service - HTTP microservice for school locations.
//!
//! Stores schools and lists them sorted by great-circle distance from a
//! given point.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PORT` | HTTP server port | 3000 |
//! | `CAMPUS_DEBUG_LEN` | Max bytes in traced packet dumps (`0` = unlimited) | 256 |
//! | `CAMPUS_CHARSET` | Connection charset used when rendering statements | utf8mb4 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug", "campus=trace") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /` - Greeting
//! - `POST /addSchool` - Add a school
//! - `POST /listSchools` - Schools sorted by distance from a point
//! - `GET /health` - Health check
//! - `GET /stats` - Usage statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use campus::SchoolServiceBuilder;
use campus_service::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_service=info,campus=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    // The library handles CAMPUS_DEBUG_LEN and CAMPUS_CHARSET
    let school_service = SchoolServiceBuilder::from_env()?.build();

    tracing::info!(
        charset = %school_service.connection().charset,
        max_dump_length = ?school_service.dump_config().max_dump_length(),
        port = port,
        "Starting campus service"
    );

    let state = Arc::new(AppState { school_service });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
