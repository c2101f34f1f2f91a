//! Campus Service Library
//!
//! HTTP handlers, router and OpenAPI document for the school directory
//! service. This library is used by both the campus-service binary and
//! integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use campus::SchoolService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// School directory used by every endpoint.
    pub school_service: SchoolService,
}

/// OpenAPI documentation for the campus service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus School Directory",
        version = "0.1.0",
        description = "Store school locations and list them sorted by distance.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::root,
        handlers::add_school,
        handlers::list_schools,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::AddSchoolRequest,
            handlers::AddSchoolResponse,
            handlers::ListSchoolsRequest,
            handlers::ListSchoolsResponse,
            handlers::SchoolLocation,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "schools", description = "School location endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::root))
        .route("/addSchool", post(handlers::add_school))
        .route("/listSchools", post(handlers::list_schools))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    AddSchoolRequest, AddSchoolResponse, ErrorResponse, HealthResponse, ListSchoolsRequest,
    ListSchoolsResponse, SchoolLocation, StatsResponse,
};
