//! HTTP request handlers for the school directory service.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use campus::{CampusError, NewSchool, SchoolWithDistance};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;

/// Request body for adding a school.
///
/// Every field is required; they are optional here so that a missing field
/// produces a JSON error body instead of a framework rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSchoolRequest {
    /// School name.
    #[schema(example = "Central High School")]
    pub name: Option<String>,
    /// Postal address.
    #[schema(example = "1 Main Street")]
    pub address: Option<String>,
    /// Latitude in decimal degrees (-90 to 90).
    #[schema(example = 12.9716)]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (-180 to 180).
    #[schema(example = 77.5946)]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

/// Successful insert response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddSchoolResponse {
    pub message: String,
    /// Id of the new school.
    #[serde(rename = "locationId")]
    pub location_id: u64,
}

/// Request body for listing schools by distance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSchoolsRequest {
    /// Latitude of the origin in decimal degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    /// Longitude of the origin in decimal degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accept coordinates sent either as JSON numbers or as numeric strings
/// (`"12.97"`), which form-driven clients commonly produce.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {:?}", text))),
    }
}

/// A school with its distance from the query origin.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolLocation {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance from the origin in kilometres.
    pub distance: f64,
}

impl From<SchoolWithDistance> for SchoolLocation {
    fn from(entry: SchoolWithDistance) -> Self {
        Self {
            id: entry.school.id,
            name: entry.school.name,
            address: entry.school.address,
            latitude: entry.school.latitude,
            longitude: entry.school.longitude,
            distance: entry.distance,
        }
    }
}

/// Distance-sorted school list.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListSchoolsResponse {
    pub message: String,
    /// Schools, nearest first.
    pub locations: Vec<SchoolLocation>,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Usage statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of stored schools.
    pub schools: usize,
    /// Successful inserts since startup.
    pub inserts: u64,
    /// Distance queries since startup.
    pub queries: u64,
}

/// Greeting.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Greeting text", body = String))
)]
pub async fn root() -> &'static str {
    "Hello from the campus school directory"
}

/// Add a school.
///
/// # Returns
///
/// - `200 OK` with the new id
/// - `400 Bad Request` if a field is missing or invalid
/// - `500 Internal Server Error` if storage fails
#[utoipa::path(
    post,
    path = "/addSchool",
    tag = "schools",
    request_body = AddSchoolRequest,
    responses(
        (status = 200, description = "School stored", body = AddSchoolResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn add_school(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddSchoolRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_body(rejection),
    };
    let (Some(name), Some(address), Some(latitude), Some(longitude)) = (
        request.name,
        request.address,
        request.latitude,
        request.longitude,
    ) else {
        return bad_request("Name, address, latitude and longitude are required");
    };

    match state
        .school_service
        .add_school(NewSchool::new(name, address, latitude, longitude))
    {
        Ok(id) => (
            StatusCode::OK,
            Json(AddSchoolResponse {
                message: "Location added successfully".to_string(),
                location_id: id,
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Error adding location"),
    }
}

/// List all schools sorted by distance from the given coordinates.
///
/// # Returns
///
/// - `200 OK` with schools nearest first
/// - `400 Bad Request` if coordinates are missing or out of range
/// - `500 Internal Server Error` on storage failure
#[utoipa::path(
    post,
    path = "/listSchools",
    tag = "schools",
    request_body = ListSchoolsRequest,
    responses(
        (status = 200, description = "Schools sorted by distance", body = ListSchoolsResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_schools(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ListSchoolsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_body(rejection),
    };
    let (Some(latitude), Some(longitude)) = (request.latitude, request.longitude) else {
        return bad_request("Latitude and longitude are required");
    };

    tracing::debug!(lat = latitude, lon = longitude, "List schools query");

    match state.school_service.list_schools(latitude, longitude) {
        Ok(schools) => (
            StatusCode::OK,
            Json(ListSchoolsResponse {
                message: "Locations sorted by distance".to_string(),
                locations: schools.into_iter().map(SchoolLocation::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Internal server error"),
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn rejected_body(rejection: JsonRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection, "Rejected request body");
    bad_request(&format!("Invalid request body: {}", rejection.body_text()))
}

/// Map a service error to a response. Validation errors are reported back to
/// the client; anything else is logged and answered with `fallback`.
fn error_response(e: CampusError, fallback: &str) -> axum::response::Response {
    match &e {
        CampusError::InvalidCoordinate { .. } | CampusError::InvalidField { .. } => {
            tracing::warn!(error = %e, "Rejected request");
            bad_request(&e.to_string())
        }
        _ => {
            tracing::error!(error = %e, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: fallback.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get usage statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses(
        (status = 200, description = "Usage counters", body = StatsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.school_service.stats() {
        Ok(stats) => Json(StatsResponse {
            schools: stats.schools,
            inserts: stats.inserts,
            queries: stats.queries,
        })
        .into_response(),
        Err(e) => error_response(e, "Internal server error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus::School;

    #[test]
    fn test_add_school_request_deserialize() {
        let json = r#"{"name": "Alpha", "address": "1 Main St", "latitude": 12.5, "longitude": 77.5}"#;
        let request: AddSchoolRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name.as_deref(), Some("Alpha"));
        assert_eq!(request.latitude, Some(12.5));

        let request: AddSchoolRequest = serde_json::from_str(r#"{"name": "Alpha"}"#).unwrap();
        assert!(request.address.is_none());
    }

    #[test]
    fn test_coordinates_accept_numeric_strings() {
        let json = r#"{"latitude": "12.9", "longitude": " -77.5 "}"#;
        let request: ListSchoolsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.latitude, Some(12.9));
        assert_eq!(request.longitude, Some(-77.5));

        let request: ListSchoolsRequest =
            serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        assert!(request.latitude.is_none());
        assert!(request.longitude.is_none());

        assert!(serde_json::from_str::<ListSchoolsRequest>(r#"{"latitude": "north"}"#).is_err());
        assert!(serde_json::from_str::<ListSchoolsRequest>(r#"{"latitude": true}"#).is_err());
    }

    #[test]
    fn test_add_school_response_serialize() {
        let response = AddSchoolResponse {
            message: "Location added successfully".to_string(),
            location_id: 42,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"locationId\":42"));
    }

    #[test]
    fn test_school_location_from_entry() {
        let entry = SchoolWithDistance {
            school: School {
                id: 3,
                name: "Alpha".to_string(),
                address: "1 Main St".to_string(),
                latitude: 1.0,
                longitude: 2.0,
            },
            distance: 12.25,
        };
        let location = SchoolLocation::from(entry);
        assert_eq!(location.id, 3);
        assert_eq!(location.distance, 12.25);
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
