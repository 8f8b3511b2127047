//! # HTTP API
//!
//! Axum handlers for the farmer registry and the health probe.
//!
//! ```text
//! GET    /health                          service name and version
//! GET    /api/v1/farmers?limit=&offset=   list farmers
//! POST   /api/v1/farmers                  register a farmer
//! PATCH  /api/v1/farmers?cpf_cnpj=        partially update a farmer
//! DELETE /api/v1/farmers?cpf_cnpj=        delete a farmer
//! ```
//!
//! Bodies are taken as raw bytes and parsed by [`crate::schemas`] so that shape
//! errors come back as a field map instead of axum's plain-text rejections.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::json;

use crate::schemas::{parse_create_body, parse_list_query, parse_update_body, require_cpf_cnpj};
use crate::{Farmer, FarmerError, FarmerRepository, ValidationErrors};

/// Repository handle shared by every farmer handler.
pub type SharedRepository = Arc<dyn FarmerRepository>;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "Agro API";

////////////////////////////////////////////// ApiError //////////////////////////////////////////////

/// Anything a farmer handler can fail with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request was malformed; reported field by field.
    Validation(ValidationErrors),
    /// The request was well formed but the operation failed.
    Farmer(FarmerError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Farmer(FarmerError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Farmer(
                FarmerError::AlreadyRegistered
                | FarmerError::AreaInvalid { .. }
                | FarmerError::Persistence(_),
            ) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<FarmerError> for ApiError {
    fn from(error: FarmerError) -> Self {
        ApiError::Farmer(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::Farmer(error) => {
                if let FarmerError::Persistence(msg) = &error {
                    tracing::error!(error = %msg, "farmer operation failed");
                }
                (status, Json(json!({ "message": error.to_string() }))).into_response()
            }
        }
    }
}

////////////////////////////////////////////// Handlers //////////////////////////////////////////////

/// Reports the service name and crate version.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Lists farmers one page at a time.
async fn list_farmers(
    State(repository): State<SharedRepository>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Farmer>>, ApiError> {
    let query = parse_list_query(&params)?;
    tracing::debug!(limit = query.limit, offset = query.offset, "listing farmers");
    let farmers = Farmer::get_all(query.limit, query.offset, repository.as_ref()).await?;
    Ok(Json(farmers))
}

/// Registers a farmer.
async fn create_farmer(
    State(repository): State<SharedRepository>,
    body: Bytes,
) -> Result<(StatusCode, Json<Farmer>), ApiError> {
    let data = parse_create_body(&body)?;
    let farmer = Farmer::create(data, repository.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(farmer)))
}

/// Partially updates the farmer named by the `cpf_cnpj` query parameter.
///
/// The query parameter is checked before the body is looked at.
async fn patch_farmer(
    State(repository): State<SharedRepository>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Farmer>, ApiError> {
    let cpf_cnpj = require_cpf_cnpj(&params)?;
    let changes = parse_update_body(&body)?;
    let farmer = Farmer::update(&cpf_cnpj, changes, repository.as_ref()).await?;
    Ok(Json(farmer))
}

/// Deletes the farmer named by the `cpf_cnpj` query parameter.
async fn delete_farmer(
    State(repository): State<SharedRepository>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cpf_cnpj = require_cpf_cnpj(&params)?;
    Farmer::delete(&cpf_cnpj, repository.as_ref()).await?;
    Ok(Json(json!({ "message": "OK" })))
}

////////////////////////////////////////////// Routers //////////////////////////////////////////////

/// Creates the farmer router; mount it under `/api/v1`.
pub fn create_farmer_router(repository: SharedRepository) -> Router {
    Router::new()
        .route(
            "/farmers",
            get(list_farmers)
                .post(create_farmer)
                .patch(patch_farmer)
                .delete(delete_farmer),
        )
        .with_state(repository)
}

/// Creates the router serving `/health`.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health))
}

/// Assembles the whole application.
pub fn create_app(repository: SharedRepository) -> Router {
    Router::new()
        .merge(create_health_router())
        .nest("/api/v1", create_farmer_router(repository))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryFarmerRepository;
    use crate::validate::MISSING_QUERY_PARAMETER;

    fn repository() -> SharedRepository {
        Arc::new(InMemoryFarmerRepository::new())
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Farmer(FarmerError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Farmer(FarmerError::AlreadyRegistered).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Farmer(FarmerError::Persistence("boom".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation(ValidationErrors::single("a", "b")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn health_reports_version() {
        let Json(body) = health().await;
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn delete_without_parameter_is_validation_error() {
        let result = delete_farmer(State(repository()), Query(HashMap::new())).await;
        match result {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.get("cpf_cnpj"), Some(MISSING_QUERY_PARAMETER));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn patch_checks_parameter_before_body() {
        let result = patch_farmer(
            State(repository()),
            Query(HashMap::new()),
            Bytes::from_static(b"not json"),
        )
        .await;
        match result {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.get("cpf_cnpj"), Some(MISSING_QUERY_PARAMETER));
                assert_eq!(errors.get("body"), None);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_missing_farmer_is_not_found() {
        let params = HashMap::from([("cpf_cnpj".to_string(), "42063478082".to_string())]);
        let result = delete_farmer(State(repository()), Query(params)).await;
        assert_eq!(result.unwrap_err(), ApiError::Farmer(FarmerError::NotFound));
    }
}
