//! # REST Handlers
//!
//! Request handlers for REST endpoints.
//!
//! This module provides axum handlers for the quotation and estimate
//! workflows. The caller's role is supplied by the identity context of
//! the deployment (here a query parameter) and is used only to select
//! which projection is returned — the engine performs no
//! authentication itself.
//!
//! # Endpoints
//!
//! ## Quotations (staff)
//! - `POST /api/v1/quotations` - Calculate and assemble a draft
//! - `GET /api/v1/quotations/{id}` - Role-selected projection
//! - `POST /api/v1/quotations/{id}/send` - Send to the customer
//! - `POST /api/v1/quotations/{id}/override` - Audited manual override
//!
//! ## Quotations (customer)
//! - `POST /api/v1/quotations/{id}/accept` - Accept inside the window
//! - `POST /api/v1/quotations/{id}/reject` - Reject
//! - `GET /api/v1/customers/{id}/quotations` - Sanitized list
//!
//! ## Estimates (guest)
//! - `POST /api/v1/estimates` - Final price only
//! - `POST /api/v1/estimates/{code}/convert` - Link to a real request
//!
//! ## Health
//! - `GET /api/v1/health`

use crate::application::dto::quotation_views::{
    QuotationExternalView, QuotationInternalView, QuotationView, external_view, internal_view,
};
use crate::application::error::ApplicationError;
use crate::application::services::calculation::CalculationRequest;
use crate::application::services::estimate::{EstimateResult, EstimateService};
use crate::application::services::quotation_service::QuotationService;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{
    CallerRole, CustomerId, EstimateCode, Money, PortCode, QuotationId, RequestId, ServiceCategory,
    ServiceInputs, StaffId, Timestamp,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for REST handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Staff quotation workflow.
    pub quotations: QuotationService,
    /// Guest estimation workflow.
    pub estimates: EstimateService,
}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// True when retrying the same call may succeed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorResponse {
    /// Creates a new error response.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable: false,
        }
    }
}

/// The `(status, body)` pair axum turns into a response.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: ApplicationError) -> ApiError {
    let retryable = err.is_retryable();
    let (status, code) = match &err {
        ApplicationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ApplicationError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ApplicationError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ApplicationError::Conflict(_) => (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION"),
        ApplicationError::Domain(domain) => match domain {
            DomainError::NoApplicableRules(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NO_PRICING_AVAILABLE")
            }
            DomainError::EstimateExpired(_) => (StatusCode::GONE, "ESTIMATE_EXPIRED"),
            DomainError::OverrideWithoutReason => {
                (StatusCode::BAD_REQUEST, "OVERRIDE_REASON_REQUIRED")
            }
            DomainError::QuotationExpired(_) => (StatusCode::CONFLICT, "QUOTATION_EXPIRED"),
            d if d.is_validation_error() => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            d if d.is_state_error() => (StatusCode::CONFLICT, "INVALID_STATE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        },
        ApplicationError::Infrastructure(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    let mut body = ErrorResponse::new(code, err.to_string());
    body.retryable = retryable;
    (status, Json(body))
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Body of `POST /api/v1/quotations`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuotationRequest {
    /// The customer the quotation is for.
    pub customer_id: Uuid,
    /// The staff member generating it, if any.
    pub staff_id: Option<Uuid>,
    /// The originating service request, if any.
    pub request_id: Option<Uuid>,
    /// The service line (e.g. `SHIPPING_AGENCY`).
    pub service_category: String,
    /// Port of call / route origin.
    pub port: Option<String>,
    /// Route destination.
    pub destination: Option<String>,
    /// Rate as-of date; defaults to today.
    pub as_of: Option<NaiveDate>,
    /// Named numeric inputs (GRT, DWT, container counts, ...).
    pub inputs: BTreeMap<String, Decimal>,
}

impl CreateQuotationRequest {
    fn into_calculation(self) -> Result<(CustomerId, Option<StaffId>, Option<RequestId>, CalculationRequest), ApplicationError>
    {
        let service_category: ServiceCategory = self
            .service_category
            .parse()
            .map_err(|_| ApplicationError::validation("unknown service category"))?;
        let request = CalculationRequest {
            service_category,
            port: self.port.as_deref().map(PortCode::new),
            destination: self.destination.as_deref().map(PortCode::new),
            as_of: self.as_of.unwrap_or_else(|| Timestamp::now().date()),
            inputs: ServiceInputs::from_pairs(self.inputs),
        };
        Ok((
            CustomerId::new(self.customer_id),
            self.staff_id.map(StaffId::new),
            self.request_id.map(RequestId::new),
            request,
        ))
    }
}

/// Query parameters of `GET /api/v1/quotations/{id}`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ViewParams {
    /// Caller role (`STAFF`, `CUSTOMER`, `GUEST`); defaults to customer.
    pub role: Option<String>,
    /// Internal cost baseline the margin is computed against.
    pub cost_baseline: Option<Decimal>,
}

/// Body of accept/reject calls.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    /// The responding customer; must own the quotation.
    pub customer_id: Uuid,
    /// Optional response note.
    pub note: Option<String>,
}

/// Body of `POST /api/v1/quotations/{id}/override`.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRequest {
    /// The staff member applying the override.
    pub staff_id: Uuid,
    /// The new final amount.
    pub amount: Decimal,
    /// Mandatory justification.
    pub reason: String,
}

/// Body of `POST /api/v1/estimates`.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    /// The service line (e.g. `FREIGHT_FORWARDING`).
    pub service_category: String,
    /// Port of call / route origin.
    pub port: Option<String>,
    /// Route destination.
    pub destination: Option<String>,
    /// Named numeric inputs.
    pub inputs: BTreeMap<String, Decimal>,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional guest session id.
    pub session_id: Option<String>,
}

/// Body of `POST /api/v1/estimates/{code}/convert`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRequest {
    /// The created service request to link.
    pub request_id: Uuid,
}

/// Response of estimate conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    /// The converted estimate code.
    pub code: EstimateCode,
    /// The linked request.
    pub request_id: Uuid,
}

/// Lifecycle operation response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// The quotation id.
    pub id: QuotationId,
    /// The quotation's status after the operation.
    pub status: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/v1/health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/v1/quotations` — staff: calculate and assemble a draft.
///
/// # Errors
///
/// `422 NO_PRICING_AVAILABLE` when no fee rule applies, `400` for an
/// unknown service category.
pub async fn create_quotation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<QuotationInternalView>), ApiError> {
    let (customer, staff, request_id, request) = body.into_calculation().map_err(api_error)?;
    let quotation = state
        .quotations
        .generate(customer, staff, request_id, request)
        .await
        .map_err(api_error)?;
    let view = internal_view(&quotation, Money::ZERO);
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/v1/quotations/{id}` — projection selected by caller role.
///
/// # Errors
///
/// `404` for an unknown quotation.
pub async fn get_quotation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ViewParams>,
) -> Result<Json<QuotationView>, ApiError> {
    let role = params
        .role
        .as_deref()
        .map(str::parse::<CallerRole>)
        .transpose()
        .map_err(|_| api_error(ApplicationError::validation("unknown caller role")))?
        .unwrap_or(CallerRole::Customer);
    let cost_baseline = params
        .cost_baseline
        .map(Money::new)
        .transpose()
        .map_err(|_| api_error(ApplicationError::validation("invalid cost baseline")))?;
    let view = state
        .quotations
        .view(QuotationId::new(id), role, cost_baseline)
        .await
        .map_err(api_error)?;
    Ok(Json(view))
}

/// `GET /api/v1/customers/{id}/quotations` — sanitized customer list.
///
/// # Errors
///
/// Propagates persistence failures as `500`.
pub async fn list_customer_quotations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuotationExternalView>>, ApiError> {
    let quotations = state
        .quotations
        .list_for_customer(CustomerId::new(id))
        .await
        .map_err(api_error)?;
    let today = Timestamp::now().date();
    let views = quotations
        .iter()
        .map(|q| external_view(q, today))
        .collect();
    Ok(Json(views))
}

/// `POST /api/v1/quotations/{id}/send`
///
/// # Errors
///
/// `409 INVALID_STATE` outside draft.
pub async fn send_quotation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let quotation = state
        .quotations
        .send(QuotationId::new(id))
        .await
        .map_err(api_error)?;
    Ok(Json(StatusResponse {
        id: quotation.id(),
        status: quotation.status().to_string(),
    }))
}

/// `POST /api/v1/quotations/{id}/accept`
///
/// # Errors
///
/// `401` for a foreign customer, `409` outside the sent state or past
/// the validity window.
pub async fn accept_quotation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let quotation = state
        .quotations
        .accept(QuotationId::new(id), CustomerId::new(body.customer_id), body.note)
        .await
        .map_err(api_error)?;
    Ok(Json(StatusResponse {
        id: quotation.id(),
        status: quotation.status().to_string(),
    }))
}

/// `POST /api/v1/quotations/{id}/reject`
///
/// # Errors
///
/// `401` for a foreign customer, `409` outside the sent state.
pub async fn reject_quotation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let quotation = state
        .quotations
        .reject(QuotationId::new(id), CustomerId::new(body.customer_id), body.note)
        .await
        .map_err(api_error)?;
    Ok(Json(StatusResponse {
        id: quotation.id(),
        status: quotation.status().to_string(),
    }))
}

/// `POST /api/v1/quotations/{id}/override` — audited manual override.
///
/// The reason is validated before any persistence.
///
/// # Errors
///
/// `400 OVERRIDE_REASON_REQUIRED` for a blank reason, `409` on
/// terminal quotations or concurrent modification.
pub async fn override_quotation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<OverrideRequest>,
) -> Result<Json<QuotationInternalView>, ApiError> {
    let amount = Money::new(body.amount)
        .map_err(|_| api_error(ApplicationError::validation("invalid override amount")))?;
    let quotation = state
        .quotations
        .override_price(
            QuotationId::new(id),
            StaffId::new(body.staff_id),
            amount,
            &body.reason,
        )
        .await
        .map_err(api_error)?;
    Ok(Json(internal_view(&quotation, Money::ZERO)))
}

/// `POST /api/v1/estimates` — guest: final price only.
///
/// # Errors
///
/// `422 NO_PRICING_AVAILABLE` when no fee rule applies.
pub async fn create_estimate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EstimateRequest>,
) -> Result<(StatusCode, Json<EstimateResult>), ApiError> {
    let service_category: ServiceCategory = body
        .service_category
        .parse()
        .map_err(|_| api_error(ApplicationError::validation("unknown service category")))?;
    let request = CalculationRequest {
        service_category,
        port: body.port.as_deref().map(PortCode::new),
        destination: body.destination.as_deref().map(PortCode::new),
        as_of: Timestamp::now().date(),
        inputs: ServiceInputs::from_pairs(body.inputs),
    };
    let result = state
        .estimates
        .estimate(request, body.email, body.session_id)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// `POST /api/v1/estimates/{code}/convert`
///
/// # Errors
///
/// `410 ESTIMATE_EXPIRED` for an expired estimate, `404` for an
/// unknown code.
pub async fn convert_estimate(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(body): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let code = EstimateCode::new(code);
    let estimate = state
        .estimates
        .convert(&code, RequestId::new(body.request_id))
        .await
        .map_err(api_error)?;
    Ok(Json(ConvertResponse {
        code: estimate.estimate_code().clone(),
        request_id: body.request_id,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_no_pricing_is_unprocessable() {
        let err: ApplicationError =
            DomainError::NoApplicableRules("CHARTERING".to_string()).into();
        let (status, body) = api_error(err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "NO_PRICING_AVAILABLE");
    }

    #[test]
    fn error_mapping_conflict_is_retryable_409() {
        let (status, body) = api_error(ApplicationError::conflict("version mismatch"));
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.retryable);
    }

    #[test]
    fn error_mapping_expired_estimate_is_gone() {
        let err: ApplicationError = DomainError::EstimateExpired("EST-1".to_string()).into();
        let (status, body) = api_error(err);
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body.code, "ESTIMATE_EXPIRED");
    }

    #[test]
    fn error_mapping_override_without_reason_is_bad_request() {
        let err: ApplicationError = DomainError::OverrideWithoutReason.into();
        let (status, body) = api_error(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "OVERRIDE_REASON_REQUIRED");
    }

    #[test]
    fn create_request_parses_category_and_inputs() {
        let body = CreateQuotationRequest {
            customer_id: Uuid::new_v4(),
            staff_id: None,
            request_id: None,
            service_category: "shipping-agency".to_string(),
            port: Some("haiphong".to_string()),
            destination: None,
            as_of: None,
            inputs: BTreeMap::from([("GRT".to_string(), Decimal::new(20_000, 0))]),
        };
        let (_, _, _, request) = body.into_calculation().unwrap();
        assert_eq!(request.service_category, ServiceCategory::ShippingAgency);
        assert_eq!(request.port.unwrap().as_str(), "HAIPHONG");
        assert_eq!(request.inputs.get("grt"), Some(Decimal::new(20_000, 0)));
    }

    #[test]
    fn create_request_rejects_unknown_category() {
        let body = CreateQuotationRequest {
            customer_id: Uuid::new_v4(),
            staff_id: None,
            request_id: None,
            service_category: "TOWING".to_string(),
            port: None,
            destination: None,
            as_of: None,
            inputs: BTreeMap::new(),
        };
        assert!(body.into_calculation().is_err());
    }
}
