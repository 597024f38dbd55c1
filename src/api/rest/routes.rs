//! # REST Routes
//!
//! Route definitions for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! /api/v1
//! ├── /health                        GET  - Health check
//! ├── /quotations                    POST - Calculate + assemble (staff)
//! │   └── /{id}                      GET  - Role-selected projection
//! │       ├── /send                  POST - Draft → Sent
//! │       ├── /accept                POST - Customer accepts
//! │       ├── /reject                POST - Customer rejects
//! │       └── /override              POST - Audited manual override
//! ├── /customers/{id}/quotations     GET  - Sanitized customer list
//! └── /estimates                     POST - Guest estimate
//!     └── /{code}/convert            POST - Estimate → request link
//! ```

use crate::api::rest::handlers::{
    AppState, accept_quotation, convert_estimate, create_estimate, create_quotation,
    get_quotation, health_check, list_customer_quotations, override_quotation, reject_quotation,
    send_quotation,
};
use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Creates the REST API router with all endpoints and middleware.
///
/// # Arguments
///
/// * `state` - Shared application state containing the workflows
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    let quotation_routes = Router::new()
        .route("/", post(create_quotation))
        .route("/{id}", get(get_quotation))
        .route("/{id}/send", post(send_quotation))
        .route("/{id}/accept", post(accept_quotation))
        .route("/{id}/reject", post(reject_quotation))
        .route("/{id}/override", post(override_quotation));

    let estimate_routes = Router::new()
        .route("/", post(create_estimate))
        .route("/{code}/convert", post(convert_estimate));

    let api = Router::new()
        .route("/health", get(health_check))
        .nest("/quotations", quotation_routes)
        .nest("/estimates", estimate_routes)
        .route("/customers/{id}/quotations", get(list_customer_quotations));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
