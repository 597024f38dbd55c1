//! # REST API
//!
//! REST endpoints using axum for the quotation platform.
//!
//! The handlers delegate to the application workflows and select the
//! quotation projection from the caller's role; confidential breakdown
//! fields only ever appear in the staff projection.
//!
//! # Usage
//!
//! ```ignore
//! use seaquote::api::rest::{AppState, create_router};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState { quotations, estimates });
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    AppState, ConvertRequest, ConvertResponse, CreateQuotationRequest, ErrorResponse,
    EstimateRequest, HealthResponse, OverrideRequest, RespondRequest, StatusResponse, ViewParams,
};
pub use routes::create_router;
