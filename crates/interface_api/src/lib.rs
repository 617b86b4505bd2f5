//! HTTP API Layer
//!
//! This crate provides the REST API for the warranty claim workflow using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims, campaigns, vehicles, and appointments
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses with a `transient` retry hint
//!
//! Handlers hold no logic of their own; every route calls one
//! [`WarrantyWorkflow`] operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(workflow, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_warranty::WarrantyWorkflow;

use crate::config::ApiConfig;
use crate::handlers::{appointments, campaigns, claims, health, vehicles};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<WarrantyWorkflow>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(workflow: Arc<WarrantyWorkflow>, config: ApiConfig) -> Self {
        Self { workflow, config }
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Claims routes
    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/check", post(claims::record_check))
        .route(
            "/:id/part-checks",
            get(claims::list_part_checks).post(claims::record_part_checks),
        )
        .route("/:id/repair", post(claims::start_repair))
        .route("/:id/decision-request", post(claims::request_decision))
        .route("/:id/ledger", get(claims::get_ledger))
        .route("/:id/ledger/preview", post(claims::preview_ledger))
        .route("/:id/comments", get(claims::list_comments))
        .route("/:id/finalize", post(claims::finalize));

    // Vehicle routes
    let vehicle_routes = Router::new()
        .route("/", get(vehicles::list_vehicles))
        .route("/:vin", get(vehicles::get_vehicle))
        .route("/:vin/campaigns", get(vehicles::vehicle_campaigns));

    // Campaign routes
    let campaign_routes = Router::new()
        .route("/", get(campaigns::list_campaigns).post(campaigns::create_campaign))
        .route("/validate", post(campaigns::validate_campaign))
        .route("/:id", put(campaigns::update_campaign))
        .route("/:id/reports", post(campaigns::submit_report));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/vehicles", vehicle_routes)
        .nest("/campaigns", campaign_routes)
        .route("/appointments", get(appointments::list_appointments))
        .layer(axum_middleware::from_fn(audit_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id_header.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id_header)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
