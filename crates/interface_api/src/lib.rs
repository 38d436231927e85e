//! HTTP API Layer
//!
//! This crate provides the REST API for the umbrella line of business using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin request handlers per domain
//! - **Services**: application services orchestrating repositories and
//!   partner ports
//! - **Middleware**: authentication, audit logging, tracing
//! - **DTOs**: request/response data transfer objects with validation
//! - **Error handling**: consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, services::PartnerPorts};
//!
//! let app = create_router(pool, config, ports);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod auth;
pub mod middleware;
pub mod services;
pub mod handlers;
pub mod dto;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use infra_db::{ClaimRepository, IntegrationAuditRepository, PolicyRepository, UserRepository};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, policy, users};
use crate::middleware::{audit_middleware, auth_middleware};
use crate::services::claims::ClaimService;
use crate::services::policy::PolicyService;
use crate::services::PartnerPorts;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub policy_service: PolicyService,
    pub claim_service: ClaimService,
    pub users: UserRepository,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
/// * `ports` - Partner port implementations (real clients or mocks)
pub fn create_router(pool: PgPool, config: ApiConfig, ports: PartnerPorts) -> Router {
    let policies = PolicyRepository::new(pool.clone());
    let claim_repo = ClaimRepository::new(pool.clone());
    let audit = IntegrationAuditRepository::new(pool.clone());

    let state = AppState {
        policy_service: PolicyService::new(
            policies.clone(),
            audit.clone(),
            ports.exporter,
            ports.registry,
        ),
        claim_service: ClaimService::new(
            claim_repo,
            policies,
            audit,
            ports.payments,
            ports.loss_history,
        ),
        users: UserRepository::new(pool.clone()),
        pool,
        config,
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Policy routes
    let policy_routes = Router::new()
        .route("/", post(policy::create_policy))
        .route("/", get(policy::list_policies))
        .route("/:id", get(policy::get_policy))
        .route("/:id", put(policy::update_policy))
        .route("/:id/activate", post(policy::activate_policy))
        .route("/:id/terminate", post(policy::terminate_policy))
        .route("/:id/export", post(policy::export_policy))
        .route("/:id/vehicle-verification", post(policy::verify_vehicle))
        .route("/:id/endorsements", post(policy::create_endorsement))
        .route(
            "/:id/endorsements/:endorsement_id/approve",
            post(policy::approve_endorsement),
        );

    // Claims routes
    let claims_routes = Router::new()
        .route("/", post(claims::open_claim))
        .route("/", get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/status", put(claims::update_status))
        .route("/:id/documents", post(claims::upload_document))
        .route("/:id/payments", post(claims::process_payment))
        .route("/:id/loss-history", post(claims::order_loss_history));

    // User routes
    let user_routes = Router::new()
        .route("/", post(users::create_user))
        .route("/", get(users::list_users))
        .route("/:id", get(users::get_user))
        .route("/:id/roles", post(users::assign_role));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .nest("/claims", claims_routes)
        .nest("/users", user_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
