pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use service_core::axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::VaultConfig;
use crate::services::{
    AdminService, AuthService, CredentialService, IdentityStore, OrgStore, SessionService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::health::metrics,
        handlers::auth::register,
        handlers::auth::login,
        handlers::credentials::get_structure,
        handlers::credentials::list_credentials,
        handlers::credentials::add_credential,
        handlers::credentials::update_credential,
        handlers::users::list_users,
        handlers::users::assign_user,
        handlers::users::unassign_user,
        handlers::users::change_role,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::auth::AuthResponse,
            dtos::credentials::StructureResponse,
            dtos::credentials::DivisionCredentialsResponse,
            dtos::credentials::CreateCredentialRequest,
            dtos::credentials::CredentialListResponse,
            dtos::credentials::UpdateCredentialRequest,
            dtos::credentials::CredentialResponse,
            dtos::admin::UserListResponse,
            dtos::admin::AssignRequest,
            dtos::admin::UserEnvelope,
            dtos::admin::ChangeRoleRequest,
            dtos::admin::RoleChangeResponse,
            models::Role,
            models::UserResponse,
            models::Credential,
            models::UnitSummary,
            models::DivisionSummary,
            models::DivisionDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Hierarchy", description = "Organizational units and divisions"),
        (name = "Credentials", description = "Division credential repositories"),
        (name = "Users", description = "User assignment and roles"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: VaultConfig,
    pub users: Arc<dyn IdentityStore>,
    pub org: Arc<dyn OrgStore>,
    pub sessions: SessionService,
    pub auth_service: AuthService,
    pub credential_service: CredentialService,
    pub admin_service: AdminService,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new(
        config: VaultConfig,
        users: Arc<dyn IdentityStore>,
        org: Arc<dyn OrgStore>,
    ) -> Result<Self, AppError> {
        let sessions = SessionService::new(&config.jwt).map_err(AppError::ConfigError)?;

        Ok(Self {
            auth_service: AuthService::new(users.clone(), sessions.clone()),
            credential_service: CredentialService::new(org.clone()),
            admin_service: AdminService::new(users.clone(), org.clone()),
            config,
            users,
            org,
            sessions,
        })
    }
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, AppError> {
    let allow_origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]))
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Every route here requires a bearer token resolving to a live user.
    let protected = Router::new()
        .route("/structure", get(handlers::credentials::get_structure))
        .route(
            "/divisions/:id/credentials",
            get(handlers::credentials::list_credentials).post(handlers::credentials::add_credential),
        )
        .route(
            "/divisions/:id/credentials/:credential_id",
            put(handlers::credentials::update_credential),
        )
        .route("/users", get(handlers::users::list_users))
        .route(
            "/users/:id/assign",
            post(handlers::users::assign_user).delete(handlers::users::unassign_user),
        )
        .route("/users/:id/role", put(handlers::users::change_role))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    if !state.config.is_prod() {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    let cors = cors_layer(&state.config.security.allowed_origins)?;

    let app = app
        .merge(protected)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    user_id = tracing::field::Empty,
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}
