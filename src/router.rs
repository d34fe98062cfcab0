use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::document_types::init_document_types_router;
use crate::modules::health::init_health_router;
use crate::modules::students::init_students_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use sysacad_config::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any() {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

pub fn init_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_config);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/health", init_health_router())
        .nest(
            "/api",
            Router::new()
                .nest("/students", init_students_router())
                .nest("/document-types", init_document_types_router()),
        )
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
