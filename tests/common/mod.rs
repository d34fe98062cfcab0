use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use sysacad::config::AppConfig;
use sysacad::router::init_router;
use sysacad::state::AppState;
use sysacad::testing::StubSpecialtyValidator;
use sysacad_cache::Cache;
use sysacad_config::DeletePolicy;

/// Specialties 1 to 10 exist in the stub academic service.
pub fn specialties() -> Arc<StubSpecialtyValidator> {
    Arc::new(StubSpecialtyValidator::new(1..=10))
}

pub fn setup_test_app(pool: PgPool, specialties: Arc<StubSpecialtyValidator>) -> Router {
    setup_test_app_with_policy(pool, specialties, DeletePolicy::Soft)
}

#[allow(dead_code)]
pub fn setup_test_app_with_policy(
    pool: PgPool,
    specialties: Arc<StubSpecialtyValidator>,
    delete_policy: DeletePolicy,
) -> Router {
    let config = AppConfig {
        delete_policy,
        ..AppConfig::default()
    };
    let state = AppState::new(pool, Cache::memory("test"), specialties, &config);
    init_router(state)
}

/// Inserts the four document types, skipping any already present.
pub async fn seed_document_types(pool: &PgPool) {
    for (name, description) in [
        ("DNI", "DNI - Documento Nacional de Identidad"),
        ("LC", "L.C - Libreta Cívica"),
        ("LE", "L.E - Libreta de Enrolamiento"),
        ("PASAPORTE", "Pasaporte"),
    ] {
        sqlx::query(
            "INSERT INTO document_types (name, description) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await
        .unwrap();
    }
}

pub async fn document_type_id(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM document_types WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
