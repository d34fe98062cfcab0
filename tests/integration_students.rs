mod common;

use axum::http::StatusCode;
use common::{
    body_json, document_type_id, empty_request, json_request, seed_document_types,
    setup_test_app, setup_test_app_with_policy, specialties,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use sysacad::testing::StubMode;
use sysacad_config::DeletePolicy;
use tower::ServiceExt;

fn student_body(student_number: i32, document_number: &str, document_type_id: i64) -> Value {
    json!({
        "first_name": "juan carlos",
        "last_name": "pérez",
        "document_number": document_number,
        "document_type_id": document_type_id,
        "birth_date": "2000-05-15",
        "gender": "M",
        "student_number": student_number,
        "enrollment_date": "2020-03-01",
        "specialty_id": 3
    })
}

async fn create(app: &axum::Router, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/students", body))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());

    let (status, body) = create(&app, &student_body(1001, "30.123.456", dni)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first_name"], "Juan Carlos");
    assert_eq!(body["last_name"], "Pérez");
    assert_eq!(body["full_name"], "Juan Carlos Pérez");
    assert_eq!(body["gender"], "M");
    assert_eq!(body["document_type"]["name"], "DNI");
    assert!(body["age"].as_i64().unwrap() >= 24);
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_duplicate_number(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());

    create(&app, &student_body(1001, "30123456", dni)).await;
    let (status, body) = create(&app, &student_body(1001, "40123456", dni)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Student number 1001 is already taken.");

    let (status, _) = create(&app, &student_body(1002, "30123456", dni)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_rule_failures(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());

    let mut body = student_body(1001, "12", dni);
    body["first_name"] = json!("J0hn");
    body["enrollment_date"] = json!("1990-01-01");

    let (status, body) = create(&app, &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["first_name"].is_array());
    assert!(body["fields"]["document_number"].is_array());
    assert!(body["fields"]["enrollment_date"].is_array());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_malformed_body(pool: PgPool) {
    seed_document_types(&pool).await;
    let app = setup_test_app(pool.clone(), specialties());

    let (status, body) = create(&app, &json!({ "first_name": "Juan" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().ends_with("is required"));

    let mut invalid_gender = student_body(1001, "30123456", 1);
    invalid_gender["gender"] = json!("X");
    let (status, _) = create(&app, &invalid_gender).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_specialty_checks(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let stub = specialties();
    let app = setup_test_app(pool.clone(), stub.clone());

    let mut body = student_body(1001, "30123456", dni);
    body["specialty_id"] = json!(77);
    let (status, response) = create(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["fields"]["specialty_id"].is_array());

    stub.set_mode(StubMode::Unavailable);
    let (status, _) = create(&app, &student_body(1001, "30123456", dni)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_student(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());
    let (_, created) = create(&app, &student_body(1001, "30123456", dni)).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/students/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["student_number"], 1001);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/students/999999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/students/number/1001"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_paginated(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());

    for n in 0..3 {
        let mut body = student_body(2000 + n, &format!("3012345{}", n), dni);
        body["last_name"] = json!(["Suarez", "Acosta", "Molina"][n as usize]);
        create(&app, &body).await;
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/students?page=1&limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["total_pages"], 2);
    assert_eq!(body["meta"]["has_more"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["last_name"], "Acosta");
    assert_eq!(data[1]["last_name"], "Molina");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_patch_and_put_student(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let passport = document_type_id(&pool, "PASAPORTE").await;
    let app = setup_test_app(pool.clone(), specialties());
    let (_, created) = create(&app, &student_body(1001, "30123456", dni)).await;
    let uri = format!("/api/students/{}", created["id"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            &json!({ "document_type_id": passport, "document_number": "AB123456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["document_type"]["name"], "PASAPORTE");
    assert_eq!(body["first_name"], "Juan Carlos");

    let mut replacement = student_body(1001, "30123456", dni);
    replacement["first_name"] = json!("maría");
    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &replacement))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["first_name"], "María");
    assert_eq!(body["document_type"]["name"], "DNI");

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, &json!({ "birth_date": "2019-01-01" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_student(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());
    let (_, created) = create(&app, &student_body(1001, "30123456", dni)).await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/students/{}", id);

    // Warm the cache so the delete has something to invalidate.
    app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (is_active, deleted): (bool, bool) =
        sqlx::query_as("SELECT is_active, deleted_at IS NOT NULL FROM students WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!is_active);
    assert!(deleted);

    // The numbers are free again.
    let (status, _) = create(&app, &student_body(1001, "30123456", dni)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_hard_delete_student(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app_with_policy(pool.clone(), specialties(), DeletePolicy::Hard);
    let (_, created) = create(&app, &student_body(1001, "30123456", dni)).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/students/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_by_specialty(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let stub = specialties();
    let app = setup_test_app(pool.clone(), stub.clone());
    let (_, created) = create(&app, &student_body(1001, "30123456", dni)).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/students/specialty/3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/students/specialty/77"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let specialty_uri = format!("/api/students/{}/specialty", created["id"]);
    let response = app
        .clone()
        .oneshot(empty_request("GET", &specialty_uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], 3);

    stub.set_mode(StubMode::Unavailable);
    let response = app
        .clone()
        .oneshot(empty_request("GET", &specialty_uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check(pool: PgPool) {
    let app = setup_test_app(pool, specialties());

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_with_padded_names(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());

    let mut body = student_body(1001, "  30123456  ", dni);
    body["first_name"] = json!(format!("    {}    ", "a".repeat(50)));

    let (status, body) = create(&app, &body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first_name"].as_str().unwrap().chars().count(), 50);
    assert_eq!(body["document_number"], "30123456");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_page_far_past_the_end(pool: PgPool) {
    seed_document_types(&pool).await;
    let dni = document_type_id(&pool, "DNI").await;
    let app = setup_test_app(pool.clone(), specialties());
    create(&app, &student_body(1001, "30123456", dni)).await;

    let uri = format!("/api/students?page={}&limit=100", i64::MAX);
    let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["has_more"], false);
}
