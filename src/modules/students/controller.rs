use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sysacad_academic::Specialty;
use sysacad_core::{AppError, Paginated, PaginationParams};
use sysacad_models::{
    CreateStudentDto, PaginatedStudentsResponse, StudentResponse, UpdateStudentDto,
};
use tracing::instrument;

use crate::state::AppState;
use crate::validator::ValidatedJson;

fn not_found(id: i64) -> AppError {
    AppError::not_found(anyhow::anyhow!("Student with id {} does not exist.", id))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Malformed body"),
        (status = 409, description = "Student number or document number already in use"),
        (status = 422, description = "Validation error"),
        (status = 502, description = "Academic service answered with an unexpected status"),
        (status = 503, description = "Academic service unavailable")
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    let created = state.students.create(dto).await?;
    let today = state.students.today();
    Ok((
        StatusCode::CREATED,
        Json(StudentResponse::from_student(created, today)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(PaginationParams),
    responses(
        (status = 200, description = "Active students ordered by last name", body = PaginatedStudentsResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let today = state.students.today();
    let page = Paginated::from_vec(state.students.find_all().await?, &params);

    Ok(Json(PaginatedStudentsResponse {
        data: page
            .data
            .into_iter()
            .map(|s| StudentResponse::from_student(s, today))
            .collect(),
        meta: page.meta,
    }))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .students
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(StudentResponse::from_student(
        student,
        state.students.today(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/students/number/{student_number}",
    params(("student_number" = i32, Path, description = "Student number")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student_by_number(
    State(state): State<AppState>,
    Path(student_number): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .students
        .find_by_student_number(student_number)
        .await?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Student with number {} does not exist.",
                student_number
            ))
        })?;
    Ok(Json(StudentResponse::from_student(
        student,
        state.students.today(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/students/specialty/{specialty_id}",
    params(("specialty_id" = i32, Path, description = "Specialty ID in the academic service")),
    responses(
        (status = 200, description = "Active students of the specialty", body = Vec<StudentResponse>),
        (status = 404, description = "Specialty not found"),
        (status = 503, description = "Academic service unavailable")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students_by_specialty(
    State(state): State<AppState>,
    Path(specialty_id): Path<i32>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let today = state.students.today();
    let students = state.students.find_by_specialty(specialty_id).await?;
    Ok(Json(
        students
            .into_iter()
            .map(|s| StudentResponse::from_student(s, today))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/specialty",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Specialty record as returned by the academic service", body = Object),
        (status = 404, description = "Student not found or specialty unavailable")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student_specialty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Specialty>, AppError> {
    state.students.get_specialty(id).await?.map(Json).ok_or_else(|| {
        AppError::not_found(anyhow::anyhow!(
            "Specialty information for student {} is not available.",
            id
        ))
    })
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = CreateStudentDto,
    responses(
        (status = 200, description = "Student replaced", body = StudentResponse),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student number or document number already in use"),
        (status = 422, description = "Validation error"),
        (status = 503, description = "Academic service unavailable")
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn replace_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<Json<StudentResponse>, AppError> {
    let updated = state.students.update(id, dto.into()).await?;
    Ok(Json(StudentResponse::from_student(
        updated,
        state.students.today(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student number or document number already in use"),
        (status = 422, description = "Validation error"),
        (status = 503, description = "Academic service unavailable")
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentResponse>, AppError> {
    let updated = state.students.update(id, dto).await?;
    Ok(Json(StudentResponse::from_student(
        updated,
        state.students.today(),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.students.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
