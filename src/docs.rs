use utoipa::OpenApi;

use crate::modules::health::controller::HealthResponse;
use sysacad_core::{PaginationMeta, PaginationParams};
use sysacad_models::{
    CreateDocumentTypeDto, CreateStudentDto, DocumentType, DocumentTypeName, Gender,
    PaginatedStudentsResponse, StudentResponse, UpdateDocumentTypeDto, UpdateStudentDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::get_student_by_number,
        crate::modules::students::controller::get_students_by_specialty,
        crate::modules::students::controller::get_student_specialty,
        crate::modules::students::controller::replace_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::document_types::controller::create_document_type,
        crate::modules::document_types::controller::get_document_types,
        crate::modules::document_types::controller::get_document_type,
        crate::modules::document_types::controller::get_document_type_by_name,
        crate::modules::document_types::controller::replace_document_type,
        crate::modules::document_types::controller::update_document_type,
        crate::modules::document_types::controller::delete_document_type,
    ),
    components(
        schemas(
            HealthResponse,
            StudentResponse,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            Gender,
            DocumentType,
            DocumentTypeName,
            CreateDocumentTypeDto,
            UpdateDocumentTypeDto,
            PaginationMeta,
            PaginationParams,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity"),
        (name = "Students", description = "Student management endpoints"),
        (name = "Document Types", description = "Identity document type catalogue")
    ),
    info(
        title = "Sysacad Student Service",
        version = "0.1.0",
        description = "Student records for the university academic system, built with Rust, Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
