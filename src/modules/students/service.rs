use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sysacad_academic::{AcademicError, Specialty, SpecialtyValidator};
use sysacad_cache::{Cache, ttl};
use sysacad_core::AppError;
use sysacad_models::{CreateStudentDto, DocumentType, Student, UpdateStudentDto};
use tracing::{debug, instrument, warn};
use validator::{ValidationError, ValidationErrors};

use super::repository::StudentRepository;
use crate::modules::document_types::DocumentTypeRepository;

/// Orchestrates student writes and reads.
///
/// Writes run every uniqueness and reference check before touching storage,
/// then invalidate the affected cache keys. The unique indexes in storage
/// remain the authority when two writers race past the pre-checks.
#[derive(Clone)]
pub struct StudentService {
    students: Arc<dyn StudentRepository>,
    document_types: Arc<dyn DocumentTypeRepository>,
    specialties: Arc<dyn SpecialtyValidator>,
    cache: Cache,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// A single field-scoped validation failure.
fn field_error(field: &'static str, code: &'static str, message: String) -> AppError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::validation(errors)
}

/// Maps a failed academic service call onto the collaborator-unavailable kind.
fn collaborator_error(err: AcademicError) -> AppError {
    if err.is_bad_gateway() {
        AppError::new(
            axum::http::StatusCode::BAD_GATEWAY,
            anyhow::anyhow!("Error communicating with the academic service: {}", err),
        )
    } else {
        AppError::service_unavailable(anyhow::anyhow!(
            "Academic service temporarily unavailable. Please try again later."
        ))
    }
}

impl StudentService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        document_types: Arc<dyn DocumentTypeRepository>,
        specialties: Arc<dyn SpecialtyValidator>,
        cache: Cache,
    ) -> Self {
        Self {
            students,
            document_types,
            specialties,
            cache,
            today: local_today,
        }
    }

    /// Replaces the clock used for date rules.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found(anyhow::anyhow!("Student with id {} does not exist.", id))
    }

    async fn ensure_student_number_free(
        &self,
        student_number: i32,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        if self
            .students
            .exists_by_student_number(student_number, exclude_id)
            .await?
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Student number {} is already taken.",
                student_number
            )));
        }
        Ok(())
    }

    async fn ensure_document_number_free(
        &self,
        document_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        if self
            .students
            .exists_by_document_number(document_number, exclude_id)
            .await?
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Document number {} is already registered.",
                document_number
            )));
        }
        Ok(())
    }

    async fn ensure_specialty_exists(&self, specialty_id: i32) -> Result<(), AppError> {
        match self.specialties.validate_specialty(specialty_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(field_error(
                "specialty_id",
                "does_not_exist",
                format!("Specialty with id {} does not exist.", specialty_id),
            )),
            Err(e) => Err(collaborator_error(e)),
        }
    }

    async fn require_document_type(&self, document_type_id: i64) -> Result<DocumentType, AppError> {
        self.document_types
            .find_by_id(document_type_id)
            .await?
            .ok_or_else(|| {
                field_error(
                    "document_type_id",
                    "does_not_exist",
                    format!("Document type with id {} does not exist.", document_type_id),
                )
            })
    }

    async fn invalidate_student(&self, id: i64) {
        let keys = self.cache.keys();
        self.cache.invalidate(&keys.student(id)).await;
        self.cache.invalidate(&keys.students_all()).await;
    }

    /// Validates, checks uniqueness and references, then persists.
    ///
    /// Nothing is written unless every check passes.
    #[instrument(skip(self, dto), fields(student.number = dto.student_number))]
    pub async fn create(&self, dto: CreateStudentDto) -> Result<Student, AppError> {
        let new = dto.normalize(self.today()).map_err(AppError::validation)?;

        self.ensure_student_number_free(new.student_number, None)
            .await?;
        self.ensure_document_number_free(&new.document_number, None)
            .await?;
        self.ensure_specialty_exists(new.specialty_id).await?;
        self.require_document_type(new.document_type_id).await?;

        let created = self.students.create(&new).await?;
        self.cache
            .invalidate(&self.cache.keys().students_all())
            .await;

        debug!(student.id = created.id, "Student created");
        Ok(created)
    }

    /// Cache-first lookup. Misses in storage are not cached.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let key = self.cache.keys().student(id);
        if let Some(cached) = self.cache.get::<Student>(&key).await {
            return Ok(Some(cached));
        }

        let found = self.students.find_by_id(id).await?;
        if let Some(student) = &found {
            self.cache.set(&key, student, ttl::STUDENT).await;
        }
        Ok(found)
    }

    /// Always reads storage.
    #[instrument(skip(self))]
    pub async fn find_by_student_number(
        &self,
        student_number: i32,
    ) -> Result<Option<Student>, AppError> {
        self.students.find_by_student_number(student_number).await
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        let key = self.cache.keys().students_all();
        if let Some(cached) = self.cache.get::<Vec<Student>>(&key).await {
            return Ok(cached);
        }

        let all = self.students.find_all().await?;
        self.cache.set(&key, &all, ttl::STUDENTS_ALL).await;
        Ok(all)
    }

    /// Fails fast when the academic service does not know the specialty.
    #[instrument(skip(self))]
    pub async fn find_by_specialty(&self, specialty_id: i32) -> Result<Vec<Student>, AppError> {
        match self.specialties.validate_specialty(specialty_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AppError::not_found(anyhow::anyhow!(
                    "Specialty with id {} does not exist.",
                    specialty_id
                )));
            }
            Err(e) => return Err(collaborator_error(e)),
        }

        self.students.find_by_specialty(specialty_id).await
    }

    /// Merges the present fields of `dto` into the stored student.
    ///
    /// Uniqueness and reference checks run only for fields whose value
    /// actually changes, and uniqueness searches exclude this student.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: UpdateStudentDto) -> Result<Student, AppError> {
        let current = self
            .students
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let changes = dto
            .normalize(&current, self.today())
            .map_err(AppError::validation)?;

        if let Some(student_number) = changes.student_number
            && student_number != current.student_number
        {
            self.ensure_student_number_free(student_number, Some(id))
                .await?;
        }

        if let Some(document_number) = changes.document_number.as_deref()
            && document_number != current.document_number
        {
            self.ensure_document_number_free(document_number, Some(id))
                .await?;
        }

        if let Some(specialty_id) = changes.specialty_id
            && specialty_id != current.specialty_id
        {
            self.ensure_specialty_exists(specialty_id).await?;
        }

        let document_type = match changes.document_type_id {
            Some(document_type_id) if document_type_id != current.document_type_id => {
                Some(self.require_document_type(document_type_id).await?)
            }
            _ => None,
        };

        let mut student = current;
        changes.apply_to(&mut student);
        if let Some(document_type) = document_type {
            student.document_type = document_type;
        }

        let updated = self.students.update(&student).await?;
        self.invalidate_student(id).await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        if !self.students.exists_by_id(id).await? {
            return Err(Self::not_found(id));
        }

        let deleted = self.students.delete_by_id(id).await?;
        if !deleted {
            warn!(student.id = id, "Student vanished before it could be deleted");
        }
        self.invalidate_student(id).await;

        debug!(
            student.id = id,
            policy = %self.students.delete_policy(),
            "Student deleted"
        );
        Ok(deleted)
    }

    /// Informational lookup of the student's specialty. `Ok(None)` when the
    /// academic service does not answer with a record.
    #[instrument(skip(self))]
    pub async fn get_specialty(&self, id: i64) -> Result<Option<Specialty>, AppError> {
        let student = self.find_by_id(id).await?.ok_or_else(|| Self::not_found(id))?;
        Ok(self.specialties.get_specialty(student.specialty_id).await)
    }
}
