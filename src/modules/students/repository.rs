//! Persistence gateway for students.
//!
//! Every read joins `document_types` so a [`Student`] always arrives with its
//! document type. Reads and existence checks only see active rows; with
//! [`DeletePolicy::Hard`] every stored row is active.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use sysacad_config::DeletePolicy;
use sysacad_core::AppError;
use sysacad_models::{DocumentType, DocumentTypeName, Gender, NewStudent, Student};
use tracing::instrument;

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn create(&self, new: &NewStudent) -> Result<Student, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn find_by_student_number(&self, student_number: i32)
    -> Result<Option<Student>, AppError>;
    /// Ordered by last name, then first name.
    async fn find_all(&self) -> Result<Vec<Student>, AppError>;
    async fn find_by_specialty(&self, specialty_id: i32) -> Result<Vec<Student>, AppError>;
    /// Writes every mutable column of `student` and returns the stored row.
    async fn update(&self, student: &Student) -> Result<Student, AppError>;
    /// Soft or hard delete depending on [`StudentRepository::delete_policy`].
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;
    /// `exclude_id` leaves one row out of the search, for updates.
    async fn exists_by_student_number(
        &self,
        student_number: i32,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>;
    async fn exists_by_document_number(
        &self,
        document_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>;
    fn delete_policy(&self) -> DeletePolicy;
}

/// Conflict raised when a unique index rejects a write the pre-checks let
/// through (a concurrent writer got there first).
fn student_write_error(err: sqlx::Error, student_number: i32, document_number: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or_default();
        if constraint.contains("student_number") {
            return AppError::conflict(anyhow::anyhow!(
                "Student number {} is already taken.",
                student_number
            ));
        }
        if constraint.contains("document_number") {
            return AppError::conflict(anyhow::anyhow!(
                "Document number {} is already registered.",
                document_number
            ));
        }
    }
    AppError::database(err)
}

#[derive(Debug, FromRow)]
struct StudentRow {
    id: i64,
    first_name: String,
    last_name: String,
    document_number: String,
    document_type_id: i64,
    birth_date: NaiveDate,
    gender: Gender,
    student_number: i32,
    enrollment_date: NaiveDate,
    specialty_id: i32,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    dt_name: DocumentTypeName,
    dt_description: String,
    dt_created_at: DateTime<Utc>,
    dt_updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            document_number: row.document_number,
            document_type_id: row.document_type_id,
            document_type: DocumentType {
                id: row.document_type_id,
                name: row.dt_name,
                description: row.dt_description,
                created_at: row.dt_created_at,
                updated_at: row.dt_updated_at,
            },
            birth_date: row.birth_date,
            gender: row.gender,
            student_number: row.student_number,
            enrollment_date: row.enrollment_date,
            specialty_id: row.specialty_id,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Projection shared by every read; expects `s` and `dt` aliases.
const SELECT_STUDENT: &str = r#"
    s.id, s.first_name, s.last_name, s.document_number, s.document_type_id,
    s.birth_date, s.gender, s.student_number, s.enrollment_date, s.specialty_id,
    s.is_active, s.deleted_at, s.created_at, s.updated_at,
    dt.name AS dt_name, dt.description AS dt_description,
    dt.created_at AS dt_created_at, dt.updated_at AS dt_updated_at"#;

#[derive(Debug, Clone)]
pub struct PgStudentRepository {
    db: PgPool,
    policy: DeletePolicy,
}

impl PgStudentRepository {
    pub fn new(db: PgPool, policy: DeletePolicy) -> Self {
        Self { db, policy }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: i64,
    ) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"SELECT {SELECT_STUDENT}
               FROM students s
               JOIN document_types dt ON dt.id = s.document_type_id
               WHERE s.is_active AND {condition}"#
        ))
        .bind(value)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::database)?;

        Ok(row.map(Student::from))
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self, new), fields(student.number = new.student_number))]
    async fn create(&self, new: &NewStudent) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"WITH s AS (
                   INSERT INTO students (
                       first_name, last_name, document_number, document_type_id,
                       birth_date, gender, student_number, enrollment_date, specialty_id
                   )
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                   RETURNING *
               )
               SELECT {SELECT_STUDENT}
               FROM s
               JOIN document_types dt ON dt.id = s.document_type_id"#
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.document_number)
        .bind(new.document_type_id)
        .bind(new.birth_date)
        .bind(new.gender)
        .bind(new.student_number)
        .bind(new.enrollment_date)
        .bind(new.specialty_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| student_write_error(e, new.student_number, &new.document_number))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        self.fetch_one_where("s.id = $1", id).await
    }

    #[instrument(skip(self))]
    async fn find_by_student_number(
        &self,
        student_number: i32,
    ) -> Result<Option<Student>, AppError> {
        self.fetch_one_where("s.student_number = $1", i64::from(student_number))
            .await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            r#"SELECT {SELECT_STUDENT}
               FROM students s
               JOIN document_types dt ON dt.id = s.document_type_id
               WHERE s.is_active
               ORDER BY s.last_name, s.first_name, s.id"#
        ))
        .fetch_all(&self.db)
        .await
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_specialty(&self, specialty_id: i32) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            r#"SELECT {SELECT_STUDENT}
               FROM students s
               JOIN document_types dt ON dt.id = s.document_type_id
               WHERE s.is_active AND s.specialty_id = $1
               ORDER BY s.last_name, s.first_name, s.id"#
        ))
        .bind(specialty_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    #[instrument(skip(self, student), fields(student.id = student.id))]
    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"WITH s AS (
                   UPDATE students SET
                       first_name = $2,
                       last_name = $3,
                       document_number = $4,
                       document_type_id = $5,
                       birth_date = $6,
                       gender = $7,
                       student_number = $8,
                       enrollment_date = $9,
                       specialty_id = $10,
                       updated_at = NOW()
                   WHERE id = $1 AND is_active
                   RETURNING *
               )
               SELECT {SELECT_STUDENT}
               FROM s
               JOIN document_types dt ON dt.id = s.document_type_id"#
        ))
        .bind(student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.document_number)
        .bind(student.document_type_id)
        .bind(student.birth_date)
        .bind(student.gender)
        .bind(student.student_number)
        .bind(student.enrollment_date)
        .bind(student.specialty_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| student_write_error(e, student.student_number, &student.document_number))?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Student with id {} does not exist.",
                student.id
            ))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(policy = %self.policy))]
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let sql = match self.policy {
            DeletePolicy::Soft => {
                r#"UPDATE students
                   SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
                   WHERE id = $1 AND is_active"#
            }
            DeletePolicy::Hard => "DELETE FROM students WHERE id = $1",
        };

        let result = sqlx::query(sql)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1 AND is_active)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn exists_by_student_number(
        &self,
        student_number: i32,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM students
                   WHERE student_number = $1 AND is_active
                     AND ($2::BIGINT IS NULL OR id <> $2)
               )"#,
        )
        .bind(student_number)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn exists_by_document_number(
        &self,
        document_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM students
                   WHERE document_number = $1 AND is_active
                     AND ($2::BIGINT IS NULL OR id <> $2)
               )"#,
        )
        .bind(document_number)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }

    fn delete_policy(&self) -> DeletePolicy {
        self.policy
    }
}
