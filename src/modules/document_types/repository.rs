//! Persistence gateway for document types.

use async_trait::async_trait;
use sqlx::PgPool;
use sysacad_core::AppError;
use sysacad_models::{DocumentType, DocumentTypeName, NewDocumentType};
use tracing::instrument;

#[async_trait]
pub trait DocumentTypeRepository: Send + Sync {
    async fn create(&self, new: &NewDocumentType) -> Result<DocumentType, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<DocumentType>, AppError>;
    async fn find_by_name(&self, name: DocumentTypeName)
    -> Result<Option<DocumentType>, AppError>;
    /// Ordered by name.
    async fn find_all(&self) -> Result<Vec<DocumentType>, AppError>;
    /// Writes every column of `entity` and returns the stored row.
    async fn update(&self, entity: &DocumentType) -> Result<DocumentType, AppError>;
    /// Refused with a conflict while any student references the row.
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;
    /// `exclude_id` leaves one row out of the search, for updates.
    async fn exists_by_name(
        &self,
        name: DocumentTypeName,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>;
}

const COLUMNS: &str = "id, name, description, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgDocumentTypeRepository {
    db: PgPool,
}

impl PgDocumentTypeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn write_error(err: sqlx::Error, name: DocumentTypeName) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow::anyhow!("Document type {} already exists.", name));
    }
    AppError::database(err)
}

#[async_trait]
impl DocumentTypeRepository for PgDocumentTypeRepository {
    #[instrument(skip(self))]
    async fn create(&self, new: &NewDocumentType) -> Result<DocumentType, AppError> {
        sqlx::query_as::<_, DocumentType>(&format!(
            "INSERT INTO document_types (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(new.name)
        .bind(&new.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| write_error(e, new.name))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<DocumentType>, AppError> {
        sqlx::query_as::<_, DocumentType>(&format!(
            "SELECT {COLUMNS} FROM document_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_by_name(
        &self,
        name: DocumentTypeName,
    ) -> Result<Option<DocumentType>, AppError> {
        sqlx::query_as::<_, DocumentType>(&format!(
            "SELECT {COLUMNS} FROM document_types WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<DocumentType>, AppError> {
        sqlx::query_as::<_, DocumentType>(&format!(
            "SELECT {COLUMNS} FROM document_types ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self, entity), fields(document_type.id = entity.id))]
    async fn update(&self, entity: &DocumentType) -> Result<DocumentType, AppError> {
        sqlx::query_as::<_, DocumentType>(&format!(
            r#"UPDATE document_types
               SET name = $2, description = $3, updated_at = NOW()
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(entity.id)
        .bind(entity.name)
        .bind(&entity.description)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| write_error(e, entity.name))?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Document type with id {} does not exist.",
                entity.id
            ))
        })
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM document_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow::anyhow!(
                        "Document type {} is referenced by existing students and cannot be deleted.",
                        id
                    ));
                }
                AppError::database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM document_types WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(
        &self,
        name: DocumentTypeName,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM document_types
                   WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
               )"#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }
}
