use std::sync::Arc;

use sysacad_cache::{Cache, ttl};
use sysacad_core::AppError;
use sysacad_models::{CreateDocumentTypeDto, DocumentType, DocumentTypeName, UpdateDocumentTypeDto};
use tracing::{debug, instrument};

use super::repository::DocumentTypeRepository;

/// Document type orchestration: uniqueness of the name, cache-first reads and
/// invalidation after every write.
#[derive(Clone)]
pub struct DocumentTypeService {
    repository: Arc<dyn DocumentTypeRepository>,
    cache: Cache,
}

impl DocumentTypeService {
    pub fn new(repository: Arc<dyn DocumentTypeRepository>, cache: Cache) -> Self {
        Self { repository, cache }
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found(anyhow::anyhow!("Document type with id {} does not exist.", id))
    }

    fn name_taken(name: DocumentTypeName) -> AppError {
        AppError::conflict(anyhow::anyhow!("Document type {} already exists.", name))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, dto: CreateDocumentTypeDto) -> Result<DocumentType, AppError> {
        let new = dto.normalize().map_err(AppError::validation)?;

        if self.repository.exists_by_name(new.name, None).await? {
            return Err(Self::name_taken(new.name));
        }

        let created = self.repository.create(&new).await?;
        self.cache
            .invalidate(&self.cache.keys().document_types_all())
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<DocumentType>, AppError> {
        let key = self.cache.keys().document_type(id);
        if let Some(cached) = self.cache.get::<DocumentType>(&key).await {
            return Ok(Some(cached));
        }

        let found = self.repository.find_by_id(id).await?;
        if let Some(document_type) = &found {
            self.cache.set(&key, document_type, ttl::DOCUMENT_TYPE).await;
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        name: DocumentTypeName,
    ) -> Result<Option<DocumentType>, AppError> {
        self.repository.find_by_name(name).await
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<DocumentType>, AppError> {
        let key = self.cache.keys().document_types_all();
        if let Some(cached) = self.cache.get::<Vec<DocumentType>>(&key).await {
            return Ok(cached);
        }

        let all = self.repository.find_all().await?;
        self.cache.set(&key, &all, ttl::DOCUMENT_TYPES_ALL).await;
        Ok(all)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        dto: UpdateDocumentTypeDto,
    ) -> Result<DocumentType, AppError> {
        let mut entity = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let changes = dto.normalize().map_err(AppError::validation)?;

        if let Some(name) = changes.name
            && name != entity.name
            && self.repository.exists_by_name(name, Some(id)).await?
        {
            return Err(Self::name_taken(name));
        }

        changes.apply_to(&mut entity);
        let updated = self.repository.update(&entity).await?;

        self.invalidate(id).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        if !self.repository.exists_by_id(id).await? {
            return Err(Self::not_found(id));
        }

        let deleted = self.repository.delete_by_id(id).await?;
        self.invalidate(id).await;
        debug!(document_type.id = id, deleted, "Document type deleted");

        Ok(deleted)
    }

    async fn invalidate(&self, id: i64) {
        let keys = self.cache.keys();
        self.cache.invalidate(&keys.document_type(id)).await;
        self.cache.invalidate(&keys.document_types_all()).await;
    }
}
