use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use sysacad_academic::{AcademicClient, SpecialtyValidator};
use sysacad_cache::Cache;
use tracing::info;

use crate::config::{AppConfig, CorsConfig};
use crate::modules::document_types::{DocumentTypeService, PgDocumentTypeRepository};
use crate::modules::students::{PgStudentRepository, StudentService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub students: Arc<StudentService>,
    pub document_types: Arc<DocumentTypeService>,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Wires the PostgreSQL gateways, the given cache and specialty validator
    /// into the domain services.
    pub fn new(
        db: PgPool,
        cache: Cache,
        specialties: Arc<dyn SpecialtyValidator>,
        config: &AppConfig,
    ) -> Self {
        let document_type_repo = Arc::new(PgDocumentTypeRepository::new(db.clone()));
        let student_repo = Arc::new(PgStudentRepository::new(db.clone(), config.delete_policy));

        let document_types = DocumentTypeService::new(document_type_repo.clone(), cache.clone());
        let students = StudentService::new(student_repo, document_type_repo, specialties, cache);

        Self {
            db,
            students: Arc::new(students),
            document_types: Arc::new(document_types),
            cors_config: config.cors.clone(),
        }
    }
}

pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = sysacad_db::init_db_pool(&config.database).await?;
    sysacad_db::run_migrations(&db).await?;

    let cache = Cache::from_config(&config.cache).await;
    let academic =
        AcademicClient::new(&config.academic).context("failed to build academic service client")?;

    info!(
        cache = cache.backend(),
        delete_policy = %config.delete_policy,
        academic_service = %config.academic.base_url,
        "Application state ready"
    );

    Ok(AppState::new(db, cache, Arc::new(academic), config))
}
