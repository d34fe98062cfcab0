use sqlx::PgPool;
use sysacad_models::DocumentTypeName;

use super::SeedResult;

/// Inserts the four document types, refreshing the description of any that
/// already exist. Safe to run repeatedly.
pub async fn seed_document_types(db: &PgPool) -> SeedResult<usize> {
    println!("🪪 Seeding document types...");

    let mut tx = db.begin().await?;
    for name in DocumentTypeName::ALL {
        sqlx::query(
            r#"
            INSERT INTO document_types (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name)
            DO UPDATE SET description = EXCLUDED.description, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(name.label())
        .execute(&mut *tx)
        .await?;

        println!("   ✓ {}", name.label());
    }
    tx.commit().await?;

    Ok(DocumentTypeName::ALL.len())
}
