//! Document type domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::validation::normalize_description;
use crate::value_types::DocumentTypeName;

/// A kind of identity document (national ID, passport, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DocumentType {
    pub id: i64,
    pub name: DocumentTypeName,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        self.name.label()
    }
}

/// The description is trimmed before its length is checked, in `normalize`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentTypeDto {
    pub name: DocumentTypeName,
    pub description: Option<String>,
}

/// All fields optional; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentTypeDto {
    pub name: Option<DocumentTypeName>,
    pub description: Option<String>,
}

/// A validated document type ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocumentType {
    pub name: DocumentTypeName,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeChanges {
    pub name: Option<DocumentTypeName>,
    pub description: Option<String>,
}

impl CreateDocumentTypeDto {
    pub fn normalize(&self) -> Result<NewDocumentType, ValidationErrors> {
        let description = match &self.description {
            Some(description) => normalize_description(description).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.add("description", e);
                errors
            })?,
            None => String::new(),
        };

        Ok(NewDocumentType {
            name: self.name,
            description,
        })
    }
}

impl UpdateDocumentTypeDto {
    pub fn normalize(&self) -> Result<DocumentTypeChanges, ValidationErrors> {
        let description = match &self.description {
            Some(description) => Some(normalize_description(description).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.add("description", e);
                errors
            })?),
            None => None,
        };

        Ok(DocumentTypeChanges {
            name: self.name,
            description,
        })
    }
}

impl DocumentTypeChanges {
    /// Copies every present field onto `entity`.
    pub fn apply_to(self, entity: &mut DocumentType) {
        if let Some(name) = self.name {
            entity.name = name;
        }
        if let Some(description) = self.description {
            entity.description = description;
        }
    }
}
