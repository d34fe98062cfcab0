//! Seeding for document types and fake students.

mod document_types;
mod students;

pub use document_types::seed_document_types;
pub use students::{StudentSeedConfig, generate_candidates, seed_students};

pub type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;
