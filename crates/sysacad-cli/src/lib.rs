//! # Sysacad CLI
//!
//! Database seeding utilities for development and testing of the student
//! service.
//!
//! ## Usage
//!
//! ```ignore
//! use sysacad_cli::seeder::{seed_document_types, seed_students, StudentSeedConfig};
//!
//! seed_document_types(&pool).await?;
//! seed_students(&pool, StudentSeedConfig { count: 50, specialty_id: 1 }).await?;
//! ```

pub mod seeder;
