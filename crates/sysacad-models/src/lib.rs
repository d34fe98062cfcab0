//! # Sysacad Models
//!
//! Domain models, DTOs and validation rules for the student service.
//!
//! # Modules
//!
//! - [`document_types`]: the document type lookup entity and its DTOs
//! - [`students`]: the student entity, its DTOs and response shape
//! - [`validation`]: pure field and cross-field rules applied on create/update
//! - [`value_types`]: closed enumerations stored as text columns
//!
//! # Example
//!
//! ```ignore
//! use sysacad_models::students::CreateStudentDto;
//!
//! let new_student = dto.normalize(chrono::Local::now().date_naive())?;
//! assert_eq!(new_student.first_name, "Juan Carlos");
//! ```

pub mod document_types;
pub mod students;
pub mod validation;
pub mod value_types;

pub use document_types::{
    CreateDocumentTypeDto, DocumentType, DocumentTypeChanges, NewDocumentType,
    UpdateDocumentTypeDto,
};
pub use students::{
    CreateStudentDto, NewStudent, PaginatedStudentsResponse, Student, StudentChanges,
    StudentResponse, UpdateStudentDto,
};
pub use validation::calculate_age;
pub use value_types::{DocumentTypeName, Gender, ValueTypeError};
