pub mod controller;
pub mod repository;
pub mod router;
pub mod service;

pub use repository::{DocumentTypeRepository, PgDocumentTypeRepository};
pub use router::init_document_types_router;
pub use service::DocumentTypeService;
