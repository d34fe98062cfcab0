pub mod controller;
pub mod repository;
pub mod router;
pub mod service;

pub use repository::{PgStudentRepository, StudentRepository};
pub use router::init_students_router;
pub use service::StudentService;
