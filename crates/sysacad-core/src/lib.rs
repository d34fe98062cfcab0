//! # Sysacad Core
//!
//! Foundational types shared by every crate of the student service:
//!
//! - [`errors`]: the application error taxonomy and its HTTP rendering
//! - [`pagination`]: page-number pagination over in-memory collections
//!
//! # Example
//!
//! ```ignore
//! use sysacad_core::{AppError, ErrorKind};
//!
//! let err = AppError::conflict(anyhow::anyhow!("Student number 1001 is already taken"));
//! assert_eq!(err.kind(), ErrorKind::Conflict);
//! ```

pub mod errors;
pub mod pagination;

pub use errors::{AppError, ErrorKind};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
