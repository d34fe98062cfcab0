//! # Sysacad Academic
//!
//! Client for the external academic service, which owns specialties.
//!
//! - [`circuit_breaker`]: process-wide failure isolation shared by every call
//! - [`client`]: `GET {base_url}/especialidades/{id}` over `reqwest`
//! - [`SpecialtyValidator`]: the seam the student service depends on
//!
//! # Example
//!
//! ```ignore
//! use sysacad_academic::{AcademicClient, SpecialtyValidator};
//! use sysacad_config::AcademicServiceConfig;
//!
//! let client = AcademicClient::new(&AcademicServiceConfig::from_env())?;
//! if !client.validate_specialty(3).await? {
//!     // unknown specialty
//! }
//! ```

pub mod circuit_breaker;
pub mod client;
pub mod error;
pub mod specialty;

pub use circuit_breaker::{BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::AcademicClient;
pub use error::AcademicError;
pub use specialty::{Specialty, SpecialtyValidator};
