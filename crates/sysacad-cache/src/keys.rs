//! Cache key generation and TTLs.
//!
//! Keys are namespaced by a configurable prefix:
//!
//! | Key | TTL |
//! |-----|-----|
//! | `{prefix}:student:{id}` | 5 minutes |
//! | `{prefix}:students:all` | 10 minutes |
//! | `{prefix}:document_type:{id}` | 10 minutes |
//! | `{prefix}:document_types:all` | 10 minutes |

pub mod ttl {
    use std::time::Duration;

    pub const STUDENT: Duration = Duration::from_secs(5 * 60);
    pub const STUDENTS_ALL: Duration = Duration::from_secs(10 * 60);
    pub const DOCUMENT_TYPE: Duration = Duration::from_secs(10 * 60);
    pub const DOCUMENT_TYPES_ALL: Duration = Duration::from_secs(10 * 60);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new("sysacad")
    }
}

impl CacheKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches(':').to_string(),
        }
    }

    fn build(&self, parts: &[&str]) -> String {
        if self.prefix.is_empty() {
            parts.join(":")
        } else {
            format!("{}:{}", self.prefix, parts.join(":"))
        }
    }

    pub fn student(&self, id: i64) -> String {
        self.build(&["student", &id.to_string()])
    }

    pub fn students_all(&self) -> String {
        self.build(&["students", "all"])
    }

    pub fn document_type(&self, id: i64) -> String {
        self.build(&["document_type", &id.to_string()])
    }

    pub fn document_types_all(&self) -> String {
        self.build(&["document_types", "all"])
    }
}
