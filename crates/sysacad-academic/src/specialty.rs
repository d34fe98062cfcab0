use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AcademicError;

/// A specialty record as returned by the academic service.
///
/// The upstream schema is not owned here, so every attribute is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Specialty {
    pub fn id(&self) -> Option<i64> {
        self.attributes.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        ["nombre", "name"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
    }
}

/// Answers whether a specialty exists in the academic service.
#[async_trait]
pub trait SpecialtyValidator: Send + Sync {
    /// `Ok(true)` on 200, `Ok(false)` on 404. Any other outcome, including an
    /// open circuit, is an error the caller must surface.
    async fn validate_specialty(&self, specialty_id: i32) -> Result<bool, AcademicError>;

    /// Informational lookup: every failure collapses to `None`.
    async fn get_specialty(&self, specialty_id: i32) -> Option<Specialty>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let specialty: Specialty =
            serde_json::from_str(r#"{"id": 3, "nombre": "Ingeniería en Sistemas", "plan": 2008}"#)
                .unwrap();
        assert_eq!(specialty.id(), Some(3));
        assert_eq!(specialty.name(), Some("Ingeniería en Sistemas"));
        assert_eq!(specialty.attributes["plan"], 2008);
    }
}
