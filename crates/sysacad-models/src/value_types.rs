//! Closed enumerations stored as text columns.
//!
//! Both types map to `VARCHAR` in PostgreSQL and to their short code in JSON,
//! so the database, the cache and the wire all agree on one spelling.
//!
//! # Example
//!
//! ```ignore
//! use sysacad_models::value_types::{DocumentTypeName, Gender};
//!
//! let gender: Gender = "M".parse().unwrap();
//! let name: DocumentTypeName = "PASAPORTE".parse().unwrap();
//! assert_eq!(name.label(), "Pasaporte");
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidGender(String),
    InvalidDocumentTypeName(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGender(value) => write!(f, "Invalid gender: '{}'", value),
            Self::InvalidDocumentTypeName(value) => {
                write!(f, "Invalid document type choice: '{}'", value)
            }
        }
    }
}

// ============================================================================
// Gender
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M", alias = "Male")]
    Male,
    #[serde(rename = "F", alias = "Female")]
    Female,
    #[serde(rename = "O", alias = "Other")]
    Other,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" | "Male" => Ok(Self::Male),
            "F" | "Female" => Ok(Self::Female),
            "O" | "Other" => Ok(Self::Other),
            other => Err(ValueTypeError::InvalidGender(other.to_string())),
        }
    }
}

impl Type<sqlx::Postgres> for Gender {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Gender {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Gender {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

impl PgHasArrayType for Gender {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

// ============================================================================
// DocumentTypeName
// ============================================================================

/// The identity documents a student may be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentTypeName {
    Dni,
    Lc,
    Le,
    Pasaporte,
}

impl DocumentTypeName {
    pub const ALL: [DocumentTypeName; 4] = [Self::Dni, Self::Lc, Self::Le, Self::Pasaporte];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Dni => "DNI",
            Self::Lc => "LC",
            Self::Le => "LE",
            Self::Pasaporte => "PASAPORTE",
        }
    }

    /// Human-readable label shown next to the code.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dni => "DNI - Documento Nacional de Identidad",
            Self::Lc => "L.C - Libreta Cívica",
            Self::Le => "L.E - Libreta de Enrolamiento",
            Self::Pasaporte => "Pasaporte",
        }
    }
}

impl fmt::Display for DocumentTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DocumentTypeName {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DNI" => Ok(Self::Dni),
            "LC" => Ok(Self::Lc),
            "LE" => Ok(Self::Le),
            "PASAPORTE" => Ok(Self::Pasaporte),
            other => Err(ValueTypeError::InvalidDocumentTypeName(other.to_string())),
        }
    }
}

impl Type<sqlx::Postgres> for DocumentTypeName {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for DocumentTypeName {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for DocumentTypeName {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

impl PgHasArrayType for DocumentTypeName {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod gender_tests {
        use super::*;

        #[test]
        fn test_parse_codes_and_labels() {
            assert_eq!("M".parse::<Gender>().unwrap(), Gender::Male);
            assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
            assert_eq!("O".parse::<Gender>().unwrap(), Gender::Other);
            assert!("X".parse::<Gender>().is_err());
        }

        #[test]
        fn test_serializes_as_code() {
            assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), r#""F""#);
        }

        #[test]
        fn test_deserializes_code_and_label() {
            let g: Gender = serde_json::from_str(r#""M""#).unwrap();
            assert_eq!(g, Gender::Male);
            let g: Gender = serde_json::from_str(r#""Other""#).unwrap();
            assert_eq!(g, Gender::Other);
            assert!(serde_json::from_str::<Gender>(r#""male""#).is_err());
        }
    }

    mod document_type_name_tests {
        use super::*;

        #[test]
        fn test_round_trip_through_code() {
            for name in DocumentTypeName::ALL {
                assert_eq!(name.code().parse::<DocumentTypeName>().unwrap(), name);
            }
        }

        #[test]
        fn test_serde_uses_uppercase_code() {
            assert_eq!(
                serde_json::to_string(&DocumentTypeName::Pasaporte).unwrap(),
                r#""PASAPORTE""#
            );
            let name: DocumentTypeName = serde_json::from_str(r#""DNI""#).unwrap();
            assert_eq!(name, DocumentTypeName::Dni);
        }

        #[test]
        fn test_rejects_unknown_choice() {
            let err = "CUIT".parse::<DocumentTypeName>().unwrap_err();
            assert_eq!(err.to_string(), "Invalid document type choice: 'CUIT'");
        }

        #[test]
        fn test_labels() {
            assert_eq!(
                DocumentTypeName::Dni.label(),
                "DNI - Documento Nacional de Identidad"
            );
            assert_eq!(DocumentTypeName::Lc.label(), "L.C - Libreta Cívica");
        }
    }
}
