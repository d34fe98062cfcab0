//! Student domain models and DTOs.
//!
//! This module contains the student entity as stored (with its document type
//! attached), the request DTOs for create/replace/partial update, the
//! normalized forms those DTOs validate into, and the response shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sysacad_core::PaginationMeta;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::document_types::DocumentType;
use crate::validation::{
    calculate_age, normalize_document_number, normalize_name, validate_birth_date,
    validate_enrollment_age, validate_enrollment_date, validate_positive_id,
};
use crate::value_types::Gender;

/// A student as persisted, with its document type eagerly attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub document_type_id: i64,
    pub document_type: DocumentType,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub student_number: i32,
    pub enrollment_date: NaiveDate,
    /// Identifier of a specialty owned by the academic service.
    pub specialty_id: i32,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on `reference`.
    pub fn age_on(&self, reference: NaiveDate) -> i32 {
        calculate_age(self.birth_date, reference)
    }
}

/// Student payload returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub document_number: String,
    pub document_type_id: i64,
    pub document_type: DocumentType,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub gender: Gender,
    pub student_number: i32,
    pub enrollment_date: NaiveDate,
    pub specialty_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentResponse {
    pub fn from_student(student: Student, today: NaiveDate) -> Self {
        Self {
            full_name: student.full_name(),
            age: student.age_on(today),
            id: student.id,
            first_name: student.first_name,
            last_name: student.last_name,
            document_number: student.document_number,
            document_type_id: student.document_type_id,
            document_type: student.document_type,
            birth_date: student.birth_date,
            gender: student.gender,
            student_number: student.student_number,
            enrollment_date: student.enrollment_date,
            specialty_id: student.specialty_id,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<StudentResponse>,
    pub meta: PaginationMeta,
}

/// DTO for creating a student, also used as the body of a full replace.
///
/// String lengths are checked by [`CreateStudentDto::normalize`] on the
/// trimmed value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub document_type_id: i64,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[validate(range(min = 1))]
    pub student_number: i32,
    pub enrollment_date: NaiveDate,
    pub specialty_id: i32,
}

/// DTO for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_number: Option<String>,
    pub document_type_id: Option<i64>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[validate(range(min = 1))]
    pub student_number: Option<i32>,
    pub enrollment_date: Option<NaiveDate>,
    pub specialty_id: Option<i32>,
}

impl From<CreateStudentDto> for UpdateStudentDto {
    fn from(dto: CreateStudentDto) -> Self {
        Self {
            first_name: Some(dto.first_name),
            last_name: Some(dto.last_name),
            document_number: Some(dto.document_number),
            document_type_id: Some(dto.document_type_id),
            birth_date: Some(dto.birth_date),
            gender: Some(dto.gender),
            student_number: Some(dto.student_number),
            enrollment_date: Some(dto.enrollment_date),
            specialty_id: Some(dto.specialty_id),
        }
    }
}

/// A student that passed every field and cross-field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub document_type_id: i64,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub student_number: i32,
    pub enrollment_date: NaiveDate,
    pub specialty_id: i32,
}

/// The normalized subset of fields a partial update carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_number: Option<String>,
    pub document_type_id: Option<i64>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub student_number: Option<i32>,
    pub enrollment_date: Option<NaiveDate>,
    pub specialty_id: Option<i32>,
}

fn check<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.add(field, error);
            None
        }
    }
}

fn check_opt<T, U>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<T>,
    rule: impl FnOnce(T) -> Result<U, ValidationError>,
) -> Option<U> {
    value.and_then(|value| check(errors, field, rule(value)))
}

impl CreateStudentDto {
    /// Applies every rule and returns the normalized student, or all failures.
    pub fn normalize(&self, today: NaiveDate) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = check(
            &mut errors,
            "first_name",
            normalize_name(&self.first_name, "First name"),
        );
        let last_name = check(
            &mut errors,
            "last_name",
            normalize_name(&self.last_name, "Last name"),
        );
        let document_number = check(
            &mut errors,
            "document_number",
            normalize_document_number(&self.document_number),
        );
        let birth_ok = check(
            &mut errors,
            "birth_date",
            validate_birth_date(self.birth_date, today),
        )
        .is_some();
        let enrollment_ok = check(
            &mut errors,
            "enrollment_date",
            validate_enrollment_date(self.enrollment_date, today),
        )
        .is_some();
        check(
            &mut errors,
            "document_type_id",
            validate_positive_id(self.document_type_id, "Document type ID"),
        );
        check(
            &mut errors,
            "specialty_id",
            validate_positive_id(i64::from(self.specialty_id), "Specialty ID"),
        );
        check(
            &mut errors,
            "student_number",
            validate_positive_id(i64::from(self.student_number), "Student number"),
        );

        if birth_ok && enrollment_ok {
            check(
                &mut errors,
                "enrollment_date",
                validate_enrollment_age(self.birth_date, self.enrollment_date),
            );
        }

        match (first_name, last_name, document_number) {
            (Some(first_name), Some(last_name), Some(document_number)) if errors.is_empty() => {
                Ok(NewStudent {
                    first_name,
                    last_name,
                    document_number,
                    document_type_id: self.document_type_id,
                    birth_date: self.birth_date,
                    gender: self.gender,
                    student_number: self.student_number,
                    enrollment_date: self.enrollment_date,
                    specialty_id: self.specialty_id,
                })
            }
            _ => Err(errors),
        }
    }
}

impl UpdateStudentDto {
    /// Validates the fields present in the update.
    ///
    /// The birth/enrollment cross-field rule runs against the merge of the
    /// update with `current` whenever either date is being changed.
    pub fn normalize(
        &self,
        current: &Student,
        today: NaiveDate,
    ) -> Result<StudentChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = check_opt(
            &mut errors,
            "first_name",
            self.first_name.as_deref(),
            |v| normalize_name(v, "First name"),
        );
        let last_name = check_opt(
            &mut errors,
            "last_name",
            self.last_name.as_deref(),
            |v| normalize_name(v, "Last name"),
        );
        let document_number = check_opt(
            &mut errors,
            "document_number",
            self.document_number.as_deref(),
            normalize_document_number,
        );
        let birth_date = check_opt(&mut errors, "birth_date", self.birth_date, |v| {
            validate_birth_date(v, today).map(|_| v)
        });
        let enrollment_date = check_opt(&mut errors, "enrollment_date", self.enrollment_date, |v| {
            validate_enrollment_date(v, today).map(|_| v)
        });
        let document_type_id = check_opt(
            &mut errors,
            "document_type_id",
            self.document_type_id,
            |v| validate_positive_id(v, "Document type ID").map(|_| v),
        );
        let specialty_id = check_opt(&mut errors, "specialty_id", self.specialty_id, |v| {
            validate_positive_id(i64::from(v), "Specialty ID").map(|_| v)
        });
        let student_number = check_opt(&mut errors, "student_number", self.student_number, |v| {
            validate_positive_id(i64::from(v), "Student number").map(|_| v)
        });

        let dates_touched = self.birth_date.is_some() || self.enrollment_date.is_some();
        let dates_valid = self.birth_date.is_none() == birth_date.is_none()
            && self.enrollment_date.is_none() == enrollment_date.is_none();
        if dates_touched && dates_valid {
            check(
                &mut errors,
                "enrollment_date",
                validate_enrollment_age(
                    birth_date.unwrap_or(current.birth_date),
                    enrollment_date.unwrap_or(current.enrollment_date),
                ),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(StudentChanges {
            first_name,
            last_name,
            document_number,
            document_type_id,
            birth_date,
            gender: self.gender,
            student_number,
            enrollment_date,
            specialty_id,
        })
    }
}

impl StudentChanges {
    /// Copies every present field onto `student`.
    ///
    /// Only `document_type_id` is updated here; the caller swaps in the
    /// matching [`DocumentType`] after confirming it exists.
    pub fn apply_to(self, student: &mut Student) {
        if let Some(v) = self.first_name {
            student.first_name = v;
        }
        if let Some(v) = self.last_name {
            student.last_name = v;
        }
        if let Some(v) = self.document_number {
            student.document_number = v;
        }
        if let Some(v) = self.document_type_id {
            student.document_type_id = v;
        }
        if let Some(v) = self.birth_date {
            student.birth_date = v;
        }
        if let Some(v) = self.gender {
            student.gender = v;
        }
        if let Some(v) = self.student_number {
            student.student_number = v;
        }
        if let Some(v) = self.enrollment_date {
            student.enrollment_date = v;
        }
        if let Some(v) = self.specialty_id {
            student.specialty_id = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::DocumentTypeName;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 1)
    }

    fn valid_dto() -> CreateStudentDto {
        CreateStudentDto {
            first_name: "juan carlos".to_string(),
            last_name: "pérez garcía".to_string(),
            document_number: " 12.345.678 ".to_string(),
            document_type_id: 1,
            birth_date: date(2000, 5, 15),
            gender: Gender::Male,
            student_number: 1001,
            enrollment_date: date(2020, 3, 1),
            specialty_id: 7,
        }
    }

    fn stored_student() -> Student {
        Student {
            id: 10,
            first_name: "Juan Carlos".to_string(),
            last_name: "Pérez García".to_string(),
            document_number: "12.345.678".to_string(),
            document_type_id: 1,
            document_type: DocumentType {
                id: 1,
                name: DocumentTypeName::Dni,
                description: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            birth_date: date(2000, 5, 15),
            gender: Gender::Male,
            student_number: 1001,
            enrollment_date: date(2020, 3, 1),
            specialty_id: 7,
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_normalize_happy_path() {
        let new = valid_dto().normalize(today()).unwrap();
        assert_eq!(new.first_name, "Juan Carlos");
        assert_eq!(new.last_name, "Pérez García");
        assert_eq!(new.document_number, "12.345.678");
        assert_eq!(new.student_number, 1001);
    }

    #[test]
    fn test_create_normalize_is_idempotent() {
        let dto = valid_dto();
        assert_eq!(dto.normalize(today()), dto.normalize(today()));

        let mut bad = valid_dto();
        bad.first_name = "1x".to_string();
        bad.birth_date = date(2030, 1, 1);
        let first = bad.normalize(today()).unwrap_err();
        let second = bad.normalize(today()).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_create_normalize_collects_every_field_error() {
        let mut dto = valid_dto();
        dto.first_name = "  ".to_string();
        dto.document_number = "ab/cd".to_string();
        dto.specialty_id = 0;
        dto.document_type_id = -1;

        let errors = dto.normalize(today()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("document_number"));
        assert!(fields.contains_key("specialty_id"));
        assert!(fields.contains_key("document_type_id"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_create_rejects_future_birth_date() {
        let mut dto = valid_dto();
        dto.birth_date = date(2030, 1, 1);

        let errors = dto.normalize(today()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("birth_date"));
        // the cross-field rule is skipped when a date already failed
        assert!(!fields.contains_key("enrollment_date"));
    }

    #[test]
    fn test_create_rejects_enrollment_before_birth() {
        let mut dto = valid_dto();
        dto.birth_date = date(2000, 5, 15);
        dto.enrollment_date = date(2000, 5, 14);

        let errors = dto.normalize(date(2024, 6, 1)).unwrap_err();
        // more than 50 years back is fine here; the ordering rule fires
        let messages: Vec<String> = errors.field_errors()["enrollment_date"]
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        assert_eq!(messages, vec!["Enrollment date cannot be before birth date."]);
    }

    #[test]
    fn test_create_accepts_every_valid_date_pair() {
        // age at enrollment in [10, 100], inside the enrollment window
        let t = today();
        let pairs = [
            (date(2000, 5, 15), date(2010, 5, 15)),
            (date(1990, 1, 1), date(2024, 6, 1)),
            (date(2004, 2, 29), date(2025, 5, 31)),
            (date(1980, 12, 31), date(1990, 12, 31)),
        ];
        for (birth, enrollment) in pairs {
            let mut dto = valid_dto();
            dto.birth_date = birth;
            dto.enrollment_date = enrollment;
            assert!(
                dto.normalize(t).is_ok(),
                "expected {birth} / {enrollment} to be accepted"
            );
        }
    }

    #[test]
    fn test_update_normalize_only_touches_present_fields() {
        let dto = UpdateStudentDto {
            last_name: Some("gómez".to_string()),
            ..Default::default()
        };
        let changes = dto.normalize(&stored_student(), today()).unwrap();
        assert_eq!(changes.last_name.as_deref(), Some("Gómez"));
        assert!(changes.first_name.is_none());
        assert!(changes.student_number.is_none());
    }

    #[test]
    fn test_update_cross_field_uses_stored_birth_date() {
        let dto = UpdateStudentDto {
            enrollment_date: Some(date(2005, 1, 1)),
            ..Default::default()
        };
        let errors = dto.normalize(&stored_student(), today()).unwrap_err();
        assert!(errors.field_errors().contains_key("enrollment_date"));
    }

    #[test]
    fn test_update_rejects_invalid_name() {
        let dto = UpdateStudentDto {
            first_name: Some("J4ne".to_string()),
            ..Default::default()
        };
        let errors = dto.normalize(&stored_student(), today()).unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_changes_apply_to_student() {
        let mut student = stored_student();
        StudentChanges {
            student_number: Some(2002),
            specialty_id: Some(9),
            ..Default::default()
        }
        .apply_to(&mut student);
        assert_eq!(student.student_number, 2002);
        assert_eq!(student.specialty_id, 9);
        assert_eq!(student.first_name, "Juan Carlos");
    }

    #[test]
    fn test_full_name_and_age() {
        let student = stored_student();
        assert_eq!(student.full_name(), "Juan Carlos Pérez García");
        assert_eq!(student.age_on(date(2024, 5, 14)), 23);
        assert_eq!(student.age_on(date(2024, 5, 15)), 24);
    }

    #[test]
    fn test_response_carries_computed_fields() {
        let response = StudentResponse::from_student(stored_student(), date(2024, 6, 1));
        assert_eq!(response.full_name, "Juan Carlos Pérez García");
        assert_eq!(response.age, 24);
        assert_eq!(response.document_type.name, DocumentTypeName::Dni);
    }

    #[test]
    fn test_create_dto_deserializes_scenario_payload() {
        let dto: CreateStudentDto = serde_json::from_str(
            r#"{
                "first_name": "juan carlos",
                "last_name": "pérez garcía",
                "document_number": "12.345.678",
                "document_type_id": 1,
                "birth_date": "2000-05-15",
                "gender": "M",
                "student_number": 1001,
                "enrollment_date": "2020-03-01",
                "specialty_id": 3
            }"#,
        )
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.gender, Gender::Male);
    }

    #[test]
    fn test_padded_names_are_measured_after_trimming() {
        let mut dto = valid_dto();
        dto.first_name = format!("   {}   ", "a".repeat(50));
        dto.last_name = format!("\t{}\n", "b".repeat(49));

        assert!(dto.validate().is_ok());
        let new = dto.normalize(today()).unwrap();
        assert_eq!(new.first_name.chars().count(), 50);
        assert_eq!(new.last_name.chars().count(), 49);

        let update = UpdateStudentDto {
            first_name: Some(format!("  {}  ", "c".repeat(50))),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_overlong_trimmed_name_is_a_field_error() {
        let mut dto = valid_dto();
        dto.first_name = format!(" {} ", "a".repeat(51));

        let errors = dto.normalize(today()).unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }
}
