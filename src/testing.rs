//! In-memory doubles for the persistence gateways and the specialty validator.
//!
//! [`InMemoryDatabase`] mimics the constraints the PostgreSQL schema enforces
//! (unique numbers among active rows, the document type foreign key) so the
//! domain services can be exercised without a database.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value, json};
use sysacad_academic::{AcademicError, Specialty, SpecialtyValidator};
use sysacad_cache::Cache;
use sysacad_config::DeletePolicy;
use sysacad_core::AppError;
use sysacad_models::{
    CreateStudentDto, DocumentType, DocumentTypeName, Gender, NewDocumentType, NewStudent,
    Student,
};

use crate::modules::document_types::{DocumentTypeRepository, DocumentTypeService};
use crate::modules::students::{StudentRepository, StudentService};

#[derive(Default)]
struct Tables {
    document_types: BTreeMap<i64, DocumentType>,
    students: BTreeMap<i64, Student>,
    next_document_type_id: i64,
    next_student_id: i64,
}

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
    student_reads: AtomicUsize,
    document_type_reads: AtomicUsize,
}

impl InMemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts the four document types and returns them in insertion order.
    pub fn seed_document_types(&self) -> Vec<DocumentType> {
        let mut tables = self.tables();
        DocumentTypeName::ALL
            .iter()
            .map(|name| {
                tables.next_document_type_id += 1;
                let now = Utc::now();
                let row = DocumentType {
                    id: tables.next_document_type_id,
                    name: *name,
                    description: name.label().to_string(),
                    created_at: now,
                    updated_at: now,
                };
                tables.document_types.insert(row.id, row.clone());
                row
            })
            .collect()
    }

    /// Every stored student row, soft-deleted ones included.
    pub fn student_rows(&self) -> Vec<Student> {
        self.tables().students.values().cloned().collect()
    }

    pub fn student_row(&self, id: i64) -> Option<Student> {
        self.tables().students.get(&id).cloned()
    }

    /// Number of student reads that reached storage.
    pub fn student_reads(&self) -> usize {
        self.student_reads.load(Ordering::SeqCst)
    }

    pub fn document_type_reads(&self) -> usize {
        self.document_type_reads.load(Ordering::SeqCst)
    }
}

fn conflict(message: String) -> AppError {
    AppError::conflict(anyhow::anyhow!(message))
}

pub struct InMemoryDocumentTypeRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryDocumentTypeRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentTypeRepository for InMemoryDocumentTypeRepository {
    async fn create(&self, new: &NewDocumentType) -> Result<DocumentType, AppError> {
        let mut tables = self.db.tables();
        if tables.document_types.values().any(|d| d.name == new.name) {
            return Err(conflict(format!("Document type {} already exists.", new.name)));
        }

        tables.next_document_type_id += 1;
        let now = Utc::now();
        let row = DocumentType {
            id: tables.next_document_type_id,
            name: new.name,
            description: new.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.document_types.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DocumentType>, AppError> {
        self.db.document_type_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.db.tables().document_types.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: DocumentTypeName,
    ) -> Result<Option<DocumentType>, AppError> {
        self.db.document_type_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .db
            .tables()
            .document_types
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<DocumentType>, AppError> {
        self.db.document_type_reads.fetch_add(1, Ordering::SeqCst);
        let mut all: Vec<DocumentType> =
            self.db.tables().document_types.values().cloned().collect();
        all.sort_by_key(|d| d.name.code());
        Ok(all)
    }

    async fn update(&self, entity: &DocumentType) -> Result<DocumentType, AppError> {
        let mut tables = self.db.tables();
        if tables
            .document_types
            .values()
            .any(|d| d.name == entity.name && d.id != entity.id)
        {
            return Err(conflict(format!(
                "Document type {} already exists.",
                entity.name
            )));
        }

        let row = tables.document_types.get_mut(&entity.id).ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Document type with id {} does not exist.",
                entity.id
            ))
        })?;
        row.name = entity.name;
        row.description = entity.description.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.tables();
        if tables.students.values().any(|s| s.document_type_id == id) {
            return Err(conflict(format!(
                "Document type with id {} is referenced by existing students and cannot be deleted.",
                id
            )));
        }
        Ok(tables.document_types.remove(&id).is_some())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.db.tables().document_types.contains_key(&id))
    }

    async fn exists_by_name(
        &self,
        name: DocumentTypeName,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        Ok(self
            .db
            .tables()
            .document_types
            .values()
            .any(|d| d.name == name && Some(d.id) != exclude_id))
    }
}

pub struct InMemoryStudentRepository {
    db: Arc<InMemoryDatabase>,
    policy: DeletePolicy,
}

impl InMemoryStudentRepository {
    pub fn new(db: Arc<InMemoryDatabase>, policy: DeletePolicy) -> Self {
        Self { db, policy }
    }
}

fn sorted(mut students: Vec<Student>) -> Vec<Student> {
    students.sort_by(|a, b| {
        (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
    });
    students
}

/// Unique-index emulation over active rows.
fn check_unique(
    tables: &Tables,
    student_number: i32,
    document_number: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let active = tables
        .students
        .values()
        .filter(|s| s.is_active && Some(s.id) != exclude_id);

    for other in active {
        if other.student_number == student_number {
            return Err(conflict(format!(
                "Student number {} is already taken.",
                student_number
            )));
        }
        if other.document_number == document_number {
            return Err(conflict(format!(
                "Document number {} is already registered.",
                document_number
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn create(&self, new: &NewStudent) -> Result<Student, AppError> {
        let mut tables = self.db.tables();
        check_unique(&tables, new.student_number, &new.document_number, None)?;

        let document_type = tables
            .document_types
            .get(&new.document_type_id)
            .cloned()
            .ok_or_else(|| {
                conflict(format!(
                    "Document type with id {} does not exist.",
                    new.document_type_id
                ))
            })?;

        tables.next_student_id += 1;
        let now = Utc::now();
        let student = Student {
            id: tables.next_student_id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            document_number: new.document_number.clone(),
            document_type_id: new.document_type_id,
            document_type,
            birth_date: new.birth_date,
            gender: new.gender,
            student_number: new.student_number,
            enrollment_date: new.enrollment_date,
            specialty_id: new.specialty_id,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        self.db.student_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .db
            .tables()
            .students
            .get(&id)
            .filter(|s| s.is_active)
            .cloned())
    }

    async fn find_by_student_number(
        &self,
        student_number: i32,
    ) -> Result<Option<Student>, AppError> {
        self.db.student_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .db
            .tables()
            .students
            .values()
            .find(|s| s.is_active && s.student_number == student_number)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        self.db.student_reads.fetch_add(1, Ordering::SeqCst);
        let all = self
            .db
            .tables()
            .students
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        Ok(sorted(all))
    }

    async fn find_by_specialty(&self, specialty_id: i32) -> Result<Vec<Student>, AppError> {
        self.db.student_reads.fetch_add(1, Ordering::SeqCst);
        let matching = self
            .db
            .tables()
            .students
            .values()
            .filter(|s| s.is_active && s.specialty_id == specialty_id)
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        let mut tables = self.db.tables();
        check_unique(
            &tables,
            student.student_number,
            &student.document_number,
            Some(student.id),
        )?;

        let document_type = tables
            .document_types
            .get(&student.document_type_id)
            .cloned()
            .ok_or_else(|| {
                conflict(format!(
                    "Document type with id {} does not exist.",
                    student.document_type_id
                ))
            })?;

        let row = tables
            .students
            .get_mut(&student.id)
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!(
                    "Student with id {} does not exist.",
                    student.id
                ))
            })?;

        let created_at = row.created_at;
        *row = Student {
            document_type,
            is_active: true,
            deleted_at: None,
            created_at,
            updated_at: Utc::now(),
            ..student.clone()
        };
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.tables();
        match self.policy {
            DeletePolicy::Soft => match tables.students.get_mut(&id).filter(|s| s.is_active) {
                Some(row) => {
                    let now = Utc::now();
                    row.is_active = false;
                    row.deleted_at = Some(now);
                    row.updated_at = now;
                    Ok(true)
                }
                None => Ok(false),
            },
            DeletePolicy::Hard => Ok(tables.students.remove(&id).is_some()),
        }
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self
            .db
            .tables()
            .students
            .get(&id)
            .is_some_and(|s| s.is_active))
    }

    async fn exists_by_student_number(
        &self,
        student_number: i32,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        Ok(self.db.tables().students.values().any(|s| {
            s.is_active && s.student_number == student_number && Some(s.id) != exclude_id
        }))
    }

    async fn exists_by_document_number(
        &self,
        document_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        Ok(self.db.tables().students.values().any(|s| {
            s.is_active && s.document_number == document_number && Some(s.id) != exclude_id
        }))
    }

    fn delete_policy(&self) -> DeletePolicy {
        self.policy
    }
}

/// How the stub academic service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    Available,
    /// Behaves like an open circuit.
    Unavailable,
    /// Answers every call with an unexpected 500.
    ServerError,
}

/// Specialty validator answering from a fixed set of known ids.
pub struct StubSpecialtyValidator {
    known: Mutex<HashSet<i32>>,
    mode: Mutex<StubMode>,
    calls: AtomicUsize,
}

impl StubSpecialtyValidator {
    pub fn new(known: impl IntoIterator<Item = i32>) -> Self {
        Self {
            known: Mutex::new(known.into_iter().collect()),
            mode: Mutex::new(StubMode::Available),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: StubMode) {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    pub fn add_specialty(&self, id: i32) {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Total calls to either trait method.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn mode(&self) -> StubMode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn knows(&self, id: i32) -> bool {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

#[async_trait]
impl SpecialtyValidator for StubSpecialtyValidator {
    async fn validate_specialty(&self, specialty_id: i32) -> Result<bool, AcademicError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            StubMode::Available => Ok(self.knows(specialty_id)),
            StubMode::Unavailable => Err(AcademicError::CircuitOpen),
            StubMode::ServerError => Err(AcademicError::UnexpectedStatus(500)),
        }
    }

    async fn get_specialty(&self, specialty_id: i32) -> Option<Specialty> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.mode() != StubMode::Available || !self.knows(specialty_id) {
            return None;
        }

        let attributes: Map<String, Value> = match json!({
            "id": specialty_id,
            "nombre": format!("Especialidad {}", specialty_id),
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Some(Specialty { attributes })
    }
}

/// Reference date used by [`TestContext`] services.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default()
}

/// A valid create request; vary the numbers to avoid uniqueness conflicts.
pub fn student_dto(
    student_number: i32,
    document_number: &str,
    document_type_id: i64,
    specialty_id: i32,
) -> CreateStudentDto {
    CreateStudentDto {
        first_name: "juan carlos".to_string(),
        last_name: "pérez".to_string(),
        document_number: document_number.to_string(),
        document_type_id,
        birth_date: NaiveDate::from_ymd_opt(2000, 5, 15).unwrap_or_default(),
        gender: Gender::Male,
        student_number,
        enrollment_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or_default(),
        specialty_id,
    }
}

/// Domain services wired to in-memory doubles.
pub struct TestContext {
    pub db: Arc<InMemoryDatabase>,
    pub specialties: Arc<StubSpecialtyValidator>,
    pub students: StudentService,
    pub document_types: DocumentTypeService,
    /// Seeded document types: DNI, LC, LE, PASAPORTE.
    pub seeded: Vec<DocumentType>,
}

impl TestContext {
    /// Specialties 1 to 10 exist; soft delete.
    pub fn new(cache: Cache) -> Self {
        Self::with_policy(cache, DeletePolicy::Soft)
    }

    pub fn with_policy(cache: Cache, policy: DeletePolicy) -> Self {
        let db = InMemoryDatabase::new();
        let seeded = db.seed_document_types();
        let specialties = Arc::new(StubSpecialtyValidator::new(1..=10));

        let document_type_repo = Arc::new(InMemoryDocumentTypeRepository::new(db.clone()));
        let student_repo = Arc::new(InMemoryStudentRepository::new(db.clone(), policy));

        let document_types = DocumentTypeService::new(document_type_repo.clone(), cache.clone());
        let students = StudentService::new(
            student_repo,
            document_type_repo,
            specialties.clone(),
            cache,
        )
        .with_today(fixed_today);

        Self {
            db,
            specialties,
            students,
            document_types,
            seeded,
        }
    }

    pub fn dni(&self) -> &DocumentType {
        &self.seeded[0]
    }

    pub fn passport(&self) -> &DocumentType {
        &self.seeded[3]
    }
}
