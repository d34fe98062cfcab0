use chrono::{NaiveDate, TimeDelta};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use sysacad_models::{CreateStudentDto, DocumentTypeName, Gender, NewStudent};

use super::SeedResult;

#[derive(Debug, Clone, Copy)]
pub struct StudentSeedConfig {
    pub count: usize,
    /// Assigned to every seeded student. Not checked against the academic service.
    pub specialty_id: i32,
}

/// Random students numbered from `first_student_number` upward.
pub fn generate_candidates(
    count: usize,
    specialty_id: i32,
    document_type_id: i64,
    first_student_number: i32,
    today: NaiveDate,
) -> Vec<CreateStudentDto> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let mut rng = rand::thread_rng();

            let enrollment_date = today - TimeDelta::days(rng.gen_range(0..=5 * 365));
            let age_at_enrollment: i64 = rng.gen_range(17..=30);
            let birth_date = enrollment_date
                - TimeDelta::days(age_at_enrollment * 365 + rng.gen_range(0..365));

            let gender = match rng.gen_range(0..3) {
                0 => Gender::Male,
                1 => Gender::Female,
                _ => Gender::Other,
            };

            CreateStudentDto {
                first_name: FirstName().fake(),
                last_name: LastName().fake(),
                document_number: rng.gen_range(20_000_000..=45_999_999).to_string(),
                document_type_id,
                birth_date,
                gender,
                student_number: first_student_number + idx as i32,
                enrollment_date,
                specialty_id,
            }
        })
        .collect()
}

/// Keeps the candidates that pass every validation rule.
fn validate_candidates(candidates: Vec<CreateStudentDto>, today: NaiveDate) -> Vec<NewStudent> {
    candidates
        .into_par_iter()
        .filter_map(|dto| dto.normalize(today).ok())
        .collect()
}

pub async fn seed_students(
    db: &PgPool,
    config: StudentSeedConfig,
    today: NaiveDate,
) -> SeedResult<usize> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} students for specialty {}...",
        config.count, config.specialty_id
    );

    let document_type_id: i64 =
        sqlx::query_scalar("SELECT id FROM document_types WHERE name = $1")
            .bind(DocumentTypeName::Dni)
            .fetch_optional(db)
            .await?
            .ok_or("Document type DNI not found. Run `seed-document-types` first.")?;

    let next_number: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(student_number), 0) + 1 FROM students",
    )
    .fetch_one(db)
    .await?;

    let candidates = generate_candidates(
        config.count,
        config.specialty_id,
        document_type_id,
        next_number,
        today,
    );
    let students = validate_candidates(candidates, today);
    let skipped = config.count - students.len();

    let inserted = insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?} ({} invalid, {} duplicates skipped)",
        inserted,
        start_time.elapsed(),
        skipped,
        students.len() - inserted
    );

    Ok(inserted)
}

async fn insert_students_batch(db: &PgPool, students: &[NewStudent]) -> SeedResult<usize> {
    let mut tx = db.begin().await?;

    // 9 params per student
    const BATCH_SIZE: usize = 500;

    let mut inserted = 0;
    for chunk in students.chunks(BATCH_SIZE) {
        inserted += insert_students_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[NewStudent],
) -> SeedResult<usize> {
    if students.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO students (first_name, last_name, document_number, document_type_id, \
         birth_date, gender, student_number, enrollment_date, specialty_id) VALUES ",
    );

    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let params: Vec<String> = (1..=9).map(|p| format!("${}", i * 9 + p)).collect();
        query.push('(');
        query.push_str(&params.join(", "));
        query.push(')');
    }

    query.push_str(" ON CONFLICT DO NOTHING");

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.document_number)
            .bind(student.document_type_id)
            .bind(student.birth_date)
            .bind(student.gender)
            .bind(student.student_number)
            .bind(student.enrollment_date)
            .bind(student.specialty_id);
    }

    let result = q.execute(&mut **tx).await?;
    Ok(result.rows_affected() as usize)
}
