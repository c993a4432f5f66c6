use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{error, info, instrument};

use super::{any_rows, class_exists, like_pattern};
use crate::error::{AppError, ConstraintExt};
use crate::models::{
    ClassSubjectCount, MarksStats, NewSubject, Subject, SubjectChanges, SubjectStats,
};

const SUBJECT_SELECT: &str = "SELECT s.subject_id, s.subject_name, s.class_number,
        s.max_marks, s.created_at, c.class_name,
        (SELECT COUNT(*) FROM students st
          WHERE st.class_number = s.class_number) AS student_count
    FROM subjects s
    JOIN classes c ON s.class_number = c.class_number";

const MISSING_CLASS: &str = "Class does not exist";
const DUPLICATE_SUBJECT: &str = "Subject already exists in this class";
const DUPLICATE_SUBJECT_NAME: &str = "Subject name already exists in this class";

#[instrument(skip(pool))]
pub async fn get_all_subjects(pool: &Pool<Sqlite>) -> Result<Vec<Subject>, AppError> {
    info!("Fetching all subjects");
    let sql = format!("{SUBJECT_SELECT} ORDER BY s.class_number, s.subject_name");
    let subjects = sqlx::query_as::<_, Subject>(&sql).fetch_all(pool).await?;

    Ok(subjects)
}

#[instrument(skip(pool))]
pub async fn get_subject(pool: &Pool<Sqlite>, subject_id: i64) -> Result<Subject, AppError> {
    info!("Fetching subject by ID");
    let sql = format!("{SUBJECT_SELECT} WHERE s.subject_id = ?");
    sqlx::query_as::<_, Subject>(&sql)
        .bind(subject_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn subject_exists(pool: &Pool<Sqlite>, subject_id: i64) -> Result<bool, AppError> {
    any_rows(
        pool,
        "SELECT COUNT(*) FROM subjects WHERE subject_id = ?",
        subject_id,
    )
    .await
}

#[instrument(skip(pool))]
pub async fn get_subjects_by_class(
    pool: &Pool<Sqlite>,
    class_number: i64,
) -> Result<Vec<Subject>, AppError> {
    info!("Fetching subjects for class");
    let sql = format!("{SUBJECT_SELECT} WHERE s.class_number = ? ORDER BY s.subject_name");
    let subjects = sqlx::query_as::<_, Subject>(&sql)
        .bind(class_number)
        .fetch_all(pool)
        .await?;

    Ok(subjects)
}

/// Matches the subject name or the name of its class.
#[instrument(skip(pool))]
pub async fn search_subjects(pool: &Pool<Sqlite>, query: &str) -> Result<Vec<Subject>, AppError> {
    info!("Searching subjects");
    let pattern = like_pattern(query);
    let sql = format!(
        "{SUBJECT_SELECT}
         WHERE s.subject_name LIKE ? ESCAPE '\\' OR c.class_name LIKE ? ESCAPE '\\'
         ORDER BY s.subject_name"
    );
    let subjects = sqlx::query_as::<_, Subject>(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    Ok(subjects)
}

#[instrument(skip(pool))]
pub async fn get_subject_stats(pool: &Pool<Sqlite>) -> Result<SubjectStats, AppError> {
    info!("Computing subject statistics");
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
        .fetch_one(pool)
        .await?;

    let classes = sqlx::query_as::<_, ClassSubjectCount>(
        "SELECT c.class_name, c.class_number, COUNT(s.subject_id) AS subject_count
         FROM classes c
         LEFT JOIN subjects s ON c.class_number = s.class_number
         GROUP BY c.class_id
         ORDER BY c.class_number",
    )
    .fetch_all(pool)
    .await?;

    let marks = sqlx::query_as::<_, MarksStats>(
        "SELECT AVG(max_marks) AS average_marks, MIN(max_marks) AS min_marks,
                MAX(max_marks) AS max_marks
         FROM subjects
         WHERE max_marks IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    Ok(SubjectStats {
        total,
        classes,
        marks,
    })
}

async fn subject_name_taken(
    pool: &Pool<Sqlite>,
    subject_name: &str,
    class_number: i64,
    exclude_subject_id: Option<i64>,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM subjects
         WHERE subject_name = ? AND class_number = ? AND subject_id IS NOT ?",
    )
    .bind(subject_name)
    .bind(class_number)
    .bind(exclude_subject_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[instrument(skip(pool))]
pub async fn create_subject(pool: &Pool<Sqlite>, subject: &NewSubject) -> Result<Subject, AppError> {
    info!("Creating subject");
    if !class_exists(pool, subject.class_number).await? {
        return Err(AppError::Reference(MISSING_CLASS.to_string()));
    }

    if subject_name_taken(pool, &subject.subject_name, subject.class_number, None).await? {
        return Err(AppError::Conflict(DUPLICATE_SUBJECT.to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO subjects (subject_name, class_number, max_marks) VALUES (?, ?, ?)",
    )
    .bind(&subject.subject_name)
    .bind(subject.class_number)
    .bind(subject.max_marks)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_SUBJECT)
    .on_foreign_key_violation(MISSING_CLASS)?;

    get_subject(pool, result.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_subject(
    pool: &Pool<Sqlite>,
    subject_id: i64,
    changes: &SubjectChanges,
) -> Result<Subject, AppError> {
    info!("Updating subject");
    let existing = get_subject(pool, subject_id).await?;

    if subject_name_taken(
        pool,
        &changes.subject_name,
        existing.class_number,
        Some(subject_id),
    )
    .await?
    {
        return Err(AppError::Conflict(DUPLICATE_SUBJECT_NAME.to_string()));
    }

    sqlx::query("UPDATE subjects SET subject_name = ?, max_marks = ? WHERE subject_id = ?")
        .bind(&changes.subject_name)
        .bind(changes.max_marks)
        .bind(subject_id)
        .execute(pool)
        .await
        .map_err(AppError::from)
        .on_unique_violation(DUPLICATE_SUBJECT_NAME)?;

    get_subject(pool, subject_id).await
}

async fn delete_subject_rows(conn: &mut SqliteConnection, subject_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM teacher_assignments WHERE subject_id = ?")
        .bind(subject_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM exam_records WHERE subject_id = ?")
        .bind(subject_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM subjects WHERE subject_id = ?")
        .bind(subject_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Removes the subject together with its assignments and exam records, all or nothing.
#[instrument(skip(pool))]
pub async fn delete_subject(pool: &Pool<Sqlite>, subject_id: i64) -> Result<(), AppError> {
    info!("Deleting subject");
    get_subject(pool, subject_id).await?;

    let mut tx = pool.begin().await.map_err(AppError::Transaction)?;

    match delete_subject_rows(&mut tx, subject_id).await {
        Ok(()) => {
            tx.commit().await.map_err(AppError::Transaction)?;
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Failed to roll back subject deletion");
            }
            Err(AppError::Transaction(err))
        }
    }
}
