use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::{class_exists, subject_exists, teacher_exists};
use crate::error::{AppError, ConstraintExt};
use crate::models::{Assignment, NewAssignment};

const ASSIGNMENT_SELECT: &str = "SELECT ta.assignment_id, ta.teacher_id, ta.class_number,
        ta.subject_id, ta.created_at, t.name AS teacher_name, s.subject_name, c.class_name
    FROM teacher_assignments ta
    LEFT JOIN teachers t ON ta.teacher_id = t.teacher_id
    LEFT JOIN subjects s ON ta.subject_id = s.subject_id
    LEFT JOIN classes c ON ta.class_number = c.class_number";

const DUPLICATE_ASSIGNMENT: &str =
    "Teacher is already assigned to this subject in the specified class";
const INVALID_REFERENCE: &str = "Invalid teacher, class, or subject ID";

/// Newest first, optionally narrowed to one teacher and/or one class.
#[instrument(skip(pool))]
pub async fn get_all_assignments(
    pool: &Pool<Sqlite>,
    teacher_id: Option<i64>,
    class_number: Option<i64>,
) -> Result<Vec<Assignment>, AppError> {
    info!("Fetching teacher assignments");
    let sql = format!(
        "{ASSIGNMENT_SELECT}
         WHERE (? IS NULL OR ta.teacher_id = ?)
           AND (? IS NULL OR ta.class_number = ?)
         ORDER BY ta.created_at DESC, ta.assignment_id DESC"
    );
    let assignments = sqlx::query_as::<_, Assignment>(&sql)
        .bind(teacher_id)
        .bind(teacher_id)
        .bind(class_number)
        .bind(class_number)
        .fetch_all(pool)
        .await?;

    Ok(assignments)
}

#[instrument(skip(pool))]
pub async fn get_assignment(
    pool: &Pool<Sqlite>,
    assignment_id: i64,
) -> Result<Assignment, AppError> {
    info!("Fetching assignment by ID");
    let sql = format!("{ASSIGNMENT_SELECT} WHERE ta.assignment_id = ?");
    sqlx::query_as::<_, Assignment>(&sql)
        .bind(assignment_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

async fn check_references(pool: &Pool<Sqlite>, assignment: &NewAssignment) -> Result<(), AppError> {
    if !teacher_exists(pool, assignment.teacher_id).await? {
        return Err(AppError::Reference("Teacher does not exist".to_string()));
    }
    if !class_exists(pool, assignment.class_number).await? {
        return Err(AppError::Reference("Class does not exist".to_string()));
    }
    if !subject_exists(pool, assignment.subject_id).await? {
        return Err(AppError::Reference("Subject does not exist".to_string()));
    }
    Ok(())
}

async fn assignment_taken(
    pool: &Pool<Sqlite>,
    assignment: &NewAssignment,
    exclude_assignment_id: Option<i64>,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM teacher_assignments
         WHERE teacher_id = ? AND class_number = ? AND subject_id = ?
           AND assignment_id IS NOT ?",
    )
    .bind(assignment.teacher_id)
    .bind(assignment.class_number)
    .bind(assignment.subject_id)
    .bind(exclude_assignment_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[instrument(skip(pool))]
pub async fn create_assignment(
    pool: &Pool<Sqlite>,
    assignment: &NewAssignment,
) -> Result<Assignment, AppError> {
    info!("Assigning teacher");
    check_references(pool, assignment).await?;

    if assignment_taken(pool, assignment, None).await? {
        return Err(AppError::Conflict(DUPLICATE_ASSIGNMENT.to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO teacher_assignments (teacher_id, class_number, subject_id)
         VALUES (?, ?, ?)",
    )
    .bind(assignment.teacher_id)
    .bind(assignment.class_number)
    .bind(assignment.subject_id)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_ASSIGNMENT)
    .on_foreign_key_violation(INVALID_REFERENCE)?;

    get_assignment(pool, result.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_assignment(
    pool: &Pool<Sqlite>,
    assignment_id: i64,
    assignment: &NewAssignment,
) -> Result<Assignment, AppError> {
    info!("Updating assignment");
    get_assignment(pool, assignment_id).await?;
    check_references(pool, assignment).await?;

    if assignment_taken(pool, assignment, Some(assignment_id)).await? {
        return Err(AppError::Conflict(DUPLICATE_ASSIGNMENT.to_string()));
    }

    sqlx::query(
        "UPDATE teacher_assignments
         SET teacher_id = ?, class_number = ?, subject_id = ?
         WHERE assignment_id = ?",
    )
    .bind(assignment.teacher_id)
    .bind(assignment.class_number)
    .bind(assignment.subject_id)
    .bind(assignment_id)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_ASSIGNMENT)
    .on_foreign_key_violation(INVALID_REFERENCE)?;

    get_assignment(pool, assignment_id).await
}

#[instrument(skip(pool))]
pub async fn delete_assignment(pool: &Pool<Sqlite>, assignment_id: i64) -> Result<(), AppError> {
    info!("Deleting assignment");
    get_assignment(pool, assignment_id).await?;

    sqlx::query("DELETE FROM teacher_assignments WHERE assignment_id = ?")
        .bind(assignment_id)
        .execute(pool)
        .await?;

    Ok(())
}
