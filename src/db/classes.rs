use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::any_rows;
use crate::error::{AppError, ConstraintExt};
use crate::models::{Class, NewClass};

const DUPLICATE_CLASS: &str = "Class already exists";
const CLASS_IN_USE: &str = "Cannot delete class with existing students, subjects or assignments";

#[instrument(skip(pool))]
pub async fn get_all_classes(pool: &Pool<Sqlite>) -> Result<Vec<Class>, AppError> {
    info!("Fetching all classes");
    let classes = sqlx::query_as::<_, Class>(
        "SELECT c.class_id, c.class_name, c.class_number,
                (SELECT COUNT(*) FROM students s
                  WHERE s.class_number = c.class_number) AS student_count,
                (SELECT COUNT(DISTINCT ta.teacher_id) FROM teacher_assignments ta
                  WHERE ta.class_number = c.class_number) AS teacher_count,
                (SELECT COUNT(*) FROM subjects sub
                  WHERE sub.class_number = c.class_number) AS subject_count
         FROM classes c
         ORDER BY c.class_number",
    )
    .fetch_all(pool)
    .await?;

    Ok(classes)
}

#[instrument(skip(pool))]
pub async fn get_class(pool: &Pool<Sqlite>, class_id: i64) -> Result<Class, AppError> {
    info!("Fetching class by ID");
    sqlx::query_as::<_, Class>(
        "SELECT class_id, class_name, class_number FROM classes WHERE class_id = ?",
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn class_exists(pool: &Pool<Sqlite>, class_number: i64) -> Result<bool, AppError> {
    any_rows(
        pool,
        "SELECT COUNT(*) FROM classes WHERE class_number = ?",
        class_number,
    )
    .await
}

async fn class_number_taken(
    pool: &Pool<Sqlite>,
    class_number: i64,
    exclude_class_id: Option<i64>,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM classes WHERE class_number = ? AND class_id IS NOT ?",
    )
    .bind(class_number)
    .bind(exclude_class_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[instrument(skip(pool))]
pub async fn create_class(pool: &Pool<Sqlite>, class: &NewClass) -> Result<Class, AppError> {
    info!("Creating class");
    if class_number_taken(pool, class.class_number, None).await? {
        return Err(AppError::Conflict(DUPLICATE_CLASS.to_string()));
    }

    let result = sqlx::query("INSERT INTO classes (class_name, class_number) VALUES (?, ?)")
        .bind(&class.class_name)
        .bind(class.class_number)
        .execute(pool)
        .await
        .map_err(AppError::from)
        .on_unique_violation(DUPLICATE_CLASS)?;

    get_class(pool, result.last_insert_rowid()).await
}

/// Renumbering a class carries its students, subjects and assignments along.
#[instrument(skip(pool))]
pub async fn update_class(
    pool: &Pool<Sqlite>,
    class_id: i64,
    class: &NewClass,
) -> Result<Class, AppError> {
    info!("Updating class");
    get_class(pool, class_id).await?;

    if class_number_taken(pool, class.class_number, Some(class_id)).await? {
        return Err(AppError::Conflict(DUPLICATE_CLASS.to_string()));
    }

    sqlx::query("UPDATE classes SET class_name = ?, class_number = ? WHERE class_id = ?")
        .bind(&class.class_name)
        .bind(class.class_number)
        .bind(class_id)
        .execute(pool)
        .await
        .map_err(AppError::from)
        .on_unique_violation(DUPLICATE_CLASS)?;

    get_class(pool, class_id).await
}

#[instrument(skip(pool))]
pub async fn delete_class(pool: &Pool<Sqlite>, class_id: i64) -> Result<(), AppError> {
    info!("Deleting class");
    get_class(pool, class_id).await?;

    sqlx::query("DELETE FROM classes WHERE class_id = ?")
        .bind(class_id)
        .execute(pool)
        .await
        .map_err(AppError::from)
        .on_foreign_key_violation(CLASS_IN_USE)?;

    Ok(())
}
