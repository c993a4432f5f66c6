use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::any_rows;
use crate::error::{AppError, ConstraintExt};
use crate::models::{NewTeacher, Teacher};

const TEACHER_SELECT: &str = "SELECT teacher_id, name, email, phone, qualification, age,
        gender, hire_date, created_at
    FROM teachers";

const DUPLICATE_EMAIL: &str = "Email already exists";
const TEACHER_ASSIGNED: &str =
    "Cannot delete teacher with existing assignments. Please remove assignments first.";

#[instrument(skip(pool))]
pub async fn get_all_teachers(pool: &Pool<Sqlite>) -> Result<Vec<Teacher>, AppError> {
    info!("Fetching all teachers");
    let sql = format!("{TEACHER_SELECT} ORDER BY name");
    let teachers = sqlx::query_as::<_, Teacher>(&sql).fetch_all(pool).await?;

    Ok(teachers)
}

#[instrument(skip(pool))]
pub async fn get_teacher(pool: &Pool<Sqlite>, teacher_id: i64) -> Result<Teacher, AppError> {
    info!("Fetching teacher by ID");
    let sql = format!("{TEACHER_SELECT} WHERE teacher_id = ?");
    sqlx::query_as::<_, Teacher>(&sql)
        .bind(teacher_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn teacher_exists(pool: &Pool<Sqlite>, teacher_id: i64) -> Result<bool, AppError> {
    any_rows(
        pool,
        "SELECT COUNT(*) FROM teachers WHERE teacher_id = ?",
        teacher_id,
    )
    .await
}

async fn email_taken(
    pool: &Pool<Sqlite>,
    email: &str,
    exclude_teacher_id: Option<i64>,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM teachers WHERE email = ? COLLATE NOCASE AND teacher_id IS NOT ?",
    )
    .bind(email)
    .bind(exclude_teacher_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[instrument(skip(pool))]
pub async fn create_teacher(pool: &Pool<Sqlite>, teacher: &NewTeacher) -> Result<Teacher, AppError> {
    info!("Creating teacher");
    if let Some(email) = &teacher.email {
        if email_taken(pool, email, None).await? {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
    }

    let result = sqlx::query(
        "INSERT INTO teachers (name, email, phone, qualification, age, gender, hire_date)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.phone)
    .bind(&teacher.qualification)
    .bind(teacher.age)
    .bind(teacher.gender.map(|g| g.as_str()))
    .bind(teacher.hire_date)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_EMAIL)?;

    get_teacher(pool, result.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_teacher(
    pool: &Pool<Sqlite>,
    teacher_id: i64,
    teacher: &NewTeacher,
) -> Result<Teacher, AppError> {
    info!("Updating teacher");
    get_teacher(pool, teacher_id).await?;

    if let Some(email) = &teacher.email {
        if email_taken(pool, email, Some(teacher_id)).await? {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
    }

    sqlx::query(
        "UPDATE teachers
         SET name = ?, email = ?, phone = ?, qualification = ?, age = ?, gender = ?,
             hire_date = ?
         WHERE teacher_id = ?",
    )
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.phone)
    .bind(&teacher.qualification)
    .bind(teacher.age)
    .bind(teacher.gender.map(|g| g.as_str()))
    .bind(teacher.hire_date)
    .bind(teacher_id)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_EMAIL)?;

    get_teacher(pool, teacher_id).await
}

#[instrument(skip(pool))]
pub async fn delete_teacher(pool: &Pool<Sqlite>, teacher_id: i64) -> Result<(), AppError> {
    info!("Deleting teacher");
    get_teacher(pool, teacher_id).await?;

    let assigned = any_rows(
        pool,
        "SELECT COUNT(*) FROM teacher_assignments WHERE teacher_id = ?",
        teacher_id,
    )
    .await?;
    if assigned {
        return Err(AppError::Conflict(TEACHER_ASSIGNED.to_string()));
    }

    sqlx::query("DELETE FROM teachers WHERE teacher_id = ?")
        .bind(teacher_id)
        .execute(pool)
        .await
        .map_err(AppError::from)
        .on_foreign_key_violation(TEACHER_ASSIGNED)?;

    Ok(())
}
