use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use super::{class_exists, like_pattern};
use crate::error::{AppError, ConstraintExt};
use crate::models::{
    AgeStats, ClassStudentCount, GenderCount, NewStudent, Student, StudentStats,
};

const STUDENT_SELECT: &str = "SELECT s.student_id, s.roll_number, s.name, s.fname, s.age,
        s.class_number, s.gender, s.address, s.phone, s.created_at, s.updated_at,
        c.class_name
    FROM students s
    LEFT JOIN classes c ON s.class_number = c.class_number";

const DUPLICATE_ROLL_NUMBER: &str = "Roll number already exists";
const MISSING_CLASS: &str = "Class does not exist";

#[instrument(skip(pool))]
pub async fn get_all_students(pool: &Pool<Sqlite>) -> Result<Vec<Student>, AppError> {
    info!("Fetching all students");
    let sql = format!("{STUDENT_SELECT} ORDER BY s.class_number, s.name");
    let students = sqlx::query_as::<_, Student>(&sql).fetch_all(pool).await?;

    Ok(students)
}

#[instrument(skip(pool))]
pub async fn get_student(pool: &Pool<Sqlite>, student_id: i64) -> Result<Student, AppError> {
    info!("Fetching student by ID");
    let sql = format!("{STUDENT_SELECT} WHERE s.student_id = ?");
    sqlx::query_as::<_, Student>(&sql)
        .bind(student_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
}

#[instrument(skip(pool))]
pub async fn get_students_by_class(
    pool: &Pool<Sqlite>,
    class_number: i64,
) -> Result<Vec<Student>, AppError> {
    info!("Fetching students for class");
    let sql = format!("{STUDENT_SELECT} WHERE s.class_number = ? ORDER BY s.roll_number, s.name");
    let students = sqlx::query_as::<_, Student>(&sql)
        .bind(class_number)
        .fetch_all(pool)
        .await?;

    Ok(students)
}

/// Matches name, roll number or father name anywhere in the value.
#[instrument(skip(pool))]
pub async fn search_students(pool: &Pool<Sqlite>, query: &str) -> Result<Vec<Student>, AppError> {
    info!("Searching students");
    let pattern = like_pattern(query);
    let sql = format!(
        "{STUDENT_SELECT}
         WHERE s.name LIKE ? ESCAPE '\\' OR s.roll_number LIKE ? ESCAPE '\\'
            OR s.fname LIKE ? ESCAPE '\\'
         ORDER BY s.name"
    );
    let students = sqlx::query_as::<_, Student>(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

    Ok(students)
}

#[instrument(skip(pool))]
pub async fn get_student_stats(pool: &Pool<Sqlite>) -> Result<StudentStats, AppError> {
    info!("Computing student statistics");
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await?;

    let gender = sqlx::query_as::<_, GenderCount>(
        "SELECT gender, COUNT(*) AS count
         FROM students
         WHERE gender IS NOT NULL
         GROUP BY gender
         ORDER BY gender",
    )
    .fetch_all(pool)
    .await?;

    let classes = sqlx::query_as::<_, ClassStudentCount>(
        "SELECT c.class_name, c.class_number, COUNT(s.student_id) AS student_count
         FROM classes c
         LEFT JOIN students s ON c.class_number = s.class_number
         GROUP BY c.class_id
         ORDER BY c.class_number",
    )
    .fetch_all(pool)
    .await?;

    let age = sqlx::query_as::<_, AgeStats>(
        "SELECT AVG(age) AS average_age, MIN(age) AS min_age, MAX(age) AS max_age
         FROM students
         WHERE age IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    Ok(StudentStats {
        total,
        gender,
        classes,
        age,
    })
}

async fn roll_number_taken(
    pool: &Pool<Sqlite>,
    roll_number: &str,
    exclude_student_id: Option<i64>,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM students WHERE roll_number = ? AND student_id IS NOT ?",
    )
    .bind(roll_number)
    .bind(exclude_student_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[instrument(skip(pool))]
pub async fn create_student(pool: &Pool<Sqlite>, student: &NewStudent) -> Result<Student, AppError> {
    info!("Creating student");
    if !class_exists(pool, student.class_number).await? {
        return Err(AppError::Reference(MISSING_CLASS.to_string()));
    }

    if roll_number_taken(pool, &student.roll_number, None).await? {
        return Err(AppError::Conflict(DUPLICATE_ROLL_NUMBER.to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO students
            (roll_number, name, fname, age, class_number, gender, address, phone)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&student.roll_number)
    .bind(&student.name)
    .bind(&student.fname)
    .bind(student.age)
    .bind(student.class_number)
    .bind(student.gender.map(|g| g.as_str()))
    .bind(&student.address)
    .bind(&student.phone)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_ROLL_NUMBER)
    .on_foreign_key_violation(MISSING_CLASS)?;

    get_student(pool, result.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn update_student(
    pool: &Pool<Sqlite>,
    student_id: i64,
    student: &NewStudent,
) -> Result<Student, AppError> {
    info!("Updating student");
    get_student(pool, student_id).await?;

    if !class_exists(pool, student.class_number).await? {
        return Err(AppError::Reference(MISSING_CLASS.to_string()));
    }

    if roll_number_taken(pool, &student.roll_number, Some(student_id)).await? {
        return Err(AppError::Conflict(DUPLICATE_ROLL_NUMBER.to_string()));
    }

    sqlx::query(
        "UPDATE students
         SET roll_number = ?, name = ?, fname = ?, age = ?, class_number = ?,
             gender = ?, address = ?, phone = ?, updated_at = CURRENT_TIMESTAMP
         WHERE student_id = ?",
    )
    .bind(&student.roll_number)
    .bind(&student.name)
    .bind(&student.fname)
    .bind(student.age)
    .bind(student.class_number)
    .bind(student.gender.map(|g| g.as_str()))
    .bind(&student.address)
    .bind(&student.phone)
    .bind(student_id)
    .execute(pool)
    .await
    .map_err(AppError::from)
    .on_unique_violation(DUPLICATE_ROLL_NUMBER)
    .on_foreign_key_violation(MISSING_CLASS)?;

    get_student(pool, student_id).await
}

/// Exam records of the student go with it.
#[instrument(skip(pool))]
pub async fn delete_student(pool: &Pool<Sqlite>, student_id: i64) -> Result<(), AppError> {
    info!("Deleting student");
    get_student(pool, student_id).await?;

    sqlx::query("DELETE FROM students WHERE student_id = ?")
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}
