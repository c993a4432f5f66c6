use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::{ApiResponse, Empty};
use crate::db::{
    create_student, delete_student, get_all_students, get_student, get_student_stats,
    get_students_by_class, search_students, update_student,
};
use crate::error::AppError;
use crate::forms::StudentForm;
use crate::models::{Student, StudentStats};

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentList {
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentBody {
    pub student: Student,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentCreated {
    #[serde(rename = "studentId")]
    pub student_id: i64,
    pub student: Student,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentSearch {
    pub students: Vec<Student>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentStatsBody {
    pub stats: StudentStats,
}

#[get("/students")]
pub async fn api_get_students(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentList>>, AppError> {
    let students = get_all_students(db).await?;
    Ok(ApiResponse::ok(StudentList { students }))
}

#[get("/students/<id>")]
pub async fn api_get_student(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentBody>>, AppError> {
    let student = get_student(db, id).await?;
    Ok(ApiResponse::ok(StudentBody { student }))
}

#[get("/students/class/<class_number>")]
pub async fn api_get_students_by_class(
    class_number: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentList>>, AppError> {
    let students = get_students_by_class(db, class_number).await?;
    Ok(ApiResponse::ok(StudentList { students }))
}

#[get("/students/search/<query>")]
pub async fn api_search_students(
    query: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentSearch>>, AppError> {
    let students = search_students(db, query).await?;
    Ok(ApiResponse::ok(StudentSearch {
        count: students.len(),
        students,
    }))
}

#[get("/students/stats/summary")]
pub async fn api_get_student_stats(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentStatsBody>>, AppError> {
    let stats = get_student_stats(db).await?;
    Ok(ApiResponse::ok(StudentStatsBody { stats }))
}

#[post("/students", data = "<form>")]
pub async fn api_create_student(
    form: Json<StudentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentCreated>>, AppError> {
    let student = create_student(db, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        StudentCreated {
            student_id: student.student_id,
            student,
        },
        "Student added successfully",
    ))
}

#[put("/students/<id>", data = "<form>")]
pub async fn api_update_student(
    id: i64,
    form: Json<StudentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<StudentBody>>, AppError> {
    let student = update_student(db, id, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        StudentBody { student },
        "Student updated successfully",
    ))
}

#[delete("/students/<id>")]
pub async fn api_delete_student(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    delete_student(db, id).await?;
    Ok(ApiResponse::with_message(Empty {}, "Student deleted successfully"))
}
