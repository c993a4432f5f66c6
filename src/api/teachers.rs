use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::{ApiResponse, Empty};
use crate::db::{create_teacher, delete_teacher, get_all_teachers, get_teacher, update_teacher};
use crate::error::AppError;
use crate::forms::TeacherForm;
use crate::models::Teacher;

#[derive(Debug, Serialize, Deserialize)]
pub struct TeacherList {
    pub teachers: Vec<Teacher>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeacherBody {
    pub teacher: Teacher,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeacherCreated {
    #[serde(rename = "teacherId")]
    pub teacher_id: i64,
    pub teacher: Teacher,
}

#[get("/teachers")]
pub async fn api_get_teachers(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<TeacherList>>, AppError> {
    let teachers = get_all_teachers(db).await?;
    Ok(ApiResponse::ok(TeacherList { teachers }))
}

#[get("/teachers/<id>")]
pub async fn api_get_teacher(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<TeacherBody>>, AppError> {
    let teacher = get_teacher(db, id).await?;
    Ok(ApiResponse::ok(TeacherBody { teacher }))
}

#[post("/teachers", data = "<form>")]
pub async fn api_create_teacher(
    form: Json<TeacherForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<TeacherCreated>>, AppError> {
    let teacher = create_teacher(db, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        TeacherCreated {
            teacher_id: teacher.teacher_id,
            teacher,
        },
        "Teacher added successfully",
    ))
}

#[put("/teachers/<id>", data = "<form>")]
pub async fn api_update_teacher(
    id: i64,
    form: Json<TeacherForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<TeacherBody>>, AppError> {
    let teacher = update_teacher(db, id, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        TeacherBody { teacher },
        "Teacher updated successfully",
    ))
}

#[delete("/teachers/<id>")]
pub async fn api_delete_teacher(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    delete_teacher(db, id).await?;
    Ok(ApiResponse::with_message(Empty {}, "Teacher deleted successfully"))
}
