use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::{ApiResponse, Empty};
use crate::db::{create_class, delete_class, get_all_classes, get_class, update_class};
use crate::error::AppError;
use crate::forms::ClassForm;
use crate::models::Class;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassList {
    pub classes: Vec<Class>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassBody {
    pub class: Class,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassCreated {
    #[serde(rename = "classId")]
    pub class_id: i64,
    pub class: Class,
}

#[get("/classes")]
pub async fn api_get_classes(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<ClassList>>, AppError> {
    let classes = get_all_classes(db).await?;
    Ok(ApiResponse::ok(ClassList { classes }))
}

#[get("/classes/<id>")]
pub async fn api_get_class(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<ClassBody>>, AppError> {
    let class = get_class(db, id).await?;
    Ok(ApiResponse::ok(ClassBody { class }))
}

#[post("/classes", data = "<form>")]
pub async fn api_create_class(
    form: Json<ClassForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<ClassCreated>>, AppError> {
    let class = create_class(db, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        ClassCreated {
            class_id: class.class_id,
            class,
        },
        "Class added successfully",
    ))
}

#[put("/classes/<id>", data = "<form>")]
pub async fn api_update_class(
    id: i64,
    form: Json<ClassForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<ClassBody>>, AppError> {
    let class = update_class(db, id, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        ClassBody { class },
        "Class updated successfully",
    ))
}

#[delete("/classes/<id>")]
pub async fn api_delete_class(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    delete_class(db, id).await?;
    Ok(ApiResponse::with_message(Empty {}, "Class deleted successfully"))
}
