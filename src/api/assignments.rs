use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::{ApiResponse, Empty};
use crate::db::{
    create_assignment, delete_assignment, get_all_assignments, get_assignment, update_assignment,
};
use crate::error::AppError;
use crate::forms::AssignmentForm;
use crate::models::Assignment;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentList {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentBody {
    pub assignment: Assignment,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentCreated {
    #[serde(rename = "assignmentId")]
    pub assignment_id: i64,
    pub assignment: Assignment,
}

#[get("/teacher-assignments?<teacher_id>&<class_number>")]
pub async fn api_get_assignments(
    teacher_id: Option<i64>,
    class_number: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<AssignmentList>>, AppError> {
    let assignments = get_all_assignments(db, teacher_id, class_number).await?;
    Ok(ApiResponse::ok(AssignmentList { assignments }))
}

#[get("/teacher-assignments/<id>")]
pub async fn api_get_assignment(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<AssignmentBody>>, AppError> {
    let assignment = get_assignment(db, id).await?;
    Ok(ApiResponse::ok(AssignmentBody { assignment }))
}

#[post("/teacher-assignments", data = "<form>")]
pub async fn api_create_assignment(
    form: Json<AssignmentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<AssignmentCreated>>, AppError> {
    let assignment = create_assignment(db, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        AssignmentCreated {
            assignment_id: assignment.assignment_id,
            assignment,
        },
        "Teacher assigned successfully",
    ))
}

#[put("/teacher-assignments/<id>", data = "<form>")]
pub async fn api_update_assignment(
    id: i64,
    form: Json<AssignmentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<AssignmentBody>>, AppError> {
    let assignment = update_assignment(db, id, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        AssignmentBody { assignment },
        "Assignment updated successfully",
    ))
}

#[delete("/teacher-assignments/<id>")]
pub async fn api_delete_assignment(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    delete_assignment(db, id).await?;
    Ok(ApiResponse::with_message(Empty {}, "Assignment deleted successfully"))
}
