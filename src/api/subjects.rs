use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use super::{ApiResponse, Empty};
use crate::db::{
    create_subject, delete_subject, get_all_subjects, get_subject, get_subject_stats,
    get_subjects_by_class, search_subjects, update_subject,
};
use crate::error::AppError;
use crate::forms::{SubjectForm, SubjectUpdate};
use crate::models::{Subject, SubjectStats};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectList {
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectBody {
    pub subject: Subject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectCreated {
    #[serde(rename = "subjectId")]
    pub subject_id: i64,
    pub subject: Subject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectSearch {
    pub subjects: Vec<Subject>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectStatsBody {
    pub stats: SubjectStats,
}

#[get("/subjects")]
pub async fn api_get_subjects(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectList>>, AppError> {
    let subjects = get_all_subjects(db).await?;
    Ok(ApiResponse::ok(SubjectList { subjects }))
}

#[get("/subjects/<id>")]
pub async fn api_get_subject(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectBody>>, AppError> {
    let subject = get_subject(db, id).await?;
    Ok(ApiResponse::ok(SubjectBody { subject }))
}

#[get("/subjects/class/<class_number>")]
pub async fn api_get_subjects_by_class(
    class_number: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectList>>, AppError> {
    let subjects = get_subjects_by_class(db, class_number).await?;
    Ok(ApiResponse::ok(SubjectList { subjects }))
}

#[get("/subjects/search/<query>")]
pub async fn api_search_subjects(
    query: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectSearch>>, AppError> {
    let subjects = search_subjects(db, query).await?;
    Ok(ApiResponse::ok(SubjectSearch {
        count: subjects.len(),
        subjects,
    }))
}

#[get("/subjects/stats/summary")]
pub async fn api_get_subject_stats(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectStatsBody>>, AppError> {
    let stats = get_subject_stats(db).await?;
    Ok(ApiResponse::ok(SubjectStatsBody { stats }))
}

#[post("/subjects", data = "<form>")]
pub async fn api_create_subject(
    form: Json<SubjectForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectCreated>>, AppError> {
    let subject = create_subject(db, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        SubjectCreated {
            subject_id: subject.subject_id,
            subject,
        },
        "Subject added successfully",
    ))
}

/// Only the name and maximum marks change; the class stays.
#[put("/subjects/<id>", data = "<form>")]
pub async fn api_update_subject(
    id: i64,
    form: Json<SubjectUpdate>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<SubjectBody>>, AppError> {
    let subject = update_subject(db, id, &form.validate()?).await?;
    Ok(ApiResponse::with_message(
        SubjectBody { subject },
        "Subject updated successfully",
    ))
}

#[delete("/subjects/<id>")]
pub async fn api_delete_subject(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    delete_subject(db, id).await?;
    Ok(ApiResponse::with_message(Empty {}, "Subject deleted successfully"))
}
