#[macro_use]
extern crate rocket;

pub mod api;
pub mod client;
pub mod config;
pub mod cors;
pub mod database;
pub mod db;
pub mod env;
pub mod error;
pub mod forms;
pub mod models;
pub mod telemetry;
pub mod validation;
#[cfg(test)]
mod test;

use api::{
    api_create_assignment, api_create_class, api_create_student, api_create_subject,
    api_create_teacher, api_delete_assignment, api_delete_class, api_delete_student,
    api_delete_subject, api_delete_teacher, api_get_assignment, api_get_assignments,
    api_get_class, api_get_classes, api_get_student, api_get_student_stats, api_get_students,
    api_get_students_by_class, api_get_subject, api_get_subject_stats, api_get_subjects,
    api_get_subjects_by_class, api_get_teacher, api_get_teachers, api_search_students,
    api_search_subjects, api_update_assignment, api_update_class, api_update_student,
    api_update_subject, api_update_teacher, bad_request, health, internal_error, not_found,
    unprocessable,
};
use config::AppConfig;
use cors::{CorsFairing, preflight};
use rocket::{Build, Rocket};
use sqlx::{Pool, Sqlite};
use telemetry::TelemetryFairing;
use tracing::info;

pub async fn init_rocket(pool: Pool<Sqlite>, config: &AppConfig) -> Rocket<Build> {
    info!("Starting student admin");

    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                api_get_classes,
                api_get_class,
                api_create_class,
                api_update_class,
                api_delete_class,
                api_get_students,
                api_get_student,
                api_get_students_by_class,
                api_search_students,
                api_get_student_stats,
                api_create_student,
                api_update_student,
                api_delete_student,
                api_get_teachers,
                api_get_teacher,
                api_create_teacher,
                api_update_teacher,
                api_delete_teacher,
                api_get_subjects,
                api_get_subject,
                api_get_subjects_by_class,
                api_search_subjects,
                api_get_subject_stats,
                api_create_subject,
                api_update_subject,
                api_delete_subject,
                api_get_assignments,
                api_get_assignment,
                api_create_assignment,
                api_update_assignment,
                api_delete_assignment,
            ],
        )
        .mount("/api", routes![health, preflight])
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .attach(CorsFairing::new(config.cors_allowed_origin.clone()))
        .attach(TelemetryFairing)
}
