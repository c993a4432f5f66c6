mod assignments;
mod classes;
mod students;
mod subjects;
mod teachers;

pub use assignments::*;
pub use classes::*;
pub use students::*;
pub use subjects::*;
pub use teachers::*;

use rocket::Request;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use crate::error::ErrorBody;

/// Success envelope: `{ "success": true, <payload fields>, "message"? }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    pub fn with_message(data: T, message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.to_string()),
        })
    }
}

/// Payload of responses that only carry a message.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[catch(400)]
pub fn bad_request(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::BadRequest, format!("Malformed request to {}", req.uri()))
}

#[catch(404)]
pub fn not_found(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::NotFound, format!("No route for {} {}", req.method(), req.uri()))
}

#[catch(422)]
pub fn unprocessable(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(
        Status::UnprocessableEntity,
        format!("Request body or parameters for {} could not be read", req.uri()),
    )
}

#[catch(500)]
pub fn internal_error() -> Custom<Json<ErrorBody>> {
    json_error(Status::InternalServerError, "Internal server error".to_string())
}

fn json_error(status: Status, message: String) -> Custom<Json<ErrorBody>> {
    Custom(status, Json(ErrorBody::new(message)))
}
