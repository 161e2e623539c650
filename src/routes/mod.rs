use actix_web::HttpResponse;
use serde::Serialize;

use crate::services::ServiceError;

pub mod api;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps a service failure onto the HTTP response returned by the JSON API.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Forbidden().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(ErrorBody { error: message })
        }
        ServiceError::Internal => HttpResponse::InternalServerError().finish(),
        err => {
            log::error!("Unhandled service error: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
