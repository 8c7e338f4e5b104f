//! HTTP handlers of the customer API and the JSON envelope helpers they share.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;

use crate::dto::api::{ApiEnvelope, ApiErrorBody, Page};
use crate::services::ServiceError;

pub mod auth;
pub mod customers;
pub mod roles;
pub mod users;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self)
    }
}

/// Renders a service failure as an error envelope.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let status = ResponseError::status_code(err);
    if status.is_server_error() {
        log::error!("{err}");
    }

    let details = match err {
        ServiceError::Validation { details, .. } if !details.is_empty() => {
            serde_json::to_value(details).ok()
        }
        _ => None,
    };

    HttpResponse::build(status).json(ApiEnvelope::<()>::failure(ApiErrorBody {
        message: err.public_message(),
        code: Some(err.code().to_string()),
        details,
    }))
}

pub fn success_response<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(ApiEnvelope::success(data))
}

pub fn paginated_response<T: Serialize>(page: Page<T>) -> HttpResponse {
    HttpResponse::Ok().json(ApiEnvelope::paginated(page.items, page.pagination))
}

/// Reports malformed JSON bodies in the error envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(&ServiceError::validation(format!("Invalid JSON body: {err}")));
    InternalError::from_response(err, response).into()
}

/// Reports malformed query strings in the error envelope.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(&ServiceError::validation(format!(
        "Invalid query parameters: {err}"
    )));
    InternalError::from_response(err, response).into()
}
