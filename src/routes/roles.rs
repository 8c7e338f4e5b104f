use actix_web::http::StatusCode;
use actix_web::{Responder, get, web};

use crate::domain::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{error_response, success_response};
use crate::services::roles as service;

#[get("/roles")]
pub async fn list_roles(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::list_roles(repo.get_ref(), &user) {
        Ok(roles) => success_response(StatusCode::OK, roles),
        Err(err) => error_response(&err),
    }
}
