use actix_web::http::StatusCode;
use actix_web::{Responder, get, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::user::{UpdateRoleForm, UserListParams};
use crate::repository::DieselRepository;
use crate::routes::{error_response, paginated_response, success_response};
use crate::services::users as service;

#[get("/user")]
pub async fn current_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::current_user(repo.get_ref(), &user) {
        Ok(profile) => success_response(StatusCode::OK, profile),
        Err(err) => error_response(&err),
    }
}

#[put("/user")]
pub async fn update_user(
    form: web::Json<UpdateRoleForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::update_role(repo.get_ref(), &user, form.into_inner()) {
        Ok(updated) => success_response(StatusCode::OK, updated),
        Err(err) => error_response(&err),
    }
}

#[get("/roles/users")]
pub async fn list_users(
    params: web::Query<UserListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::list_users_with_roles(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => paginated_response(page),
        Err(err) => error_response(&err),
    }
}
