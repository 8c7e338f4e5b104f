use actix_web::http::StatusCode;
use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::customer::{
    AssignManagersForm, CreateCustomerForm, CustomerListForm, UpdateCustomerForm,
};
use crate::repository::DieselRepository;
use crate::routes::{error_response, paginated_response, success_response};
use crate::services::customers as service;

#[get("/customers")]
pub async fn list_customers(
    params: web::Query<CustomerListForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::list_customers(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => paginated_response(page),
        Err(err) => error_response(&err),
    }
}

#[get("/customers/search")]
pub async fn search_customers(
    params: web::Query<CustomerListForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::search_customers(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => paginated_response(page),
        Err(err) => error_response(&err),
    }
}

#[post("/customers")]
pub async fn create_customer(
    form: web::Json<CreateCustomerForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::create_customer(repo.get_ref(), &user, form.into_inner()) {
        Ok(customer) => success_response(StatusCode::CREATED, customer),
        Err(err) => error_response(&err),
    }
}

#[get("/customers/{id}")]
pub async fn get_customer(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::get_customer(repo.get_ref(), &user, &path) {
        Ok(details) => success_response(StatusCode::OK, details),
        Err(err) => error_response(&err),
    }
}

#[put("/customers/{id}")]
pub async fn update_customer(
    path: web::Path<String>,
    form: web::Json<UpdateCustomerForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::update_customer(repo.get_ref(), &user, &path, form.into_inner()) {
        Ok(customer) => success_response(StatusCode::OK, customer),
        Err(err) => error_response(&err),
    }
}

#[delete("/customers/{id}")]
pub async fn delete_customer(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::delete_customer(repo.get_ref(), &user, &path) {
        Ok(deleted) => success_response(StatusCode::OK, deleted),
        Err(err) => error_response(&err),
    }
}

#[put("/customers/{id}/managers")]
pub async fn assign_managers(
    path: web::Path<String>,
    form: web::Json<AssignManagersForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match service::assign_managers(repo.get_ref(), &user, &path, form.into_inner()) {
        Ok(managers) => success_response(StatusCode::OK, managers),
        Err(err) => error_response(&err),
    }
}
