//! Login hand-off from the external auth provider and logout.

use actix_identity::Identity;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::routes::error_response;
use crate::services::ServiceError;

#[derive(Deserialize)]
struct CallbackParams {
    token: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Stores a verified provider token in the identity cookie.
#[get("/auth/callback")]
pub async fn callback(
    request: HttpRequest,
    params: web::Query<CallbackParams>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Some(token) = params.token.as_deref().filter(|t| !t.is_empty()) else {
        return redirect("/");
    };

    if let Err(e) = AuthenticatedUser::from_jwt(token, &server_config.secret) {
        log::warn!("Login with invalid token: {e}");
        return error_response(&ServiceError::Unauthenticated);
    }

    match Identity::login(&request.extensions(), token.to_string()) {
        Ok(_) => redirect("/"),
        Err(e) => error_response(&ServiceError::Internal(format!("Failed to log in: {e}"))),
    }
}

#[post("/auth/logout")]
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect("/")
}
