//! Request principal extraction.
//!
//! Tokens are issued by the external auth provider and signed with the shared
//! `secret`. A request is authenticated by an `Authorization: Bearer` header or,
//! failing that, by the token stored in the identity cookie at login.

use std::future::{Ready, ready};

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;

impl AuthenticatedUser {
    /// Decodes and verifies an HS256 token.
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        decode::<AuthenticatedUser>(token, &key, &Validation::default()).map(|data| data.claims)
    }

    /// Signs the claims into an HS256 token.
    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Token stored at login; `None` when the identity middleware is not installed.
fn identity_token(req: &HttpRequest) -> Option<String> {
    Identity::extract(req)
        .into_inner()
        .ok()
        .and_then(|identity| identity.id().ok())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ServiceError::Internal("server configuration is not registered".into()))?;

    let token = bearer_token(req)
        .or_else(|| identity_token(req))
        .ok_or(ServiceError::Unauthenticated)?;

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|e| {
        log::debug!("Rejected session token: {e}");
        ServiceError::Unauthenticated
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
