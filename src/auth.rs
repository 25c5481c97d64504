//! Identity of the signed-in user.
//!
//! The external auth service stores a signed JWT as the `actix-identity` id.
//! Every request decodes it again with the shared secret, so role changes
//! made in the auth service apply as soon as a new token is issued.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::SERVICE_ADMIN_ROLE;
use crate::models::config::ServerConfig;
use crate::services::{ServiceError, ServiceResult};

/// Claims carried by the identity token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Verifies and decodes an HS256 token.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// Signs the claims; used by tests and local tooling.
    pub fn to_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn is_admin(&self) -> bool {
        check_role(SERVICE_ADMIN_ROLE, &self.roles)
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("Not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| ErrorUnauthorized("Not signed in"))?;

    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("Server configuration is missing"))?;

    AuthenticatedUser::from_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected identity token: {err}");
        ErrorUnauthorized("Invalid identity token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}
