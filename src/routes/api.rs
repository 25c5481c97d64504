use actix_web::{HttpResponse, Responder, get, web};
use log::error;

use crate::auth::AuthenticatedUser;
use crate::dto::api::ClientsQuery;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, api};

/// JSON list of the caller's clients, always masked.
#[get("/v1/clients")]
pub async fn api_v1_clients(
    params: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api::list_clients(repo.get_ref(), &user, params.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::TypeConstraint(message)) | Err(ServiceError::Form(message)) => {
            HttpResponse::BadRequest().body(message)
        }
        Err(e) => {
            error!("Failed to list clients: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
