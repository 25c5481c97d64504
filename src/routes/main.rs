use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::privacy::PrivacyLevel;
use crate::forms::client::ClientForm;
use crate::forms::main::UploadClientsForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, finish_post, redirect, render_template};
use crate::services::ServiceError;
use crate::services::main::{self as main_service, IndexQuery};

#[get("/")]
pub async fn show_index(
    params: web::Query<IndexQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match main_service::load_index_page(repo.get_ref(), &user, params.into_inner(), now) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "index",
                &server_config.auth_service_url,
            );
            context.insert("clients", &data.clients);
            context.insert("search_query", &data.search_query);
            context.insert("tag_id", &data.tag_id);
            context.insert("tags", &data.tags);
            context.insert("upcoming_meetings", &data.upcoming_meetings);
            context.insert("expiring_policies", &data.expiring_policies);
            context.insert("agents", &data.agents);
            context.insert("show_confidential", &data.show_confidential);
            context.insert("can_reveal", &data.can_reveal);
            context.insert("privacy_levels", &PrivacyLevel::ALL);

            render_template(&tera, "main/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::TypeConstraint(message)) | Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load the index page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/client/add")]
pub async fn add_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    match main_service::add_client(repo.get_ref(), &user, form) {
        Ok(client) => {
            FlashMessage::success("Client added.").send();
            redirect(&format!("/client/{}", client.id))
        }
        other => finish_post(other, "Client added.", "Failed to add the client", "/"),
    }
}

#[post("/clients/upload")]
pub async fn clients_upload(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadClientsForm>,
) -> impl Responder {
    match main_service::upload_clients(repo.get_ref(), &user, &form) {
        Ok(count) => {
            FlashMessage::success(format!("{count} clients imported.")).send();
            redirect("/")
        }
        other => finish_post(other, "Clients imported.", "Failed to import clients", "/"),
    }
}
