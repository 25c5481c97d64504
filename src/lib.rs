//! Insurance agent CRM: clients, policies, meetings and documents behind
//! privacy masking, with an admin backoffice and an audit trail.

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::middleware::{Compress, Logger};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::admin::{
    add_agent, add_tag, delete_tag, purge_audit, save_settings, save_tag, show_agents,
    show_audit, show_settings, show_tags, show_trash, toggle_agent, transfer_clients,
};
#[cfg(feature = "server")]
use crate::routes::api::api_v1_clients;
#[cfg(feature = "server")]
use crate::routes::client::{
    add_meeting, add_policy, delete_client, delete_meeting, delete_policy, purge_client,
    restore_client, save_client, save_client_tags, save_meeting, save_policy, set_meeting_status,
    show_client,
};
#[cfg(feature = "server")]
use crate::routes::documents::{delete_document, download_document, upload_document};
#[cfg(feature = "server")]
use crate::routes::main::{add_client, clients_upload, show_index};
#[cfg(feature = "server")]
use crate::routes::{logout, not_assigned};

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "crm";
pub const SERVICE_ADMIN_ROLE: &str = "crm_admin";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    std::fs::create_dir_all(&server_config.upload_dir).map_err(|e| {
        std::io::Error::other(format!(
            "Failed to create upload directory {}: {e}",
            server_config.upload_dir
        ))
    })?;

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let signin_url = format!(
        "{}/auth/signin",
        server_config.auth_service_url.trim_end_matches('/')
    );
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!("Starting agent CRM on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(web::scope("/api").service(api_v1_clients))
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized::new(&signin_url))
                    .service(show_index)
                    .service(add_client)
                    .service(clients_upload)
                    .service(show_client)
                    .service(save_client)
                    .service(delete_client)
                    .service(restore_client)
                    .service(purge_client)
                    .service(save_client_tags)
                    .service(add_policy)
                    .service(save_policy)
                    .service(delete_policy)
                    .service(add_meeting)
                    .service(save_meeting)
                    .service(set_meeting_status)
                    .service(delete_meeting)
                    .service(upload_document)
                    .service(download_document)
                    .service(delete_document)
                    .service(show_agents)
                    .service(add_agent)
                    .service(toggle_agent)
                    .service(transfer_clients)
                    .service(show_tags)
                    .service(add_tag)
                    .service(save_tag)
                    .service(delete_tag)
                    .service(show_settings)
                    .service(save_settings)
                    .service(show_audit)
                    .service(purge_audit)
                    .service(show_trash)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
