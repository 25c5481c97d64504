//! Backoffice pages. Every handler here requires the admin role; the
//! services enforce it and answer `Unauthorized` otherwise.

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::privacy::PrivacyLevel;
use crate::dto::admin::{AuditQuery, TrashQuery};
use crate::forms::agents::{AddAgentForm, TransferClientsForm};
use crate::forms::settings::SettingsForm;
use crate::forms::tags::TagForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, finish_post, redirect, render_template};
use crate::services::{ServiceError, agents, audit, client as client_service, settings, tags};

fn page_error(err: ServiceError, page: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            FlashMessage::error(message).send();
            redirect("/")
        }
        err => {
            log::error!("Failed to load the {page} page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/agents")]
pub async fn show_agents(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match agents::load_agents_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "agents",
                &server_config.auth_service_url,
            );
            context.insert("agents", &data.agents);
            context.insert("clients", &data.clients);
            render_template(&tera, "admin/agents.html", &context)
        }
        Err(err) => page_error(err, "agents"),
    }
}

#[post("/admin/agents/add")]
pub async fn add_agent(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddAgentForm>,
) -> impl Responder {
    let result = agents::add_agent(repo.get_ref(), &user, form);
    finish_post(result, "Agent saved.", "Failed to save the agent", "/admin/agents")
}

#[post("/admin/agents/{agent_id}/toggle")]
pub async fn toggle_agent(
    agent_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match agents::toggle_agent(repo.get_ref(), &user, agent_id.into_inner()) {
        Ok(agent) => {
            let state = if agent.is_active { "activated" } else { "deactivated" };
            FlashMessage::success(format!("{} {state}.", agent.name)).send();
            redirect("/admin/agents")
        }
        other => finish_post(other, "Agent updated.", "Failed to update the agent", "/admin/agents"),
    }
}

/// Client checkboxes repeat the `client_id` key.
#[post("/admin/agents/transfer")]
pub async fn transfer_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form: TransferClientsForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Invalid transfer form: {err}");
            FlashMessage::error("Invalid form.").send();
            return redirect("/admin/agents");
        }
    };

    match agents::transfer_clients(repo.get_ref(), &user, form) {
        Ok(count) => {
            FlashMessage::success(format!("{count} clients transferred.")).send();
            redirect("/admin/agents")
        }
        other => finish_post(
            other,
            "Clients transferred.",
            "Failed to transfer clients",
            "/admin/agents",
        ),
    }
}

#[get("/admin/tags")]
pub async fn show_tags(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match tags::load_tags_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "tags",
                &server_config.auth_service_url,
            );
            context.insert("tags", &data.tags);
            render_template(&tera, "admin/tags.html", &context)
        }
        Err(err) => page_error(err, "tags"),
    }
}

#[post("/admin/tags/add")]
pub async fn add_tag(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    let result = tags::add_tag(repo.get_ref(), &user, form);
    finish_post(result, "Tag added.", "Failed to add the tag", "/admin/tags")
}

#[post("/admin/tags/{tag_id}/save")]
pub async fn save_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TagForm>,
) -> impl Responder {
    let result = tags::update_tag(repo.get_ref(), &user, tag_id.into_inner(), form);
    finish_post(result, "Tag saved.", "Failed to save the tag", "/admin/tags")
}

#[post("/admin/tags/{tag_id}/delete")]
pub async fn delete_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = tags::delete_tag(repo.get_ref(), &user, tag_id.into_inner());
    finish_post(result, "Tag deleted.", "Failed to delete the tag", "/admin/tags")
}

#[get("/admin/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match settings::load_settings_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "settings",
                &server_config.auth_service_url,
            );
            context.insert("settings", &data.settings);
            context.insert("privacy_levels", &PrivacyLevel::ALL);
            render_template(&tera, "admin/settings.html", &context)
        }
        Err(err) => page_error(err, "settings"),
    }
}

#[post("/admin/settings")]
pub async fn save_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SettingsForm>,
) -> impl Responder {
    let result = settings::save_settings(repo.get_ref(), &user, form);
    finish_post(
        result,
        "Settings saved.",
        "Failed to save settings",
        "/admin/settings",
    )
}

#[get("/admin/audit")]
pub async fn show_audit(
    params: web::Query<AuditQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match audit::load_audit_page(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "audit",
                &server_config.auth_service_url,
            );
            context.insert("logs", &data.logs);
            context.insert("actor", &data.actor);
            context.insert("action", &data.action);
            context.insert("entity", &data.entity);
            context.insert("retention_days", &data.retention_days);
            context.insert("actions", &AuditAction::ALL);
            context.insert("entities", &AuditEntity::ALL);
            render_template(&tera, "admin/audit.html", &context)
        }
        Err(err) => page_error(err, "audit"),
    }
}

#[post("/admin/audit/purge")]
pub async fn purge_audit(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match audit::purge_audit_log(repo.get_ref(), &user, Utc::now().naive_utc()) {
        Ok(purged) => {
            FlashMessage::success(format!("{purged} audit entries purged.")).send();
            redirect("/admin/audit")
        }
        other => finish_post(other, "Audit log purged.", "Failed to purge the audit log", "/admin/audit"),
    }
}

#[get("/admin/trash")]
pub async fn show_trash(
    params: web::Query<TrashQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match client_service::list_deleted_clients(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "trash",
                &server_config.auth_service_url,
            );
            context.insert("clients", &data.clients);
            context.insert("agents", &data.agents);
            render_template(&tera, "admin/trash.html", &context)
        }
        Err(err) => page_error(err, "trash"),
    }
}
