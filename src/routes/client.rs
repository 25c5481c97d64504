use std::path::Path;

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::meeting::MeetingStatus;
use crate::domain::policy::{PaymentCycle, PolicyKind, PolicyStatus};
use crate::domain::privacy::PrivacyLevel;
use crate::dto::client::ClientPageQuery;
use crate::forms::client::{ClientForm, ClientTagsForm};
use crate::forms::meetings::{MeetingForm, MeetingStatusForm};
use crate::forms::policies::PolicyForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, finish_post, redirect, render_template};
use crate::services::{ServiceError, client as client_service, meetings, policies};

fn client_url(client_id: i32) -> String {
    format!("/client/{client_id}")
}

#[get("/client/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    params: web::Query<ClientPageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let client_id = client_id.into_inner();

    match client_service::load_client_page(
        repo.get_ref(),
        &user,
        client_id,
        params.show_confidential,
    ) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "client",
                &server_config.auth_service_url,
            );
            context.insert("client", &data.client);
            context.insert("agent", &data.agent);
            context.insert("referrer", &data.referrer);
            context.insert("referrals", &data.referrals);
            context.insert("policies", &data.policies);
            context.insert("meetings", &data.meetings);
            context.insert("documents", &data.documents);
            context.insert("tags", &data.tags);
            context.insert("available_tags", &data.available_tags);
            context.insert("show_confidential", &data.show_confidential);
            context.insert("can_reveal", &data.can_reveal);
            context.insert("privacy_levels", &PrivacyLevel::ALL);
            context.insert("policy_kinds", &PolicyKind::ALL);
            context.insert("policy_statuses", &PolicyStatus::ALL);
            context.insert("payment_cycles", &PaymentCycle::ALL);
            context.insert("meeting_statuses", &MeetingStatus::ALL);

            render_template(&tera, "client/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Client not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load client {client_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/client/{client_id}/save")]
pub async fn save_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let result = client_service::update_client(repo.get_ref(), &user, client_id, form);
    finish_post(
        result,
        "Client saved.",
        "Failed to save the client",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/delete")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    match client_service::delete_client(repo.get_ref(), &user, client_id) {
        Ok(()) => {
            FlashMessage::success("Client moved to trash.").send();
            redirect("/")
        }
        other => finish_post(
            other,
            "Client moved to trash.",
            "Failed to delete the client",
            &client_url(client_id),
        ),
    }
}

#[post("/client/{client_id}/restore")]
pub async fn restore_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    match client_service::restore_client(repo.get_ref(), &user, client_id) {
        Ok(()) => {
            FlashMessage::success("Client restored.").send();
            redirect(&client_url(client_id))
        }
        other => finish_post(
            other,
            "Client restored.",
            "Failed to restore the client",
            "/admin/trash",
        ),
    }
}

#[post("/client/{client_id}/purge")]
pub async fn purge_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let result = client_service::purge_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        Path::new(&server_config.upload_dir),
    );
    finish_post(
        result,
        "Client deleted permanently.",
        "Failed to purge the client",
        "/admin/trash",
    )
}

/// Tag checkboxes repeat the `tag_id` key, so the body is parsed with
/// `serde_html_form` instead of `web::Form`.
#[post("/client/{client_id}/tags")]
pub async fn save_client_tags(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let back = client_url(client_id);

    let form: ClientTagsForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Invalid tags form: {err}");
            FlashMessage::error("Invalid form.").send();
            return redirect(&back);
        }
    };

    let result = client_service::set_client_tags(repo.get_ref(), &user, client_id, form);
    finish_post(result, "Tags saved.", "Failed to save tags", &back)
}

#[post("/client/{client_id}/policies/add")]
pub async fn add_policy(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PolicyForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let result = policies::add_policy(repo.get_ref(), &user, client_id, form);
    finish_post(
        result,
        "Policy added.",
        "Failed to add the policy",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/policies/{policy_id}/save")]
pub async fn save_policy(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PolicyForm>,
) -> impl Responder {
    let (client_id, policy_id) = path.into_inner();
    let result = policies::update_policy(repo.get_ref(), &user, client_id, policy_id, form);
    finish_post(
        result,
        "Policy saved.",
        "Failed to save the policy",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/policies/{policy_id}/delete")]
pub async fn delete_policy(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (client_id, policy_id) = path.into_inner();
    let result = policies::delete_policy(repo.get_ref(), &user, client_id, policy_id);
    finish_post(
        result,
        "Policy deleted.",
        "Failed to delete the policy",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/meetings/add")]
pub async fn add_meeting(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<MeetingForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let result = meetings::add_meeting(repo.get_ref(), &user, client_id, form);
    finish_post(
        result,
        "Meeting scheduled.",
        "Failed to schedule the meeting",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/meetings/{meeting_id}/save")]
pub async fn save_meeting(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<MeetingForm>,
) -> impl Responder {
    let (client_id, meeting_id) = path.into_inner();
    let result = meetings::update_meeting(repo.get_ref(), &user, client_id, meeting_id, form);
    finish_post(
        result,
        "Meeting saved.",
        "Failed to save the meeting",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/meetings/{meeting_id}/status")]
pub async fn set_meeting_status(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<MeetingStatusForm>,
) -> impl Responder {
    let (client_id, meeting_id) = path.into_inner();
    let result =
        meetings::set_meeting_status(repo.get_ref(), &user, client_id, meeting_id, form);
    finish_post(
        result,
        "Meeting updated.",
        "Failed to update the meeting",
        &client_url(client_id),
    )
}

#[post("/client/{client_id}/meetings/{meeting_id}/delete")]
pub async fn delete_meeting(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (client_id, meeting_id) = path.into_inner();
    let result = meetings::delete_meeting(repo.get_ref(), &user, client_id, meeting_id);
    finish_post(
        result,
        "Meeting deleted.",
        "Failed to delete the meeting",
        &client_url(client_id),
    )
}
