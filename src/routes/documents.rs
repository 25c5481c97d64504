use std::path::Path;

use actix_files::NamedFile;
use actix_multipart::form::MultipartForm;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, get, mime, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::auth::AuthenticatedUser;
use crate::forms::documents::UploadDocumentForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{finish_post, redirect};
use crate::services::{ServiceError, documents};

#[post("/client/{client_id}/documents/upload")]
pub async fn upload_document(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let result = documents::upload_document(
        repo.get_ref(),
        &user,
        client_id,
        &form,
        Path::new(&server_config.upload_dir),
    );
    finish_post(
        result,
        "Document uploaded.",
        "Failed to upload the document",
        &format!("/client/{client_id}"),
    )
}

/// Streams a stored document as an attachment under its original name.
#[get("/documents/{public_id}")]
pub async fn download_document(
    req: HttpRequest,
    public_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> HttpResponse {
    let download = match documents::prepare_download(
        repo.get_ref(),
        &user,
        &public_id,
        Path::new(&server_config.upload_dir),
    ) {
        Ok(download) => download,
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            return redirect("/na");
        }
        Err(ServiceError::NotFound) => return HttpResponse::NotFound().finish(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            return redirect("/");
        }
        Err(err) => {
            log::error!("Failed to prepare download of {public_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let file = match NamedFile::open(&download.path) {
        Ok(file) => file,
        Err(err) => {
            log::error!("Stored document {} is unreadable: {err}", download.path.display());
            return HttpResponse::NotFound().finish();
        }
    };

    let content_type = download
        .content_type
        .as_deref()
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    file.set_content_type(content_type)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download.file_name)],
        })
        .into_response(&req)
}

#[post("/documents/{public_id}/delete")]
pub async fn delete_document(
    public_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match documents::delete_document(
        repo.get_ref(),
        &user,
        &public_id,
        Path::new(&server_config.upload_dir),
    ) {
        Ok(client_id) => {
            FlashMessage::success("Document deleted.").send();
            redirect(&format!("/client/{client_id}"))
        }
        other => finish_post(other, "Document deleted.", "Failed to delete the document", "/"),
    }
}
