//! Admin user management pages.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::filter::QuickFilter;
use crate::domain::sort::SortField;
use crate::domain::types::UserId;
use crate::domain::user::{MembershipType, ProfessionalStatus, UserStatus};
use crate::dto::users::{InvalidUserForm, UsersPageData};
use crate::export::{ExportDialog, ExportFile, ExportFormat};
use crate::forms::FieldErrors;
use crate::forms::bulk::{BulkAction, BulkActionForm};
use crate::forms::export::ExportForm;
use crate::forms::filters::{FilterForm, ListState, StateForm, UserListParams};
use crate::forms::users::UserForm;
use crate::models::config::ServerConfig;
use crate::pagination::PAGE_SIZES;
use crate::repository::ApiRepository;
use crate::routes::{base_context, redirect, render_template, with_query};
use crate::services::ServiceResult;
use crate::services::users::{self as users_service, ActionOutcome, UserAction};

const USERS_PATH: &str = "/admin/users";

#[derive(Serialize)]
struct Link {
    label: String,
    query: String,
    active: bool,
}

/// Header links toggling the sort of every column.
fn sort_links(state: &ListState) -> Vec<(&'static str, Link)> {
    SortField::ALL
        .iter()
        .map(|field| {
            let active = state.sort.field == *field;
            let label = if active {
                format!("{} ({})", field.label(), state.sort.order.as_str())
            } else {
                field.label().to_string()
            };
            (
                field.as_str(),
                Link {
                    label,
                    query: state.query_sorted_by(*field),
                    active,
                },
            )
        })
        .collect()
}

fn page_size_links(state: &ListState) -> Vec<Link> {
    PAGE_SIZES
        .iter()
        .map(|limit| Link {
            label: limit.to_string(),
            query: ListState {
                limit: *limit,
                ..state.clone()
            }
            .query_for_page(1),
            active: state.limit == *limit,
        })
        .collect()
}

fn choice_context(context: &mut Context) {
    context.insert("membership_types", MembershipType::ALL);
    context.insert("professional_statuses", ProfessionalStatus::ALL);
    context.insert("user_statuses", UserStatus::ALL);
    context.insert("quick_filters", QuickFilter::ALL);
    context.insert("bulk_actions", BulkAction::ALL);
    let custom_keys: Vec<(&str, &[&str])> = ProfessionalStatus::ALL
        .iter()
        .map(|status| (status.as_str(), status.custom_field_keys()))
        .collect();
    context.insert("custom_field_keys", &custom_keys);
}

fn users_context(
    flash_messages: &IncomingFlashMessages,
    data: &UsersPageData,
) -> Context {
    let mut context = base_context(flash_messages, "admin_users");
    let state = &data.state;
    let page_links: Vec<(usize, String)> = data
        .users
        .pages
        .iter()
        .map(|page| (*page, state.query_for_page(*page)))
        .collect();

    context.insert("users", &data.users);
    context.insert("state", state);
    let state_query = state.query();
    let query_prefix = if state_query.is_empty() {
        String::new()
    } else {
        format!("{state_query}&")
    };
    context.insert("list_url", &with_query(USERS_PATH, &state_query));
    context.insert("query_prefix", &query_prefix);
    context.insert("state_query", &state_query);
    context.insert("filters", &state.filters);
    context.insert("page_links", &page_links);
    context.insert("previous_query", &state.query_for_page(state.page.saturating_sub(1)));
    context.insert("next_query", &state.query_for_page(state.page.saturating_add(1)));
    context.insert("sort_links", &sort_links(state));
    context.insert("page_size_links", &page_size_links(state));
    context.insert("modal", data.modal.kind());
    context.insert("modal_user", &data.modal.user());
    let form = data.modal.user().map(UserForm::from).unwrap_or_default();
    context.insert("form", &form);
    context.insert("errors", &FieldErrors::new());
    choice_context(&mut context);
    context
}

fn list_redirect(state_query: &str) -> HttpResponse {
    redirect(&with_query(USERS_PATH, state_query))
}

/// Query of page 1 with the filters and sort carried by `state_query`.
fn first_page_query(state_query: &str) -> String {
    UserListParams::parse(state_query).state().query_for_page(1)
}

#[get("/admin/users")]
pub async fn list_users(
    req: HttpRequest,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = UserListParams::parse(req.query_string());
    match users_service::load_users_page(repo.get_ref(), &params).await {
        Ok(data) => {
            let context = users_context(&flash_messages, &data);
            render_template(&tera, "admin/users/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load users page: {err}");
            let mut context = base_context(&flash_messages, "admin_users");
            context.insert("load_error", &err.user_message());
            context.insert("state_query", &params.state().query());
            render_template(&tera, "admin/users/error.html", &context)
        }
    }
}

#[post("/admin/users/filters")]
pub async fn apply_filters(form: web::Form<FilterForm>) -> impl Responder {
    let state = form.into_inner().resolve(Utc::now().date_naive());
    list_redirect(&state.query())
}

/// Re-renders the list with the modal holding the rejected values.
async fn render_invalid_form(
    repo: &ApiRepository,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
    invalid: InvalidUserForm,
) -> HttpResponse {
    let params = UserListParams::parse(&invalid.form.state);
    match users_service::load_users_page(repo, &params).await {
        Ok(data) => {
            let mut context = users_context(flash_messages, &data);
            let modal = if invalid.user_id.is_some() { "edit" } else { "create" };
            context.insert("modal", modal);
            context.insert("modal_user_id", &invalid.user_id);
            context.insert("form", &invalid.form);
            context.insert("errors", &invalid.errors);
            render_template(tera, "admin/users/index.html", &context)
        }
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            list_redirect(&invalid.form.state)
        }
    }
}

async fn finish_action(
    outcome: ServiceResult<ActionOutcome>,
    state_query: &str,
    repo: &ApiRepository,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match outcome {
        Ok(ActionOutcome::Success(message)) => {
            FlashMessage::success(message).send();
            list_redirect(state_query)
        }
        Ok(ActionOutcome::Partial(message)) => {
            FlashMessage::warning(message).send();
            list_redirect(state_query)
        }
        Ok(ActionOutcome::Failed(message)) => {
            FlashMessage::error(message).send();
            list_redirect(state_query)
        }
        Ok(ActionOutcome::Invalid(invalid)) => {
            render_invalid_form(repo, flash_messages, tera, invalid).await
        }
        Ok(ActionOutcome::NeedsConfirmation(confirmation)) => {
            let mut context = base_context(flash_messages, "admin_users");
            context.insert("confirmation", &confirmation);
            context.insert("cancel_query", &confirmation.state);
            render_template(tera, "admin/users/confirm.html", &context)
        }
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            list_redirect(state_query)
        }
    }
}

/// Custom profile keys arrive as repeated fields, so the body is decoded
/// with `serde_html_form`.
fn decode_user_form(body: &[u8]) -> Option<UserForm> {
    serde_html_form::from_bytes(body)
        .map_err(|err| {
            log::warn!("Rejected malformed user form: {err}");
            FlashMessage::error("The form could not be read.").send();
        })
        .ok()
}

#[post("/admin/users")]
pub async fn create_user(
    body: web::Bytes,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(form) = decode_user_form(&body) else {
        return list_redirect("");
    };
    let state_query = form.state.clone();
    let outcome = users_service::dispatch(repo.get_ref(), UserAction::Create(form), 1).await;
    finish_action(outcome, &state_query, repo.get_ref(), &flash_messages, &tera).await
}

/// Registered after the fixed `/admin/users/*` paths it would shadow.
#[post("/admin/users/{user_id}")]
pub async fn update_user(
    user_id: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(user_id) = UserId::new(user_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };
    let Some(form) = decode_user_form(&body) else {
        return list_redirect("");
    };
    let state_query = form.state.clone();
    let outcome =
        users_service::dispatch(repo.get_ref(), UserAction::Update(user_id, form), 1).await;
    finish_action(outcome, &state_query, repo.get_ref(), &flash_messages, &tera).await
}

#[post("/admin/users/{user_id}/delete")]
pub async fn delete_user(
    user_id: web::Path<String>,
    form: web::Form<StateForm>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(user_id) = UserId::new(user_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };
    let state_query = first_page_query(&form.state);
    let outcome = users_service::dispatch(repo.get_ref(), UserAction::Delete(user_id), 1).await;
    finish_action(outcome, &state_query, repo.get_ref(), &flash_messages, &tera).await
}

/// First submit renders the confirmation page; the confirmed submit runs
/// the action and returns to page 1 with the selection cleared.
#[post("/admin/users/bulk")]
pub async fn bulk_users(
    body: web::Bytes,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form: BulkActionForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected malformed bulk form: {err}");
            FlashMessage::error("The selection could not be read.").send();
            return list_redirect("");
        }
    };
    let state_query = first_page_query(&form.state);
    let outcome = users_service::dispatch(
        repo.get_ref(),
        UserAction::Bulk(form),
        server_config.bulk_concurrency(),
    )
    .await;
    finish_action(outcome, &state_query, repo.get_ref(), &flash_messages, &tera).await
}

fn export_context(
    flash_messages: &IncomingFlashMessages,
    state: &str,
    dialog: &ExportDialog,
) -> Context {
    let mut context = base_context(flash_messages, "admin_users");
    context.insert("state_query", state);
    context.insert("dialog_error", &dialog.error());
    context.insert("exporting", &dialog.is_exporting());
    context.insert("formats", &[
        (ExportFormat::Csv, "CSV"),
        (ExportFormat::Json, "JSON"),
        (ExportFormat::Excel, "Excel"),
    ]);
    context.insert("professional_statuses", ProfessionalStatus::ALL);
    context
}

#[get("/admin/users/export")]
pub async fn export_dialog(
    query: web::Query<StateForm>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = export_context(&flash_messages, &query.state, &ExportDialog::open());
    render_template(&tera, "admin/users/export.html", &context)
}

/// Sends the export as an attachment named after the file.
fn download(file: ExportFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.filename)],
        })
        .body(file.body)
}

#[post("/admin/users/export")]
pub async fn export_users(
    form: web::Form<ExportForm>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form = form.into_inner();
    let today = Utc::now().date_naive();
    match users_service::export_users_file(repo.get_ref(), &form, today).await {
        Ok(file) => {
            log::info!("Exported {} users to {}", file.rows, file.filename);
            download(file)
        }
        Err((dialog, err)) => {
            log::warn!("Export failed: {err}");
            let context = export_context(&flash_messages, &form.state, &dialog);
            render_template(&tera, "admin/users/export.html", &context)
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::header;

    use super::*;

    #[actix_web::test]
    async fn export_is_sent_as_named_attachment() {
        let file = ExportFile {
            filename: "users-export-2024-06-01.csv".to_string(),
            content_type: ExportFormat::Csv.content_type(),
            body: b"id,fullName\nu1,Ann Lee\n".to_vec(),
            rows: 1,
        };

        let resp = download(file);

        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("filename=\"users-export-2024-06-01.csv\""));
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type.to_str().unwrap(), "text/csv; charset=utf-8");
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], b"id,fullName\nu1,Ann Lee\n");
    }

    #[test]
    fn first_page_query_keeps_filters_and_limit() {
        let query = first_page_query("status=active&page=4&limit=50");
        assert!(query.contains("status=active"));
        assert!(query.contains("page=1&limit=50"));
    }
}
