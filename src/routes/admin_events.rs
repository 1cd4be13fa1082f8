//! Admin event list and the tabbed event editor.

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::event::{CollectionEdit, EventCollection, EventMode, SponsorTier};
use crate::domain::filter::empty_as_none;
use crate::domain::types::EventId;
use crate::dto::events::EventEditorData;
use crate::forms::{FieldErrors, FormError};
use crate::forms::events::{
    AgendaItemForm, BannerUploadForm, CollectionItemForm, EDITOR_TABS, EventForm,
    NotificationForm, SpeakerForm, SponsorForm, normalize_tab,
};
use crate::repository::ApiRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::events::{self as events_service, CollectionChange, EditorOutcome};

#[derive(Debug, Default, Deserialize)]
pub struct AdminEventsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

fn editor_url(event_id: &EventId, tab: &str) -> String {
    format!("/admin/events/{event_id}/edit?tab={tab}")
}

fn render_editor(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    data: &EventEditorData,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "admin_events");
    context.insert("event", &data.event);
    context.insert("form", &data.form);
    context.insert("errors", &data.errors);
    context.insert("tab", data.tab);
    context.insert("tabs", &EDITOR_TABS);
    context.insert("event_modes", EventMode::ALL);
    context.insert("sponsor_tiers", SponsorTier::ALL);
    let action = match &data.event {
        Some(event) => format!("/admin/events/{}", event.id),
        None => "/admin/events".to_string(),
    };
    context.insert("form_action", &action);
    render_template(tera, "admin/events/edit.html", &context)
}

fn parse_event_id(raw: &str) -> Option<EventId> {
    EventId::new(raw).ok()
}

#[get("/admin/events")]
pub async fn list_events(
    query: web::Query<AdminEventsQuery>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = query.page.unwrap_or(1);
    match events_service::load_admin_events(repo.get_ref(), page).await {
        Ok(events) => {
            let mut context = base_context(&flash_messages, "admin_events");
            context.insert("events", &events);
            render_template(&tera, "admin/events/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load admin events: {err}");
            let mut context = base_context(&flash_messages, "admin_events");
            context.insert("load_error", &err.user_message());
            render_template(&tera, "admin/events/index.html", &context)
        }
    }
}

#[get("/admin/events/new")]
pub async fn new_event(
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match events_service::load_event_editor(repo.get_ref(), None, None).await {
        Ok(data) => render_editor(&tera, &flash_messages, &data),
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            redirect("/admin/events")
        }
    }
}

#[get("/admin/events/{event_id}/edit")]
pub async fn edit_event(
    event_id: web::Path<String>,
    query: web::Query<EditorQuery>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };
    match events_service::load_event_editor(repo.get_ref(), Some(&event_id), query.tab.as_deref())
        .await
    {
        Ok(data) => render_editor(&tera, &flash_messages, &data),
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            redirect("/admin/events")
        }
    }
}

#[post("/admin/events")]
pub async fn create_event(
    form: web::Form<EventForm>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match events_service::create_event(repo.get_ref(), form.into_inner()).await {
        Ok(EditorOutcome::Saved(event)) => {
            FlashMessage::success(format!("{} was created.", event.title)).send();
            redirect(&editor_url(&event.id, "details"))
        }
        Ok(EditorOutcome::Invalid(data)) => render_editor(&tera, &flash_messages, &data),
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            redirect("/admin/events/new")
        }
    }
}

#[post("/admin/events/{event_id}")]
pub async fn update_event(
    event_id: web::Path<String>,
    form: web::Form<EventForm>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };
    let form = form.into_inner();
    let tab = normalize_tab(Some(form.tab.as_str()));
    match events_service::update_event(repo.get_ref(), &event_id, form).await {
        Ok(EditorOutcome::Saved(_)) => {
            FlashMessage::success("Event saved.").send();
            redirect(&editor_url(&event_id, tab))
        }
        Ok(EditorOutcome::Invalid(data)) => render_editor(&tera, &flash_messages, &data),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("That event no longer exists.").send();
            redirect("/admin/events")
        }
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            redirect(&editor_url(&event_id, tab))
        }
    }
}

#[post("/admin/events/{event_id}/delete")]
pub async fn delete_event(
    event_id: web::Path<String>,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };
    match events_service::delete_event(repo.get_ref(), &event_id).await {
        Ok(()) => FlashMessage::success("Event deleted.").send(),
        Err(err) => FlashMessage::error(err.user_message()).send(),
    }
    redirect("/admin/events")
}

#[post("/admin/events/{event_id}/banner")]
pub async fn upload_banner(
    event_id: web::Path<String>,
    MultipartForm(form): MultipartForm<BannerUploadForm>,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };
    let media_url = editor_url(&event_id, "media");

    let upload = match form.into_upload() {
        Ok(upload) => upload,
        Err(err) => {
            let message = err
                .field_errors()
                .into_values()
                .next()
                .unwrap_or_else(|| err.to_string());
            FlashMessage::error(message).send();
            return redirect(&media_url);
        }
    };

    match events_service::upload_banner(repo.get_ref(), &event_id, upload).await {
        Ok(_) => FlashMessage::success("Banner updated.").send(),
        Err(err) => FlashMessage::error(err.user_message()).send(),
    }
    redirect(&media_url)
}

fn decode_item<F>(body: &[u8]) -> Result<F, FormError>
where
    F: for<'de> Deserialize<'de>,
{
    serde_html_form::from_bytes(body).map_err(|err| {
        log::warn!("Rejected malformed collection form: {err}");
        let mut errors = FieldErrors::new();
        errors.insert("form".to_string(), "The form could not be read.".to_string());
        FormError::Fields(errors)
    })
}

fn edit_from<F>(body: &[u8]) -> Result<CollectionEdit<F::Item>, FormError>
where
    F: CollectionItemForm + for<'de> Deserialize<'de>,
{
    decode_item::<F>(body)?.into_edit()
}

fn collection_change(
    collection: EventCollection,
    body: &[u8],
) -> Result<CollectionChange, FormError> {
    Ok(match collection {
        EventCollection::Agenda => CollectionChange::Agenda(edit_from::<AgendaItemForm>(body)?),
        EventCollection::Speakers => CollectionChange::Speakers(edit_from::<SpeakerForm>(body)?),
        EventCollection::Sponsors => CollectionChange::Sponsors(edit_from::<SponsorForm>(body)?),
        EventCollection::Notifications => {
            CollectionChange::Notifications(edit_from::<NotificationForm>(body)?)
        }
    })
}

async fn save_collection(
    repo: &ApiRepository,
    event_id: &EventId,
    change: CollectionChange,
) -> HttpResponse {
    let collection = change.collection();
    match events_service::edit_collection(repo, event_id, change).await {
        Ok(_) => FlashMessage::success(format!("Updated {collection}.")).send(),
        Err(err) => FlashMessage::error(err.user_message()).send(),
    }
    redirect(&editor_url(event_id, collection.as_str()))
}

/// Adds an item, or replaces it when the form carries an `index`.
///
/// Registered after the `delete` and `banner` routes it would shadow.
#[post("/admin/events/{event_id}/{collection}")]
pub async fn edit_collection(
    path: web::Path<(String, String)>,
    body: web::Bytes,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    let (event_id, collection) = path.into_inner();
    let (Some(event_id), Ok(collection)) =
        (parse_event_id(&event_id), collection.parse::<EventCollection>())
    else {
        return HttpResponse::NotFound().finish();
    };

    match collection_change(collection, &body) {
        Ok(change) => save_collection(repo.get_ref(), &event_id, change).await,
        Err(err) => {
            let message = err
                .field_errors()
                .into_values()
                .next()
                .unwrap_or_else(|| err.to_string());
            FlashMessage::error(message).send();
            redirect(&editor_url(&event_id, collection.as_str()))
        }
    }
}

#[post("/admin/events/{event_id}/{collection}/{index}/delete")]
pub async fn remove_collection_item(
    path: web::Path<(String, String, usize)>,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    let (event_id, collection, index) = path.into_inner();
    let (Some(event_id), Ok(collection)) =
        (parse_event_id(&event_id), collection.parse::<EventCollection>())
    else {
        return HttpResponse::NotFound().finish();
    };
    save_collection(
        repo.get_ref(),
        &event_id,
        CollectionChange::Remove(collection, index),
    )
    .await
}
