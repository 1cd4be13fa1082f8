//! Public events catalog, event pages and registration.

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::domain::event::EventMode;
use crate::domain::types::EventId;
use crate::dto::events::{CatalogQuery, EventDetailData};
use crate::forms::FieldErrors;
use crate::forms::registration::RegistrationForm;
use crate::repository::ApiRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::events::{self as events_service, RegistrationOutcome};
use crate::services::ServiceError;

fn insert_detail(context: &mut Context, detail: &EventDetailData) {
    context.insert("card", &detail.card);
    context.insert("event", &detail.card.event);
    context.insert("sponsor_groups", &detail.sponsor_groups);
}

fn parse_event_id(raw: &str) -> Option<EventId> {
    EventId::new(raw).ok()
}

#[get("/events")]
pub async fn catalog(
    query: web::Query<CatalogQuery>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = query.into_inner();
    match events_service::load_catalog(repo.get_ref(), &query).await {
        Ok(data) => {
            let page_links: Vec<(usize, String)> = data
                .events
                .pages
                .iter()
                .map(|page| (*page, query.query_for_page(*page)))
                .collect();
            let mut context = base_context(&flash_messages, "events");
            context.insert("events", &data.events);
            context.insert("page_links", &page_links);
            context.insert("previous_query", &query.query_for_page(data.events.page.saturating_sub(1)));
            context.insert("next_query", &query.query_for_page(data.events.page.saturating_add(1)));
            context.insert("categories", &data.categories);
            context.insert("search", &query.search);
            context.insert("category", &query.category);
            context.insert("mode", &query.mode);
            context.insert("modes", EventMode::ALL);
            render_template(&tera, "events/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load events catalog: {err}");
            let mut context = base_context(&flash_messages, "events");
            context.insert("load_error", &err.user_message());
            render_template(&tera, "events/index.html", &context)
        }
    }
}

#[get("/events/{event_id}")]
pub async fn show_event(
    event_id: web::Path<String>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };

    match events_service::load_event_detail(repo.get_ref(), &event_id).await {
        Ok(detail) => {
            let mut context = base_context(&flash_messages, "events");
            insert_detail(&mut context, &detail);
            context.insert("form", &RegistrationForm::default());
            context.insert("errors", &FieldErrors::new());
            render_template(&tera, "events/show.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("That event could not be found.").send();
            redirect("/events")
        }
        Err(err) => {
            log::error!("Failed to load event {event_id}: {err}");
            FlashMessage::error(err.user_message()).send();
            redirect("/events")
        }
    }
}

#[post("/events/{event_id}/register")]
pub async fn register(
    event_id: web::Path<String>,
    form: web::Form<RegistrationForm>,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(event_id) = parse_event_id(&event_id) else {
        return HttpResponse::NotFound().finish();
    };
    let event_url = format!("/events/{event_id}");

    match events_service::register_for_event(repo.get_ref(), &event_id, form.into_inner()).await {
        Ok(RegistrationOutcome::Registered(page)) => {
            let mut context = base_context(&flash_messages, "events");
            context.insert("card", &page.card);
            context.insert("event", &page.card.event);
            context.insert("ticket", &page.ticket);
            context.insert("qr_svg", &page.qr_svg);
            render_template(&tera, "events/ticket.html", &context)
        }
        Ok(RegistrationOutcome::Invalid(invalid)) => {
            let mut context = base_context(&flash_messages, "events");
            insert_detail(&mut context, &invalid.detail);
            context.insert("form", &invalid.form);
            context.insert("errors", &invalid.errors);
            render_template(&tera, "events/show.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("That event could not be found.").send();
            redirect("/events")
        }
        Err(err) => {
            FlashMessage::error(err.user_message()).send();
            redirect(&event_url)
        }
    }
}
