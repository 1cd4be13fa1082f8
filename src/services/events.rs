//! Public events catalog, registrations and the admin event editor.

use qrcode::QrCode;
use qrcode::render::svg;

use crate::domain::event::{
    AgendaItem, Banner, CollectionEdit, Event, EventCollection, EventDraft, EventNotification,
    Speaker, Sponsor,
};
use crate::domain::registration::Ticket;
use crate::domain::types::{EventId, TypeConstraintError};
use crate::dto::events::{
    CatalogPageData, CatalogQuery, EventCard, EventDetailData, EventEditorData,
    InvalidRegistration, SponsorGroup, TicketPageData,
};
use crate::formatting::format_venue;
use crate::forms::FormError;
use crate::forms::events::{EventForm, normalize_tab};
use crate::forms::registration::RegistrationForm;
use crate::pagination::{PageState, Paginated};
use crate::repository::{
    EventListQuery, EventReader, EventWriter, ImageUpload, RegistrationWriter, UploadWriter,
};
use crate::services::{ServiceError, ServiceResult};

pub const CATALOG_PAGE_SIZE: usize = 12;
pub const ADMIN_PAGE_SIZE: usize = 25;
const DEFAULT_OVERLAY_OPACITY: u8 = 40;

async fn fetch_event<R>(repo: &R, event_id: &EventId) -> ServiceResult<Event>
where
    R: EventReader + ?Sized,
{
    repo.get_event(event_id)
        .await
        .map_err(|err| {
            log::error!("Failed to load event {event_id}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)
}

/// Loads one page of the public catalog.
pub async fn load_catalog<R>(repo: &R, query: &CatalogQuery) -> ServiceResult<CatalogPageData>
where
    R: EventReader + ?Sized,
{
    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = EventListQuery::new().paginate(page, CATALOG_PAGE_SIZE);
    if !query.past.unwrap_or(false) {
        list_query = list_query.upcoming();
    }
    if let Some(search) = &query.search {
        list_query = list_query.search(search.trim());
    }
    if let Some(category) = &query.category {
        list_query = list_query.category(category.as_str());
    }
    if let Some(mode) = query.mode {
        list_query = list_query.mode(mode);
    }

    let (total, events) = repo.list_events(list_query).await.map_err(|err| {
        log::error!("Failed to list events: {err}");
        err
    })?;

    let mut categories: Vec<String> = events.iter().filter_map(|e| e.category.clone()).collect();
    categories.sort();
    categories.dedup();

    let cards = events.into_iter().map(EventCard::from).collect();
    Ok(CatalogPageData {
        events: Paginated::new(cards, PageState::new(page, CATALOG_PAGE_SIZE, total)),
        categories,
    })
}

/// Next events shown on the home page.
pub async fn upcoming_events<R>(repo: &R, count: usize) -> ServiceResult<Vec<EventCard>>
where
    R: EventReader + ?Sized,
{
    let (_, events) = repo
        .list_events(EventListQuery::new().upcoming().paginate(1, count))
        .await
        .map_err(|err| {
            log::error!("Failed to list upcoming events: {err}");
            err
        })?;
    Ok(events.into_iter().take(count).map(EventCard::from).collect())
}

fn detail(event: Event) -> EventDetailData {
    let sponsor_groups = event
        .sponsors_by_tier()
        .into_iter()
        .map(|(tier, sponsors)| SponsorGroup {
            tier: tier.label(),
            sponsors: sponsors.into_iter().cloned().collect(),
        })
        .collect();
    EventDetailData {
        card: EventCard::from(event),
        sponsor_groups,
    }
}

pub async fn load_event_detail<R>(repo: &R, event_id: &EventId) -> ServiceResult<EventDetailData>
where
    R: EventReader + ?Sized,
{
    fetch_event(repo, event_id).await.map(detail)
}

/// Outcome of a registration attempt.
pub enum RegistrationOutcome {
    Registered(TicketPageData),
    Invalid(Box<InvalidRegistration>),
}

/// Renders the ticket payload as an SVG QR code.
pub fn ticket_qr_svg(ticket: &Ticket) -> ServiceResult<String> {
    let payload = serde_json::to_string(ticket)
        .map_err(|err| ServiceError::Internal(format!("ticket serialization failed: {err}")))?;
    let code = QrCode::new(payload.as_bytes())
        .map_err(|err| ServiceError::Internal(format!("QR encoding failed: {err}")))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(220, 220)
        .dark_color(svg::Color("#1b2a4a"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Registers an attendee. Sold out events are refused before contacting
/// the backend.
pub async fn register_for_event<R>(
    repo: &R,
    event_id: &EventId,
    form: RegistrationForm,
) -> ServiceResult<RegistrationOutcome>
where
    R: EventReader + RegistrationWriter + ?Sized,
{
    let event = fetch_event(repo, event_id).await?;
    if event.is_sold_out() {
        return Err(ServiceError::Form("This event is sold out.".to_string()));
    }

    let snapshot = form.clone();
    let new_registration = match form.into_registration(event.id.clone()) {
        Ok(registration) => registration,
        Err(err) => {
            let errors = err.field_errors();
            if errors.is_empty() {
                return Err(err.into());
            }
            return Ok(RegistrationOutcome::Invalid(Box::new(InvalidRegistration {
                detail: detail(event),
                form: snapshot,
                errors,
            })));
        }
    };

    let registration = repo.register(&new_registration).await.map_err(|err| {
        log::error!("Failed to register for event {event_id}: {err}");
        err
    })?;

    let ticket = Ticket::new(&event, &registration, format_venue(&event));
    let qr_svg = ticket_qr_svg(&ticket)?;
    Ok(RegistrationOutcome::Registered(TicketPageData {
        card: EventCard::from(event),
        ticket,
        qr_svg,
    }))
}

/// All events, past ones included, for the admin list.
pub async fn load_admin_events<R>(repo: &R, page: usize) -> ServiceResult<Paginated<EventCard>>
where
    R: EventReader + ?Sized,
{
    let page = page.max(1);
    let (total, events) = repo
        .list_events(EventListQuery::new().paginate(page, ADMIN_PAGE_SIZE))
        .await
        .map_err(|err| {
            log::error!("Failed to list events: {err}");
            err
        })?;
    let cards = events.into_iter().map(EventCard::from).collect();
    Ok(Paginated::new(cards, PageState::new(page, ADMIN_PAGE_SIZE, total)))
}

/// Editor for `event_id`, or an empty editor when creating.
pub async fn load_event_editor<R>(
    repo: &R,
    event_id: Option<&EventId>,
    tab: Option<&str>,
) -> ServiceResult<EventEditorData>
where
    R: EventReader + ?Sized,
{
    let event = match event_id {
        Some(event_id) => Some(fetch_event(repo, event_id).await?),
        None => None,
    };
    let form = event
        .as_ref()
        .map(|event| EventForm::from(&EventDraft::from(event.clone())))
        .unwrap_or_default();
    Ok(EventEditorData {
        event,
        form,
        errors: Default::default(),
        tab: normalize_tab(tab),
    })
}

/// Result of saving the editor form.
pub enum EditorOutcome {
    Saved(Event),
    Invalid(EventEditorData),
}

fn invalid_editor(
    event: Option<Event>,
    form: EventForm,
    err: FormError,
) -> ServiceResult<EditorOutcome> {
    let errors = err.field_errors();
    if errors.is_empty() {
        return Err(err.into());
    }
    let tab = normalize_tab(Some(form.tab.as_str()));
    Ok(EditorOutcome::Invalid(EventEditorData {
        event,
        form,
        errors,
        tab,
    }))
}

pub async fn create_event<R>(repo: &R, form: EventForm) -> ServiceResult<EditorOutcome>
where
    R: EventWriter + ?Sized,
{
    let snapshot = form.clone();
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(err) => return invalid_editor(None, snapshot, err),
    };
    let event = repo.create_event(&draft).await.map_err(|err| {
        log::error!("Failed to create event: {err}");
        err
    })?;
    Ok(EditorOutcome::Saved(event))
}

/// Replaces the scalar fields of the stored event, keeping its collections.
pub async fn update_event<R>(
    repo: &R,
    event_id: &EventId,
    form: EventForm,
) -> ServiceResult<EditorOutcome>
where
    R: EventReader + EventWriter + ?Sized,
{
    let event = fetch_event(repo, event_id).await?;
    let mut draft = EventDraft::from(event.clone());
    let snapshot = form.clone();
    if let Err(err) = form.apply_to(&mut draft) {
        return invalid_editor(Some(event), snapshot, err);
    }
    let event = repo.update_event(event_id, &draft).await.map_err(|err| {
        log::error!("Failed to update event {event_id}: {err}");
        err
    })?;
    Ok(EditorOutcome::Saved(event))
}

pub async fn delete_event<R>(repo: &R, event_id: &EventId) -> ServiceResult<()>
where
    R: EventWriter + ?Sized,
{
    repo.delete_event(event_id).await.map_err(|err| {
        log::error!("Failed to delete event {event_id}: {err}");
        err
    })?;
    Ok(())
}

/// Edit of one nested collection of an event.
#[derive(Debug)]
pub enum CollectionChange {
    Agenda(CollectionEdit<AgendaItem>),
    Speakers(CollectionEdit<Speaker>),
    Sponsors(CollectionEdit<Sponsor>),
    Notifications(CollectionEdit<EventNotification>),
    Remove(EventCollection, usize),
}

impl CollectionChange {
    pub fn collection(&self) -> EventCollection {
        match self {
            CollectionChange::Agenda(_) => EventCollection::Agenda,
            CollectionChange::Speakers(_) => EventCollection::Speakers,
            CollectionChange::Sponsors(_) => EventCollection::Sponsors,
            CollectionChange::Notifications(_) => EventCollection::Notifications,
            CollectionChange::Remove(collection, _) => *collection,
        }
    }

    fn apply(self, draft: &mut EventDraft) -> Result<(), TypeConstraintError> {
        match self {
            CollectionChange::Agenda(edit) => edit.apply(&mut draft.agenda),
            CollectionChange::Speakers(edit) => edit.apply(&mut draft.speakers),
            CollectionChange::Sponsors(edit) => edit.apply(&mut draft.sponsors),
            CollectionChange::Notifications(edit) => edit.apply(&mut draft.notifications),
            CollectionChange::Remove(collection, index) => collection.remove(draft, index),
        }
    }
}

/// Loads the event, applies `change` locally and saves the whole event.
pub async fn edit_collection<R>(
    repo: &R,
    event_id: &EventId,
    change: CollectionChange,
) -> ServiceResult<Event>
where
    R: EventReader + EventWriter + ?Sized,
{
    let mut draft = EventDraft::from(fetch_event(repo, event_id).await?);
    let collection = change.collection();
    change.apply(&mut draft)?;
    repo.update_event(event_id, &draft).await.map_err(|err| {
        log::error!("Failed to save {collection} of event {event_id}: {err}");
        ServiceError::from(err)
    })
}

/// Uploads a banner image and makes it the banner of the event.
pub async fn upload_banner<R>(
    repo: &R,
    event_id: &EventId,
    upload: ImageUpload,
) -> ServiceResult<Event>
where
    R: EventReader + EventWriter + UploadWriter + ?Sized,
{
    let mut draft = EventDraft::from(fetch_event(repo, event_id).await?);
    let image_url = repo.upload_image(upload).await.map_err(|err| {
        log::error!("Failed to upload banner for event {event_id}: {err}");
        err
    })?;

    let previous = draft.banner.take();
    draft.banner = Some(Banner {
        image_url,
        overlay_color: previous.as_ref().and_then(|b| b.overlay_color.clone()),
        overlay_opacity: previous
            .map(|b| b.overlay_opacity)
            .unwrap_or(DEFAULT_OVERLAY_OPACITY),
    });

    repo.update_event(event_id, &draft).await.map_err(|err| {
        log::error!("Failed to save banner of event {event_id}: {err}");
        ServiceError::from(err)
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::domain::registration::Registration;
    use crate::domain::types::{Email, FullName, RegistrationId, WebUrl};
    use crate::formatting::tests::sample_event;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn event_id() -> EventId {
        EventId::new("e1").unwrap()
    }

    fn registration_form() -> RegistrationForm {
        RegistrationForm {
            full_name: "Ann Lee".to_string(),
            email: "ann@example.com".to_string(),
            ..RegistrationForm::default()
        }
    }

    #[actix_web::test]
    async fn sold_out_events_refuse_registration_locally() {
        let mut repo = MockRepository::new();
        repo.expect_get_event().times(1).returning(|_| {
            let mut event = sample_event("e1");
            event.seats_left = Some(0);
            Ok(Some(event))
        });
        repo.expect_register().times(0);

        let result = register_for_event(&repo, &event_id(), registration_form()).await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[actix_web::test]
    async fn registration_renders_ticket_with_qr() {
        let mut repo = MockRepository::new();
        repo.expect_get_event()
            .times(1)
            .returning(|_| Ok(Some(sample_event("e1"))));
        repo.expect_register()
            .withf(|registration| registration.email.as_str() == "ann@example.com")
            .times(1)
            .returning(|registration| {
                Ok(Registration {
                    id: RegistrationId::new("r1").unwrap(),
                    event_id: registration.event_id.clone(),
                    full_name: FullName::new("Ann Lee").unwrap(),
                    email: Email::new("ann@example.com").unwrap(),
                    is_member: false,
                    registered_at: NaiveDateTime::default(),
                })
            });

        let outcome = register_for_event(&repo, &event_id(), registration_form())
            .await
            .unwrap();

        match outcome {
            RegistrationOutcome::Registered(page) => {
                assert_eq!(page.ticket.ticket_id, "r1");
                assert!(page.qr_svg.contains("<svg"));
            }
            RegistrationOutcome::Invalid(_) => panic!("registration should succeed"),
        }
    }

    #[actix_web::test]
    async fn missing_event_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_event().times(1).returning(|_| Ok(None));

        let result = load_event_detail(&repo, &event_id()).await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn collection_edit_saves_the_full_array() {
        let mut repo = MockRepository::new();
        repo.expect_get_event().times(1).returning(|_| {
            let mut event = sample_event("e1");
            event.speakers = vec![
                Speaker {
                    name: "Ann".to_string(),
                    title: None,
                    company: None,
                    photo_url: None,
                    bio: None,
                    link: None,
                },
                Speaker {
                    name: "Bob".to_string(),
                    title: None,
                    company: None,
                    photo_url: None,
                    bio: None,
                    link: None,
                },
            ];
            Ok(Some(event))
        });
        repo.expect_update_event()
            .withf(|_, draft| draft.speakers.len() == 1 && draft.speakers[0].name == "Bob")
            .times(1)
            .returning(|_, _| Ok(sample_event("e1")));

        let change = CollectionChange::Remove(EventCollection::Speakers, 0);
        edit_collection(&repo, &event_id(), change).await.unwrap();
    }

    #[actix_web::test]
    async fn out_of_range_edit_is_not_saved() {
        let mut repo = MockRepository::new();
        repo.expect_get_event()
            .times(1)
            .returning(|_| Ok(Some(sample_event("e1"))));
        repo.expect_update_event().times(0);

        let change = CollectionChange::Remove(EventCollection::Sponsors, 3);
        let result = edit_collection(&repo, &event_id(), change).await;

        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[actix_web::test]
    async fn banner_upload_becomes_event_banner() {
        let mut repo = MockRepository::new();
        repo.expect_get_event()
            .times(1)
            .returning(|_| Ok(Some(sample_event("e1"))));
        repo.expect_upload_image()
            .times(1)
            .returning(|_| Ok(WebUrl::new("https://cdn.example.com/b.png").unwrap()));
        repo.expect_update_event()
            .withf(|_, draft| {
                draft.banner.as_ref().map(|b| (b.image_url.as_str(), b.overlay_opacity))
                    == Some(("https://cdn.example.com/b.png", 40))
            })
            .times(1)
            .returning(|_, _| Ok(sample_event("e1")));

        let upload = ImageUpload {
            filename: "b.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        upload_banner(&repo, &event_id(), upload).await.unwrap();
    }

    #[actix_web::test]
    async fn invalid_editor_form_keeps_submitted_tab() {
        let mut repo = MockRepository::new();
        repo.expect_create_event().times(0);

        let form = EventForm {
            tab: "pricing".to_string(),
            ..EventForm::default()
        };
        match create_event(&repo, form).await.unwrap() {
            EditorOutcome::Invalid(data) => {
                assert_eq!(data.tab, "pricing");
                assert!(data.errors.contains_key("title"));
            }
            EditorOutcome::Saved(_) => panic!("empty form must not be saved"),
        }
    }

    #[actix_web::test]
    async fn backend_failure_is_propagated() {
        let mut repo = MockRepository::new();
        repo.expect_list_events()
            .times(1)
            .returning(|_| Err(RepositoryError::Timeout("15s".to_string())));

        let result = load_catalog(&repo, &CatalogQuery::default()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::Timeout(_)))
        ));
    }
}
