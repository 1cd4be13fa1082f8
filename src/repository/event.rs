use async_trait::async_trait;
use reqwest::Method;

use crate::domain::event::{Event, EventDraft};
use crate::domain::registration::{NewRegistration, Registration};
use crate::domain::types::EventId;
use crate::models::event::{ApiEvent, ApiEventBody, ApiEventList};
use crate::models::registration::ApiRegistration;
use crate::repository::errors::RepositoryResult;
use crate::repository::http::{convert_rows, optional};
use crate::repository::{ApiRepository, EventListQuery, EventReader, EventWriter, RegistrationWriter};

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum EventEnvelope {
    Wrapped { event: ApiEvent },
    Bare(ApiEvent),
}

impl EventEnvelope {
    fn into_event(self) -> RepositoryResult<Event> {
        let api = match self {
            EventEnvelope::Wrapped { event } => event,
            EventEnvelope::Bare(event) => event,
        };
        Ok(Event::try_from(api)?)
    }
}

#[async_trait]
impl EventReader for ApiRepository {
    async fn list_events(&self, query: EventListQuery) -> RepositoryResult<(usize, Vec<Event>)> {
        let request = self.request(Method::GET, &["events"])?.query(&query.to_params());
        let (total, events) = self.send_json::<ApiEventList>(request).await?.into_parts();

        let events: Vec<Event> = convert_rows(events, "event");
        Ok((total.unwrap_or(events.len()), events))
    }

    async fn get_event(&self, id: &EventId) -> RepositoryResult<Option<Event>> {
        let request = self.request(Method::GET, &["events", id.as_str()])?;
        let envelope = optional(self.send_json::<EventEnvelope>(request).await)?;
        envelope.map(EventEnvelope::into_event).transpose()
    }
}

#[async_trait]
impl EventWriter for ApiRepository {
    async fn create_event(&self, draft: &EventDraft) -> RepositoryResult<Event> {
        let request = self
            .request(Method::POST, &["events"])?
            .json(&ApiEventBody::from(draft));
        self.send_json::<EventEnvelope>(request).await?.into_event()
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> RepositoryResult<Event> {
        let request = self
            .request(Method::PUT, &["events", id.as_str()])?
            .json(&ApiEventBody::from(draft));
        self.send_json::<EventEnvelope>(request).await?.into_event()
    }

    async fn delete_event(&self, id: &EventId) -> RepositoryResult<()> {
        let request = self.request(Method::DELETE, &["events", id.as_str()])?;
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationWriter for ApiRepository {
    async fn register(&self, registration: &NewRegistration) -> RepositoryResult<Registration> {
        let request = self
            .request(
                Method::POST,
                &["events", registration.event_id.as_str(), "registrations"],
            )?
            .json(registration);
        let api: ApiRegistration = self.send_json(request).await?;
        Ok(Registration::try_from(api)?)
    }
}
