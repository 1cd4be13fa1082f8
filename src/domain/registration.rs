//! Event registrations and the attendee ticket rendered from them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::event::Event;
use crate::domain::types::{Email, EventId, FullName, PhoneNumber, RegistrationId};

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub event_id: EventId,
    pub full_name: FullName,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub membership_number: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub full_name: FullName,
    pub email: Email,
    pub is_member: bool,
    pub registered_at: NaiveDateTime,
}

/// Data encoded into the attendee QR code.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket_id: String,
    pub event_id: String,
    pub event_title: String,
    pub attendee: String,
    pub email: String,
    pub starts_at: NaiveDateTime,
    pub venue: String,
    pub is_member: bool,
}

impl Ticket {
    pub fn new(event: &Event, registration: &Registration, venue: String) -> Self {
        Self {
            ticket_id: registration.id.to_string(),
            event_id: event.id.to_string(),
            event_title: event.title.to_string(),
            attendee: registration.full_name.to_string(),
            email: registration.email.to_string(),
            starts_at: event.starts_at,
            venue,
            is_member: registration.is_member,
        }
    }
}
