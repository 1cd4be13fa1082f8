//! Event aggregate with its nested agenda, speaker, sponsor and notification
//! collections.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Cents, EventId, EventTitle, SanitizedHtml, TypeConstraintError, WebUrl};
use crate::domain::user::string_enum;

string_enum!(
    /// How attendees join the event.
    EventMode {
        InPerson => "in-person", "In person",
        Virtual => "virtual", "Virtual",
        Hybrid => "hybrid", "Hybrid",
    }
);

string_enum!(
    /// Sponsor level, in display order.
    SponsorTier {
        Platinum => "platinum", "Platinum",
        Gold => "gold", "Gold",
        Silver => "silver", "Silver",
        Bronze => "bronze", "Bronze",
        Community => "community", "Community",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub map_url: Option<WebUrl>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualLinks {
    pub zoom: Option<WebUrl>,
    pub meet: Option<WebUrl>,
    pub teams: Option<WebUrl>,
    pub password: Option<String>,
    pub instructions: Option<String>,
}

impl VirtualLinks {
    /// Name of the first configured meeting platform.
    pub fn platform(&self) -> Option<&'static str> {
        if self.zoom.is_some() {
            Some("Zoom")
        } else if self.meet.is_some() {
            Some("Google Meet")
        } else if self.teams.is_some() {
            Some("Microsoft Teams")
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPrice {
    pub member: Cents,
    pub non_member: Cents,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Banner {
    pub image_url: WebUrl,
    pub overlay_color: Option<String>,
    /// Overlay opacity in percent, 0..=100.
    pub overlay_opacity: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgendaItem {
    pub starts_at: String,
    pub ends_at: String,
    pub title: String,
    pub description: Option<String>,
    /// Names of the speakers presenting this slot.
    pub speakers: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Speaker {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub photo_url: Option<WebUrl>,
    pub bio: Option<String>,
    pub link: Option<WebUrl>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sponsor {
    pub name: String,
    pub logo_url: Option<WebUrl>,
    pub tier: SponsorTier,
    pub website: Option<WebUrl>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventNotification {
    pub title: String,
    pub body: String,
    pub published_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub title: EventTitle,
    pub host: Option<String>,
    pub category: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub mode: EventMode,
    pub venue: Option<Venue>,
    pub virtual_links: Option<VirtualLinks>,
    pub price: EventPrice,
    pub capacity: Option<u32>,
    /// Computed by the backend from registrations; never edited here.
    pub seats_left: Option<u32>,
    pub cpe_score: f32,
    pub tags: Vec<String>,
    pub description: String,
    pub description_html: SanitizedHtml,
    pub banner: Option<Banner>,
    pub agenda: Vec<AgendaItem>,
    pub speakers: Vec<Speaker>,
    pub sponsors: Vec<Sponsor>,
    pub notifications: Vec<EventNotification>,
}

impl Event {
    pub fn is_sold_out(&self) -> bool {
        self.seats_left == Some(0)
    }

    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.ends_at >= now
    }

    /// Sponsors ordered by tier, keeping the admin-entered order inside a tier.
    pub fn sponsors_by_tier(&self) -> Vec<(SponsorTier, Vec<&Sponsor>)> {
        SponsorTier::ALL
            .iter()
            .filter_map(|tier| {
                let sponsors: Vec<&Sponsor> =
                    self.sponsors.iter().filter(|s| s.tier == *tier).collect();
                (!sponsors.is_empty()).then_some((*tier, sponsors))
            })
            .collect()
    }
}

/// Editable fields of an event, sent to the backend as a full replacement.
///
/// Nested collections always travel as complete arrays.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EventDraft {
    pub title: EventTitle,
    pub host: Option<String>,
    pub category: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub mode: EventMode,
    pub venue: Option<Venue>,
    pub virtual_links: Option<VirtualLinks>,
    pub price: EventPrice,
    pub capacity: Option<u32>,
    pub cpe_score: f32,
    pub tags: Vec<String>,
    pub description: String,
    pub description_html: SanitizedHtml,
    pub banner: Option<Banner>,
    pub agenda: Vec<AgendaItem>,
    pub speakers: Vec<Speaker>,
    pub sponsors: Vec<Sponsor>,
    pub notifications: Vec<EventNotification>,
}

impl From<Event> for EventDraft {
    fn from(event: Event) -> Self {
        Self {
            title: event.title,
            host: event.host,
            category: event.category,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            mode: event.mode,
            venue: event.venue,
            virtual_links: event.virtual_links,
            price: event.price,
            capacity: event.capacity,
            cpe_score: event.cpe_score,
            tags: event.tags,
            description: event.description,
            description_html: event.description_html,
            banner: event.banner,
            agenda: event.agenda,
            speakers: event.speakers,
            sponsors: event.sponsors,
            notifications: event.notifications,
        }
    }
}

/// Index-based edit of one of the nested event collections.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionEdit<T> {
    Add(T),
    Update(usize, T),
    Remove(usize),
}

impl<T> CollectionEdit<T> {
    /// Applies the edit to `items` in place.
    pub fn apply(self, items: &mut Vec<T>) -> Result<(), TypeConstraintError> {
        let len = items.len();
        match self {
            CollectionEdit::Add(item) => items.push(item),
            CollectionEdit::Update(index, item) => match items.get_mut(index) {
                Some(slot) => *slot = item,
                None => return Err(TypeConstraintError::IndexOutOfRange { index, len }),
            },
            CollectionEdit::Remove(index) => {
                if index >= len {
                    return Err(TypeConstraintError::IndexOutOfRange { index, len });
                }
                items.remove(index);
            }
        }
        Ok(())
    }
}

/// Which nested collection of an event an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventCollection {
    Agenda,
    Speakers,
    Sponsors,
    Notifications,
}

impl EventCollection {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventCollection::Agenda => "agenda",
            EventCollection::Speakers => "speakers",
            EventCollection::Sponsors => "sponsors",
            EventCollection::Notifications => "notifications",
        }
    }

    /// Removes the item at `index` from the matching collection of `draft`.
    pub fn remove(self, draft: &mut EventDraft, index: usize) -> Result<(), TypeConstraintError> {
        match self {
            EventCollection::Agenda => CollectionEdit::Remove(index).apply(&mut draft.agenda),
            EventCollection::Speakers => CollectionEdit::Remove(index).apply(&mut draft.speakers),
            EventCollection::Sponsors => CollectionEdit::Remove(index).apply(&mut draft.sponsors),
            EventCollection::Notifications => {
                CollectionEdit::Remove(index).apply(&mut draft.notifications)
            }
        }
    }
}

impl Display for EventCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCollection {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agenda" => Ok(EventCollection::Agenda),
            "speakers" => Ok(EventCollection::Speakers),
            "sponsors" => Ok(EventCollection::Sponsors),
            "notifications" => Ok(EventCollection::Notifications),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown event collection: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_edits_replace_by_index() {
        let mut items = vec!["a", "b"];
        CollectionEdit::Add("c").apply(&mut items).unwrap();
        CollectionEdit::Update(0, "z").apply(&mut items).unwrap();
        CollectionEdit::Remove(1).apply(&mut items).unwrap();
        assert_eq!(items, vec!["z", "c"]);
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut items = vec![1];
        assert_eq!(
            CollectionEdit::Update(3, 9).apply(&mut items),
            Err(TypeConstraintError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(CollectionEdit::<i32>::Remove(1).apply(&mut items).is_err());
        assert_eq!(items, vec![1]);
    }

    #[test]
    fn virtual_platform_prefers_zoom() {
        let links = VirtualLinks {
            meet: Some(WebUrl::new("https://meet.google.com/abc").unwrap()),
            ..VirtualLinks::default()
        };
        assert_eq!(links.platform(), Some("Google Meet"));
        assert_eq!(VirtualLinks::default().platform(), None);
    }

    #[test]
    fn collection_names_parse() {
        assert_eq!("speakers".parse::<EventCollection>().unwrap(), EventCollection::Speakers);
        assert!("tickets".parse::<EventCollection>().is_err());
    }
}
