use serde::{Deserialize, Serialize};

use crate::domain::event::{Event, EventMode, Sponsor};
use crate::domain::filter::empty_as_none;
use crate::domain::registration::Ticket;
use crate::forms::FieldErrors;
use crate::forms::events::EventForm;
use crate::forms::registration::RegistrationForm;
use crate::formatting::{format_event_date, format_event_price, format_time_range, format_venue};
use crate::pagination::Paginated;

/// Query parameters of the public catalog.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mode: Option<EventMode>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
    /// Include events that already ended.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub past: Option<bool>,
}

impl CatalogQuery {
    /// Query string for `page`, keeping the active filters.
    pub fn query_for_page(&self, page: usize) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(mode) = self.mode {
            pairs.push(("mode", mode.as_str().to_string()));
        }
        if self.past == Some(true) {
            pairs.push(("past", "true".to_string()));
        }
        pairs.push(("page", page.max(1).to_string()));
        serde_html_form::to_string(&pairs).unwrap_or_default()
    }
}

/// Event with its display strings precomputed for the templates.
#[derive(Debug, Serialize)]
pub struct EventCard {
    pub event: Event,
    pub date: String,
    pub time_range: String,
    pub price: String,
    pub venue: String,
    pub mode_label: &'static str,
    pub sold_out: bool,
}

impl From<Event> for EventCard {
    fn from(event: Event) -> Self {
        Self {
            date: format_event_date(event.starts_at),
            time_range: format_time_range(event.starts_at, event.ends_at),
            price: format_event_price(event.price),
            venue: format_venue(&event),
            mode_label: event.mode.label(),
            sold_out: event.is_sold_out(),
            event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SponsorGroup {
    pub tier: &'static str,
    pub sponsors: Vec<Sponsor>,
}

pub struct CatalogPageData {
    pub events: Paginated<EventCard>,
    pub categories: Vec<String>,
}

pub struct EventDetailData {
    pub card: EventCard,
    pub sponsor_groups: Vec<SponsorGroup>,
}

/// Registration form shown again with its problems.
pub struct InvalidRegistration {
    pub detail: EventDetailData,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
}

pub struct TicketPageData {
    pub card: EventCard,
    pub ticket: Ticket,
    /// Inline SVG markup of the QR code.
    pub qr_svg: String,
}

/// Data for the admin event editor.
pub struct EventEditorData {
    /// `None` while creating.
    pub event: Option<Event>,
    pub form: EventForm,
    pub errors: FieldErrors,
    pub tab: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_pages_keep_filters() {
        let query: CatalogQuery =
            serde_html_form::from_str("search=cloud+audit&mode=virtual&category=&page=3").unwrap();
        assert_eq!(query.category, None);
        assert_eq!(
            query.query_for_page(4),
            "search=cloud+audit&mode=virtual&page=4"
        );
    }
}
