//! Display helpers shared by the event pages and the ticket.

use chrono::NaiveDateTime;

use crate::domain::event::{Event, EventMode, EventPrice};
use crate::domain::types::Cents;

/// `Saturday, March 15, 2025`
pub fn format_event_date(at: NaiveDateTime) -> String {
    at.format("%A, %B %-d, %Y").to_string()
}

/// `6:00 PM - 8:00 PM`, or with both dates when the event spans days.
pub fn format_time_range(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> String {
    if starts_at.date() == ends_at.date() {
        format!(
            "{} - {}",
            starts_at.format("%-I:%M %p"),
            ends_at.format("%-I:%M %p")
        )
    } else {
        format!(
            "{} - {}",
            starts_at.format("%b %-d, %-I:%M %p"),
            ends_at.format("%b %-d, %-I:%M %p")
        )
    }
}

pub fn format_price(amount: Cents) -> String {
    if amount.is_free() {
        "Free".to_string()
    } else {
        format!("${}.{:02}", amount.get() / 100, amount.get() % 100)
    }
}

/// `Members: Free / Non-members: $40.00`, collapsed when both match.
pub fn format_event_price(price: EventPrice) -> String {
    if price.member == price.non_member {
        format_price(price.member)
    } else {
        format!(
            "Members: {} / Non-members: {}",
            format_price(price.member),
            format_price(price.non_member)
        )
    }
}

pub fn format_venue(event: &Event) -> String {
    let physical = event.venue.as_ref().map(|venue| {
        [venue.name.trim(), venue.address.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    });
    let online = match event.virtual_links.as_ref().and_then(|links| links.platform()) {
        Some(platform) => format!("Online ({platform})"),
        None => "Online".to_string(),
    };

    match (event.mode, physical) {
        (EventMode::InPerson, Some(place)) if !place.is_empty() => place,
        (EventMode::InPerson, _) => "Venue to be announced".to_string(),
        (EventMode::Virtual, _) => online,
        (EventMode::Hybrid, Some(place)) if !place.is_empty() => format!("{place} + {online}"),
        (EventMode::Hybrid, _) => online,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::event::{Venue, VirtualLinks};
    use crate::domain::types::{EventId, EventTitle, SanitizedHtml, WebUrl};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub(crate) fn sample_event(id: &str) -> Event {
        Event {
            id: EventId::new(id).unwrap(),
            title: EventTitle::new("Cloud Audit Workshop").unwrap(),
            host: Some("ISACA SV".to_string()),
            category: Some("workshop".to_string()),
            starts_at: at(15, 18, 0),
            ends_at: at(15, 20, 0),
            mode: EventMode::InPerson,
            venue: Some(Venue {
                name: "Santa Clara Convention Center".to_string(),
                address: "5001 Great America Pkwy".to_string(),
                map_url: None,
                latitude: None,
                longitude: None,
            }),
            virtual_links: None,
            price: EventPrice {
                member: Cents::new(0),
                non_member: Cents::new(4000),
            },
            capacity: Some(100),
            seats_left: Some(10),
            cpe_score: 2.0,
            tags: vec!["audit".to_string()],
            description: "Hands-on session".to_string(),
            description_html: SanitizedHtml::default(),
            banner: None,
            agenda: Vec::new(),
            speakers: Vec::new(),
            sponsors: Vec::new(),
            notifications: Vec::new(),
        }
    }

    #[test]
    fn formats_dates_and_times() {
        assert_eq!(format_event_date(at(15, 18, 0)), "Saturday, March 15, 2025");
        assert_eq!(format_time_range(at(15, 18, 0), at(15, 20, 30)), "6:00 PM - 8:30 PM");
        assert_eq!(
            format_time_range(at(15, 9, 0), at(16, 17, 0)),
            "Mar 15, 9:00 AM - Mar 16, 5:00 PM"
        );
    }

    #[test]
    fn formats_prices() {
        assert_eq!(format_price(Cents::new(0)), "Free");
        assert_eq!(format_price(Cents::new(2505)), "$25.05");
        assert_eq!(
            format_event_price(EventPrice {
                member: Cents::new(0),
                non_member: Cents::new(4000)
            }),
            "Members: Free / Non-members: $40.00"
        );
    }

    #[test]
    fn formats_venue_by_mode() {
        let mut event = sample_event("e1");
        assert_eq!(
            format_venue(&event),
            "Santa Clara Convention Center, 5001 Great America Pkwy"
        );

        event.mode = EventMode::Hybrid;
        event.virtual_links = Some(VirtualLinks {
            zoom: Some(WebUrl::new("https://zoom.us/j/123").unwrap()),
            ..VirtualLinks::default()
        });
        assert_eq!(
            format_venue(&event),
            "Santa Clara Convention Center, 5001 Great America Pkwy + Online (Zoom)"
        );

        event.mode = EventMode::Virtual;
        assert_eq!(format_venue(&event), "Online (Zoom)");
    }
}
