use serde::Serialize;

use crate::dto::events::EventCard;

/// Data required to render the home page.
pub struct HomePageData {
    pub upcoming: Vec<EventCard>,
    /// Set when the events could not be loaded; the page still renders.
    pub events_unavailable: bool,
}

/// Membership tier described on the membership page.
#[derive(Debug, Serialize)]
pub struct MembershipTier {
    pub key: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    pub benefits: &'static [&'static str],
}
