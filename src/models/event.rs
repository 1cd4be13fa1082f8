use serde::{Deserialize, Serialize};

use crate::domain::event::{
    AgendaItem, Banner, Event, EventDraft, EventMode, EventNotification, EventPrice, Speaker,
    Sponsor, SponsorTier, Venue, VirtualLinks,
};
use crate::domain::types::{Cents, EventId, EventTitle, SanitizedHtml, TypeConstraintError, WebUrl};
use crate::models::{non_blank, optional_url, parse_timestamp};

const WIRE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiVenue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(default, alias = "latitude", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiVirtualLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Prices travel in dollars.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrice {
    #[serde(default)]
    pub member: f64,
    #[serde(default)]
    pub non_member: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiBanner {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_color: Option<String>,
    #[serde(default)]
    pub overlay_opacity: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiAgendaItem {
    #[serde(default, alias = "start")]
    pub starts_at: String,
    #[serde(default, alias = "end")]
    pub ends_at: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub speakers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpeaker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, alias = "photo", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, alias = "linkedin", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSponsor {
    pub name: String,
    #[serde(default, alias = "logo", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiNotification {
    pub title: String,
    #[serde(alias = "message")]
    pub body: String,
    #[serde(alias = "createdAt")]
    pub published_at: String,
}

/// Editable part of an event, shared by reads and `POST`/`PUT` bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventBody {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(alias = "startDate")]
    pub starts_at: String,
    #[serde(alias = "endDate")]
    pub ends_at: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<ApiVenue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_links: Option<ApiVirtualLinks>,
    #[serde(default)]
    pub price: ApiPrice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, alias = "cpePoints")]
    pub cpe_score: f32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<ApiBanner>,
    #[serde(default)]
    pub agenda: Vec<ApiAgendaItem>,
    #[serde(default)]
    pub speakers: Vec<ApiSpeaker>,
    #[serde(default)]
    pub sponsors: Vec<ApiSponsor>,
    #[serde(default)]
    pub notifications: Vec<ApiNotification>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "availableSeats")]
    pub seats_left: Option<u32>,
    #[serde(flatten)]
    pub body: ApiEventBody,
}

/// Envelope of `GET /events`; a bare array is also accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEventList {
    Envelope {
        #[serde(alias = "data")]
        events: Vec<ApiEvent>,
        #[serde(default)]
        total: Option<usize>,
    },
    Bare(Vec<ApiEvent>),
}

impl ApiEventList {
    pub fn into_parts(self) -> (Option<usize>, Vec<ApiEvent>) {
        match self {
            ApiEventList::Envelope { events, total } => (total, events),
            ApiEventList::Bare(events) => (None, events),
        }
    }
}

fn venue_from_api(api: ApiVenue) -> Option<Venue> {
    let venue = Venue {
        name: api.name.trim().to_string(),
        address: api.address.trim().to_string(),
        map_url: optional_url(api.map_url),
        latitude: api.lat,
        longitude: api.lng,
    };
    (!venue.name.is_empty() || !venue.address.is_empty()).then_some(venue)
}

fn links_from_api(api: ApiVirtualLinks) -> Option<VirtualLinks> {
    let links = VirtualLinks {
        zoom: optional_url(api.zoom),
        meet: optional_url(api.meet),
        teams: optional_url(api.teams),
        password: non_blank(api.password),
        instructions: non_blank(api.instructions),
    };
    (links != VirtualLinks::default()).then_some(links)
}

impl TryFrom<ApiEventBody> for EventDraft {
    type Error = TypeConstraintError;

    fn try_from(api: ApiEventBody) -> Result<Self, Self::Error> {
        let description_html = match non_blank(api.description_html) {
            Some(html) => SanitizedHtml::new(&html),
            None => SanitizedHtml::default(),
        };

        Ok(Self {
            title: EventTitle::new(api.title)?,
            host: non_blank(api.host),
            category: non_blank(api.category),
            starts_at: parse_timestamp(&api.starts_at)?,
            ends_at: parse_timestamp(&api.ends_at)?,
            mode: match non_blank(api.mode) {
                Some(mode) => mode.parse()?,
                None => EventMode::InPerson,
            },
            venue: api.venue.and_then(venue_from_api),
            virtual_links: api.virtual_links.and_then(links_from_api),
            price: EventPrice {
                member: Cents::from_dollars(api.price.member)?,
                non_member: Cents::from_dollars(api.price.non_member)?,
            },
            capacity: api.capacity,
            cpe_score: api.cpe_score.max(0.0),
            tags: api.tags.into_iter().filter_map(|t| non_blank(Some(t))).collect(),
            description: api.description,
            description_html,
            banner: api.banner.and_then(|banner| {
                Some(Banner {
                    image_url: WebUrl::new(banner.image_url).ok()?,
                    overlay_color: non_blank(banner.overlay_color),
                    overlay_opacity: banner.overlay_opacity.unwrap_or(40).min(100),
                })
            }),
            agenda: api
                .agenda
                .into_iter()
                .map(|item| AgendaItem {
                    starts_at: item.starts_at,
                    ends_at: item.ends_at,
                    title: item.title,
                    description: non_blank(item.description),
                    speakers: item.speakers,
                })
                .collect(),
            speakers: api
                .speakers
                .into_iter()
                .map(|s| Speaker {
                    name: s.name,
                    title: non_blank(s.title),
                    company: non_blank(s.company),
                    photo_url: optional_url(s.photo_url),
                    bio: non_blank(s.bio),
                    link: optional_url(s.link),
                })
                .collect(),
            sponsors: api
                .sponsors
                .into_iter()
                .map(|s| {
                    Ok(Sponsor {
                        name: s.name,
                        logo_url: optional_url(s.logo_url),
                        tier: match non_blank(s.tier) {
                            Some(tier) => tier.parse()?,
                            None => SponsorTier::Community,
                        },
                        website: optional_url(s.website),
                    })
                })
                .collect::<Result<_, TypeConstraintError>>()?,
            notifications: api
                .notifications
                .into_iter()
                .map(|n| {
                    Ok(EventNotification {
                        title: n.title,
                        body: n.body,
                        published_at: parse_timestamp(&n.published_at)?,
                    })
                })
                .collect::<Result<_, TypeConstraintError>>()?,
        })
    }
}

impl TryFrom<ApiEvent> for Event {
    type Error = TypeConstraintError;

    fn try_from(api: ApiEvent) -> Result<Self, Self::Error> {
        let id = EventId::new(api.id)?;
        let draft = EventDraft::try_from(api.body)?;
        Ok(Self {
            id,
            title: draft.title,
            host: draft.host,
            category: draft.category,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            mode: draft.mode,
            venue: draft.venue,
            virtual_links: draft.virtual_links,
            price: draft.price,
            capacity: draft.capacity,
            seats_left: api.seats_left,
            cpe_score: draft.cpe_score,
            tags: draft.tags,
            description: draft.description,
            description_html: draft.description_html,
            banner: draft.banner,
            agenda: draft.agenda,
            speakers: draft.speakers,
            sponsors: draft.sponsors,
            notifications: draft.notifications,
        })
    }
}

fn url_string(url: &Option<WebUrl>) -> Option<String> {
    url.as_ref().map(|u| u.as_str().to_string())
}

impl From<&EventDraft> for ApiEventBody {
    fn from(draft: &EventDraft) -> Self {
        Self {
            title: draft.title.to_string(),
            host: draft.host.clone(),
            category: draft.category.clone(),
            starts_at: draft.starts_at.format(WIRE_TIMESTAMP).to_string(),
            ends_at: draft.ends_at.format(WIRE_TIMESTAMP).to_string(),
            mode: Some(draft.mode.as_str().to_string()),
            venue: draft.venue.as_ref().map(|v| ApiVenue {
                name: v.name.clone(),
                address: v.address.clone(),
                map_url: url_string(&v.map_url),
                lat: v.latitude,
                lng: v.longitude,
            }),
            virtual_links: draft.virtual_links.as_ref().map(|l| ApiVirtualLinks {
                zoom: url_string(&l.zoom),
                meet: url_string(&l.meet),
                teams: url_string(&l.teams),
                password: l.password.clone(),
                instructions: l.instructions.clone(),
            }),
            price: ApiPrice {
                member: draft.price.member.as_dollars(),
                non_member: draft.price.non_member.as_dollars(),
            },
            capacity: draft.capacity,
            cpe_score: draft.cpe_score,
            tags: draft.tags.clone(),
            description: draft.description.clone(),
            description_html: (!draft.description_html.is_empty())
                .then(|| draft.description_html.as_str().to_string()),
            banner: draft.banner.as_ref().map(|b| ApiBanner {
                image_url: b.image_url.as_str().to_string(),
                overlay_color: b.overlay_color.clone(),
                overlay_opacity: Some(b.overlay_opacity),
            }),
            agenda: draft
                .agenda
                .iter()
                .map(|a| ApiAgendaItem {
                    starts_at: a.starts_at.clone(),
                    ends_at: a.ends_at.clone(),
                    title: a.title.clone(),
                    description: a.description.clone(),
                    speakers: a.speakers.clone(),
                })
                .collect(),
            speakers: draft
                .speakers
                .iter()
                .map(|s| ApiSpeaker {
                    name: s.name.clone(),
                    title: s.title.clone(),
                    company: s.company.clone(),
                    photo_url: url_string(&s.photo_url),
                    bio: s.bio.clone(),
                    link: url_string(&s.link),
                })
                .collect(),
            sponsors: draft
                .sponsors
                .iter()
                .map(|s| ApiSponsor {
                    name: s.name.clone(),
                    logo_url: url_string(&s.logo_url),
                    tier: Some(s.tier.as_str().to_string()),
                    website: url_string(&s.website),
                })
                .collect(),
            notifications: draft
                .notifications
                .iter()
                .map(|n| ApiNotification {
                    title: n.title.clone(),
                    body: n.body.clone(),
                    published_at: n.published_at.format(WIRE_TIMESTAMP).to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wire_event() -> serde_json::Value {
        json!({
            "_id": "ev-1",
            "title": "Cloud Audit Workshop",
            "startDate": "2025-03-15T18:00:00.000Z",
            "endsAt": "2025-03-15T20:00:00Z",
            "mode": "hybrid",
            "venue": { "name": "SCCC", "address": "", "mapUrl": "" },
            "virtualLinks": { "zoom": "https://zoom.us/j/1", "teams": "" },
            "price": { "member": 0, "nonMember": 25.5 },
            "availableSeats": 0,
            "cpePoints": 2,
            "descriptionHtml": "<p>Hi</p><script>x()</script>",
            "sponsors": [{ "name": "Acme", "tier": "gold", "logo": "https://acme.test/logo.png" }],
            "notifications": [{ "title": "Room change", "message": "Hall B", "createdAt": "2025-03-01" }]
        })
    }

    #[test]
    fn maps_wire_event_into_domain() {
        let api: ApiEvent = serde_json::from_value(wire_event()).unwrap();
        let event = Event::try_from(api).unwrap();

        assert_eq!(event.id.as_str(), "ev-1");
        assert_eq!(event.mode, EventMode::Hybrid);
        assert_eq!(event.price.non_member.get(), 2550);
        assert!(event.is_sold_out());
        assert_eq!(event.cpe_score, 2.0);
        assert_eq!(event.description_html.as_str(), "<p>Hi</p>");
        assert_eq!(event.venue.as_ref().and_then(|v| v.map_url.clone()), None);
        assert_eq!(event.virtual_links.as_ref().and_then(|l| l.platform()), Some("Zoom"));
        assert_eq!(event.sponsors[0].tier, SponsorTier::Gold);
        assert_eq!(event.notifications[0].body, "Hall B");
    }

    #[test]
    fn draft_serializes_back_to_camel_case_dollars() {
        let api: ApiEvent = serde_json::from_value(wire_event()).unwrap();
        let draft = EventDraft::from(Event::try_from(api).unwrap());

        let body = serde_json::to_value(ApiEventBody::from(&draft)).unwrap();

        assert_eq!(body["price"]["nonMember"], json!(25.5));
        assert_eq!(body["startsAt"], json!("2025-03-15T18:00:00"));
        assert_eq!(body["sponsors"][0]["tier"], json!("gold"));
        assert!(body.get("seatsLeft").is_none());
    }

    #[test]
    fn event_list_accepts_bare_arrays() {
        let list: ApiEventList = serde_json::from_value(json!([wire_event()])).unwrap();
        let (total, events) = list.into_parts();
        assert_eq!(total, None);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_sponsor_tier_is_rejected() {
        let mut value = wire_event();
        value["sponsors"][0]["tier"] = json!("diamond");
        let api: ApiEvent = serde_json::from_value(value).unwrap();
        assert!(Event::try_from(api).is_err());
    }
}
