//! Admin event editor forms: the scalar fields of the wizard tabs and one
//! form per nested collection.

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::event::{
    AgendaItem, Banner, CollectionEdit, EventDraft, EventMode, EventNotification, EventPrice,
    Speaker, Sponsor, SponsorTier, Venue, VirtualLinks,
};
use crate::domain::filter::empty_as_none;
use crate::domain::types::{Cents, EventTitle, SanitizedHtml, WebUrl};
use crate::forms::{FieldErrors, FormError, collect_field_errors, split_list};
use crate::models::{non_blank, optional_url};
use crate::repository::ImageUpload;

const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";

/// Tabs of the event editor, in display order.
pub const EDITOR_TABS: [&str; 9] = [
    "details",
    "schedule",
    "location",
    "pricing",
    "agenda",
    "speakers",
    "sponsors",
    "notifications",
    "media",
];

pub fn normalize_tab(tab: Option<&str>) -> &'static str {
    tab.and_then(|tab| EDITOR_TABS.iter().copied().find(|known| *known == tab))
        .unwrap_or(EDITOR_TABS[0])
}

fn parse_datetime(value: &str, field: &str, errors: &mut FieldErrors) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, FORM_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            errors.insert(field.to_string(), "Enter a date and time".to_string());
        })
        .ok()
}

fn parse_dollars(value: &str, field: &str, errors: &mut FieldErrors) -> Cents {
    let value = value.trim().trim_start_matches('$');
    if value.is_empty() {
        return Cents::default();
    }
    match value.parse::<f64>().map_err(|_| ()).and_then(|v| Cents::from_dollars(v).map_err(|_| ())) {
        Ok(cents) => cents,
        Err(()) => {
            errors.insert(field.to_string(), "Enter a non-negative amount".to_string());
            Cents::default()
        }
    }
}

fn parse_optional_number<T: std::str::FromStr>(
    value: &str,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value
        .parse()
        .map_err(|_| {
            errors.insert(field.to_string(), "Enter a number".to_string());
        })
        .ok()
}

fn checked_url(value: &str, field: &str, errors: &mut FieldErrors) -> Option<WebUrl> {
    let value = non_blank(Some(value.to_string()))?;
    WebUrl::new(value)
        .map_err(|_| {
            errors.insert(field.to_string(), "Enter a full URL".to_string());
        })
        .ok()
}

/// Scalar fields of the event editor. Every tab posts the full form.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct EventForm {
    #[serde(default)]
    pub tab: String,
    #[validate(length(min = 1, message = "Title is required"))]
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub venue_address: String,
    #[serde(default)]
    pub venue_map_url: String,
    #[serde(default)]
    pub venue_lat: String,
    #[serde(default)]
    pub venue_lng: String,
    #[serde(default)]
    pub zoom: String,
    #[serde(default)]
    pub meet: String,
    #[serde(default)]
    pub teams: String,
    #[serde(default)]
    pub virtual_password: String,
    #[serde(default)]
    pub virtual_instructions: String,
    #[serde(default)]
    pub price_member: String,
    #[serde(default)]
    pub price_non_member: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub cpe_score: String,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    #[serde(default)]
    pub banner_image_url: String,
    #[serde(default)]
    pub banner_overlay_color: String,
    #[serde(default)]
    pub banner_overlay_opacity: String,
}

/// Validated scalar fields; collections come from the stored event.
struct EventScalars {
    title: EventTitle,
    host: Option<String>,
    category: Option<String>,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
    mode: EventMode,
    venue: Option<Venue>,
    virtual_links: Option<VirtualLinks>,
    price: EventPrice,
    capacity: Option<u32>,
    cpe_score: f32,
    tags: Vec<String>,
    description: String,
    description_html: SanitizedHtml,
    banner: Option<Banner>,
}

impl From<&EventDraft> for EventForm {
    fn from(draft: &EventDraft) -> Self {
        let venue = draft.venue.as_ref();
        let links = draft.virtual_links.as_ref();
        let url = |u: Option<&WebUrl>| u.map(|u| u.as_str().to_string()).unwrap_or_default();
        Self {
            tab: String::new(),
            title: draft.title.to_string(),
            host: draft.host.clone().unwrap_or_default(),
            category: draft.category.clone().unwrap_or_default(),
            starts_at: draft.starts_at.format(FORM_DATETIME).to_string(),
            ends_at: draft.ends_at.format(FORM_DATETIME).to_string(),
            mode: draft.mode.as_str().to_string(),
            venue_name: venue.map(|v| v.name.clone()).unwrap_or_default(),
            venue_address: venue.map(|v| v.address.clone()).unwrap_or_default(),
            venue_map_url: url(venue.and_then(|v| v.map_url.as_ref())),
            venue_lat: venue.and_then(|v| v.latitude).map(|v| v.to_string()).unwrap_or_default(),
            venue_lng: venue.and_then(|v| v.longitude).map(|v| v.to_string()).unwrap_or_default(),
            zoom: url(links.and_then(|l| l.zoom.as_ref())),
            meet: url(links.and_then(|l| l.meet.as_ref())),
            teams: url(links.and_then(|l| l.teams.as_ref())),
            virtual_password: links.and_then(|l| l.password.clone()).unwrap_or_default(),
            virtual_instructions: links.and_then(|l| l.instructions.clone()).unwrap_or_default(),
            price_member: format!("{:.2}", draft.price.member.as_dollars()),
            price_non_member: format!("{:.2}", draft.price.non_member.as_dollars()),
            capacity: draft.capacity.map(|c| c.to_string()).unwrap_or_default(),
            cpe_score: draft.cpe_score.to_string(),
            tags: draft.tags.join(", "),
            description: draft.description.clone(),
            description_html: draft.description_html.as_str().to_string(),
            banner_image_url: url(draft.banner.as_ref().map(|b| &b.image_url)),
            banner_overlay_color: draft
                .banner
                .as_ref()
                .and_then(|b| b.overlay_color.clone())
                .unwrap_or_default(),
            banner_overlay_opacity: draft
                .banner
                .as_ref()
                .map(|b| b.overlay_opacity.to_string())
                .unwrap_or_default(),
        }
    }
}

impl EventForm {
    fn scalars(&self) -> Result<EventScalars, FormError> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(err) => collect_field_errors(&err),
        };

        let starts_at = parse_datetime(&self.starts_at, "starts_at", &mut errors);
        let ends_at = parse_datetime(&self.ends_at, "ends_at", &mut errors);
        if matches!((starts_at, ends_at), (Some(start), Some(end)) if end < start) {
            errors.insert("ends_at".to_string(), "End must be after the start".to_string());
        }

        let mode = if self.mode.trim().is_empty() {
            EventMode::InPerson
        } else {
            self.mode.parse().unwrap_or_else(|_| {
                errors.insert("mode".to_string(), "Select how attendees join".to_string());
                EventMode::InPerson
            })
        };

        let venue = Venue {
            name: self.venue_name.trim().to_string(),
            address: self.venue_address.trim().to_string(),
            map_url: checked_url(&self.venue_map_url, "venue_map_url", &mut errors),
            latitude: parse_optional_number(&self.venue_lat, "venue_lat", &mut errors),
            longitude: parse_optional_number(&self.venue_lng, "venue_lng", &mut errors),
        };
        let has_venue = !venue.name.is_empty() || !venue.address.is_empty();
        if mode != EventMode::Virtual && !has_venue {
            errors.insert("venue_name".to_string(), "A venue is required".to_string());
        }

        let links = VirtualLinks {
            zoom: checked_url(&self.zoom, "zoom", &mut errors),
            meet: checked_url(&self.meet, "meet", &mut errors),
            teams: checked_url(&self.teams, "teams", &mut errors),
            password: non_blank(Some(self.virtual_password.clone())),
            instructions: non_blank(Some(self.virtual_instructions.clone())),
        };
        let has_links = links.platform().is_some();
        if mode != EventMode::InPerson && !has_links {
            errors.insert("zoom".to_string(), "Add at least one meeting link".to_string());
        }

        let price = EventPrice {
            member: parse_dollars(&self.price_member, "price_member", &mut errors),
            non_member: parse_dollars(&self.price_non_member, "price_non_member", &mut errors),
        };
        let capacity = parse_optional_number(&self.capacity, "capacity", &mut errors);
        let cpe_score: f32 = parse_optional_number(&self.cpe_score, "cpe_score", &mut errors)
            .unwrap_or(0.0_f32)
            .max(0.0);

        let banner_url = checked_url(&self.banner_image_url, "banner_image_url", &mut errors);
        let overlay_opacity: u8 =
            parse_optional_number(&self.banner_overlay_opacity, "banner_overlay_opacity", &mut errors)
                .unwrap_or(40);
        if overlay_opacity > 100 {
            errors.insert(
                "banner_overlay_opacity".to_string(),
                "Opacity is a percentage between 0 and 100".to_string(),
            );
        }

        let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) else {
            return Err(FormError::Fields(errors));
        };
        if !errors.is_empty() {
            return Err(FormError::Fields(errors));
        }

        Ok(EventScalars {
            title: EventTitle::new(self.title.as_str())?,
            host: non_blank(Some(self.host.clone())),
            category: non_blank(Some(self.category.clone())),
            starts_at,
            ends_at,
            mode,
            venue: (mode != EventMode::Virtual && has_venue).then_some(venue),
            virtual_links: (mode != EventMode::InPerson && has_links).then_some(links),
            price,
            capacity,
            cpe_score,
            tags: split_list(&self.tags),
            description: self.description.trim().to_string(),
            description_html: SanitizedHtml::new(&self.description_html),
            banner: banner_url.map(|image_url| Banner {
                image_url,
                overlay_color: non_blank(Some(self.banner_overlay_color.clone())),
                overlay_opacity,
            }),
        })
    }

    /// New event with empty nested collections.
    pub fn into_draft(self) -> Result<EventDraft, FormError> {
        let s = self.scalars()?;
        Ok(EventDraft {
            title: s.title,
            host: s.host,
            category: s.category,
            starts_at: s.starts_at,
            ends_at: s.ends_at,
            mode: s.mode,
            venue: s.venue,
            virtual_links: s.virtual_links,
            price: s.price,
            capacity: s.capacity,
            cpe_score: s.cpe_score,
            tags: s.tags,
            description: s.description,
            description_html: s.description_html,
            banner: s.banner,
            agenda: Vec::new(),
            speakers: Vec::new(),
            sponsors: Vec::new(),
            notifications: Vec::new(),
        })
    }

    /// Overwrites the scalar fields of `draft`, keeping its collections.
    pub fn apply_to(self, draft: &mut EventDraft) -> Result<(), FormError> {
        let s = self.scalars()?;
        draft.title = s.title;
        draft.host = s.host;
        draft.category = s.category;
        draft.starts_at = s.starts_at;
        draft.ends_at = s.ends_at;
        draft.mode = s.mode;
        draft.venue = s.venue;
        draft.virtual_links = s.virtual_links;
        draft.price = s.price;
        draft.capacity = s.capacity;
        draft.cpe_score = s.cpe_score;
        draft.tags = s.tags;
        draft.description = s.description;
        draft.description_html = s.description_html;
        draft.banner = s.banner;
        Ok(())
    }
}

/// Item of an event collection posted from the editor. A present `index`
/// updates that item, otherwise the item is appended.
pub trait CollectionItemForm {
    type Item;

    fn index(&self) -> Option<usize>;
    fn item(self) -> Result<Self::Item, FormError>;

    fn into_edit(self) -> Result<CollectionEdit<Self::Item>, FormError>
    where
        Self: Sized,
    {
        let index = self.index();
        let item = self.item()?;
        Ok(match index {
            Some(index) => CollectionEdit::Update(index, item),
            None => CollectionEdit::Add(item),
        })
    }
}

fn required(value: &str, field: &str, message: &str) -> Result<String, FormError> {
    non_blank(Some(value.to_string())).ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        FormError::Fields(errors)
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct AgendaItemForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub speakers: String,
}

impl CollectionItemForm for AgendaItemForm {
    type Item = AgendaItem;

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn item(self) -> Result<AgendaItem, FormError> {
        Ok(AgendaItem {
            title: required(&self.title, "title", "Session title is required")?,
            starts_at: required(&self.starts_at, "starts_at", "Start time is required")?,
            ends_at: self.ends_at.trim().to_string(),
            description: non_blank(Some(self.description)),
            speakers: split_list(&self.speakers),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SpeakerForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub link: String,
}

impl CollectionItemForm for SpeakerForm {
    type Item = Speaker;

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn item(self) -> Result<Speaker, FormError> {
        Ok(Speaker {
            name: required(&self.name, "name", "Speaker name is required")?,
            title: non_blank(Some(self.title)),
            company: non_blank(Some(self.company)),
            photo_url: optional_url(Some(self.photo_url)),
            bio: non_blank(Some(self.bio)),
            link: optional_url(Some(self.link)),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SponsorForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tier: Option<SponsorTier>,
    #[serde(default)]
    pub website: String,
}

impl CollectionItemForm for SponsorForm {
    type Item = Sponsor;

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn item(self) -> Result<Sponsor, FormError> {
        Ok(Sponsor {
            name: required(&self.name, "name", "Sponsor name is required")?,
            logo_url: optional_url(Some(self.logo_url)),
            tier: self.tier.unwrap_or(SponsorTier::Community),
            website: optional_url(Some(self.website)),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl CollectionItemForm for NotificationForm {
    type Item = EventNotification;

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn item(self) -> Result<EventNotification, FormError> {
        Ok(EventNotification {
            title: required(&self.title, "title", "Notification title is required")?,
            body: required(&self.body, "body", "Notification text is required")?,
            published_at: Utc::now().naive_utc(),
        })
    }
}

/// Banner image picked on the media tab.
#[derive(MultipartForm)]
pub struct BannerUploadForm {
    #[multipart(limit = "5MB")]
    pub banner: TempFile,
}

impl BannerUploadForm {
    pub fn into_upload(self) -> Result<ImageUpload, FormError> {
        let mut errors = FieldErrors::new();
        let content_type = self
            .banner
            .content_type
            .as_ref()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            errors.insert(
                "banner".to_string(),
                "Upload a PNG, JPEG, GIF or WebP image".to_string(),
            );
            return Err(FormError::Fields(errors));
        }

        let bytes = std::fs::read(self.banner.file.path()).map_err(|err| {
            log::error!("Failed to read uploaded banner: {err}");
            errors.insert("banner".to_string(), "The upload could not be read".to_string());
            FormError::Fields(errors.clone())
        })?;

        Ok(ImageUpload {
            filename: self
                .banner
                .file_name
                .unwrap_or_else(|| "banner".to_string()),
            content_type,
            bytes,
        })
    }
}
