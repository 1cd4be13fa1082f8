use serde::Deserialize;

use crate::domain::registration::Registration;
use crate::domain::types::{Email, EventId, FullName, RegistrationId, TypeConstraintError};
use crate::models::parse_timestamp;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegistration {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "event")]
    pub event_id: String,
    #[serde(alias = "name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub is_member: bool,
    #[serde(alias = "createdAt")]
    pub registered_at: String,
}

impl TryFrom<ApiRegistration> for Registration {
    type Error = TypeConstraintError;

    fn try_from(api: ApiRegistration) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RegistrationId::new(api.id)?,
            event_id: EventId::new(api.event_id)?,
            full_name: FullName::new(api.full_name)?,
            email: Email::new(api.email)?,
            is_member: api.is_member,
            registered_at: parse_timestamp(&api.registered_at)?,
        })
    }
}

/// Response of `POST /uploads/image`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUpload {
    #[serde(alias = "imageUrl")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_registration_response() {
        let api: ApiRegistration = serde_json::from_value(json!({
            "_id": "r-9",
            "event": "ev-1",
            "name": "Ann Lee",
            "email": "Ann@Example.com",
            "isMember": true,
            "createdAt": "2025-02-01T10:00:00Z"
        }))
        .unwrap();

        let registration = Registration::try_from(api).unwrap();

        assert_eq!(registration.id.as_str(), "r-9");
        assert_eq!(registration.email.as_str(), "ann@example.com");
        assert!(registration.is_member);
    }
}
