use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::types::{Email, FullName, PhoneNumber, TypeConstraintError, UserId};
use crate::domain::user::{MembershipType, ProfessionalStatus, User, UserStatus};
use crate::models::{non_blank, parse_timestamp};

/// Member record as returned by `GET /users` and `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_status: Option<String>,
    #[serde(default, alias = "experience")]
    pub years_of_experience: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub membership_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default, alias = "cpePoints")]
    pub cpe_score: Option<f64>,
    #[serde(default, alias = "attendedEvents")]
    pub events_attended: Option<u32>,
    #[serde(default, alias = "profile")]
    pub custom_fields: BTreeMap<String, Value>,
}

/// Envelope of `GET /users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserList {
    #[serde(alias = "data")]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub total: Option<usize>,
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, TypeConstraintError>
where
    T: std::str::FromStr<Err = TypeConstraintError>,
{
    non_blank(value).map(|v| v.parse()).transpose()
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => non_blank(Some(s)),
        other => Some(other.to_string()),
    }
}

impl TryFrom<ApiUser> for User {
    type Error = TypeConstraintError;

    fn try_from(api: ApiUser) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(api.id)?,
            full_name: FullName::new(api.full_name)?,
            email: Email::new(api.email)?,
            // Legacy records hold free-form numbers; those are dropped rather
            // than failing the whole page.
            phone: non_blank(api.phone).and_then(|p| PhoneNumber::new(p).ok()),
            professional_status: parse_optional(api.professional_status)?
                .unwrap_or(ProfessionalStatus::WorkingProfessional),
            years_of_experience: non_blank(api.years_of_experience),
            industry: non_blank(api.industry),
            membership_type: parse_optional::<MembershipType>(api.membership_type)?
                .unwrap_or_default(),
            status: parse_optional::<UserStatus>(api.status)?.unwrap_or_default(),
            created_at: parse_timestamp(&api.created_at)?,
            last_login: non_blank(api.last_login)
                .map(|at| parse_timestamp(&at))
                .transpose()?,
            certifications: api
                .certifications
                .into_iter()
                .filter_map(|c| non_blank(Some(c)))
                .collect(),
            cpe_score: api.cpe_score.unwrap_or(0.0).max(0.0).round() as u32,
            events_attended: api.events_attended.unwrap_or(0),
            custom_fields: api
                .custom_fields
                .into_iter()
                .filter_map(|(key, value)| value_to_string(value).map(|v| (key, v)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalizes_alternate_field_names() {
        let api: ApiUser = serde_json::from_value(json!({
            "_id": "64f1",
            "name": "Ann Lee",
            "email": "ANN@example.com",
            "phone": "+1 408 555 0100",
            "professionalStatus": "student",
            "membershipType": "student",
            "status": "active",
            "createdAt": "2024-03-10T09:00:00.000Z",
            "cpePoints": 12.4,
            "attendedEvents": 5,
            "profile": { "university": "SJSU", "graduationYear": 2026, "major": null }
        }))
        .unwrap();

        let user = User::try_from(api).unwrap();

        assert_eq!(user.id.as_str(), "64f1");
        assert_eq!(user.email.as_str(), "ann@example.com");
        assert_eq!(user.cpe_score, 12);
        assert_eq!(user.events_attended, 5);
        assert_eq!(user.professional_status, ProfessionalStatus::Student);
        assert_eq!(user.custom_fields.get("graduationYear").map(String::as_str), Some("2026"));
        assert!(!user.custom_fields.contains_key("major"));
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let api: ApiUser = serde_json::from_value(json!({
            "id": "u1",
            "fullName": "Bo",
            "email": "bo@example.com",
            "createdAt": "2024-01-01",
            "cpeScore": 3,
            "phone": "n/a"
        }))
        .unwrap();

        let user = User::try_from(api).unwrap();

        assert_eq!(user.membership_type, MembershipType::Basic);
        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.cpe_score, 3);
        assert_eq!(user.phone, None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let api: ApiUser = serde_json::from_value(json!({
            "id": "u1",
            "fullName": "Bo",
            "email": "bo@example.com",
            "createdAt": "2024-01-01",
            "status": "banned"
        }))
        .unwrap();

        assert!(User::try_from(api).is_err());
    }
}
