use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::registration::NewRegistration;
use crate::domain::types::{Email, EventId, FullName, PhoneNumber};
use crate::forms::{FieldErrors, FormError, collect_field_errors};
use crate::models::non_blank;

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
/// Public event registration form.
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "Please enter your name"))]
    #[serde(default)]
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// ISACA member number; members get the member price.
    #[serde(default)]
    pub membership_number: String,
}

impl RegistrationForm {
    pub fn into_registration(self, event_id: EventId) -> Result<NewRegistration, FormError> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(err) => collect_field_errors(&err),
        };

        let phone = match non_blank(Some(self.phone.clone())) {
            Some(phone) => match PhoneNumber::new(phone) {
                Ok(phone) => Some(phone),
                Err(_) => {
                    errors.insert("phone".to_string(), "Please enter a valid phone number".to_string());
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(FormError::Fields(errors));
        }

        Ok(NewRegistration {
            event_id,
            full_name: FullName::new(self.full_name)?,
            email: Email::new(self.email)?,
            phone,
            membership_number: non_blank(Some(self.membership_number)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_id() -> EventId {
        EventId::new("ev-1").unwrap()
    }

    #[test]
    fn builds_registration_with_optional_fields() {
        let form = RegistrationForm {
            full_name: " Ann Lee ".to_string(),
            email: "ANN@example.com".to_string(),
            phone: String::new(),
            membership_number: " 123456 ".to_string(),
        };

        let registration = form.into_registration(event_id()).unwrap();

        assert_eq!(registration.full_name.as_str(), "Ann Lee");
        assert_eq!(registration.email.as_str(), "ann@example.com");
        assert_eq!(registration.phone, None);
        assert_eq!(registration.membership_number.as_deref(), Some("123456"));
    }

    #[test]
    fn reports_invalid_fields() {
        let form = RegistrationForm {
            full_name: String::new(),
            email: "ann".to_string(),
            phone: "abc".to_string(),
            membership_number: String::new(),
        };

        let errors = form.into_registration(event_id()).unwrap_err().field_errors();

        assert_eq!(
            errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "full_name", "phone"]
        );
    }
}
