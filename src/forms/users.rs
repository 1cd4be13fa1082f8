use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::types::{Email, FullName, PhoneNumber};
use crate::domain::user::{
    MembershipType, NewUser, ProfessionalStatus, UpdateUser, User, UserStatus,
};
use crate::forms::{FieldErrors, FormError, collect_field_errors, split_list};
use crate::models::non_blank;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Create/edit modal submission.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct UserForm {
    /// Query string of the list to return to.
    #[serde(default)]
    pub state: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    #[serde(default)]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub professional_status: String,
    #[serde(default)]
    pub years_of_experience: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub membership_type: String,
    #[serde(default)]
    pub status: String,
    /// Comma separated certification names.
    #[serde(default)]
    pub certifications: String,
    #[serde(default)]
    pub custom_key: Vec<String>,
    #[serde(default)]
    pub custom_value: Vec<String>,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub password_confirmation: String,
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            state: String::new(),
            full_name: user.full_name.to_string(),
            email: user.email.to_string(),
            phone: user.phone.as_ref().map(ToString::to_string).unwrap_or_default(),
            professional_status: user.professional_status.as_str().to_string(),
            years_of_experience: user.years_of_experience.clone().unwrap_or_default(),
            industry: user.industry.clone().unwrap_or_default(),
            membership_type: user.membership_type.as_str().to_string(),
            status: user.status.as_str().to_string(),
            certifications: user.certifications.join(", "),
            custom_key: user.custom_fields.keys().cloned().collect(),
            custom_value: user.custom_fields.values().cloned().collect(),
            password: String::new(),
            password_confirmation: String::new(),
        }
    }
}

/// Validated account fields shared by create and update.
struct UserPayload {
    full_name: FullName,
    email: Email,
    phone: Option<PhoneNumber>,
    professional_status: ProfessionalStatus,
    years_of_experience: Option<String>,
    industry: Option<String>,
    membership_type: MembershipType,
    status: UserStatus,
}

fn parse_choice<T: std::str::FromStr + Default>(
    value: &str,
    field: &str,
    errors: &mut FieldErrors,
) -> T {
    if value.trim().is_empty() {
        return T::default();
    }
    value.parse().unwrap_or_else(|_| {
        errors.insert(field.to_string(), format!("Unknown value '{value}'"));
        T::default()
    })
}

impl UserForm {
    fn payload(&self, creating: bool) -> Result<UserPayload, FormError> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(err) => collect_field_errors(&err),
        };

        let phone = match non_blank(Some(self.phone.clone())) {
            Some(phone) => PhoneNumber::new(phone)
                .map_err(|_| {
                    errors.insert("phone".to_string(), "Enter a valid phone number".to_string());
                })
                .ok(),
            None => None,
        };

        if creating {
            if self.password.chars().count() < MIN_PASSWORD_LENGTH {
                errors.insert(
                    "password".to_string(),
                    format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
                );
            } else if self.password != self.password_confirmation {
                errors.insert(
                    "password_confirmation".to_string(),
                    "Passwords do not match".to_string(),
                );
            }
        }

        let professional_status = if self.professional_status.trim().is_empty() {
            ProfessionalStatus::WorkingProfessional
        } else {
            self.professional_status.parse().unwrap_or_else(|_| {
                errors.insert(
                    "professional_status".to_string(),
                    "Select a professional status".to_string(),
                );
                ProfessionalStatus::WorkingProfessional
            })
        };
        let membership_type: MembershipType =
            parse_choice(&self.membership_type, "membership_type", &mut errors);
        let status: UserStatus = parse_choice(&self.status, "status", &mut errors);

        let full_name = FullName::new(self.full_name.as_str());
        let email = Email::new(self.email.as_str());
        if email.is_err() {
            errors
                .entry("email".to_string())
                .or_insert_with(|| "Enter a valid email address".to_string());
        }

        match (full_name, email) {
            (Ok(full_name), Ok(email)) if errors.is_empty() => Ok(UserPayload {
                full_name,
                email,
                phone,
                professional_status,
                years_of_experience: non_blank(Some(self.years_of_experience.clone())),
                industry: non_blank(Some(self.industry.clone())),
                membership_type,
                status,
            }),
            _ => Err(FormError::Fields(errors)),
        }
    }

    /// Only keys belonging to the selected professional status are kept.
    fn custom_fields(&self, status: ProfessionalStatus) -> BTreeMap<String, String> {
        let allowed = status.custom_field_keys();
        self.custom_key
            .iter()
            .zip(self.custom_value.iter())
            .filter(|(key, _)| allowed.contains(&key.as_str()))
            .filter_map(|(key, value)| non_blank(Some(value.clone())).map(|v| (key.clone(), v)))
            .collect()
    }

    pub fn into_new_user(self) -> Result<NewUser, FormError> {
        let payload = self.payload(true)?;
        Ok(NewUser {
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            professional_status: payload.professional_status,
            years_of_experience: payload.years_of_experience,
            industry: payload.industry,
            membership_type: payload.membership_type,
            status: payload.status,
            password: self.password,
        })
    }

    pub fn into_update_user(self) -> Result<UpdateUser, FormError> {
        let payload = self.payload(false)?;
        let custom_fields = self.custom_fields(payload.professional_status);
        Ok(UpdateUser {
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            professional_status: payload.professional_status,
            years_of_experience: payload.years_of_experience,
            industry: payload.industry,
            membership_type: payload.membership_type,
            status: payload.status,
            certifications: split_list(&self.certifications),
            custom_fields,
        })
    }
}
