//! Chapter member records and the enums describing their membership.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Email, FullName, PhoneNumber, UserId};

/// Member account as projected from the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub full_name: FullName,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub professional_status: ProfessionalStatus,
    /// Bucketed label such as `"3-5"` or `"10+"`.
    pub years_of_experience: Option<String>,
    pub industry: Option<String>,
    pub membership_type: MembershipType,
    pub status: UserStatus,
    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub certifications: Vec<String>,
    pub cpe_score: u32,
    pub events_attended: u32,
    /// Profile answers keyed by [`ProfessionalStatus::custom_field_keys`].
    pub custom_fields: BTreeMap<String, String>,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal, $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, ::serde::Serialize, ::serde::Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value used on the wire and in query strings.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human readable label for templates.
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::types::TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::domain::types::TypeConstraintError::InvalidValue(format!(
                        "unknown {}: {other}",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

pub(crate) use string_enum;

string_enum!(
    /// Career stage selected by the member at sign-up.
    ProfessionalStatus {
        WorkingProfessional => "working-professional", "Working Professional",
        Student => "student", "Student",
        RecentGraduate => "recent-graduate", "Recent Graduate",
        CareerChanger => "career-changer", "Career Changer",
        Consultant => "consultant", "Consultant",
        Entrepreneur => "entrepreneur", "Entrepreneur",
    }
);

string_enum!(
    /// Membership tier governing pricing and badges.
    MembershipType {
        Basic => "basic", "Basic",
        Premium => "premium", "Premium",
        Student => "student", "Student",
        Trial => "trial", "Trial",
    }
);

string_enum!(
    /// Account state managed from the admin back-office.
    UserStatus {
        Active => "active", "Active",
        Inactive => "inactive", "Inactive",
        Pending => "pending", "Pending",
        Suspended => "suspended", "Suspended",
    }
);

impl ProfessionalStatus {
    /// Profile keys collected only for members with this status.
    pub const fn custom_field_keys(self) -> &'static [&'static str] {
        match self {
            ProfessionalStatus::WorkingProfessional => &["company", "jobTitle"],
            ProfessionalStatus::Student => &["university", "major", "graduationYear"],
            ProfessionalStatus::RecentGraduate => &["university", "graduationYear"],
            ProfessionalStatus::CareerChanger => &["previousField", "targetRole"],
            ProfessionalStatus::Consultant => &["consultancyName", "specialization"],
            ProfessionalStatus::Entrepreneur => &["companyName", "startupStage"],
        }
    }
}

impl Default for MembershipType {
    fn default() -> Self {
        MembershipType::Basic
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Pending
    }
}

/// Payload for creating an account from the admin back-office.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: FullName,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub professional_status: ProfessionalStatus,
    pub years_of_experience: Option<String>,
    pub industry: Option<String>,
    pub membership_type: MembershipType,
    pub status: UserStatus,
    pub password: String,
}

/// Full replacement of the editable fields of an account.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub full_name: FullName,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub professional_status: ProfessionalStatus,
    pub years_of_experience: Option<String>,
    pub industry: Option<String>,
    pub membership_type: MembershipType,
    pub status: UserStatus,
    pub certifications: Vec<String>,
    pub custom_fields: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_wire_names() {
        for status in ProfessionalStatus::ALL {
            assert_eq!(status.as_str().parse::<ProfessionalStatus>().unwrap(), *status);
        }
        assert_eq!("premium".parse::<MembershipType>().unwrap(), MembershipType::Premium);
        assert!("gold".parse::<MembershipType>().is_err());
    }

    #[test]
    fn serde_uses_kebab_wire_names() {
        let json = serde_json::to_string(&ProfessionalStatus::CareerChanger).unwrap();
        assert_eq!(json, "\"career-changer\"");
        let status: UserStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(status, UserStatus::Suspended);
    }

    #[test]
    fn student_profile_keys() {
        assert_eq!(
            ProfessionalStatus::Student.custom_field_keys(),
            &["university", "major", "graduationYear"]
        );
    }
}
