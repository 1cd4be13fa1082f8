//! Sortable columns of the admin user list and their toggle order.

use serde::{Deserialize, Serialize};

use crate::domain::user::string_enum;

string_enum!(
    /// Sortable columns of the admin user table.
    SortField {
        FullName => "fullName", "Name",
        Email => "email", "Email",
        MembershipType => "membershipType", "Membership",
        Status => "status", "Status",
        CreatedAt => "createdAt", "Joined",
        LastLogin => "lastLogin", "Last login",
    }
);

string_enum!(
    SortOrder {
        Asc => "asc", "Ascending",
        Desc => "desc", "Descending",
    }
);

impl SortOrder {
    pub const fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Column and direction requested from the backend.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    /// Sort state after clicking the header of `field`.
    ///
    /// A different column starts ascending; the current column flips.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.flipped(),
            }
        } else {
            Self {
                field,
                order: SortOrder::Asc,
            }
        }
    }

    pub fn to_query(self) -> String {
        format!("sort_by={}&sort_order={}", self.field, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TypeConstraintError;

    #[test]
    fn clicking_same_header_twice_restores_order() {
        let sort = Sort {
            field: SortField::Email,
            order: SortOrder::Desc,
        };
        assert_eq!(sort.toggle(SortField::Email).toggle(SortField::Email), sort);
        assert_eq!(sort.toggle(SortField::Email).order, SortOrder::Asc);
    }

    #[test]
    fn new_column_always_starts_ascending() {
        for start in [SortOrder::Asc, SortOrder::Desc] {
            let sort = Sort {
                field: SortField::CreatedAt,
                order: start,
            };
            assert_eq!(sort.toggle(SortField::FullName).order, SortOrder::Asc);
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            "password".parse::<SortField>(),
            Err(TypeConstraintError::InvalidValue(_))
        ));
    }
}
