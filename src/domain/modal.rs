//! Modal shown on top of the admin user list.

use crate::domain::user::User;

/// Which user modal is open, carrying the record it needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UserModal {
    #[default]
    Closed,
    Create,
    View(Box<User>),
    Edit(Box<User>),
}

/// Modal requested through the query string, before the user is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalRequest {
    Create,
    View,
    Edit,
}

impl ModalRequest {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(ModalRequest::Create),
            "view" => Some(ModalRequest::View),
            "edit" => Some(ModalRequest::Edit),
            _ => None,
        }
    }
}

impl UserModal {
    pub const fn kind(&self) -> &'static str {
        match self {
            UserModal::Closed => "closed",
            UserModal::Create => "create",
            UserModal::View(_) => "view",
            UserModal::Edit(_) => "edit",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            UserModal::View(user) | UserModal::Edit(user) => Some(user),
            UserModal::Closed | UserModal::Create => None,
        }
    }
}
