//! Bulk action bar submission and its confirmation wording.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::selection::Selection;
use crate::domain::types::{TypeConstraintError, UserId};
use crate::domain::user::UserStatus;
use crate::forms::is_checked;

/// Operation applied to every selected user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Suspend,
    Delete,
}

impl BulkAction {
    pub const ALL: &'static [BulkAction] = &[
        BulkAction::Activate,
        BulkAction::Deactivate,
        BulkAction::Suspend,
        BulkAction::Delete,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::Suspend => "suspend",
            BulkAction::Delete => "delete",
        }
    }

    /// Status written by the action; `None` for deletion.
    pub const fn target_status(self) -> Option<UserStatus> {
        match self {
            BulkAction::Activate => Some(UserStatus::Active),
            BulkAction::Deactivate => Some(UserStatus::Inactive),
            BulkAction::Suspend => Some(UserStatus::Suspended),
            BulkAction::Delete => None,
        }
    }

    pub fn confirmation_message(self, count: usize) -> String {
        let noun = if count == 1 { "user" } else { "users" };
        match self {
            BulkAction::Activate => format!("Activate {count} {noun}? They will regain access."),
            BulkAction::Deactivate => {
                format!("Deactivate {count} {noun}? They will lose access until reactivated.")
            }
            BulkAction::Suspend => format!("Suspend {count} {noun}? Suspended accounts cannot sign in."),
            BulkAction::Delete => {
                format!("Permanently delete {count} {noun}? This cannot be undone.")
            }
        }
    }

    /// Past participle used in result messages.
    pub const fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Activate => "activated",
            BulkAction::Deactivate => "deactivated",
            BulkAction::Suspend => "suspended",
            BulkAction::Delete => "deleted",
        }
    }
}

impl Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "activate" => Ok(BulkAction::Activate),
            "deactivate" => Ok(BulkAction::Deactivate),
            "suspend" => Ok(BulkAction::Suspend),
            "delete" => Ok(BulkAction::Delete),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown bulk action: {other}"
            ))),
        }
    }
}

/// Bulk action bar submission.
///
/// `ids` and `page_ids` are repeated keys, decoded with `serde_html_form`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkActionForm {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub ids: Vec<String>,
    /// Header checkbox selecting every row of the current page.
    #[serde(default)]
    pub select_all: Option<String>,
    #[serde(default)]
    pub page_ids: Vec<String>,
    /// Set only by the confirmation page.
    #[serde(default)]
    pub confirmed: Option<String>,
}

impl BulkActionForm {
    pub fn action(&self) -> Result<BulkAction, TypeConstraintError> {
        self.action.parse()
    }

    pub fn selection(&self) -> Selection {
        let parse = |ids: &[String]| {
            ids.iter()
                .filter_map(|id| UserId::new(id.as_str()).ok())
                .collect::<Vec<_>>()
        };
        let mut selection = Selection::from_ids(parse(&self.ids));
        if is_checked(&self.select_all) {
            selection.select_all(parse(&self.page_ids));
        }
        selection
    }

    pub fn is_confirmed(&self) -> bool {
        is_checked(&self.confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_repeated_ids() {
        let form: BulkActionForm =
            serde_html_form::from_str("action=suspend&ids=u1&ids=u2&ids=&confirmed=true").unwrap();

        assert_eq!(form.action().unwrap(), BulkAction::Suspend);
        assert_eq!(form.selection().len(), 2);
        assert!(form.is_confirmed());
    }

    #[test]
    fn select_all_takes_exactly_the_page() {
        let form: BulkActionForm = serde_html_form::from_str(
            "action=delete&ids=other&select_all=on&page_ids=u1&page_ids=u2",
        )
        .unwrap();

        let selection = form.selection();

        assert_eq!(selection.len(), 2);
        assert!(!selection.contains(&UserId::new("other").unwrap()));
        assert!(!form.is_confirmed());
    }

    #[test]
    fn confirmation_messages_are_action_specific() {
        assert!(BulkAction::Delete.confirmation_message(3).contains("cannot be undone"));
        assert!(BulkAction::Activate.confirmation_message(1).contains("1 user?"));
        assert_eq!(BulkAction::Suspend.target_status(), Some(UserStatus::Suspended));
        assert!("archive".parse::<BulkAction>().is_err());
    }
}
