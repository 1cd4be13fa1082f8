use serde::Serialize;

use crate::domain::modal::UserModal;
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::forms::FieldErrors;
use crate::forms::bulk::BulkAction;
use crate::forms::filters::ListState;
use crate::forms::users::UserForm;
use crate::pagination::Paginated;

/// Data required to render the admin user list.
pub struct UsersPageData {
    pub users: Paginated<User>,
    pub state: ListState,
    pub modal: UserModal,
}

/// Modal reopened with the submitted values after a failed save.
#[derive(Debug, Serialize)]
pub struct InvalidUserForm {
    pub form: UserForm,
    pub errors: FieldErrors,
    /// Set when the edit modal was submitted.
    pub user_id: Option<UserId>,
}

/// Bulk action waiting for an explicit confirmation.
#[derive(Debug, Serialize)]
pub struct BulkConfirmation {
    pub action: BulkAction,
    pub ids: Vec<UserId>,
    pub message: String,
    /// Query string of the list to return to.
    pub state: String,
}
