//! Admin user management: list page, modal saves, bulk actions and export.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use crate::domain::modal::{ModalRequest, UserModal};
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::dto::users::{BulkConfirmation, InvalidUserForm, UsersPageData};
use crate::export::{ExportDialog, ExportError, ExportFile, export_users};
use crate::forms::FormError;
use crate::forms::bulk::{BulkAction, BulkActionForm};
use crate::forms::export::ExportForm;
use crate::forms::filters::{ListState, UserListParams};
use crate::forms::users::UserForm;
use crate::pagination::{PageState, Paginated};
use crate::repository::errors::RepositoryResult;
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Page size used when walking the whole list for an export.
const EXPORT_PAGE_SIZE: usize = 100;

/// Loads one page of users for the committed list state.
///
/// Exactly one list request is made. The modal user is taken from the loaded
/// page when present and fetched on its own otherwise.
pub async fn load_users_page<R>(repo: &R, params: &UserListParams) -> ServiceResult<UsersPageData>
where
    R: UserReader + ?Sized,
{
    let state = params.state();
    let query = UserListQuery::new(state.filters.clone())
        .sort(state.sort)
        .paginate(state.page, state.limit);

    let (total, users) = repo.list_users(query).await.map_err(|err| {
        log::error!("Failed to list users: {err}");
        err
    })?;

    let modal = match params.modal_request() {
        None => UserModal::Closed,
        Some((ModalRequest::Create, _)) => UserModal::Create,
        Some((_, None)) => UserModal::Closed,
        Some((request, Some(user_id))) => {
            let user = match users.iter().find(|user| user.id == user_id) {
                Some(user) => Some(user.clone()),
                None => repo.get_user(&user_id).await.map_err(|err| {
                    log::error!("Failed to load user {user_id}: {err}");
                    err
                })?,
            };
            match (request, user) {
                (ModalRequest::View, Some(user)) => UserModal::View(Box::new(user)),
                (ModalRequest::Edit, Some(user)) => UserModal::Edit(Box::new(user)),
                _ => UserModal::Closed,
            }
        }
    };

    let page_state = PageState::new(state.page, state.limit, total);
    Ok(UsersPageData {
        users: Paginated::new(users, page_state),
        state,
        modal,
    })
}

/// Mutation requested from the admin user page.
pub enum UserAction {
    Create(UserForm),
    Update(UserId, UserForm),
    Delete(UserId),
    Bulk(BulkActionForm),
}

/// Result of a dispatched action. Callers redirect afterwards unless a
/// page has to be rendered.
#[derive(Debug)]
pub enum ActionOutcome {
    Success(String),
    /// Some calls failed; the message lists them.
    Partial(String),
    Failed(String),
    Invalid(InvalidUserForm),
    NeedsConfirmation(BulkConfirmation),
}

/// Per-user result of a confirmed bulk action.
#[derive(Debug)]
pub struct BulkReport {
    pub action: BulkAction,
    pub succeeded: Vec<UserId>,
    pub failed: Vec<(UserId, String)>,
}

impl BulkReport {
    pub fn outcome(&self) -> ActionOutcome {
        let done = self.succeeded.len();
        let noun = |count: usize| if count == 1 { "user" } else { "users" };
        if self.failed.is_empty() {
            return ActionOutcome::Success(format!(
                "{done} {} {}.",
                noun(done),
                self.action.past_tense()
            ));
        }
        let failed_ids = self
            .failed
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if done == 0 {
            ActionOutcome::Failed(format!(
                "Could not {} any of the selected users ({failed_ids}).",
                self.action
            ))
        } else {
            ActionOutcome::Partial(format!(
                "{done} {} {}, {} failed: {failed_ids}.",
                noun(done),
                self.action.past_tense(),
                self.failed.len()
            ))
        }
    }
}

/// Runs `action` and reports its outcome.
pub async fn dispatch<R>(repo: &R, action: UserAction, concurrency: usize) -> ServiceResult<ActionOutcome>
where
    R: UserWriter + ?Sized,
{
    match action {
        UserAction::Create(form) => {
            let snapshot = form.clone();
            let new_user = match form.into_new_user() {
                Ok(new_user) => new_user,
                Err(err) => return invalid(snapshot, None, err),
            };
            let user = repo.create_user(&new_user).await.map_err(|err| {
                log::error!("Failed to create user: {err}");
                err
            })?;
            Ok(ActionOutcome::Success(format!("{} was added.", user.full_name)))
        }
        UserAction::Update(user_id, form) => {
            let snapshot = form.clone();
            let updates = match form.into_update_user() {
                Ok(updates) => updates,
                Err(err) => return invalid(snapshot, Some(user_id), err),
            };
            let user = repo.update_user(&user_id, &updates).await.map_err(|err| {
                log::error!("Failed to update user {user_id}: {err}");
                err
            })?;
            Ok(ActionOutcome::Success(format!("{} was updated.", user.full_name)))
        }
        UserAction::Delete(user_id) => {
            repo.delete_user(&user_id).await.map_err(|err| {
                log::error!("Failed to delete user {user_id}: {err}");
                err
            })?;
            Ok(ActionOutcome::Success("User deleted.".to_string()))
        }
        UserAction::Bulk(form) => bulk_action(repo, &form, concurrency).await,
    }
}

fn invalid(form: UserForm, user_id: Option<UserId>, err: FormError) -> ServiceResult<ActionOutcome> {
    let errors = err.field_errors();
    if errors.is_empty() {
        return Err(ServiceError::from(err));
    }
    Ok(ActionOutcome::Invalid(InvalidUserForm {
        form,
        errors,
        user_id,
    }))
}

/// Two-step bulk action. Without confirmation nothing is sent to the backend.
///
/// Confirmed actions run at most `concurrency` requests at a time and wait
/// for every request before reporting.
pub async fn bulk_action<R>(
    repo: &R,
    form: &BulkActionForm,
    concurrency: usize,
) -> ServiceResult<ActionOutcome>
where
    R: UserWriter + ?Sized,
{
    let action = form
        .action()
        .map_err(|_| ServiceError::Form("Choose a bulk action.".to_string()))?;
    let selection = form.selection();
    if selection.is_empty() {
        return Err(ServiceError::Form("Select at least one user.".to_string()));
    }

    if !form.is_confirmed() {
        return Ok(ActionOutcome::NeedsConfirmation(BulkConfirmation {
            action,
            message: action.confirmation_message(selection.len()),
            ids: selection.ids(),
            state: form.state.clone(),
        }));
    }

    let results: Vec<(UserId, RepositoryResult<()>)> = stream::iter(selection.ids())
        .map(|user_id| async move {
            let result = match action.target_status() {
                Some(status) => repo.set_user_status(&user_id, status).await,
                None => repo.delete_user(&user_id).await,
            };
            (user_id, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = BulkReport {
        action,
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (user_id, result) in results {
        match result {
            Ok(()) => report.succeeded.push(user_id),
            Err(err) => {
                log::warn!("Bulk {action} failed for user {user_id}: {err}");
                report.failed.push((user_id, err.to_string()));
            }
        }
    }

    Ok(report.outcome())
}

/// Fetches every user matching the committed filters, page by page.
async fn fetch_all_users<R>(repo: &R, state: &ListState) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    let mut users = Vec::new();
    let mut page = 1;
    loop {
        let query = UserListQuery::new(state.filters.clone())
            .sort(state.sort)
            .paginate(page, EXPORT_PAGE_SIZE);
        let (total, batch) = repo.list_users(query).await.map_err(|err| {
            log::error!("Failed to fetch users for export: {err}");
            err
        })?;
        let fetched = batch.len();
        users.extend(batch);
        if fetched == 0 || users.len() >= total {
            return Ok(users);
        }
        page += 1;
    }
}

/// Builds the export download for the list state carried by the form.
///
/// On failure the returned dialog holds the message to show.
pub async fn export_users_file<R>(
    repo: &R,
    form: &ExportForm,
    today: NaiveDate,
) -> Result<ExportFile, (ExportDialog, ServiceError)>
where
    R: UserReader + ?Sized,
{
    let mut dialog = ExportDialog::open();
    if let Err(err) = dialog.begin() {
        return Err((dialog, err.into()));
    }

    let request = match form.request() {
        Ok(request) if request.fields.columns().is_empty() => {
            let err = ExportError::NoFieldsSelected;
            dialog = ExportDialog::Open {
                error: Some(err.to_string()),
            };
            return Err((dialog, err.into()));
        }
        Ok(request) => request,
        Err(err) => {
            dialog = ExportDialog::Open {
                error: Some(err.to_string()),
            };
            return Err((dialog, err.into()));
        }
    };

    let state = UserListParams::parse(&form.state).state();
    let users = match fetch_all_users(repo, &state).await {
        Ok(users) => users,
        Err(err) => {
            dialog = ExportDialog::Open {
                error: Some(err.user_message()),
            };
            return Err((dialog, err));
        }
    };

    let result = export_users(&users, &state.filters, &request, today);
    dialog.finish(&result);
    result.map_err(|err| (dialog, err.into()))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::filter::tests::sample_user;
    use crate::domain::user::{MembershipType, UserStatus};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn bulk_form(query: &str) -> BulkActionForm {
        serde_html_form::from_str(query).unwrap()
    }

    #[actix_web::test]
    async fn list_page_makes_a_single_list_call() {
        let mut repo = MockRepository::new();
        repo.expect_list_users()
            .withf(|query| {
                query.pagination.map(|p| (p.page, p.per_page)) == Some((2, 25))
                    && query.filters.status == Some(UserStatus::Active)
            })
            .times(1)
            .returning(|_| {
                Ok((
                    30,
                    vec![sample_user("u1", UserStatus::Active, MembershipType::Basic)],
                ))
            });
        repo.expect_get_user().times(0);

        let params = UserListParams::parse("status=active&page=2&limit=25&modal=view&user_id=u1");
        let data = load_users_page(&repo, &params).await.unwrap();

        assert_eq!(data.users.total_pages, 2);
        assert_eq!(data.modal.kind(), "view");
    }

    #[actix_web::test]
    async fn edit_modal_fetches_user_missing_from_page() {
        let mut repo = MockRepository::new();
        repo.expect_list_users().times(1).returning(|_| Ok((0, Vec::new())));
        repo.expect_get_user()
            .withf(|id| id.as_str() == "u9")
            .times(1)
            .returning(|_| Ok(Some(sample_user("u9", UserStatus::Pending, MembershipType::Trial))));

        let params = UserListParams::parse("modal=edit&user_id=u9");
        let data = load_users_page(&repo, &params).await.unwrap();

        assert_eq!(data.modal.user().map(|u| u.id.as_str()), Some("u9"));
    }

    #[actix_web::test]
    async fn bulk_action_without_confirmation_makes_no_calls() {
        let mut repo = MockRepository::new();
        repo.expect_set_user_status().times(0);
        repo.expect_delete_user().times(0);

        let form = bulk_form("action=delete&ids=u1&ids=u2");
        let outcome = bulk_action(&repo, &form, 4).await.unwrap();

        match outcome {
            ActionOutcome::NeedsConfirmation(confirmation) => {
                assert_eq!(confirmation.ids.len(), 2);
                assert!(confirmation.message.contains("cannot be undone"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn confirmed_activation_updates_every_selected_user() {
        let mut repo = MockRepository::new();
        repo.expect_set_user_status()
            .withf(|_, status| *status == UserStatus::Active)
            .times(3)
            .returning(|_, _| Ok(()));

        let form = bulk_form("action=activate&ids=u1&ids=u2&ids=u3&confirmed=true");
        let outcome = bulk_action(&repo, &form, 2).await.unwrap();

        match outcome {
            ActionOutcome::Success(message) => assert_eq!(message, "3 users activated."),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn partial_failures_are_reported() {
        let mut repo = MockRepository::new();
        repo.expect_delete_user().times(3).returning(|id| {
            if id.as_str() == "u2" {
                Err(RepositoryError::Backend("boom".to_string()))
            } else {
                Ok(())
            }
        });

        let form = bulk_form("action=delete&ids=u1&ids=u2&ids=u3&confirmed=true");
        let outcome = bulk_action(&repo, &form, 8).await.unwrap();

        match outcome {
            ActionOutcome::Partial(message) => {
                assert!(message.starts_with("2 users deleted, 1 failed"));
                assert!(message.contains("u2"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn empty_selection_is_rejected() {
        let repo = MockRepository::new();
        let form = bulk_form("action=suspend&confirmed=true");
        assert!(matches!(
            bulk_action(&repo, &form, 1).await,
            Err(ServiceError::Form(_))
        ));
    }

    #[actix_web::test]
    async fn invalid_create_form_is_returned_for_display() {
        let mut repo = MockRepository::new();
        repo.expect_create_user().times(0);

        let form = UserForm {
            email: "nope".to_string(),
            ..UserForm::default()
        };
        let outcome = dispatch(&repo, UserAction::Create(form), 1).await.unwrap();

        match outcome {
            ActionOutcome::Invalid(invalid) => assert!(invalid.errors.contains_key("email")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn export_walks_every_page() {
        let mut repo = MockRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_list_users()
            .withf(|query| query.pagination.map(|p| p.page) == Some(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                let users = (0..EXPORT_PAGE_SIZE)
                    .map(|i| sample_user(&format!("a{i}"), UserStatus::Active, MembershipType::Basic))
                    .collect();
                Ok((EXPORT_PAGE_SIZE + 1, users))
            });
        repo.expect_list_users()
            .withf(|query| query.pagination.map(|p| p.page) == Some(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok((
                    EXPORT_PAGE_SIZE + 1,
                    vec![sample_user("last", UserStatus::Active, MembershipType::Basic)],
                ))
            });

        let form: ExportForm =
            serde_html_form::from_str("state=status%3Dactive&format=csv&basic_info=on").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let file = export_users_file(&repo, &form, today).await.unwrap();

        assert_eq!(file.rows, EXPORT_PAGE_SIZE + 1);
        assert_eq!(file.filename, "users-export-2024-06-01.csv");
    }

    #[actix_web::test]
    async fn export_without_fields_reopens_dialog_with_error() {
        let mut repo = MockRepository::new();
        repo.expect_list_users().times(0);

        let form: ExportForm = serde_html_form::from_str("format=json").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (dialog, err) = export_users_file(&repo, &form, today).await.unwrap_err();

        assert!(matches!(err, ServiceError::Export(_)));
        assert!(dialog.error().is_some());
    }
}
