//! Query-string state of the admin user list and the filter panel form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::filter::{FilterPanel, QuickFilter, UserFilters, empty_as_none};
use crate::domain::modal::ModalRequest;
use crate::domain::sort::{Sort, SortField, SortOrder};
use crate::domain::types::UserId;
use crate::domain::user::{MembershipType, ProfessionalStatus, UserStatus};
use crate::pagination::PageState;

/// Everything the admin user list reads from its URL.
///
/// Kept flat so it can be decoded straight from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub professional_status: Option<ProfessionalStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub modal: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
}

impl UserListParams {
    /// Lenient parse: a malformed query yields the default list.
    pub fn parse(query: &str) -> Self {
        serde_html_form::from_str(query).unwrap_or_else(|err| {
            log::warn!("Ignoring malformed user list query: {err}");
            Self::default()
        })
    }

    pub fn state(&self) -> ListState {
        let sort = match (self.sort_by, self.sort_order) {
            (Some(field), Some(order)) => Sort { field, order },
            (Some(field), None) => Sort {
                field,
                order: SortOrder::Asc,
            },
            _ => Sort::default(),
        };
        ListState {
            filters: UserFilters {
                search: self.search.clone(),
                membership_type: self.membership_type,
                professional_status: self.professional_status,
                industry: self.industry.clone(),
                status: self.status,
                created_from: self.created_from,
                created_to: self.created_to,
            },
            sort,
            page: self.page.unwrap_or(1).max(1),
            limit: PageState::normalize_limit(self.limit),
        }
    }

    pub fn modal_request(&self) -> Option<(ModalRequest, Option<UserId>)> {
        let request = ModalRequest::parse(self.modal.as_deref()?)?;
        let user_id = self.user_id.as_deref().and_then(|id| UserId::new(id).ok());
        Some((request, user_id))
    }
}

/// Committed filters, sort, page and page size of the admin user list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListState {
    pub filters: UserFilters,
    pub sort: Sort,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            filters: UserFilters::default(),
            sort: Sort::default(),
            page: 1,
            limit: PageState::normalize_limit(None),
        }
    }
}

impl ListState {
    /// Query string for `page`, keeping filters, sort and page size.
    pub fn query_for_page(&self, page: usize) -> String {
        let mut parts = Vec::new();
        let filters = self.filters.to_query();
        if !filters.is_empty() {
            parts.push(filters);
        }
        parts.push(self.sort.to_query());
        parts.push(format!("page={}&limit={}", page.max(1), self.limit));
        parts.join("&")
    }

    pub fn query(&self) -> String {
        self.query_for_page(self.page)
    }

    /// First page with the sort toggled on `field`.
    pub fn query_sorted_by(&self, field: SortField) -> String {
        Self {
            sort: self.sort.toggle(field),
            ..self.clone()
        }
        .query_for_page(1)
    }

    pub fn with_filters(&self, filters: UserFilters) -> Self {
        Self {
            filters,
            page: 1,
            ..self.clone()
        }
    }
}

/// Form carrying only the list query to return to.
#[derive(Debug, Default, Deserialize)]
pub struct StateForm {
    #[serde(default)]
    pub state: String,
}

/// Filter panel submission: the draft fields plus the button that was hit.
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    /// Query string of the list the panel was rendered on.
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub professional_status: Option<ProfessionalStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub quick: Option<QuickFilter>,
    /// `search`, `apply`, `clear` or `quick`.
    #[serde(default)]
    pub action: String,
}

impl FilterForm {
    fn draft(&self) -> UserFilters {
        UserFilters {
            search: self.search.clone(),
            membership_type: self.membership_type,
            professional_status: self.professional_status,
            industry: self.industry.clone(),
            status: self.status,
            created_from: self.created_from,
            created_to: self.created_to,
        }
    }

    /// Runs the submitted action against the panel and returns the new list
    /// state, always back on the first page.
    pub fn resolve(self, today: NaiveDate) -> ListState {
        let current = UserListParams::parse(&self.state).state();
        let mut panel = FilterPanel::new(current.filters.clone());

        match self.action.as_str() {
            "clear" => panel.clear(),
            "quick" => {
                panel.edit_draft(self.draft());
                if let Some(quick) = self.quick {
                    panel.apply_quick(quick, today);
                }
            }
            "apply" => {
                panel.edit_draft(self.draft());
                panel.set_search(self.search.clone());
                panel.apply();
            }
            _ => panel.set_search(self.search.clone()),
        }

        current.with_filters(panel.committed)
    }
}
