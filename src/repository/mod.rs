//! Backend access traits and the query builders shared by their
//! implementations.

use async_trait::async_trait;

use crate::domain::event::{Event, EventDraft, EventMode};
use crate::domain::filter::UserFilters;
use crate::domain::registration::{NewRegistration, Registration};
use crate::domain::sort::Sort;
use crate::domain::types::{EventId, UserId, WebUrl};
use crate::domain::user::{NewUser, UpdateUser, User, UserStatus};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod event;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod upload;
pub mod user;

pub use http::ApiRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub filters: UserFilters,
    pub sort: Sort,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new(filters: UserFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    /// Query parameters in the backend's camelCase naming.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let filters = &self.filters;
        let mut params = Vec::new();
        if let Some(search) = &filters.search {
            params.push(("search", search.clone()));
        }
        if let Some(membership) = filters.membership_type {
            params.push(("membershipType", membership.as_str().to_string()));
        }
        if let Some(status) = filters.professional_status {
            params.push(("professionalStatus", status.as_str().to_string()));
        }
        if let Some(industry) = &filters.industry {
            params.push(("industry", industry.clone()));
        }
        if let Some(status) = filters.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = filters.created_from {
            params.push(("createdFrom", from.to_string()));
        }
        if let Some(to) = filters.created_to {
            params.push(("createdTo", to.to_string()));
        }
        params.push(("sortBy", self.sort.field.as_str().to_string()));
        params.push(("sortOrder", self.sort.order.as_str().to_string()));
        if let Some(pagination) = self.pagination {
            params.push(("page", pagination.page.to_string()));
            params.push(("limit", pagination.per_page.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub mode: Option<EventMode>,
    /// Only events that have not ended yet.
    pub upcoming: bool,
    pub pagination: Option<Pagination>,
}

impl EventListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upcoming(mut self) -> Self {
        self.upcoming = true;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn mode(mut self, mode: EventMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(mode) = self.mode {
            params.push(("mode", mode.as_str().to_string()));
        }
        if self.upcoming {
            params.push(("upcoming", "true".to_string()));
        }
        if let Some(pagination) = self.pagination {
            params.push(("page", pagination.page.to_string()));
            params.push(("limit", pagination.per_page.to_string()));
        }
        params
    }
}

/// Image bytes received from a multipart form, ready to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait UserReader: Send + Sync {
    async fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>>;
}

#[async_trait]
pub trait UserWriter: Send + Sync {
    async fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    async fn update_user(&self, id: &UserId, updates: &UpdateUser) -> RepositoryResult<User>;
    async fn set_user_status(&self, id: &UserId, status: UserStatus) -> RepositoryResult<()>;
    async fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait EventReader: Send + Sync {
    async fn list_events(&self, query: EventListQuery) -> RepositoryResult<(usize, Vec<Event>)>;
    async fn get_event(&self, id: &EventId) -> RepositoryResult<Option<Event>>;
}

#[async_trait]
pub trait EventWriter: Send + Sync {
    async fn create_event(&self, draft: &EventDraft) -> RepositoryResult<Event>;
    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> RepositoryResult<Event>;
    async fn delete_event(&self, id: &EventId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait RegistrationWriter: Send + Sync {
    async fn register(&self, registration: &NewRegistration) -> RepositoryResult<Registration>;
}

#[async_trait]
pub trait UploadWriter: Send + Sync {
    async fn upload_image(&self, upload: ImageUpload) -> RepositoryResult<WebUrl>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::sort::{SortField, SortOrder};
    use crate::domain::user::MembershipType;

    #[test]
    fn user_query_uses_backend_parameter_names() {
        let filters = UserFilters {
            search: Some("ann".to_string()),
            membership_type: Some(MembershipType::Premium),
            created_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..UserFilters::default()
        };
        let params = UserListQuery::new(filters)
            .sort(Sort {
                field: SortField::FullName,
                order: SortOrder::Asc,
            })
            .paginate(2, 25)
            .to_params();

        assert_eq!(
            params,
            vec![
                ("search", "ann".to_string()),
                ("membershipType", "premium".to_string()),
                ("createdFrom", "2024-01-01".to_string()),
                ("sortBy", "fullName".to_string()),
                ("sortOrder", "asc".to_string()),
                ("page", "2".to_string()),
                ("limit", "25".to_string()),
            ]
        );
    }

    #[test]
    fn unpaged_query_omits_page_parameters() {
        let params = UserListQuery::default().to_params();
        assert!(params.iter().all(|(key, _)| *key != "page" && *key != "limit"));
    }

    #[test]
    fn event_query_parameters() {
        let params = EventListQuery::new()
            .upcoming()
            .mode(EventMode::Virtual)
            .paginate(1, 12)
            .to_params();
        assert!(params.contains(&("mode", "virtual".to_string())));
        assert!(params.contains(&("upcoming", "true".to_string())));
        assert!(params.contains(&("limit", "12".to_string())));
    }
}
