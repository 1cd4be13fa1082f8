//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::event::{Event, EventDraft};
use crate::domain::registration::{NewRegistration, Registration};
use crate::domain::types::{EventId, UserId, WebUrl};
use crate::domain::user::{NewUser, UpdateUser, User, UserStatus};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    EventListQuery, EventReader, EventWriter, ImageUpload, RegistrationWriter, UploadWriter,
    UserListQuery, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl UserReader for Repository {
        async fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
        async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>>;
    }

    #[async_trait]
    impl UserWriter for Repository {
        async fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        async fn update_user(&self, id: &UserId, updates: &UpdateUser) -> RepositoryResult<User>;
        async fn set_user_status(&self, id: &UserId, status: UserStatus) -> RepositoryResult<()>;
        async fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl EventReader for Repository {
        async fn list_events(&self, query: EventListQuery) -> RepositoryResult<(usize, Vec<Event>)>;
        async fn get_event(&self, id: &EventId) -> RepositoryResult<Option<Event>>;
    }

    #[async_trait]
    impl EventWriter for Repository {
        async fn create_event(&self, draft: &EventDraft) -> RepositoryResult<Event>;
        async fn update_event(&self, id: &EventId, draft: &EventDraft) -> RepositoryResult<Event>;
        async fn delete_event(&self, id: &EventId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl RegistrationWriter for Repository {
        async fn register(&self, registration: &NewRegistration) -> RepositoryResult<Registration>;
    }

    #[async_trait]
    impl UploadWriter for Repository {
        async fn upload_image(&self, upload: ImageUpload) -> RepositoryResult<WebUrl>;
    }
}
