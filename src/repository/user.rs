use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::domain::types::UserId;
use crate::domain::user::{NewUser, UpdateUser, User, UserStatus};
use crate::models::user::{ApiUser, ApiUserList};
use crate::repository::errors::RepositoryResult;
use crate::repository::http::{convert_rows, optional};
use crate::repository::{ApiRepository, UserListQuery, UserReader, UserWriter};

/// Single-record answers come either bare or wrapped in `{ "user": … }`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: ApiUser },
    Bare(ApiUser),
}

impl UserEnvelope {
    fn into_user(self) -> RepositoryResult<User> {
        let api = match self {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        };
        Ok(User::try_from(api)?)
    }
}

#[async_trait]
impl UserReader for ApiRepository {
    async fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let request = self.request(Method::GET, &["users"])?.query(&query.to_params());
        let list: ApiUserList = self.send_json(request).await?;

        let users: Vec<User> = convert_rows(list.users, "user");
        let total = list.total.unwrap_or(users.len());
        Ok((total, users))
    }

    async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        let request = self.request(Method::GET, &["users", id.as_str()])?;
        let envelope = optional(self.send_json::<UserEnvelope>(request).await)?;
        envelope.map(UserEnvelope::into_user).transpose()
    }
}

#[async_trait]
impl UserWriter for ApiRepository {
    async fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let request = self.request(Method::POST, &["users"])?.json(new_user);
        self.send_json::<UserEnvelope>(request).await?.into_user()
    }

    async fn update_user(&self, id: &UserId, updates: &UpdateUser) -> RepositoryResult<User> {
        let request = self
            .request(Method::PUT, &["users", id.as_str()])?
            .json(updates);
        self.send_json::<UserEnvelope>(request).await?.into_user()
    }

    async fn set_user_status(&self, id: &UserId, status: UserStatus) -> RepositoryResult<()> {
        let request = self
            .request(Method::PATCH, &["users", id.as_str(), "status"])?
            .json(&json!({ "status": status.as_str() }));
        self.send(request).await?;
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> RepositoryResult<()> {
        let request = self.request(Method::DELETE, &["users", id.as_str()])?;
        self.send(request).await?;
        Ok(())
    }
}
