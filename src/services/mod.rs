//! Workflows behind the pages: each service talks to the backend through the
//! repository traits and hands plain page data to the routes.

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::export::ExportError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod events;
pub mod main;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,

    /// Message suitable for showing to the user as is.
    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

impl ServiceError {
    /// Text for a flash message, hiding transport details.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::NotFound => "The requested record no longer exists.".to_string(),
            ServiceError::Form(message) | ServiceError::TypeConstraint(message) => message.clone(),
            ServiceError::Repository(RepositoryError::Rejected(message)) => message.clone(),
            ServiceError::Repository(RepositoryError::NotFound) => {
                "The requested record no longer exists.".to_string()
            }
            ServiceError::Repository(RepositoryError::Timeout(_)) => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ServiceError::Repository(_) | ServiceError::Internal(_) => {
                "Something went wrong while contacting the server.".to_string()
            }
            ServiceError::Export(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_messages_are_shown_only_for_rejections() {
        let rejected = ServiceError::from(RepositoryError::Rejected("Email already in use".into()));
        assert_eq!(rejected.user_message(), "Email already in use");

        let backend = ServiceError::from(RepositoryError::Backend("stack trace".into()));
        assert!(!backend.user_message().contains("stack trace"));
    }
}
