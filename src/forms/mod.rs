//! Form definitions backing the public and admin routes.

use std::collections::BTreeMap;

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod bulk;
pub mod events;
pub mod export;
pub mod filters;
pub mod registration;
pub mod users;

/// Inline error message per form field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    TypeConstraint(#[from] TypeConstraintError),

    /// Field-level problems to be shown next to the inputs.
    #[error("please correct the highlighted fields")]
    Fields(FieldErrors),
}

impl FormError {
    /// Per-field messages, when the error carries any.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            FormError::Validation(errors) => collect_field_errors(errors),
            FormError::Fields(errors) => errors.clone(),
            _ => FieldErrors::new(),
        }
    }
}

/// Keeps the first message of every failing field.
pub fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            let first = errors.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid {field}"));
            Some((field.to_string(), message))
        })
        .collect()
}

/// Checkbox values arrive as `on`/`true`/`1` when ticked and are absent otherwise.
pub(crate) fn is_checked(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Splits a comma separated input into trimmed, non-empty items.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
