//! Domain records and view state exposed to the service layer.

pub mod event;
pub mod filter;
pub mod modal;
pub mod registration;
pub mod selection;
pub mod sort;
pub mod types;
pub mod user;
