//! Page data handed from services to the templates.

pub mod events;
pub mod main;
pub mod users;
