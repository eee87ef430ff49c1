pub mod api;
pub mod code;
pub mod handlers;
mod models;

pub use models::{Campaign, Contributor, ContributorWithUser};
