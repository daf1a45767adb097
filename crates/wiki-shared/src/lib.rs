pub mod api;
pub mod diff;
pub mod markdown;
pub mod models;
pub mod permissions;
pub mod search;
pub mod validation;
pub mod wire;

pub use models::*;
