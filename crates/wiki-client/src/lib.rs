pub mod api;
pub mod config;
pub mod dashboard;
pub mod editor;

pub use api::{ApiClient, ApiError, DocumentStore, IdentityService, Session, TokenSlot};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardError, Mode};
