mod client;
mod session;
mod store;

pub use client::{ApiClient, ApiError};
pub use session::{resume, token_expired, Session, TokenSlot};
pub use store::{DocumentStore, IdentityService};
