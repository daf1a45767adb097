mod document;
mod user;

pub use document::*;
pub use user::*;
