use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("You are not allowed to {0}")]
    PermissionDenied(&'static str),
    #[error("No document is selected")]
    NoSelection,
    #[error("Still loading document {0}")]
    Loading(String),
    #[error("Not editing a document")]
    NotEditing,
    #[error("Save or cancel the current edit first")]
    Editing,
    #[error("Cancelled")]
    Cancelled,
    #[error("Document {0} is not in the list")]
    UnknownDocument(String),
    #[error("Revision {0} does not belong to this document")]
    UnknownRevision(String),
    #[error("Revision {0} is already the current version")]
    AlreadyCurrent(String),
    #[error("Failed to {action}: {source}")]
    Request {
        action: &'static str,
        #[source]
        source: ApiError,
    },
}
