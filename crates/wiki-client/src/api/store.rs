use async_trait::async_trait;
use wiki_shared::{
    api::{CreateDocumentRequest, LoginRequest, RegisterRequest, UpdateDocumentRequest},
    Document, User,
};

use super::{ApiError, Session};

/// Account operations. `register` and `login` are the only calls made
/// without a bearer token.
///
/// Abstracted as a trait so the dashboard can be exercised without a server.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<Session, ApiError>;

    async fn login(&self, req: LoginRequest) -> Result<Session, ApiError>;

    /// Resolve the user a token belongs to
    async fn me(&self, token: &str) -> Result<User, ApiError>;
}

/// Document persistence. Every document returned is already normalized.
///
/// The store re-checks every permission the client checks; a rejected call
/// surfaces as an ordinary [`ApiError`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_all(&self, session: &Session) -> Result<Vec<Document>, ApiError>;

    async fn get_one(&self, session: &Session, id: &str) -> Result<Document, ApiError>;

    /// Create a document along with its first revision
    async fn create(
        &self,
        session: &Session,
        req: CreateDocumentRequest,
    ) -> Result<Document, ApiError>;

    /// Save new title and content, appending one revision
    async fn update(
        &self,
        session: &Session,
        id: &str,
        req: UpdateDocumentRequest,
    ) -> Result<Document, ApiError>;

    /// Remove a document together with all of its revisions
    async fn delete(&self, session: &Session, id: &str) -> Result<(), ApiError>;

    /// Append a revision whose content is that of `revision_id`
    async fn restore(
        &self,
        session: &Session,
        doc_id: &str,
        revision_id: &str,
    ) -> Result<Document, ApiError>;
}
