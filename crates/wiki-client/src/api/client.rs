use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use wiki_shared::{
    api::{
        AuthResponse, CreateDocumentRequest, DocumentListResponse, DocumentResponse, Envelope,
        LoginRequest, MeResponse, RegisterRequest, UpdateDocumentRequest,
    },
    wire::{self, WireError},
    Document, User,
};

use super::{DocumentStore, IdentityService, Session};
use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{message} ({status})")]
    Server { status: StatusCode, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected document payload: {0}")]
    Wire(#[from] WireError),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            _ => Self::Server { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Decode a response body, turning non-2xx statuses and `success: false`
/// envelopes into errors carrying the server's message.
pub(crate) fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
    let envelope: Envelope = serde_json::from_value(value.clone()).unwrap_or_default();

    if !status.is_success() || !envelope.success {
        return Err(ApiError::from_status(status, envelope.failure_message()));
    }

    Ok(serde_json::from_value(value)?)
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_prefix: String,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn document_path(id: &str) -> String {
        format!("/documents/{}", urlencoding::encode(id))
    }

    /// Request carrying the session's bearer token
    fn authed(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(session.token())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;

        tracing::debug!(%status, %url, "api response");
        decode_body(status, &body)
    }

    fn session_from(auth: AuthResponse) -> Session {
        Session::new(auth.token, auth.user)
    }
}

// ============ Auth ============

#[async_trait]
impl IdentityService for ApiClient {
    async fn register(&self, req: RegisterRequest) -> Result<Session, ApiError> {
        let request = self.client.post(self.url("/auth/register")).json(&req);
        let auth: AuthResponse = self.send(request).await?;

        tracing::info!(email = %auth.user.email, role = %auth.user.role, "registered");
        Ok(Self::session_from(auth))
    }

    async fn login(&self, req: LoginRequest) -> Result<Session, ApiError> {
        let request = self.client.post(self.url("/auth/login")).json(&req);
        let auth: AuthResponse = self.send(request).await?;

        tracing::info!(email = %auth.user.email, "logged in");
        Ok(Self::session_from(auth))
    }

    async fn me(&self, token: &str) -> Result<User, ApiError> {
        let request = self.client.get(self.url("/auth/me")).bearer_auth(token);
        let me: MeResponse = self.send(request).await?;
        Ok(me.user)
    }
}

// ============ Documents ============

#[async_trait]
impl DocumentStore for ApiClient {
    async fn list_all(&self, session: &Session) -> Result<Vec<Document>, ApiError> {
        let listing: DocumentListResponse = self
            .send(self.authed(Method::GET, "/documents", session))
            .await?;

        if let Some(count) = listing.count {
            if count != listing.documents.len() {
                tracing::debug!(
                    count,
                    received = listing.documents.len(),
                    "listing count mismatch"
                );
            }
        }

        Ok(wire::normalize_all(listing.documents)?)
    }

    async fn get_one(&self, session: &Session, id: &str) -> Result<Document, ApiError> {
        let res: DocumentResponse = self
            .send(self.authed(Method::GET, &Self::document_path(id), session))
            .await?;
        Ok(res.document.normalize()?)
    }

    async fn create(
        &self,
        session: &Session,
        req: CreateDocumentRequest,
    ) -> Result<Document, ApiError> {
        let res: DocumentResponse = self
            .send(self.authed(Method::POST, "/documents", session).json(&req))
            .await?;
        Ok(res.document.normalize()?)
    }

    async fn update(
        &self,
        session: &Session,
        id: &str,
        req: UpdateDocumentRequest,
    ) -> Result<Document, ApiError> {
        let res: DocumentResponse = self
            .send(
                self.authed(Method::PUT, &Self::document_path(id), session)
                    .json(&req),
            )
            .await?;
        Ok(res.document.normalize()?)
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        let _: Envelope = self
            .send(self.authed(Method::DELETE, &Self::document_path(id), session))
            .await?;
        Ok(())
    }

    async fn restore(
        &self,
        session: &Session,
        doc_id: &str,
        revision_id: &str,
    ) -> Result<Document, ApiError> {
        let path = format!(
            "{}/restore/{}",
            Self::document_path(doc_id),
            urlencoding::encode(revision_id)
        );
        let res: DocumentResponse = self
            .send(self.authed(Method::POST, &path, session))
            .await?;
        Ok(res.document.normalize()?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn error_status_carries_server_message() {
        let err = decode_body::<Envelope>(
            StatusCode::FORBIDDEN,
            &body(json!({"success": false, "message": "Not authorized to edit"})),
        )
        .unwrap_err();

        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.to_string(), "Not authorized to edit");
    }

    #[test]
    fn missing_message_falls_back_to_generic_text() {
        let err = decode_body::<Envelope>(StatusCode::INTERNAL_SERVER_ERROR, b"<html>")
            .unwrap_err();
        assert_eq!(err.to_string(), "API request failed (500 Internal Server Error)");
    }

    #[test]
    fn unsuccessful_envelope_is_an_error_even_with_ok_status() {
        let err = decode_body::<Envelope>(StatusCode::OK, &body(json!({"success": false})))
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));
    }

    #[test]
    fn unauthorized_is_recognized() {
        let err = decode_body::<MeResponse>(
            StatusCode::UNAUTHORIZED,
            &body(json!({"success": false, "message": "Invalid or expired token"})),
        )
        .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn document_payload_decodes() {
        let res: DocumentResponse = decode_body(
            StatusCode::CREATED,
            &body(json!({
                "success": true,
                "document": {
                    "_id": "5",
                    "title": "New Document",
                    "content": "# New Document",
                    "owner_email": "a@x.com",
                    "revisions": [{"_id": "1", "changes": "Document created", "authorName": "A"}]
                }
            })),
        )
        .unwrap();

        let doc = res.document.normalize().unwrap();
        assert_eq!(doc.owner_email, "a@x.com");
        assert_eq!(doc.revisions.len(), 1);
    }

    #[test]
    fn urls_join_prefix_and_path() {
        let config = Config {
            server_url: "http://localhost:5000/".to_string(),
            api_prefix: "/api".to_string(),
            request_timeout: None,
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.url("/documents"), "http://localhost:5000/api/documents");
        assert_eq!(ApiClient::document_path("a b"), "/documents/a%20b");
    }
}
