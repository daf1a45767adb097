//! In-memory document store behaving like the wiki backend: first revision
//! on create, one appended revision per update and per restore, and the
//! same role/ownership rules enforced on its side.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use wiki_client::{
    api::{DocumentStore, IdentityService},
    ApiError, Dashboard, Session,
};
use wiki_shared::{
    api::{CreateDocumentRequest, LoginRequest, RegisterRequest, UpdateDocumentRequest},
    diff::{change_summary, RevisionDiff},
    permissions, Document, Revision, Role, User,
};

#[derive(Default)]
struct State {
    users: Vec<(User, String)>,
    tokens: HashMap<String, String>,
    documents: Vec<Document>,
    next_id: u64,
    ticks: i64,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(self.ticks)
    }

    fn user_for(&self, token: &str) -> Result<User, ApiError> {
        let email = self
            .tokens
            .get(token)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        self.users
            .iter()
            .find(|(u, _)| &u.email == email)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))
    }

    fn issue_token(&mut self, user: &User) -> String {
        let token = format!("token-{}-{}", user.email, self.tokens.len());
        self.tokens.insert(token.clone(), user.email.clone());
        token
    }

    fn document_mut(&mut self, id: &str) -> Result<&mut Document, ApiError> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))
    }

    fn revision(
        &mut self,
        user: &User,
        title: &str,
        content: &str,
        changes: String,
        diff: RevisionDiff,
    ) -> Revision {
        Revision {
            id: self.next_id(),
            changes,
            author_name: user.name.clone(),
            author_email: Some(user.email.clone()),
            created_at: Some(self.now()),
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            diff: Some(diff),
            restored_from: None,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_up(&self, name: &str, email: &str, role: Role) -> Session {
        self.register(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
        })
        .await
        .unwrap()
    }

    /// Stored state of a document, full history included
    pub fn stored(&self, id: &str) -> Document {
        let state = self.state.lock().unwrap();
        state.documents.iter().find(|d| d.id == id).cloned().unwrap()
    }
}

#[async_trait]
impl IdentityService for MemoryStore {
    async fn register(&self, req: RegisterRequest) -> Result<Session, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|(u, _)| u.email == req.email) {
            let message = "User with this email already exists".to_string();
            return Err(ApiError::Validation(message));
        }

        let user = User {
            id: state.next_id(),
            name: req.name,
            email: req.email,
            role: req.role,
            created_at: Some(state.now()),
        };
        state.users.push((user.clone(), req.password));
        let token = state.issue_token(&user);
        Ok(Session::new(token, user))
    }

    async fn login(&self, req: LoginRequest) -> Result<Session, ApiError> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter()
            .find(|(u, pw)| u.email == req.email && *pw == req.password)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;
        let token = state.issue_token(&user);
        Ok(Session::new(token, user))
    }

    async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.state.lock().unwrap().user_for(token)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_all(&self, session: &Session) -> Result<Vec<Document>, ApiError> {
        let state = self.state.lock().unwrap();
        state.user_for(session.token())?;

        let mut listing: Vec<Document> = state
            .documents
            .iter()
            .map(|d| Document {
                revision_count: Some(d.revisions.len()),
                revisions: Vec::new(),
                ..d.clone()
            })
            .collect();
        listing.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listing)
    }

    async fn get_one(&self, session: &Session, id: &str) -> Result<Document, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.user_for(session.token())?;
        state.document_mut(id).map(|d| d.clone())
    }

    async fn create(
        &self,
        session: &Session,
        req: CreateDocumentRequest,
    ) -> Result<Document, ApiError> {
        let mut state = self.state.lock().unwrap();
        let user = state.user_for(session.token())?;
        if !user.role.can_create() {
            let message = format!("Role '{}' is not authorized", user.role);
            return Err(ApiError::Forbidden(message));
        }

        let diff = RevisionDiff::between("", &req.content);
        let changes = "Document created".to_string();
        let revision = state.revision(&user, &req.title, &req.content, changes, diff);
        let now = state.now();
        let document = Document {
            id: state.next_id(),
            title: req.title,
            content: req.content,
            owner_id: Some(user.id.clone()),
            owner_email: user.email.clone(),
            owner_name: user.name.clone(),
            last_edited_by: Some(user.name.clone()),
            is_public: req.is_public.unwrap_or(true),
            created_at: Some(now),
            updated_at: Some(now),
            editors: vec![user.id.clone()],
            viewers: Vec::new(),
            revision_count: None,
            revisions: vec![revision],
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        session: &Session,
        id: &str,
        req: UpdateDocumentRequest,
    ) -> Result<Document, ApiError> {
        let mut state = self.state.lock().unwrap();
        let user = state.user_for(session.token())?;
        let doc = state.document_mut(id)?.clone();
        if !permissions::can_edit(&user, &doc) {
            return Err(ApiError::Forbidden("Not authorized to edit".to_string()));
        }

        let diff = RevisionDiff::between(&doc.content, &req.content);
        let changes = change_summary(doc.title != req.title, &diff);
        let revision = state.revision(&user, &req.title, &req.content, changes, diff);
        let now = state.now();

        let doc = state.document_mut(id)?;
        doc.title = req.title;
        doc.content = req.content;
        doc.last_edited_by = Some(user.name.clone());
        doc.updated_at = Some(now);
        doc.revisions.push(revision);
        Ok(doc.clone())
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let user = state.user_for(session.token())?;
        let doc = state.document_mut(id)?.clone();
        if !permissions::can_delete(&user, &doc) {
            return Err(ApiError::Forbidden("Not authorized to delete".to_string()));
        }

        state.documents.retain(|d| d.id != id);
        Ok(())
    }

    async fn restore(
        &self,
        session: &Session,
        doc_id: &str,
        revision_id: &str,
    ) -> Result<Document, ApiError> {
        let mut state = self.state.lock().unwrap();
        let user = state.user_for(session.token())?;
        let doc = state.document_mut(doc_id)?.clone();
        if !permissions::can_edit(&user, &doc) {
            return Err(ApiError::Forbidden("Not authorized to edit".to_string()));
        }
        let source = doc
            .revision(revision_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Revision not found".to_string()))?;

        let title = source.title.clone().unwrap_or_else(|| doc.title.clone());
        let content = source.content.clone().unwrap_or_default();
        let label = source
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let diff = RevisionDiff::between(&doc.content, &content);
        let changes = format!("Restored from {}", label);
        let mut revision = state.revision(&user, &title, &content, changes, diff);
        revision.restored_from = Some(source.id.clone());
        let now = state.now();

        let doc = state.document_mut(doc_id)?;
        doc.title = title;
        doc.content = content;
        doc.last_edited_by = Some(user.name.clone());
        doc.updated_at = Some(now);
        doc.revisions.push(revision);
        Ok(doc.clone())
    }
}

/// Dashboard for `session` with the listing loaded
pub async fn dashboard(store: &MemoryStore, session: &Session) -> Dashboard {
    let mut dashboard = Dashboard::new(session.user().clone());
    let request = dashboard.refresh();
    dashboard.run(store, session, request).await.unwrap();
    dashboard
}

pub fn yes(_: &str) -> bool {
    true
}

pub fn no(_: &str) -> bool {
    false
}
