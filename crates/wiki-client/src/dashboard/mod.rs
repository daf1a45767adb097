//! Document access and revision controller.
//!
//! `Dashboard` is the client's view of the document set for the signed-in
//! user. Actions that need the store return a [`Request`] instead of calling
//! it; the caller runs it (possibly concurrently with others) and feeds the
//! [`Outcome`] back through [`Dashboard::apply`]. [`Dashboard::run`] does both
//! in one step for callers that only ever have one request in flight.

mod error;
mod request;

pub use error::DashboardError;
pub use request::{execute, Outcome, Request};

use wiki_shared::{
    diff::{change_summary, RevisionDiff},
    permissions, search, Document, User, DEFAULT_CONTENT, DEFAULT_TITLE,
};

use crate::api::{DocumentStore, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub title: String,
    pub content: String,
}

impl EditBuffer {
    fn from_document(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            content: doc.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit(EditBuffer),
}

/// Explicit user confirmation for destructive actions
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const DELETE_PROMPT: &str = "Delete this document?";
pub const RESTORE_PROMPT: &str = "Restore this version?";

pub struct Dashboard {
    user: User,
    documents: Vec<Document>,
    loaded: bool,
    search_query: String,

    // Selection
    selected: Option<Document>,
    pending: Option<String>,
    epoch: u64,
    mode: Mode,
    history_shown: bool,

    last_error: Option<String>,
}

impl Dashboard {
    pub fn new(user: User) -> Self {
        Self {
            user,
            documents: Vec::new(),
            loaded: false,
            search_query: String::new(),
            selected: None,
            pending: None,
            epoch: 0,
            mode: Mode::View,
            history_shown: false,
            last_error: None,
        }
    }

    // ============ Accessors ============

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Whether the first listing has arrived
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected(&self) -> Option<&Document> {
        self.selected.as_ref()
    }

    /// Id of a document that was selected but has not arrived yet
    pub fn pending_selection(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit(_))
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        match &self.mode {
            Mode::Edit(buffer) => Some(buffer),
            Mode::View => None,
        }
    }

    pub fn edit_buffer_mut(&mut self) -> Result<&mut EditBuffer, DashboardError> {
        match &mut self.mode {
            Mode::Edit(buffer) => Ok(buffer),
            Mode::View => Err(DashboardError::NotEditing),
        }
    }

    pub fn history_shown(&self) -> bool {
        self.history_shown
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ============ Permissions ============

    pub fn can_create(&self) -> bool {
        permissions::can_create(&self.user)
    }

    pub fn can_edit(&self, doc: &Document) -> bool {
        permissions::can_edit(&self.user, doc)
    }

    pub fn can_delete(&self, doc: &Document) -> bool {
        permissions::can_delete(&self.user, doc)
    }

    // ============ Listing ============

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    /// The listing filtered by the current search query
    pub fn visible_documents(&self) -> Vec<&Document> {
        search::filter_by_title(&self.documents, &self.search_query)
    }

    pub fn refresh(&self) -> Request {
        Request::Refresh
    }

    // ============ Selection ============

    /// Switch to another document. Any unsaved edit is dropped without
    /// warning and the history panel closes; the current document stays on
    /// display until the new one arrives.
    pub fn select(&mut self, id: &str) -> Request {
        self.epoch += 1;
        self.pending = Some(id.to_string());
        self.mode = Mode::View;
        self.history_shown = false;

        Request::Fetch {
            epoch: self.epoch,
            id: id.to_string(),
        }
    }

    /// Selected document, provided it is settled and editable by this user
    fn editable_selection(&self) -> Result<&Document, DashboardError> {
        if let Some(id) = &self.pending {
            return Err(DashboardError::Loading(id.clone()));
        }
        let doc = self.selected.as_ref().ok_or(DashboardError::NoSelection)?;
        if !self.can_edit(doc) {
            return Err(DashboardError::PermissionDenied("edit this document"));
        }
        Ok(doc)
    }

    // ============ Editing ============

    pub fn begin_create(&self) -> Result<Request, DashboardError> {
        if !self.can_create() {
            return Err(DashboardError::PermissionDenied("create documents"));
        }

        Ok(Request::Create {
            epoch: self.epoch,
            title: DEFAULT_TITLE.to_string(),
            content: DEFAULT_CONTENT.to_string(),
        })
    }

    /// Enter edit mode with the buffer seeded from the selected document
    pub fn begin_edit(&mut self) -> Result<(), DashboardError> {
        if self.is_editing() {
            return Err(DashboardError::Editing);
        }
        let buffer = EditBuffer::from_document(self.editable_selection()?);

        self.mode = Mode::Edit(buffer);
        self.history_shown = false;
        Ok(())
    }

    /// Leave edit mode, discarding the buffer
    pub fn cancel_edit(&mut self) {
        self.mode = Mode::View;
    }

    /// Summary of the edit buffer against the saved document, in the same
    /// form the store uses for revision summaries.
    pub fn pending_changes(&self) -> Option<String> {
        let buffer = self.edit_buffer()?;
        let doc = self.selected.as_ref()?;
        let diff = RevisionDiff::between(&doc.content, &buffer.content);

        Some(change_summary(doc.title != buffer.title, &diff))
    }

    /// Submit the edit buffer. Stays in edit mode until the outcome is
    /// applied; saving again before then issues a second, independent update.
    pub fn begin_save(&self) -> Result<Request, DashboardError> {
        let buffer = self.edit_buffer().ok_or(DashboardError::NotEditing)?;
        let doc = self.editable_selection()?;

        Ok(Request::Update {
            epoch: self.epoch,
            id: doc.id.clone(),
            title: buffer.title.clone(),
            content: buffer.content.clone(),
        })
    }

    pub fn begin_delete(
        &self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<Request, DashboardError> {
        let doc = self
            .documents
            .iter()
            .chain(self.selected.iter())
            .find(|d| d.id == id)
            .ok_or_else(|| DashboardError::UnknownDocument(id.to_string()))?;

        if !self.can_delete(doc) {
            return Err(DashboardError::PermissionDenied("delete this document"));
        }
        if !confirm.confirm(DELETE_PROMPT) {
            return Err(DashboardError::Cancelled);
        }

        Ok(Request::Delete { id: id.to_string() })
    }

    // ============ History ============

    /// Show or hide the revision history; only available outside edit mode
    pub fn toggle_history(&mut self) -> Result<bool, DashboardError> {
        if self.is_editing() {
            return Err(DashboardError::Editing);
        }
        self.editable_selection()?;

        self.history_shown = !self.history_shown;
        Ok(self.history_shown)
    }

    /// Ask the store to make an older revision current again
    pub fn begin_restore(
        &self,
        revision_id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<Request, DashboardError> {
        if self.is_editing() {
            return Err(DashboardError::Editing);
        }
        let doc = self.editable_selection()?;

        if doc.revision(revision_id).is_none() {
            return Err(DashboardError::UnknownRevision(revision_id.to_string()));
        }
        if doc.is_current_revision(revision_id) {
            return Err(DashboardError::AlreadyCurrent(revision_id.to_string()));
        }
        if !confirm.confirm(RESTORE_PROMPT) {
            return Err(DashboardError::Cancelled);
        }

        Ok(Request::Restore {
            epoch: self.epoch,
            doc_id: doc.id.clone(),
            revision_id: revision_id.to_string(),
        })
    }

    // ============ Outcomes ============

    fn is_stale(&self, epoch: u64, action: &str) -> bool {
        if epoch == self.epoch {
            return false;
        }
        tracing::warn!(
            epoch,
            current = self.epoch,
            action,
            "discarding response for an earlier selection"
        );
        true
    }

    fn set_documents(&mut self, documents: Option<Vec<Document>>) {
        if let Some(documents) = documents {
            self.documents = documents;
            self.loaded = true;
        }
    }

    /// Replace the selected document with the store's newer state
    fn adopt(&mut self, document: Document) {
        if let Some(previous) = self.selected.as_ref().filter(|d| d.id == document.id) {
            if !document.extends_history_of(previous) {
                tracing::warn!(
                    id = %document.id,
                    before = previous.revisions.len(),
                    after = document.revisions.len(),
                    "revision history does not extend the one on display"
                );
            }
        }
        self.selected = Some(document);
    }

    /// Fold a store outcome into the dashboard. Failures leave the selection
    /// and edit buffer as they were and are returned as well as remembered
    /// in [`Dashboard::last_error`].
    pub fn apply(&mut self, outcome: Outcome) -> Result<(), DashboardError> {
        match outcome {
            Outcome::Listed(documents) => {
                tracing::debug!(count = documents.len(), "documents loaded");
                self.set_documents(Some(documents));
            }
            Outcome::Fetched { epoch, document } => {
                if self.is_stale(epoch, "open document") {
                    return Ok(());
                }
                self.pending = None;
                self.selected = Some(document);
            }
            Outcome::Created {
                epoch,
                document,
                documents,
            } => {
                tracing::info!(id = %document.id, "document created");
                self.set_documents(documents);
                if self.is_stale(epoch, "create") {
                    return Ok(());
                }
                self.epoch += 1;
                self.pending = None;
                self.mode = Mode::Edit(EditBuffer::from_document(&document));
                self.history_shown = false;
                self.selected = Some(document);
            }
            Outcome::Saved {
                epoch,
                document,
                documents,
            } => {
                tracing::info!(
                    id = %document.id,
                    revisions = document.revisions.len(),
                    "document saved"
                );
                self.set_documents(documents);
                if self.is_stale(epoch, "save") {
                    return Ok(());
                }
                self.adopt(document);
                self.mode = Mode::View;
            }
            Outcome::Deleted { id, documents } => {
                tracing::info!(%id, "document deleted");
                match documents {
                    Some(documents) => self.set_documents(Some(documents)),
                    None => self.documents.retain(|d| d.id != id),
                }
                if self.selected.as_ref().is_some_and(|d| d.id == id) {
                    self.selected = None;
                    self.mode = Mode::View;
                    self.history_shown = false;
                }
                if self.pending.as_deref() == Some(id.as_str()) {
                    self.pending = None;
                }
            }
            Outcome::Restored {
                epoch,
                document,
                documents,
            } => {
                tracing::info!(id = %document.id, "revision restored");
                self.set_documents(documents);
                if self.is_stale(epoch, "restore") {
                    return Ok(());
                }
                self.adopt(document);
                self.history_shown = false;
            }
            Outcome::Failed { request, error } => {
                let action = request.action();

                if let Request::Fetch { epoch, id } = &request {
                    if *epoch != self.epoch {
                        tracing::warn!(%id, "dropping failure for an earlier selection: {}", error);
                        return Ok(());
                    }
                    if self.pending.as_deref() == Some(id.as_str()) {
                        self.pending = None;
                    }
                }

                tracing::warn!(action, "request failed: {}", error);
                self.last_error = Some(format!("Failed to {}: {}", action, error));
                return Err(DashboardError::Request {
                    action,
                    source: error,
                });
            }
        }

        Ok(())
    }

    /// Execute `request` and apply its outcome
    pub async fn run<S>(
        &mut self,
        store: &S,
        session: &Session,
        request: Request,
    ) -> Result<(), DashboardError>
    where
        S: DocumentStore + ?Sized,
    {
        let outcome = execute(store, session, request).await;
        self.apply(outcome)
    }
}
