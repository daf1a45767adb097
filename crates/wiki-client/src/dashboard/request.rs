use wiki_shared::{
    api::{CreateDocumentRequest, UpdateDocumentRequest},
    Document,
};

use crate::api::{ApiError, DocumentStore, Session};

/// A store call the dashboard wants made.
///
/// Calls tied to the current selection carry the selection epoch they were
/// issued under, so that a late answer for an abandoned selection can be
/// recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Refresh,
    Fetch { epoch: u64, id: String },
    Create { epoch: u64, title: String, content: String },
    Update { epoch: u64, id: String, title: String, content: String },
    Delete { id: String },
    Restore { epoch: u64, doc_id: String, revision_id: String },
}

impl Request {
    /// Verb used in failure messages
    pub fn action(&self) -> &'static str {
        match self {
            Self::Refresh => "load documents",
            Self::Fetch { .. } => "open document",
            Self::Create { .. } => "create",
            Self::Update { .. } => "save",
            Self::Delete { .. } => "delete",
            Self::Restore { .. } => "restore",
        }
    }

    pub fn epoch(&self) -> Option<u64> {
        match self {
            Self::Fetch { epoch, .. }
            | Self::Create { epoch, .. }
            | Self::Update { epoch, .. }
            | Self::Restore { epoch, .. } => Some(*epoch),
            Self::Refresh | Self::Delete { .. } => None,
        }
    }
}

/// What came back from the store for a [`Request`].
///
/// Mutations also carry the refreshed listing; `None` there means the
/// mutation went through but the follow-up listing failed.
#[derive(Debug)]
pub enum Outcome {
    Listed(Vec<Document>),
    Fetched {
        epoch: u64,
        document: Document,
    },
    Created {
        epoch: u64,
        document: Document,
        documents: Option<Vec<Document>>,
    },
    Saved {
        epoch: u64,
        document: Document,
        documents: Option<Vec<Document>>,
    },
    Deleted {
        id: String,
        documents: Option<Vec<Document>>,
    },
    Restored {
        epoch: u64,
        document: Document,
        documents: Option<Vec<Document>>,
    },
    Failed {
        request: Request,
        error: ApiError,
    },
}

impl Outcome {
    /// Selection epoch of the request this answers, if it had one
    pub fn epoch(&self) -> Option<u64> {
        match self {
            Self::Fetched { epoch, .. }
            | Self::Created { epoch, .. }
            | Self::Saved { epoch, .. }
            | Self::Restored { epoch, .. } => Some(*epoch),
            Self::Failed { request, .. } => request.epoch(),
            Self::Listed(_) | Self::Deleted { .. } => None,
        }
    }
}

/// Run one request against the store. Never retries.
pub async fn execute<S>(store: &S, session: &Session, request: Request) -> Outcome
where
    S: DocumentStore + ?Sized,
{
    tracing::debug!(action = request.action(), epoch = ?request.epoch(), "dispatching");

    match perform(store, session, &request).await {
        Ok(outcome) => outcome,
        Err(error) => Outcome::Failed { request, error },
    }
}

async fn perform<S>(store: &S, session: &Session, request: &Request) -> Result<Outcome, ApiError>
where
    S: DocumentStore + ?Sized,
{
    let outcome = match request {
        Request::Refresh => Outcome::Listed(store.list_all(session).await?),
        Request::Fetch { epoch, id } => Outcome::Fetched {
            epoch: *epoch,
            document: store.get_one(session, id).await?,
        },
        Request::Create {
            epoch,
            title,
            content,
        } => {
            let req = CreateDocumentRequest {
                title: title.clone(),
                content: content.clone(),
                is_public: None,
            };
            let document = store.create(session, req).await?;
            Outcome::Created {
                epoch: *epoch,
                document,
                documents: relist(store, session).await,
            }
        }
        Request::Update {
            epoch,
            id,
            title,
            content,
        } => {
            let req = UpdateDocumentRequest {
                title: title.clone(),
                content: content.clone(),
            };
            let document = store.update(session, id, req).await?;
            Outcome::Saved {
                epoch: *epoch,
                document,
                documents: relist(store, session).await,
            }
        }
        Request::Delete { id } => {
            store.delete(session, id).await?;
            Outcome::Deleted {
                id: id.clone(),
                documents: relist(store, session).await,
            }
        }
        Request::Restore {
            epoch,
            doc_id,
            revision_id,
        } => {
            let document = store.restore(session, doc_id, revision_id).await?;
            Outcome::Restored {
                epoch: *epoch,
                document,
                documents: relist(store, session).await,
            }
        }
    };

    Ok(outcome)
}

/// Listing refresh after a mutation; its failure does not undo the mutation
async fn relist<S>(store: &S, session: &Session) -> Option<Vec<Document>>
where
    S: DocumentStore + ?Sized,
{
    match store.list_all(session).await {
        Ok(documents) => Some(documents),
        Err(err) => {
            tracing::warn!("refreshing document list failed: {}", err);
            None
        }
    }
}
