use serde::{Deserialize, Serialize};

use crate::wire::WireDocument;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentListResponse {
    #[serde(default)]
    pub count: Option<usize>,
    pub documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentResponse {
    pub document: WireDocument,
}
