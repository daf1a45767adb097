//! Wire-level document payloads.
//!
//! The document store is not consistent about field naming: the same record
//! may arrive with `ownerEmail` or `owner_email`. Everything in this module
//! accepts both and normalizes to the canonical [`Document`] before the rest
//! of the client sees it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::diff::RevisionDiff;
use crate::models::{Document, Revision};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("document payload is missing '{0}'")]
    MissingField(&'static str),
    #[error("invalid timestamp in '{field}': {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Identifier that may be sent as a JSON number or string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_timestamp("createdAt", &value))
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, WireError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| WireError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn parse_optional(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, WireError> {
    value.map(|v| parse_timestamp(field, &v)).transpose()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireDocument {
    #[serde(rename = "_id")]
    pub underscore_id: Option<RawId>,
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub content: Option<String>,

    #[serde(rename = "ownerId")]
    pub owner_id_camel: Option<RawId>,
    pub owner_id: Option<RawId>,
    #[serde(rename = "ownerEmail")]
    pub owner_email_camel: Option<String>,
    pub owner_email: Option<String>,
    #[serde(rename = "ownerName")]
    pub owner_name_camel: Option<String>,
    pub owner_name: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at_camel: Option<String>,
    pub updated_at: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at_camel: Option<String>,
    pub created_at: Option<String>,
    #[serde(rename = "isPublic")]
    pub is_public_camel: Option<bool>,
    pub is_public: Option<bool>,
    #[serde(rename = "lastEditedBy")]
    pub last_edited_by_camel: Option<String>,
    pub last_edited_by: Option<String>,
    #[serde(rename = "revisionCount")]
    pub revision_count_camel: Option<usize>,
    pub revision_count: Option<usize>,

    pub editors: Option<Vec<RawId>>,
    pub viewers: Option<Vec<RawId>>,
    pub revisions: Option<Vec<WireRevision>>,
}

impl WireDocument {
    /// Collapse both naming conventions into the canonical shape,
    /// preferring the camelCase value whenever both are present.
    pub fn normalize(self) -> Result<Document, WireError> {
        let id = self
            .underscore_id
            .or(self.id)
            .map(String::from)
            .ok_or(WireError::MissingField("_id"))?;
        let owner_email = self
            .owner_email_camel
            .or(self.owner_email)
            .ok_or(WireError::MissingField("ownerEmail"))?;

        let revisions = self
            .revisions
            .unwrap_or_default()
            .into_iter()
            .map(WireRevision::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Document {
            id,
            title: self.title.ok_or(WireError::MissingField("title"))?,
            content: self.content.unwrap_or_default(),
            owner_id: self.owner_id_camel.or(self.owner_id).map(String::from),
            owner_email,
            owner_name: self
                .owner_name_camel
                .or(self.owner_name)
                .unwrap_or_default(),
            last_edited_by: self.last_edited_by_camel.or(self.last_edited_by),
            is_public: self.is_public_camel.or(self.is_public).unwrap_or(false),
            created_at: parse_optional("createdAt", self.created_at_camel.or(self.created_at))?,
            updated_at: parse_optional("updatedAt", self.updated_at_camel.or(self.updated_at))?,
            editors: ids(self.editors),
            viewers: ids(self.viewers),
            revision_count: self.revision_count_camel.or(self.revision_count),
            revisions,
        })
    }
}

fn ids(raw: Option<Vec<RawId>>) -> Vec<String> {
    raw.unwrap_or_default().into_iter().map(String::from).collect()
}

/// Normalize every document of a listing, failing on the first bad record.
pub fn normalize_all(documents: Vec<WireDocument>) -> Result<Vec<Document>, WireError> {
    documents.into_iter().map(WireDocument::normalize).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRevision {
    #[serde(rename = "_id")]
    pub underscore_id: Option<RawId>,
    pub id: Option<RawId>,
    pub changes: Option<String>,
    #[serde(rename = "authorName")]
    pub author_name_camel: Option<String>,
    pub author_name: Option<String>,
    #[serde(rename = "authorEmail")]
    pub author_email_camel: Option<String>,
    pub author_email: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at_camel: Option<String>,
    pub created_at: Option<String>,
    #[serde(rename = "restoredFrom")]
    pub restored_from_camel: Option<RawId>,
    pub restored_from: Option<RawId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub diff: Option<RevisionDiff>,
}

impl WireRevision {
    pub fn normalize(self) -> Result<Revision, WireError> {
        Ok(Revision {
            id: self
                .underscore_id
                .or(self.id)
                .map(String::from)
                .ok_or(WireError::MissingField("revisions[]._id"))?,
            changes: self.changes.unwrap_or_default(),
            author_name: self
                .author_name_camel
                .or(self.author_name)
                .unwrap_or_default(),
            author_email: self.author_email_camel.or(self.author_email),
            created_at: parse_optional(
                "revisions[].createdAt",
                self.created_at_camel.or(self.created_at),
            )?,
            title: self.title,
            content: self.content,
            diff: self.diff,
            restored_from: self
                .restored_from_camel
                .or(self.restored_from)
                .map(String::from),
        })
    }
}
