//! Proposal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use versa_core::AppResult;

use super::status::ProposalStatus;
use crate::fields::{FieldSet, VersionedEntity, optional, required, to_field};
use crate::kind::EntityKind;

/// A sales content proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Proposal {
    /// Unique proposal identifier.
    pub id: Uuid,
    /// Proposal title.
    pub title: String,
    /// Proposal body (rich text or markdown).
    pub content: String,
    /// Path of the attached file, if any.
    pub file_path: Option<String>,
    /// Size of the attached file in bytes.
    pub file_size: Option<i64>,
    /// MIME type of the attached file.
    pub mime_type: Option<String>,
    /// Arbitrary structured metadata (JSON).
    pub metadata: Option<serde_json::Value>,
    /// The customer the proposal is written for.
    pub client_name: Option<String>,
    /// Review workflow status.
    pub status: ProposalStatus,
    /// Latest snapshot version (0 before the first snapshot).
    pub current_version: i32,
    /// User who created the proposal.
    pub created_by: i64,
    /// User who last modified the proposal.
    pub modified_by: Option<i64>,
    /// When the proposal was created.
    pub created_at: DateTime<Utc>,
    /// When the proposal was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Build a fresh proposal from creation data.
    pub fn new(data: CreateProposal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: data.title,
            content: data.content,
            file_path: data.file_path,
            file_size: data.file_size,
            mime_type: data.mime_type,
            metadata: data.metadata,
            client_name: data.client_name,
            status: ProposalStatus::Draft,
            current_version: 0,
            created_by: data.created_by,
            modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl VersionedEntity for Proposal {
    const KIND: EntityKind = EntityKind::Proposal;

    const TRACKED_FIELDS: &'static [&'static str] = &[
        "title",
        "content",
        "file_path",
        "file_size",
        "mime_type",
        "metadata",
        "client_name",
        "status",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn current_version(&self) -> i32 {
        self.current_version
    }

    fn set_current_version(&mut self, version: i32) {
        self.current_version = version;
    }

    fn capture(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        fields.insert("title".into(), to_field(&self.title));
        fields.insert("content".into(), to_field(&self.content));
        fields.insert("file_path".into(), to_field(&self.file_path));
        fields.insert("file_size".into(), to_field(&self.file_size));
        fields.insert("mime_type".into(), to_field(&self.mime_type));
        fields.insert("metadata".into(), to_field(&self.metadata));
        fields.insert("client_name".into(), to_field(&self.client_name));
        fields.insert("status".into(), to_field(&self.status));
        fields
    }

    fn restore(&mut self, fields: &FieldSet) -> AppResult<()> {
        let title = required(fields, "title")?;
        let content = required(fields, "content")?;
        let file_path = optional(fields, "file_path")?;
        let file_size = optional(fields, "file_size")?;
        let mime_type = optional(fields, "mime_type")?;
        let metadata = optional(fields, "metadata")?;
        let client_name = optional(fields, "client_name")?;
        let status = optional(fields, "status")?.unwrap_or_default();

        self.title = title;
        self.content = content;
        self.file_path = file_path;
        self.file_size = file_size;
        self.mime_type = mime_type;
        self.metadata = metadata;
        self.client_name = client_name;
        self.status = status;
        Ok(())
    }

    fn touch(&mut self, actor_id: i64, at: DateTime<Utc>) {
        self.modified_by = Some(actor_id);
        self.updated_at = at;
    }
}

/// Data required to create a new proposal record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProposal {
    /// Proposal title.
    pub title: String,
    /// Proposal body.
    pub content: String,
    /// Attached file path.
    pub file_path: Option<String>,
    /// Attached file size in bytes.
    pub file_size: Option<i64>,
    /// Attached file MIME type.
    pub mime_type: Option<String>,
    /// Structured metadata.
    pub metadata: Option<serde_json::Value>,
    /// Target customer.
    pub client_name: Option<String>,
    /// The creating user.
    pub created_by: i64,
}
