//! Knowledge document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use versa_core::AppResult;

use crate::fields::{FieldSet, VersionedEntity, optional, required, to_field};
use crate::kind::EntityKind;

/// An article or reference file in the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct KnowledgeDocument {
    /// Unique document identifier.
    pub id: Uuid,
    /// Document title.
    pub title: String,
    /// Document body.
    pub body: String,
    /// Path of the uploaded source file, if any.
    pub file_path: Option<String>,
    /// Source file size in bytes.
    pub file_size: Option<i64>,
    /// Source file MIME type.
    pub mime_type: Option<String>,
    /// Arbitrary structured metadata (JSON).
    pub metadata: Option<serde_json::Value>,
    /// Knowledge-base category.
    pub category: Option<String>,
    /// Short abstract shown in listings.
    pub summary: Option<String>,
    /// Latest snapshot version (0 before the first snapshot).
    pub current_version: i32,
    /// User who created the document.
    pub created_by: i64,
    /// User who last modified the document.
    pub modified_by: Option<i64>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    /// Build a fresh document from creation data.
    pub fn new(data: CreateDocument) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: data.title,
            body: data.body,
            file_path: data.file_path,
            file_size: data.file_size,
            mime_type: data.mime_type,
            metadata: data.metadata,
            category: data.category,
            summary: data.summary,
            current_version: 0,
            created_by: data.created_by,
            modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl VersionedEntity for KnowledgeDocument {
    const KIND: EntityKind = EntityKind::Document;

    const TRACKED_FIELDS: &'static [&'static str] = &[
        "title",
        "body",
        "file_path",
        "file_size",
        "mime_type",
        "metadata",
        "category",
        "summary",
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
        fields.insert("body".into(), to_field(&self.body));
        fields.insert("file_path".into(), to_field(&self.file_path));
        fields.insert("file_size".into(), to_field(&self.file_size));
        fields.insert("mime_type".into(), to_field(&self.mime_type));
        fields.insert("metadata".into(), to_field(&self.metadata));
        fields.insert("category".into(), to_field(&self.category));
        fields.insert("summary".into(), to_field(&self.summary));
        fields
    }

    fn restore(&mut self, fields: &FieldSet) -> AppResult<()> {
        let title = required(fields, "title")?;
        let body = required(fields, "body")?;
        let file_path = optional(fields, "file_path")?;
        let file_size = optional(fields, "file_size")?;
        let mime_type = optional(fields, "mime_type")?;
        let metadata = optional(fields, "metadata")?;
        let category = optional(fields, "category")?;
        let summary = optional(fields, "summary")?;

        self.title = title;
        self.body = body;
        self.file_path = file_path;
        self.file_size = file_size;
        self.mime_type = mime_type;
        self.metadata = metadata;
        self.category = category;
        self.summary = summary;
        Ok(())
    }

    fn touch(&mut self, actor_id: i64, at: DateTime<Utc>) {
        self.modified_by = Some(actor_id);
        self.updated_at = at;
    }
}

/// Data required to create a new knowledge document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Document title.
    pub title: String,
    /// Document body.
    pub body: String,
    /// Source file path.
    pub file_path: Option<String>,
    /// Source file size in bytes.
    pub file_size: Option<i64>,
    /// Source file MIME type.
    pub mime_type: Option<String>,
    /// Structured metadata.
    pub metadata: Option<serde_json::Value>,
    /// Category.
    pub category: Option<String>,
    /// Short abstract.
    pub summary: Option<String>,
    /// The creating user.
    pub created_by: i64,
}
