//! Versioned entity kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The business object a snapshot belongs to.
///
/// Stored alongside every snapshot row so proposals and knowledge documents
/// keep independent version sequences in a shared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entity_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A content proposal.
    Proposal,
    /// A knowledge-base document.
    Document,
}

impl EntityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = versa_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proposal" => Ok(Self::Proposal),
            "document" => Ok(Self::Document),
            _ => Err(versa_core::AppError::validation(format!(
                "Invalid entity kind: '{s}'. Expected one of: proposal, document"
            ))),
        }
    }
}
