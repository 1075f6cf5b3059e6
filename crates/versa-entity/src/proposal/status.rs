//! Proposal workflow status.

use serde::{Deserialize, Serialize};

/// Where a proposal is in its review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "proposal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Being written.
    #[default]
    Draft,
    /// Submitted for approval.
    Review,
    /// Approved for use with customers.
    Approved,
    /// Withdrawn from use.
    Archived,
}
