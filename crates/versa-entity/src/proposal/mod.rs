//! Content proposal entities.

pub mod model;
pub mod status;

pub use model::{CreateProposal, Proposal};
pub use status::ProposalStatus;
