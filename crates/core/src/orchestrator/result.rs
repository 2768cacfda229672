use std::fmt;

use crate::{error::PublishError, types::TokenId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Reconciling,
    Publishing,
    Waiting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reconciling => "reconciling",
            Self::Publishing => "publishing",
            Self::Waiting => "waiting",
        };
        f.write_str(name)
    }
}

/// Outcome of a single reconciliation step.
#[derive(Debug)]
pub enum Iteration {
    Published { id: TokenId, caption: String },
    /// The post went out badly; the id is not retried.
    PublishFailed { id: TokenId, error: PublishError },
    Pending { id: TokenId },
}
