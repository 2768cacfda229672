//! Reaction to freshly minted tokens, outside the reconciliation cursor.

pub mod feed;
pub mod listener;

pub use feed::MintFeed;
pub use listener::{MintListener, MintOutcome};
