pub mod chain;
pub mod error;
pub mod interface;
pub mod mint;
pub mod orchestrator;
pub mod publish;
pub mod render;
pub mod settlement;
pub mod types;

pub use error::*;
pub use types::*;
