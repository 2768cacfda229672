pub mod caption;
pub mod core;
pub mod result;

pub use caption::Captions;
pub use self::core::{Orchestrator, Schedule};
pub use result::{Iteration, Phase};
