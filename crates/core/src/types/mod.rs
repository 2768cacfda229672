pub mod primitives;
pub mod publish;
pub mod settlement;

pub use primitives::*;
pub use publish::*;
pub use settlement::*;
