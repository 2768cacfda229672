pub mod ens;

pub use ens::{IAddrResolver, IEnsRegistry, INameResolver};
