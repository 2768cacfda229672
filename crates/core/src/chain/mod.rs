//! Narrow view of the chain used by the resolver, locator and renderer.
//!
//! Everything goes through the [`Chain`] trait so the components can be
//! exercised against mocked node responses.

pub mod ens;
pub mod rpc;

use alloy::{
    primitives::{Address, B256, Bytes},
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;

use crate::error::ChainError;

pub use rpc::AlloyChain;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Chain: Send + Sync {
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError>;

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ChainError>;

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError>;

    /// Verified primary ENS name, if one is registered.
    async fn lookup_name(&self, address: Address) -> Result<Option<String>, ChainError>;
}
