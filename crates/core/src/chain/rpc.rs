use alloy::{
    consensus::BlockHeader,
    eips::BlockNumberOrTag,
    network::TransactionBuilder,
    primitives::{Address, B256, Bytes, U256},
    providers::Provider,
    rpc::types::{Filter, Log, TransactionRequest},
};
use async_trait::async_trait;

use super::{Chain, ens};
use crate::error::ChainError;

#[derive(Clone)]
pub struct AlloyChain<P>
where
    P: Provider + Clone,
{
    provider: P,
}

impl<P> AlloyChain<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> Chain for AlloyChain<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await?;
        Ok(B256::from(value.to_be_bytes::<32>()))
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default().with_to(to).with_input(input);
        Ok(self.provider.call(tx).await?)
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ChainError> {
        Ok(self.provider.get_logs(filter).await?)
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?
            .ok_or(ChainError::MissingBlock(number))?;
        Ok(block.header.timestamp())
    }

    async fn lookup_name(&self, address: Address) -> Result<Option<String>, ChainError> {
        ens::reverse_lookup(&self.provider, address).await
    }
}
