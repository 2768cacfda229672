use alloy::primitives::{Address, B256, b256};
use tracing::info;

use super::{AbiCache, InterfaceDescription};
use crate::{
    chain::Chain,
    error::{DecodeError, Error, ResolutionError},
};

/// EIP-1967 logic contract slot: `keccak256("eip1967.proxy.implementation") - 1`.
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyResolution {
    pub proxy: Address,
    pub implementation: Address,
}

/// Decodes a right-aligned address from a storage word.
pub fn decode_address_word(word: B256) -> Result<Address, DecodeError> {
    if word[..12].iter().any(|byte| *byte != 0) {
        return Err(DecodeError::NotAnAddress(word));
    }
    Ok(Address::from_word(word))
}

pub async fn implementation_of(chain: &dyn Chain, proxy: Address) -> Result<ProxyResolution, Error> {
    let word = chain
        .storage_at(proxy, IMPLEMENTATION_SLOT)
        .await
        .map_err(ResolutionError::from)?;

    let implementation = decode_address_word(word)?;
    if implementation.is_zero() {
        return Err(DecodeError::EmptySlot(proxy).into());
    }

    Ok(ProxyResolution {
        proxy,
        implementation,
    })
}

/// Resolves the ABI of the contract a proxy currently delegates to. Only the
/// implementation's ABI is cached; the proxy mapping is re-read every call.
pub async fn resolve_implementation(
    chain: &dyn Chain,
    cache: &AbiCache,
    proxy: Address,
) -> Result<InterfaceDescription, Error> {
    let resolution = implementation_of(chain, proxy).await?;
    info!(
        proxy = %resolution.proxy,
        implementation = %resolution.implementation,
        "resolved proxy implementation"
    );

    Ok(cache.resolve(resolution.implementation).await?)
}
