use alloy::{
    contract,
    primitives::{Address, B256, address, hex, keccak256},
    providers::Provider,
    transports::RpcError,
};
use herald_abi::{IAddrResolver, IEnsRegistry, INameResolver};

use crate::error::ChainError;

pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// EIP-137 namehash.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(node.as_slice());
        preimage[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(preimage);
    }
    node
}

pub fn reverse_node(address: Address) -> B256 {
    namehash(&format!("{}.addr.reverse", hex::encode(address)))
}

/// Resolves the primary name of `address` and checks that the name resolves
/// back to the same address. Reverts and undecodable answers mean "no name";
/// transport failures are errors.
pub async fn reverse_lookup<P>(provider: &P, address: Address) -> Result<Option<String>, ChainError>
where
    P: Provider,
{
    let registry = IEnsRegistry::new(ENS_REGISTRY, provider);
    let node = reverse_node(address);

    let Some(resolver) = soft(registry.resolver(node).call().await)? else {
        return Ok(None);
    };
    if resolver.is_zero() {
        return Ok(None);
    }

    let Some(name) = soft(INameResolver::new(resolver, provider).name(node).call().await)? else {
        return Ok(None);
    };
    if name.is_empty() {
        return Ok(None);
    }

    let forward = namehash(&name);
    let Some(forward_resolver) = soft(registry.resolver(forward).call().await)? else {
        return Ok(None);
    };
    if forward_resolver.is_zero() {
        return Ok(None);
    }

    let Some(resolved) =
        soft(IAddrResolver::new(forward_resolver, provider).addr(forward).call().await)?
    else {
        return Ok(None);
    };

    Ok((resolved == address).then_some(name))
}

fn soft<T>(result: Result<T, contract::Error>) -> Result<Option<T>, ChainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(contract::Error::TransportError(RpcError::ErrorResp(_))) => Ok(None),
        Err(contract::Error::TransportError(err)) => Err(err.into()),
        Err(_) => Ok(None),
    }
}
