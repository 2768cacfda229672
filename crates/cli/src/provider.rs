use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::TransportError,
};
use url::Url;

/// Connects over http, ws or ipc depending on the url scheme.
pub async fn connect(rpc_url: &Url) -> Result<DynProvider, TransportError> {
    let provider = ProviderBuilder::new().connect(rpc_url.as_str()).await?;
    Ok(provider.erased())
}
