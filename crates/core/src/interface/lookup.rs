use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::AbiSource;
use crate::error::ResolutionError;

/// `getabi` client for the Etherscan v2 multichain API.
pub struct EtherscanLookup {
    client: Client,
    url: Url,
    chain_id: u64,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

impl Envelope {
    fn into_abi(self, address: Address) -> Result<String, ResolutionError> {
        if self.status == "1" {
            Ok(self.result)
        } else {
            Err(ResolutionError::Upstream {
                address,
                message: self.message,
                result: self.result,
            })
        }
    }
}

impl EtherscanLookup {
    pub const DEFAULT_URL: &'static str = "https://api.etherscan.io/v2/api";

    pub fn new(client: Client, url: Url, chain_id: u64, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            chain_id,
            api_key,
        }
    }
}

#[async_trait]
impl AbiSource for EtherscanLookup {
    async fn fetch(&self, address: Address) -> Result<String, ResolutionError> {
        let chain_id = self.chain_id.to_string();
        let address_param = address.to_string();
        let mut query = vec![
            ("chainid", chain_id.as_str()),
            ("module", "contract"),
            ("action", "getabi"),
            ("address", address_param.as_str()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        debug!(%address, url = %self.url, "fetching abi");
        let envelope: Envelope = self
            .client
            .get(self.url.clone())
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope.into_abi(address)
    }
}
