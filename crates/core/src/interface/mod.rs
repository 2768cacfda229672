pub mod cache;
pub mod contract;
pub mod lookup;
pub mod proxy;

use alloy::json_abi::JsonAbi;

pub use cache::{AbiCache, AbiSource};
pub use contract::{ContractHandle, DecodedFields};
pub use lookup::EtherscanLookup;
pub use proxy::{IMPLEMENTATION_SLOT, ProxyResolution, implementation_of, resolve_implementation};

/// Raw JSON ABI text, exactly as returned by the lookup service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDescription(String);

impl InterfaceDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> Result<JsonAbi, serde_json::Error> {
        serde_json::from_str(&self.0)
    }
}
