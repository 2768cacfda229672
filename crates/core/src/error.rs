use std::{fmt, path::PathBuf};

use alloy::{
    primitives::{Address, B256, U256},
    transports::TransportError,
};
use thiserror::Error;

use crate::types::TokenId;

/// Failures that stop the reconciliation loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cursor cannot advance past the largest id")]
    CursorExhausted,
}

#[derive(Debug, Error)]
#[error("{source} occurred at id #{id}")]
pub struct FatalError {
    pub id: TokenId,
    pub source: Error,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("block {0} not found")]
    MissingBlock(u64),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("abi lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("abi lookup for {address} failed: {message}: {result}")]
    Upstream {
        address: Address,
        message: String,
        result: String,
    },

    #[error("abi returned for {address} is unusable: {source}")]
    Unusable {
        address: Address,
        source: serde_json::Error,
    },

    #[error("abi cache io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read proxy storage: {0}")]
    Chain(#[from] ChainError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("storage word {0} is not a left-padded address")]
    NotAnAddress(B256),

    #[error("proxy {0} has an empty implementation slot")]
    EmptySlot(Address),
}

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("abi of {address} has no function `{name}`")]
    UnknownFunction { address: Address, name: String },

    #[error("abi of {address} has no event `{name}`")]
    UnknownEvent { address: Address, name: String },

    #[error("invalid abi json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("abi coding failed: {0}")]
    Coding(#[from] alloy::dyn_abi::Error),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error("settlement log for id {id} has no block number")]
    MissingBlockNumber { id: TokenId },

    #[error("settlement log for id {id} is missing field `{field}`")]
    MissingField { id: TokenId, field: &'static str },

    #[error("settlement amount {amount} for id {id} is out of range")]
    AmountOutOfRange { id: TokenId, amount: U256 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    #[error("tokenURI for id {0} returned no string")]
    MissingUri(TokenId),

    #[error("malformed data uri `{0}`")]
    MalformedUri(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid token metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("svg parse failed: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("image has an unsupported size {width}x{height}")]
    Size { width: u32, height: u32 },

    #[error("jpeg encoding failed: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{action} rejected with status `{status}`")]
    Rejected {
        action: PublishAction,
        status: String,
    },

    #[error("login rejected: {0}")]
    Login(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishAction {
    Photo,
    ProfilePicture,
    Story,
}

impl fmt::Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => f.write_str("photo publish"),
            Self::ProfilePicture => f.write_str("profile picture change"),
            Self::Story => f.write_str("story publish"),
        }
    }
}
