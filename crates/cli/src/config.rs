use std::{num::NonZeroU64, path::PathBuf, time::Duration};

use alloy::primitives::Address;
use clap::Parser;
use herald_core::{
    TokenId,
    interface::{AbiCache, EtherscanLookup},
    orchestrator::{Captions, Schedule},
    publish::Credentials,
    settlement::ChainSettlementLocator,
};
use thiserror::Error;
use url::Url;

/// Every setting comes from the environment; flags exist for local runs.
#[derive(Debug, Parser)]
#[command(name = "herald", about = "Posts settled auctions and fresh mints", version)]
pub struct Args {
    #[arg(long, env = "IG_USERNAME")]
    pub ig_username: String,

    #[arg(long, env = "IG_PASSWORD", hide_env_values = true)]
    pub ig_password: String,

    /// Base URL of the publishing gateway
    #[arg(long, env = "PUBLISH_API_URL", value_name = "URL")]
    pub publish_api_url: String,

    #[arg(long, env = "RPC_URL", value_name = "URL")]
    pub rpc_url: String,

    /// Token contract, also the source of artwork and mint events
    #[arg(long, env = "NFT_ADDRESS", value_name = "ADDRESS")]
    pub nft_address: String,

    /// Auction house proxy
    #[arg(long, env = "AUCTION_HOUSE_ADDRESS", value_name = "ADDRESS")]
    pub auction_house_address: String,

    /// First auction id to reconcile
    #[arg(long, env = "START_ID", value_name = "ID")]
    pub start_id: String,

    #[arg(long, env = "POST_INTERVAL_MINS", value_name = "MINUTES")]
    pub post_interval_mins: String,

    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    #[arg(long, env = "ABI_LOOKUP_URL", default_value = EtherscanLookup::DEFAULT_URL, value_name = "URL")]
    pub abi_lookup_url: String,

    #[arg(long, env = "CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,

    #[arg(long, env = "ABI_DIR", default_value = AbiCache::DEFAULT_DIR, value_name = "DIR")]
    pub abi_dir: PathBuf,

    /// Ids divisible by this are direct mints; 0 disables
    #[arg(long, env = "RESERVED_MODULUS", default_value_t = 10)]
    pub reserved_modulus: u64,

    #[arg(long, env = "SETTLEMENT_FROM_BLOCK", default_value_t = 0)]
    pub settlement_from_block: u64,

    #[arg(long, env = "SETTLEMENT_EVENT", default_value = ChainSettlementLocator::DEFAULT_EVENT)]
    pub settlement_event: String,

    #[arg(long, env = "MINT_EVENT", default_value = "NounCreated")]
    pub mint_event: String,

    #[arg(long, env = "ITEM_LABEL", default_value = "Noun")]
    pub item_label: String,

    #[arg(long, env = "RESERVED_RECIPIENT", default_value = "the Nounders")]
    pub reserved_recipient: String,

    #[arg(long, env = "CURRENCY_SYMBOL", default_value = "ETH")]
    pub currency_symbol: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is empty")]
    Missing(&'static str),

    #[error("{key} is not an address: `{value}`")]
    InvalidAddress { key: &'static str, value: String },

    #[error("{key} is not a valid url: {source}")]
    InvalidUrl {
        key: &'static str,
        source: url::ParseError,
    },

    #[error("{key} is not a valid number: `{value}`")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub publish_url: Url,
    pub rpc_url: Url,
    pub token: Address,
    pub auction_house: Address,
    pub start: TokenId,
    pub schedule: Schedule,
    pub abi_lookup_url: Url,
    pub etherscan_api_key: Option<String>,
    pub chain_id: u64,
    pub abi_dir: PathBuf,
    pub settlement_from_block: u64,
    pub settlement_event: String,
    pub mint_event: String,
    pub captions: Captions,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let credentials = Credentials {
            username: required("IG_USERNAME", &args.ig_username)?.to_string(),
            password: required("IG_PASSWORD", &args.ig_password)?.to_string(),
        };

        Ok(Self {
            credentials,
            publish_url: parse_url("PUBLISH_API_URL", &args.publish_api_url)?,
            rpc_url: parse_url("RPC_URL", &args.rpc_url)?,
            token: parse_address("NFT_ADDRESS", &args.nft_address)?,
            auction_house: parse_address("AUCTION_HOUSE_ADDRESS", &args.auction_house_address)?,
            start: parse_id(&args.start_id)?,
            schedule: Schedule {
                interval: parse_interval(&args.post_interval_mins)?,
                reserved_modulus: NonZeroU64::new(args.reserved_modulus),
            },
            abi_lookup_url: parse_url("ABI_LOOKUP_URL", &args.abi_lookup_url)?,
            etherscan_api_key: args.etherscan_api_key.filter(|key| !key.trim().is_empty()),
            chain_id: args.chain_id,
            abi_dir: args.abi_dir,
            settlement_from_block: args.settlement_from_block,
            settlement_event: args.settlement_event,
            mint_event: args.mint_event,
            captions: Captions {
                item_label: args.item_label,
                reserved_recipient: args.reserved_recipient,
                currency_symbol: args.currency_symbol,
            },
        })
    }
}

fn required<'a>(key: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::Missing(key))
    } else {
        Ok(value)
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(required(key, value)?).map_err(|source| ConfigError::InvalidUrl { key, source })
}

fn parse_address(key: &'static str, value: &str) -> Result<Address, ConfigError> {
    let value = required(key, value)?;
    value.parse().map_err(|_| ConfigError::InvalidAddress {
        key,
        value: value.to_string(),
    })
}

fn parse_id(value: &str) -> Result<TokenId, ConfigError> {
    const KEY: &str = "START_ID";
    let value = required(KEY, value)?;
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key: KEY,
        value: value.to_string(),
    })
}

fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    const KEY: &str = "POST_INTERVAL_MINS";
    let value = required(KEY, value)?;
    let invalid = || ConfigError::InvalidNumber {
        key: KEY,
        value: value.to_string(),
    };
    let minutes: f64 = value.parse().map_err(|_| invalid())?;
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| invalid())
}
