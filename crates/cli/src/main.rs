use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;
use tokio::sync::mpsc;
use tracing::{error, info};

use herald_cli::{
    config::{Args, Config},
    provider, telemetry,
};
use herald_core::{
    chain::{AlloyChain, Chain},
    interface::{self, AbiCache, ContractHandle, EtherscanLookup},
    mint::{MintFeed, MintListener},
    orchestrator::Orchestrator,
    publish::{HttpSession, Publisher},
    render::{Renderer, SvgRasterizer, TokenRenderer},
    settlement::ChainSettlementLocator,
};

const MINT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    telemetry::init();
    let config = Config::from_args(Args::parse())?;

    let http = reqwest::Client::new();
    let session = HttpSession::login(http.clone(), config.publish_url.clone(), &config.credentials)
        .await
        .wrap_err("could not log in to the publishing gateway")?;
    let publisher: Arc<dyn Publisher> = Arc::new(session);

    let provider = provider::connect(&config.rpc_url)
        .await
        .wrap_err_with(|| format!("could not connect to {}", config.rpc_url))?;
    let chain: Arc<dyn Chain> = Arc::new(AlloyChain::new(provider.clone()));

    let lookup = EtherscanLookup::new(
        http,
        config.abi_lookup_url.clone(),
        config.chain_id,
        config.etherscan_api_key.clone(),
    );
    let cache = AbiCache::new(config.abi_dir.clone(), Arc::new(lookup));

    let token_abi = cache
        .resolve(config.token)
        .await
        .wrap_err("could not resolve the token interface")?;
    let token = ContractHandle::from_description(config.token, &token_abi)?;
    let auction_abi = interface::resolve_implementation(chain.as_ref(), &cache, config.auction_house)
        .await
        .wrap_err("could not resolve the auction house interface")?;
    let auction = ContractHandle::from_description(config.auction_house, &auction_abi)?;
    info!(token = %token.address(), auction = %auction.address(), "interfaces ready");

    let renderer: Arc<dyn Renderer> = Arc::new(TokenRenderer::new(
        Arc::clone(&chain),
        token.clone(),
        Arc::new(SvgRasterizer::default()),
    ));
    let locator = ChainSettlementLocator::new(
        chain,
        auction,
        &config.settlement_event,
        config.settlement_from_block,
    )?;

    let feed = MintFeed::new(provider, &token, &config.mint_event)?;
    let listener = MintListener::new(
        Arc::clone(&renderer),
        Arc::clone(&publisher),
        config.captions.clone(),
    );
    let (mints, notifications) = mpsc::channel(MINT_CHANNEL_CAPACITY);
    tokio::spawn(feed.run(mints));
    tokio::spawn(listener.run(notifications));

    let orchestrator = Orchestrator::new(
        Arc::new(locator),
        renderer,
        publisher,
        config.captions,
        config.schedule,
        config.start,
    );
    let Err(fatal) = orchestrator.run().await;
    error!(%fatal, "reconciliation stopped");
    Err(fatal.into())
}
