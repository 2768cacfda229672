use std::time::Duration;

use alloy::{
    providers::Provider,
    rpc::types::{Filter, Log},
    transports::{TransportError, TransportErrorKind},
};
use futures::{StreamExt, future, stream, stream::BoxStream};
use tokio::{sync::mpsc, time::sleep};
use tracing::{error, info, warn};

use crate::{
    error::{ChainError, InterfaceError},
    interface::ContractHandle,
    types::TokenId,
};

pub type BoxMintStream = BoxStream<'static, TokenId>;

/// Live creation events of the token contract.
#[derive(Clone)]
pub struct MintFeed<P>
where
    P: Provider + Clone,
{
    provider: P,
    filter: Filter,
}

impl<P> MintFeed<P>
where
    P: Provider + Clone,
{
    pub const DEFAULT_EVENT: &'static str = "NounCreated";

    pub fn new(provider: P, token: &ContractHandle, event_name: &str) -> Result<Self, InterfaceError> {
        Ok(Self {
            provider,
            filter: creation_filter(token, event_name)?,
        })
    }

    pub async fn into_stream(&self) -> Result<BoxMintStream, ChainError> {
        match self.try_subscribe().await {
            Ok(stream) => Ok(stream),
            Err(TransportError::Transport(TransportErrorKind::PubsubUnavailable)) => {
                info!("pubsub unavailable, polling for mints");
                Ok(self.watch().await?)
            }
            Err(other) => Err(ChainError::Transport(other)),
        }
    }

    /// Forwards minted ids until the receiving side goes away, reconnecting
    /// whenever the underlying stream fails or ends.
    pub async fn run(self, mints: mpsc::Sender<TokenId>) {
        let mut failures = 0;
        loop {
            match self.into_stream().await {
                Ok(mut stream) => {
                    failures = 0;
                    while let Some(id) = stream.next().await {
                        info!(%id, "mint observed");
                        if mints.send(id).await.is_err() {
                            info!("mint listener gone, stopping feed");
                            return;
                        }
                    }
                    warn!("mint stream ended");
                }
                Err(err) => error!(%err, "could not open mint stream"),
            }

            if mints.is_closed() {
                return;
            }
            let delay = backoff(failures);
            failures += 1;
            info!(?delay, "reconnecting mint stream");
            sleep(delay).await;
        }
    }

    async fn try_subscribe(&self) -> Result<BoxMintStream, TransportError> {
        let subscription = self.provider.subscribe_logs(&self.filter).await?;
        let stream = subscription
            .into_stream()
            .filter_map(|log| future::ready(minted_id(&log)))
            .boxed();
        Ok(stream)
    }

    async fn watch(&self) -> Result<BoxMintStream, TransportError> {
        let watcher = self.provider.watch_logs(&self.filter).await?;
        let stream = watcher
            .into_stream()
            .flat_map(stream::iter)
            .filter_map(|log| future::ready(minted_id(&log)))
            .boxed();
        Ok(stream)
    }
}

fn creation_filter(token: &ContractHandle, event_name: &str) -> Result<Filter, InterfaceError> {
    let event = token.event(event_name)?;
    Ok(Filter::new()
        .address(token.address())
        .event_signature(event.selector()))
}

fn minted_id(log: &Log) -> Option<TokenId> {
    if log.removed {
        return None;
    }
    log.topics().get(1).copied().map(TokenId::from_topic)
}

const MAX_BACKOFF: Duration = Duration::from_secs(60);

fn backoff(failures: u32) -> Duration {
    Duration::from_secs(1 << failures.min(6)).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::InterfaceDescription;
    use alloy::primitives::{Address, B256, LogData, address};

    const TOKEN_ABI: &str = r#"[
        {"type":"event","name":"NounCreated","anonymous":false,
         "inputs":[{"name":"tokenId","type":"uint256","indexed":true},
                   {"name":"seed","type":"tuple","indexed":false,"components":[
                       {"name":"background","type":"uint48"},
                       {"name":"body","type":"uint48"}]}]}
    ]"#;
    const TOKEN: Address = address!("9c8ff314c9bc7f6e59a9d9225fb22946427edc03");

    fn token() -> ContractHandle {
        ContractHandle::from_description(TOKEN, &InterfaceDescription::new(TOKEN_ABI)).unwrap()
    }

    fn log(topics: Vec<B256>, removed: bool) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: TOKEN,
                data: LogData::new_unchecked(topics, Default::default()),
            },
            removed,
            ..Default::default()
        }
    }

    #[test]
    fn backoff_doubles_up_to_a_minute() {
        let delays: Vec<u64> = (0..8).map(|n| backoff(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 60, 60]);
        assert_eq!(backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn minted_id_comes_from_the_first_indexed_topic() {
        let selector = token().event("NounCreated").unwrap().selector();

        let created = log(vec![selector, TokenId::from(1_234).as_topic()], false);
        assert_eq!(minted_id(&created), Some(TokenId::from(1_234)));

        let reorged = log(vec![selector, TokenId::from(1_234).as_topic()], true);
        assert_eq!(minted_id(&reorged), None);

        let bare = log(vec![selector], false);
        assert_eq!(minted_id(&bare), None);
    }

    #[test]
    fn filter_targets_the_creation_event() {
        let filter = creation_filter(&token(), "NounCreated").unwrap();
        let selector = token().event("NounCreated").unwrap().selector();

        assert!(filter.address.matches(&TOKEN));
        assert!(filter.topics[0].matches(&selector));
    }

    #[test]
    fn unknown_creation_event_is_rejected() {
        let err = creation_filter(&token(), "Minted").unwrap_err();
        assert!(matches!(err, InterfaceError::UnknownEvent { .. }));
    }
}
