use std::sync::Arc;

use alloy::{dyn_abi::DynSolValue, json_abi::Event, rpc::types::Filter};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    chain::Chain,
    error::{InterfaceError, LocatorError},
    interface::ContractHandle,
    types::{Settlement, SettlementRecord, TokenId, WeiAmount},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettlementLocator: Send + Sync {
    async fn find_settlement(&self, id: TokenId) -> Result<Settlement, LocatorError>;
}

/// Finds the settlement log of an auction by its indexed id.
pub struct ChainSettlementLocator {
    chain: Arc<dyn Chain>,
    auction: ContractHandle,
    event: Event,
    from_block: u64,
}

impl ChainSettlementLocator {
    pub const DEFAULT_EVENT: &'static str = "AuctionSettled";
    const WINNER: &'static str = "winner";
    const AMOUNT: &'static str = "amount";

    pub fn new(
        chain: Arc<dyn Chain>,
        auction: ContractHandle,
        event_name: &str,
        from_block: u64,
    ) -> Result<Self, InterfaceError> {
        let event = auction.event(event_name)?.clone();
        Ok(Self {
            chain,
            auction,
            event,
            from_block,
        })
    }

    fn filter(&self, id: TokenId) -> Filter {
        Filter::new()
            .address(self.auction.address())
            .event_signature(self.event.selector())
            .topic1(id.as_topic())
            .from_block(self.from_block)
    }
}

#[async_trait]
impl SettlementLocator for ChainSettlementLocator {
    async fn find_settlement(&self, id: TokenId) -> Result<Settlement, LocatorError> {
        let logs = self.chain.logs(&self.filter(id)).await?;
        let Some(log) = logs.first() else {
            return Ok(Settlement::NotYetOccurred);
        };

        let fields = self.auction.decode_log(&self.event, log.data())?;
        let winner = fields
            .get(Self::WINNER)
            .and_then(DynSolValue::as_address)
            .ok_or(LocatorError::MissingField {
                id,
                field: Self::WINNER,
            })?;
        let (raw_amount, _) = fields
            .get(Self::AMOUNT)
            .and_then(DynSolValue::as_uint)
            .ok_or(LocatorError::MissingField {
                id,
                field: Self::AMOUNT,
            })?;
        let amount = WeiAmount::new(raw_amount)
            .to_native()
            .ok_or(LocatorError::AmountOutOfRange {
                id,
                amount: raw_amount,
            })?;
        let block = log
            .block_number
            .ok_or(LocatorError::MissingBlockNumber { id })?;

        let winner = match self.chain.lookup_name(winner).await? {
            Some(name) => name,
            None => winner.to_string(),
        };
        let settled_at = self.chain.block_timestamp(block).await?;
        debug!(%id, %winner, %amount, block, "found settlement");

        Ok(Settlement::Settled(SettlementRecord {
            id,
            winner,
            amount,
            settled_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain::MockChain, error::ChainError, interface::InterfaceDescription};
    use alloy::{
        primitives::{Address, LogData, U256, address},
        rpc::types::Log,
        transports::TransportErrorKind,
    };
    use mockall::predicate;
    use rust_decimal::Decimal;

    const AUCTION_ABI: &str = r#"[
        {"type":"event","name":"AuctionSettled","anonymous":false,
         "inputs":[{"name":"nounId","type":"uint256","indexed":true},
                   {"name":"winner","type":"address","indexed":false},
                   {"name":"amount","type":"uint256","indexed":false}]}
    ]"#;
    const AUCTION: Address = address!("830bd73e4184cef73443c15111a1df14e495c706");
    const WINNER: Address = address!("00000000000000000000000000000000000000aa");

    fn auction() -> ContractHandle {
        ContractHandle::from_description(AUCTION, &InterfaceDescription::new(AUCTION_ABI)).unwrap()
    }

    fn settled_log(id: u64, amount: u128, block: Option<u64>) -> Log {
        let selector = auction().event("AuctionSettled").unwrap().selector();
        let mut data = Vec::new();
        data.extend_from_slice(WINNER.into_word().as_slice());
        data.extend_from_slice(&U256::from(amount).to_be_bytes::<32>());

        Log {
            inner: alloy::primitives::Log {
                address: AUCTION,
                data: LogData::new_unchecked(
                    vec![selector, TokenId::from(id).as_topic()],
                    data.into(),
                ),
            },
            block_number: block,
            ..Default::default()
        }
    }

    fn locator(chain: MockChain) -> ChainSettlementLocator {
        ChainSettlementLocator::new(
            Arc::new(chain),
            auction(),
            ChainSettlementLocator::DEFAULT_EVENT,
            0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn no_logs_means_not_yet_occurred() {
        let mut chain = MockChain::new();
        chain.expect_logs().times(1).returning(|_| Ok(Vec::new()));
        chain.expect_lookup_name().never();
        chain.expect_block_timestamp().never();

        let settlement = locator(chain).find_settlement(TokenId::from(7)).await.unwrap();

        assert_eq!(settlement, Settlement::NotYetOccurred);
    }

    #[tokio::test]
    async fn decodes_first_matching_log() {
        let mut chain = MockChain::new();
        chain.expect_logs().returning(|_| {
            Ok(vec![
                settled_log(7, 1_234_500_000_000_000_000, Some(100)),
                settled_log(7, 9_000_000_000_000_000_000, Some(200)),
            ])
        });
        chain
            .expect_lookup_name()
            .with(predicate::eq(WINNER))
            .returning(|_| Ok(Some("alice.eth".to_string())));
        chain
            .expect_block_timestamp()
            .with(predicate::eq(100))
            .returning(|_| Ok(1_700_000_000));

        let settlement = locator(chain).find_settlement(TokenId::from(7)).await.unwrap();

        assert_eq!(
            settlement,
            Settlement::Settled(SettlementRecord {
                id: TokenId::from(7),
                winner: "alice.eth".to_string(),
                amount: Decimal::new(123, 2),
                settled_at: 1_700_000_000,
            })
        );
    }

    #[tokio::test]
    async fn falls_back_to_checksummed_address() {
        let mut chain = MockChain::new();
        chain
            .expect_logs()
            .returning(|_| Ok(vec![settled_log(3, 1_000_000_000_000_000_000, Some(5))]));
        chain.expect_lookup_name().returning(|_| Ok(None));
        chain.expect_block_timestamp().returning(|_| Ok(0));

        let Settlement::Settled(record) =
            locator(chain).find_settlement(TokenId::from(3)).await.unwrap()
        else {
            panic!("expected a settlement");
        };

        assert_eq!(record.winner, WINNER.to_string());
        assert_eq!(record.amount.to_string(), "1");
    }

    #[tokio::test]
    async fn transport_failure_is_not_pending() {
        let mut chain = MockChain::new();
        chain.expect_logs().returning(|_| {
            Err(ChainError::Transport(TransportErrorKind::custom_str(
                "connection reset",
            )))
        });

        let result = locator(chain).find_settlement(TokenId::from(7)).await;

        assert!(matches!(result, Err(LocatorError::Chain(_))));
    }

    #[tokio::test]
    async fn log_without_block_is_rejected() {
        let mut chain = MockChain::new();
        chain
            .expect_logs()
            .returning(|_| Ok(vec![settled_log(7, 1, None)]));

        let result = locator(chain).find_settlement(TokenId::from(7)).await;

        assert!(matches!(
            result,
            Err(LocatorError::MissingBlockNumber { id }) if id == TokenId::from(7)
        ));
    }

    #[test]
    fn requires_settlement_event_in_abi() {
        let result = ChainSettlementLocator::new(
            Arc::new(MockChain::new()),
            auction(),
            "AuctionCreated",
            0,
        );

        assert!(matches!(result, Err(InterfaceError::UnknownEvent { .. })));
    }
}
