use rust_decimal::Decimal;

use super::primitives::TokenId;

#[derive(Clone, Debug, PartialEq)]
pub struct SettlementRecord {
    pub id: TokenId,
    /// Verified ENS name of the winner, or the checksummed address.
    pub winner: String,
    /// Native units, already rounded for display.
    pub amount: Decimal,
    pub settled_at: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    Settled(SettlementRecord),
    NotYetOccurred,
}
