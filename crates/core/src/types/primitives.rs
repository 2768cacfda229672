use std::{fmt, num::NonZeroU64, str::FromStr};

use alloy::primitives::{B256, U256};
use rust_decimal::{Decimal, RoundingStrategy};

/// Auction and token identifier. The reconciliation cursor is one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(U256);

impl TokenId {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// `None` once the id space is exhausted.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(U256::from(1)).map(Self)
    }

    pub fn is_multiple_of(&self, modulus: NonZeroU64) -> bool {
        (self.0 % U256::from(modulus.get())).is_zero()
    }

    /// Indexed event parameters carry the id as a big-endian word.
    pub fn as_topic(&self) -> B256 {
        B256::from(self.0.to_be_bytes::<32>())
    }

    pub fn from_topic(topic: B256) -> Self {
        Self(U256::from_be_bytes(topic.0))
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for TokenId {
    type Err = <U256 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str(s).map(Self)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Amount in the chain's base units (wei).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeiAmount(U256);

impl WeiAmount {
    pub const DECIMALS: u32 = 18;
    pub const DISPLAY_PLACES: u32 = 2;

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Whole native units rounded half-up to two places, trailing zeros dropped.
    /// `None` when the amount does not fit a 96-bit decimal mantissa.
    pub fn to_native(&self) -> Option<Decimal> {
        let raw = i128::try_from(u128::try_from(self.0).ok()?).ok()?;
        let value = Decimal::try_from_i128_with_scale(raw, Self::DECIMALS).ok()?;
        Some(
            value
                .round_dp_with_strategy(Self::DISPLAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(raw: u128) -> WeiAmount {
        WeiAmount::new(U256::from(raw))
    }

    #[test]
    fn formats_amount_to_two_places() {
        assert_eq!(wei(1_234_500_000_000_000_000).to_native().unwrap().to_string(), "1.23");
        assert_eq!(wei(1_500_000_000_000_000_000).to_native().unwrap().to_string(), "1.5");
        assert_eq!(wei(2_000_000_000_000_000_000).to_native().unwrap().to_string(), "2");
        assert_eq!(wei(5_000_000_000_000_000).to_native().unwrap().to_string(), "0.01");
        assert_eq!(wei(0).to_native().unwrap().to_string(), "0");
    }

    #[test]
    fn rejects_amounts_beyond_decimal_range() {
        assert!(WeiAmount::new(U256::MAX).to_native().is_none());
    }

    #[test]
    fn token_id_steps_and_matches_modulus() {
        let ten = NonZeroU64::new(10).unwrap();
        let id = TokenId::from(9);

        assert!(!id.is_multiple_of(ten));
        assert!(id.next().unwrap().is_multiple_of(ten));
        assert!(TokenId::from(0).is_multiple_of(ten));
        assert_eq!(id.next().unwrap().to_string(), "10");
    }

    #[test]
    fn last_token_id_has_no_successor() {
        assert_eq!(TokenId::new(U256::MAX).next(), None);
        assert_eq!(
            TokenId::new(U256::MAX - U256::from(1)).next(),
            Some(TokenId::new(U256::MAX))
        );
    }

    #[test]
    fn token_id_topic_is_big_endian_word() {
        let id = TokenId::from(0x1234);
        let topic = id.as_topic();

        assert_eq!(topic[30..], [0x12, 0x34]);
        assert!(topic[..30].iter().all(|byte| *byte == 0));
        assert_eq!(TokenId::from_topic(topic), id);
    }

    #[test]
    fn parses_decimal_and_hex_ids() {
        assert_eq!("42".parse::<TokenId>().unwrap(), TokenId::from(42));
        assert_eq!("0x2a".parse::<TokenId>().unwrap(), TokenId::from(42));
        assert!("forty-two".parse::<TokenId>().is_err());
    }
}
