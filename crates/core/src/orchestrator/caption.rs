use chrono::{DateTime, Utc};

use crate::types::{SettlementRecord, TokenId};

/// Wording used for every post.
#[derive(Clone, Debug)]
pub struct Captions {
    pub item_label: String,
    pub reserved_recipient: String,
    pub currency_symbol: String,
}

impl Default for Captions {
    fn default() -> Self {
        Self {
            item_label: "Noun".to_string(),
            reserved_recipient: "the Nounders".to_string(),
            currency_symbol: "ETH".to_string(),
        }
    }
}

impl Captions {
    const DATE_FORMAT: &'static str = "%-m-%-d-%y";

    pub fn direct_mint(&self, id: TokenId) -> String {
        format!(
            "{} {id} was minted to {}",
            self.item_label, self.reserved_recipient
        )
    }

    pub fn settled(&self, record: &SettlementRecord) -> String {
        format!(
            "{} {} was auctioned for {} {} to {} on {}",
            self.item_label,
            record.id,
            record.amount,
            self.currency_symbol,
            record.winner,
            format_date(record.settled_at),
        )
    }

    pub fn story(&self, id: TokenId) -> String {
        format!("{} {id}", self.item_label)
    }
}

fn format_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|date| date.format(Captions::DATE_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn settled_caption() {
        let record = SettlementRecord {
            id: TokenId::from(42),
            winner: "alice.eth".to_string(),
            amount: Decimal::new(123, 2),
            settled_at: 1_700_000_000,
        };

        assert_eq!(
            Captions::default().settled(&record),
            "Noun 42 was auctioned for 1.23 ETH to alice.eth on 11-14-23"
        );
    }

    #[test]
    fn months_are_one_based() {
        // 2024-01-05T12:00:00Z
        assert_eq!(format_date(1_704_456_000), "1-5-24");
    }

    #[test]
    fn direct_mint_and_story_captions() {
        let captions = Captions::default();

        assert_eq!(
            captions.direct_mint(TokenId::from(10)),
            "Noun 10 was minted to the Nounders"
        );
        assert_eq!(captions.story(TokenId::from(11)), "Noun 11");
    }

    #[test]
    fn custom_wording() {
        let captions = Captions {
            item_label: "Lil Noun".to_string(),
            reserved_recipient: "the Lil Nounders".to_string(),
            currency_symbol: "Ξ".to_string(),
        };

        assert_eq!(
            captions.direct_mint(TokenId::from(20)),
            "Lil Noun 20 was minted to the Lil Nounders"
        );
    }
}
