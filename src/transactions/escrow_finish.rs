use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::transactions::TransactionType;

/// Delivers escrowed XRP from a held payment to the recipient.
///
/// See EscrowFinish:
/// `<https://xrpl.org/escrowfinish.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowFinishTx {
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// Address of the account submitting the finish.
    pub account: String,
    /// Address of the source account that funded the held payment.
    pub owner: String,
    /// Transaction sequence of the EscrowCreate that created the held payment.
    pub offer_sequence: u32,
    /// Hex preimage matching the held payment's PREIMAGE-SHA-256 condition.
    /// Present only for the winner's bonus purse.
    pub fulfillment: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_serde() {
        let tx = EscrowFinishTx {
            transaction_type: TransactionType::EscrowFinish,
            account: "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".to_string(),
            owner: "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn".to_string(),
            offer_sequence: 7,
            fulfillment: Some("A0028000".to_string()),
        };
        let expected = r#"{"TransactionType":"EscrowFinish","Account":"rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn","Owner":"rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn","OfferSequence":7,"Fulfillment":"A0028000"}"#;

        let serialized = serde_json::to_value(&tx).unwrap();
        let expected_value: serde_json::Value = serde_json::from_str(expected).unwrap();
        assert_eq!(serialized, expected_value);

        let deserialized: EscrowFinishTx = serde_json::from_str(expected).unwrap();
        assert_eq!(tx, deserialized);
    }
}
