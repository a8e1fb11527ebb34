use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::transactions::TransactionType;

/// Locks XRP until the escrow process either finishes or is canceled.
///
/// See EscrowCreate:
/// `<https://xrpl.org/escrowcreate.html>`
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowCreateTx {
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// Address of the promoter account that funds the escrow.
    pub account: String,
    /// Address to receive the escrowed XRP.
    pub destination: String,
    /// Amount of XRP, in drops, to deduct from the sender's balance and
    /// escrow. Rendered as a decimal string per the XRPL JSON convention.
    pub amount: String,
    /// The time, in seconds since the Ripple Epoch, when the escrowed XRP can
    /// be released to the recipient.
    pub finish_after: i64,
    /// The time, in seconds since the Ripple Epoch, when this escrow expires
    /// and the funds can only revert to the sender. Bonus purses only.
    pub cancel_after: Option<i64>,
    /// Hex value representing a PREIMAGE-SHA-256 crypto-condition. The funds
    /// can only be delivered if this condition is fulfilled. Bonus purses
    /// only.
    pub condition: Option<String>,
}
