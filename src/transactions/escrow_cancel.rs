use serde::{Deserialize, Serialize};

use crate::transactions::TransactionType;

/// Returns escrowed XRP to the sender after the escrow has expired.
///
/// See EscrowCancel:
/// `<https://xrpl.org/escrowcancel.html>`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EscrowCancelTx {
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// Address of the account submitting the cancel.
    pub account: String,
    /// Address of the source account that funded the escrow.
    pub owner: String,
    /// Transaction sequence of the EscrowCreate that created the escrow.
    pub offer_sequence: u32,
}
