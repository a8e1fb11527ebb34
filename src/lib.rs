//! Off-chain orchestration of prize-fight payouts settled on the XRP Ledger.
//!
//! A promoter funds four conditional escrows per bout (two show purses, two
//! bonus purses carrying PREIMAGE-SHA-256 conditions), an administrator records
//! the winner, and this crate plans the EscrowCreate/EscrowFinish/EscrowCancel
//! payloads, validates the ledger confirmations that come back, and drives the
//! bout and escrow state machines. It never signs, submits, or watches the
//! ledger itself: unsigned transactions go out through the signing adapter and
//! observed confirmations come back through the confirm endpoints.

pub mod api;
pub mod auth;
pub mod conditions;
pub mod config;
pub mod confirmation;
pub mod failure;
pub mod idempotency;
pub mod models;
pub mod services;
pub mod store;
pub mod transactions;
pub mod utils;
pub mod xaman;
