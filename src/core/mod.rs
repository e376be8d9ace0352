//! Core business logic - framework-agnostic ledger, referral, and profile
//! operations. Nothing in here knows about HTTP; the API layer is a thin
//! translation over these functions.

/// Profile aggregation (read-side statistics)
pub mod profile;
/// Referral relationship establishment and bonus awards
pub mod referral;
/// Ledger engine: recording and deleting transactions
pub mod transaction;
/// User provisioning and profile updates
pub mod user;
/// Wallet creation and atomic balance updates
pub mod wallet;
