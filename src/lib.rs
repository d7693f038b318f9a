//! This crate validates escrow-based marketplace protocols for indivisible
//! tokenized assets traded as atomic transaction groups on an Algorand-style
//! ledger. Given an ordered batch of transfer records and one bound trade
//! deployment, it decides whether the batch is a legitimate instance of a
//! protocol variant and reports the match or structured diagnostics.

pub mod types; // Ledger records, groups, verdicts, and rejection reasons.
pub mod deployment; // Template-parameter binding for one concrete trade.
pub mod validation; // Group invariants, protocol variants, and the engine.

// Re-export commonly used types for easier access.
pub use types::*;
pub use deployment::{Deployment, DeploymentConfig, TradeKind};
pub use validation::{ValidationEngine, VariantId};
