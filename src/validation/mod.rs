//! Transaction-Group Validation Module
//!
//! Decides whether an ordered, atomic group of transfer records is a
//! legitimate instance of one of a deployment's marketplace protocol
//! variants:
//! - **invariants**: ledger-wide safety checks shared by every variant
//!   (size, fees, clawback, leases, rekeys)
//! - **variants**: the six flows (listing, unlisting, direct purchase,
//!   offer withdrawal, offer acceptance, escrow-less direct sale) expressed
//!   as static slot-spec data
//! - **engine**: the single generic interpreter and the top-level
//!   `ValidationEngine`

pub mod invariants;
mod engine;
mod variants;


pub use engine::{ValidationEngine, eval_variant};
pub use variants::{
    AmountRef, Binding, BindingField, CloseSpec, PartyRef, ProtocolVariant, SlotSpec, VariantId,
    variant_by_id, variants_for,
};
