//! Validation Engine
//!
//! The top-level entry point and the single generic interpreter for protocol
//! variants. Given a transaction group and a bound deployment, the engine
//! tries every variant applicable to the deployment's trade kind in priority
//! order and returns the first accept, or the most informative rejection if
//! none accept.
//!
//! Per variant, evaluation runs: generic invariants, deadline (if any),
//! cross-slot binding resolution, distinctness checks, then each slot
//! predicate left to right. Everything is a pure function of the group and
//! the deployment; the engine holds no mutable state and may be shared
//! freely across threads.

use crate::deployment::Deployment;
use crate::types::{Address, RejectReason, TransactionGroup, TransactionRecord, TxnKind, Verdict};
use crate::validation::invariants;
use crate::validation::variants::{
    self, AmountRef, BindingField, CloseSpec, PartyRef, ProtocolVariant, SlotSpec, VariantId,
};
use tracing::{debug, warn};

/// Cross-slot identities resolved once per group, before any slot predicate
/// runs. Each bound party is read from its designated slot and then compared
/// wherever it recurs.
#[derive(Debug, Default, Clone, Copy)]
struct BoundParties {
    escrow: Option<Address>,
    buyer: Option<Address>,
    seller: Option<Address>,
    counterparty: Option<Address>,
}

impl BoundParties {
    fn set(&mut self, party: PartyRef, address: Address) {
        match party {
            PartyRef::Escrow => self.escrow = Some(address),
            PartyRef::Buyer => self.buyer = Some(address),
            PartyRef::Seller => self.seller = Some(address),
            PartyRef::Counterparty => self.counterparty = Some(address),
            // Platform/royalty/creator identities only ever come from the
            // deployment, never from the group.
            _ => {}
        }
    }

    fn get(&self, party: PartyRef) -> Option<Address> {
        match party {
            PartyRef::Escrow => self.escrow,
            PartyRef::Buyer => self.buyer,
            PartyRef::Seller => self.seller,
            PartyRef::Counterparty => self.counterparty,
            _ => None,
        }
    }
}

/// An address bound by the deployment, if the deployment's trade kind binds
/// that party at all.
fn deployment_party(deployment: &Deployment, party: PartyRef) -> Option<Address> {
    match deployment {
        Deployment::EscrowListing(p) => match party {
            PartyRef::Seller => Some(p.seller),
            PartyRef::Platform => Some(p.platform),
            PartyRef::Royalty => Some(p.royalty),
            _ => None,
        },
        Deployment::StandingOffer(p) => match party {
            PartyRef::Buyer => Some(p.buyer),
            PartyRef::Platform => Some(p.platform),
            PartyRef::Royalty => Some(p.royalty),
            _ => None,
        },
        Deployment::DirectSale(p) => match party {
            PartyRef::Buyer => Some(p.buyer),
            PartyRef::Creator => Some(p.creator),
            PartyRef::Seller => Some(p.seller),
            PartyRef::Platform => Some(p.platform),
            _ => None,
        },
    }
}

/// Resolve a party reference: identities bound from the group win over the
/// deployment's template addresses.
fn resolve_party(
    party: PartyRef,
    deployment: &Deployment,
    bound: &BoundParties,
) -> Option<Address> {
    bound.get(party).or_else(|| deployment_party(deployment, party))
}

/// Resolve an amount reference against the deployment's bound parameters.
fn resolve_amount(amount: AmountRef, deployment: &Deployment) -> Option<u64> {
    match (amount, deployment) {
        (AmountRef::Zero, _) => Some(0),
        (AmountRef::One, _) => Some(1),
        (AmountRef::Price, Deployment::EscrowListing(p)) => Some(p.price),
        (AmountRef::PlatformFee, Deployment::EscrowListing(p)) => Some(p.platform_fee),
        (AmountRef::RoyaltyFee, Deployment::EscrowListing(p)) => Some(p.royalty_fee),
        (AmountRef::InitFee, Deployment::EscrowListing(p)) => Some(p.init_fee),
        (AmountRef::Price, Deployment::StandingOffer(p)) => Some(p.price),
        (AmountRef::PlatformFee, Deployment::StandingOffer(p)) => Some(p.platform_fee),
        (AmountRef::RoyaltyFee, Deployment::StandingOffer(p)) => Some(p.royalty_fee),
        // A sum that overflows cannot be paid by any record, so it resolves
        // to no amount at all and the slot predicate rejects.
        (AmountRef::OfferRefund, Deployment::StandingOffer(p)) => p
            .price
            .checked_add(p.royalty_fee)
            .and_then(|sum| sum.checked_add(p.platform_fee)),
        (AmountRef::CreatorCut, Deployment::DirectSale(p)) => Some(p.creator_cut),
        (AmountRef::SellerCut, Deployment::DirectSale(p)) => Some(p.seller_cut),
        (AmountRef::PlatformCut, Deployment::DirectSale(p)) => Some(p.platform_cut),
        _ => None,
    }
}

fn fail(slot: usize, predicate: &'static str) -> RejectReason {
    RejectReason::SlotPredicateFailed { slot, predicate }
}

/// How far a variant got before rejecting, used to pick the most informative
/// diagnostics when several variants share a group size. A size mismatch
/// ranks below everything; slot-level failures rank by slot index.
fn progress(reason: &RejectReason) -> i64 {
    match reason {
        RejectReason::SizeMismatch { .. } => -1,
        RejectReason::CrossSlotBindingViolated { .. } => 0,
        RejectReason::InvariantViolation { slot, .. } => *slot as i64,
        RejectReason::SlotPredicateFailed { slot, .. } => *slot as i64,
    }
}

/// Check one slot's predicate fields in order: kind, sender, receiver,
/// amount, asset id, close-out. The first mismatch names the field.
fn check_slot(
    slot: usize,
    spec: &SlotSpec,
    record: &TransactionRecord,
    deployment: &Deployment,
    bound: &BoundParties,
) -> Result<(), RejectReason> {
    if record.kind() != spec.kind {
        return Err(fail(slot, "kind"));
    }

    if resolve_party(spec.sender, deployment, bound) != Some(record.sender) {
        return Err(fail(slot, "sender"));
    }

    if resolve_party(spec.receiver, deployment, bound) != Some(record.receiver()) {
        return Err(fail(slot, "receiver"));
    }

    if resolve_amount(spec.amount, deployment) != Some(record.amount()) {
        return Err(fail(slot, "amount"));
    }

    // Every asset-transfer slot must move the deployment's bound asset.
    if record.kind() == TxnKind::AssetTransfer
        && record.asset_id() != Some(deployment.asset_id())
    {
        return Err(fail(slot, "asset-id"));
    }

    match spec.close {
        CloseSpec::Forbidden => {
            if record.close_to().is_some() {
                return Err(fail(slot, "close-to"));
            }
        }
        CloseSpec::To(party) => {
            if record.close_to() != resolve_party(party, deployment, bound) {
                return Err(fail(slot, "close-to"));
            }
        }
        CloseSpec::Any => {}
    }

    Ok(())
}

/// Evaluate one variant against a group under a deployment.
pub fn eval_variant(
    variant: &ProtocolVariant,
    deployment: &Deployment,
    group: &TransactionGroup,
) -> Result<(), RejectReason> {
    invariants::check(group, variant.size)?;

    // The only temporal constraint: the group must become valid before the
    // deployment's deadline round.
    if variant.deadline {
        let deadline = match deployment {
            Deployment::DirectSale(p) => Some(p.deadline),
            _ => None,
        };
        let first_valid = group.get(0).map(|r| r.first_valid_round);
        match (first_valid, deadline) {
            (Some(round), Some(deadline)) if round < deadline => {}
            _ => return Err(fail(0, "deadline")),
        }
    }

    // Resolve cross-slot identities once, from their designated slots.
    let mut bound = BoundParties::default();
    for binding in variant.bindings {
        let record = group
            .get(binding.slot)
            .ok_or(RejectReason::SizeMismatch {
                expected: variant.size,
                got: group.len(),
            })?;
        let address = match binding.field {
            BindingField::Sender => record.sender,
            BindingField::Receiver => record.receiver(),
        };
        bound.set(binding.party, address);
    }

    for &(a, b, name) in variant.distinct {
        let left = resolve_party(a, deployment, &bound);
        let right = resolve_party(b, deployment, &bound);
        match (left, right) {
            (Some(left), Some(right)) if left != right => {}
            _ => return Err(RejectReason::CrossSlotBindingViolated { binding: name }),
        }
    }

    for (slot, spec) in variant.slots.iter().enumerate() {
        let record = group.get(slot).ok_or(RejectReason::SizeMismatch {
            expected: variant.size,
            got: group.len(),
        })?;
        check_slot(slot, spec, record, deployment, &bound)?;
    }

    Ok(())
}

/// Top-level validator for one deployment.
///
/// Holds the deployment and its applicable variant list; read-only after
/// construction, so one engine may serve arbitrarily many concurrent
/// validation calls.
pub struct ValidationEngine {
    deployment: Deployment,
    variants: &'static [&'static ProtocolVariant],
}

impl ValidationEngine {
    /// Create an engine for one bound deployment.
    pub fn new(deployment: Deployment) -> Self {
        let variants = variants::variants_for(deployment.trade());
        Self {
            deployment,
            variants,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Validate a group against every applicable variant, in priority order.
    ///
    /// Returns the first variant that accepts. If none accept, the rejection
    /// carries the diagnostics of the variant that matched the group most
    /// closely (deepest failure; ties go to priority order), so callers see
    /// which leg of the trade is malformed rather than just "wrong size".
    pub fn validate(&self, group: &TransactionGroup) -> Verdict {
        let mut best: Option<(VariantId, RejectReason)> = None;

        for variant in self.variants {
            match eval_variant(variant, &self.deployment, group) {
                Ok(()) => {
                    debug!("group matched variant {}", variant.id);
                    #[cfg(debug_assertions)]
                    self.assert_mutually_exclusive(variant.id, group);
                    return Verdict::Accepted { variant: variant.id };
                }
                Err(reason) => {
                    debug!("variant {} rejected group: {}", variant.id, reason);
                    let deeper = best
                        .as_ref()
                        .is_none_or(|(_, b)| progress(&reason) > progress(b));
                    if deeper {
                        best = Some((variant.id, reason));
                    }
                }
            }
        }

        let (variant, reason) = match best {
            Some(found) => found,
            // The variant list of a trade kind is never empty; this arm only
            // keeps the verdict total.
            None => (
                VariantId::Listing,
                RejectReason::SizeMismatch {
                    expected: 0,
                    got: group.len(),
                },
            ),
        };

        warn!("group rejected (closest variant {}): {}", variant, reason);
        Verdict::Rejected { variant, reason }
    }

    /// Validate a group against exactly one variant (the caller's hint),
    /// skipping the priority scan.
    pub fn validate_variant(
        &self,
        group: &TransactionGroup,
        id: VariantId,
    ) -> Result<(), RejectReason> {
        eval_variant(variants::variant_by_id(id), &self.deployment, group)
    }

    /// Variants of one deployment are mutually exclusive by construction
    /// (distinct sizes or incompatible slot-kind sequences). Two variants
    /// accepting the same group is a definition defect, fatal in test builds.
    #[cfg(debug_assertions)]
    fn assert_mutually_exclusive(&self, accepted: VariantId, group: &TransactionGroup) {
        for variant in self.variants.iter().filter(|v| v.id != accepted) {
            debug_assert!(
                eval_variant(variant, &self.deployment, group).is_err(),
                "variants {} and {} both accept the same group",
                accepted,
                variant.id
            );
        }
    }
}
