//! Protocol Variant Definitions
//!
//! Each marketplace flow is one `ProtocolVariant`: an expected group size, a
//! slot spec per position, cross-slot identity bindings, and distinctness
//! requirements between parties. Variants are plain static data interpreted
//! by the engine; there is exactly one interpreter instead of one hand-inlined
//! condition body per flow.
//!
//! Records are positional within an atomic group on the ledger, so each spec
//! pins the role of its slot directly. Evaluation is O(group size) and a
//! record in the wrong position fails that position's predicate.

use crate::deployment::TradeKind;
use crate::types::TxnKind;
use serde::Serialize;

/// Identifies one protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantId {
    /// Seller funds an escrow, the escrow opts in, the seller deposits the
    /// asset.
    Listing,
    /// Escrow returns the asset and its balance to the seller.
    Unlisting,
    /// Buyer pays seller/platform/royalty and takes the asset out of escrow.
    DirectPurchase,
    /// Buyer reclaims the funds locked behind a standing offer.
    OfferWithdrawal,
    /// Seller takes a standing offer: escrow pays out, seller sends the
    /// asset straight to the buyer.
    OfferAcceptance,
    /// Escrow-less purchase with a deadline.
    DirectSale,
}

impl VariantId {
    pub fn name(&self) -> &'static str {
        match self {
            VariantId::Listing => "listing",
            VariantId::Unlisting => "unlisting",
            VariantId::DirectPurchase => "direct-purchase",
            VariantId::OfferWithdrawal => "offer-withdrawal",
            VariantId::OfferAcceptance => "offer-acceptance",
            VariantId::DirectSale => "direct-sale",
        }
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A party referenced by a slot predicate.
///
/// Named parties resolve against the deployment's bound addresses; bound
/// parties resolve against the group itself via the variant's `bindings`
/// (e.g. "the escrow is whoever sent slot 4") and are then required to recur
/// unchanged at every slot that references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRef {
    Seller,
    Buyer,
    Platform,
    Royalty,
    Creator,
    /// The escrow account introduced by one slot of the group.
    Escrow,
    /// An otherwise-unconstrained account introduced by one slot.
    Counterparty,
}

impl PartyRef {
    pub fn name(&self) -> &'static str {
        match self {
            PartyRef::Seller => "seller",
            PartyRef::Buyer => "buyer",
            PartyRef::Platform => "platform",
            PartyRef::Royalty => "royalty",
            PartyRef::Creator => "creator",
            PartyRef::Escrow => "escrow",
            PartyRef::Counterparty => "counterparty",
        }
    }
}

/// Which record field a binding is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingField {
    Sender,
    Receiver,
}

/// Derives a party's identity from one slot of the group, once, before any
/// slot predicate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub party: PartyRef,
    pub slot: usize,
    pub field: BindingField,
}

/// An amount constraint, resolved against the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRef {
    /// Exactly zero; an opt-in or a pure group-binding leg.
    Zero,
    /// Exactly one unit of the (indivisible) asset.
    One,
    Price,
    PlatformFee,
    RoyaltyFee,
    InitFee,
    /// Everything a standing offer locked up: price + royalty + platform fee.
    OfferRefund,
    CreatorCut,
    SellerCut,
    PlatformCut,
}

/// Close-out constraint for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSpec {
    /// The close-out field must be empty.
    Forbidden,
    /// The slot must close out to this party.
    To(PartyRef),
    /// Close-out is not constrained.
    Any,
}

/// The predicate for one position of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub kind: TxnKind,
    pub sender: PartyRef,
    pub receiver: PartyRef,
    pub amount: AmountRef,
    pub close: CloseSpec,
}

/// One protocol variant: a named, ordered predicate over the slots of a
/// fixed-size group. Pure data, constructed once, interpreted by the engine.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolVariant {
    pub id: VariantId,
    pub size: usize,
    pub slots: &'static [SlotSpec],
    pub bindings: &'static [Binding],
    /// Pairs of parties that must resolve to different accounts. The name is
    /// the diagnostic label reported on violation.
    pub distinct: &'static [(PartyRef, PartyRef, &'static str)],
    /// Whether slot 0's first-valid round must precede the deployment's
    /// deadline.
    pub deadline: bool,
}

use self::AmountRef as A;
use self::BindingField as F;
use self::CloseSpec as C;
use self::PartyRef as P;
use crate::types::TxnKind as K;

/// Seller lists an asset: fund the escrow, escrow opts in, asset moves in.
pub static LISTING: ProtocolVariant = ProtocolVariant {
    id: VariantId::Listing,
    size: 3,
    slots: &[
        // Seller funds escrow.
        SlotSpec {
            kind: K::Payment,
            sender: P::Seller,
            receiver: P::Escrow,
            amount: A::InitFee,
            close: C::Forbidden,
        },
        // Escrow opts in to the asset.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Escrow,
            receiver: P::Escrow,
            amount: A::Zero,
            close: C::Forbidden,
        },
        // Seller deposits the asset.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Seller,
            receiver: P::Escrow,
            amount: A::One,
            close: C::Forbidden,
        },
    ],
    bindings: &[Binding {
        party: P::Escrow,
        slot: 0,
        field: F::Receiver,
    }],
    distinct: &[],
    deadline: false,
};

/// Seller unlists: opt back in, asset comes back with a close-out, escrow
/// pays its residual balance back to the seller.
pub static UNLISTING: ProtocolVariant = ProtocolVariant {
    id: VariantId::Unlisting,
    size: 3,
    slots: &[
        // Seller opts back in.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Seller,
            receiver: P::Seller,
            amount: A::Zero,
            close: C::Forbidden,
        },
        // Escrow returns the asset, closing its holding to the seller.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Escrow,
            receiver: P::Seller,
            amount: A::One,
            close: C::To(P::Seller),
        },
        // Escrow closes its balance out to the seller.
        SlotSpec {
            kind: K::Payment,
            sender: P::Escrow,
            receiver: P::Seller,
            amount: A::Zero,
            close: C::To(P::Seller),
        },
    ],
    bindings: &[Binding {
        party: P::Escrow,
        slot: 1,
        field: F::Sender,
    }],
    distinct: &[],
    deadline: false,
};

/// Buyer purchases an escrow-held asset: three payment legs, opt-in, asset
/// out of escrow, escrow account closed back to the seller.
pub static DIRECT_PURCHASE: ProtocolVariant = ProtocolVariant {
    id: VariantId::DirectPurchase,
    size: 6,
    slots: &[
        // Buyer pays seller.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Seller,
            amount: A::Price,
            close: C::Forbidden,
        },
        // Buyer pays platform.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Platform,
            amount: A::PlatformFee,
            close: C::Forbidden,
        },
        // Buyer pays royalty recipient.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Royalty,
            amount: A::RoyaltyFee,
            close: C::Forbidden,
        },
        // Buyer opts in to the asset.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Buyer,
            receiver: P::Buyer,
            amount: A::Zero,
            close: C::Forbidden,
        },
        // Escrow hands over the asset, closing the holding to the buyer.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Escrow,
            receiver: P::Buyer,
            amount: A::One,
            close: C::To(P::Buyer),
        },
        // Escrow closes its residual balance out to the seller.
        SlotSpec {
            kind: K::Payment,
            sender: P::Escrow,
            receiver: P::Seller,
            amount: A::Zero,
            close: C::To(P::Seller),
        },
    ],
    bindings: &[
        Binding {
            party: P::Buyer,
            slot: 0,
            field: F::Sender,
        },
        Binding {
            party: P::Escrow,
            slot: 4,
            field: F::Sender,
        },
    ],
    // A degenerate self-trade through the escrow would bypass the fee legs.
    distinct: &[(P::Buyer, P::Escrow, "buyer-escrow-distinct")],
    deadline: false,
};

/// Buyer withdraws a standing offer: a zero-amount self-payment binds the
/// group, then the escrow refunds everything it locked.
pub static OFFER_WITHDRAWAL: ProtocolVariant = ProtocolVariant {
    id: VariantId::OfferWithdrawal,
    size: 2,
    slots: &[
        // Buyer-signed confirmation leg.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Buyer,
            amount: A::Zero,
            close: C::Forbidden,
        },
        // Escrow refunds the full locked amount and closes to the buyer.
        SlotSpec {
            kind: K::Payment,
            sender: P::Escrow,
            receiver: P::Buyer,
            amount: A::OfferRefund,
            close: C::To(P::Buyer),
        },
    ],
    bindings: &[Binding {
        party: P::Escrow,
        slot: 1,
        field: F::Sender,
    }],
    distinct: &[(P::Escrow, P::Buyer, "escrow-buyer-distinct")],
    deadline: false,
};

/// Seller accepts a standing offer: escrow pays price and royalty (closing
/// its remainder to the platform), seller sends the asset straight to the
/// buyer.
pub static OFFER_ACCEPTANCE: ProtocolVariant = ProtocolVariant {
    id: VariantId::OfferAcceptance,
    size: 3,
    slots: &[
        // Escrow pays the seller the asset price.
        SlotSpec {
            kind: K::Payment,
            sender: P::Escrow,
            receiver: P::Seller,
            amount: A::Price,
            close: C::Forbidden,
        },
        // Escrow pays the royalty recipient, remainder to the platform.
        SlotSpec {
            kind: K::Payment,
            sender: P::Escrow,
            receiver: P::Royalty,
            amount: A::RoyaltyFee,
            close: C::To(P::Platform),
        },
        // Seller sends the asset directly to the buyer.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Seller,
            receiver: P::Buyer,
            amount: A::One,
            close: C::Forbidden,
        },
    ],
    bindings: &[
        Binding {
            party: P::Escrow,
            slot: 0,
            field: F::Sender,
        },
        Binding {
            party: P::Seller,
            slot: 2,
            field: F::Sender,
        },
    ],
    distinct: &[
        (P::Escrow, P::Buyer, "escrow-buyer-distinct"),
        (P::Escrow, P::Seller, "escrow-seller-distinct"),
    ],
    deadline: false,
};

/// Escrow-less purchase before a deadline: buyer opts in, pays three cuts,
/// and receives the asset from any account other than their own.
pub static DIRECT_SALE: ProtocolVariant = ProtocolVariant {
    id: VariantId::DirectSale,
    size: 5,
    slots: &[
        // Buyer opts in to the asset.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Buyer,
            receiver: P::Buyer,
            amount: A::Zero,
            close: C::Forbidden,
        },
        // Buyer pays creator cut.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Creator,
            amount: A::CreatorCut,
            close: C::Forbidden,
        },
        // Buyer pays seller cut.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Seller,
            amount: A::SellerCut,
            close: C::Forbidden,
        },
        // Buyer pays platform cut.
        SlotSpec {
            kind: K::Payment,
            sender: P::Buyer,
            receiver: P::Platform,
            amount: A::PlatformCut,
            close: C::Forbidden,
        },
        // Asset arrives from the counterparty.
        SlotSpec {
            kind: K::AssetTransfer,
            sender: P::Counterparty,
            receiver: P::Buyer,
            amount: A::One,
            close: C::Any,
        },
    ],
    bindings: &[Binding {
        party: P::Counterparty,
        slot: 4,
        field: F::Sender,
    }],
    distinct: &[(P::Counterparty, P::Buyer, "counterparty-buyer-distinct")],
    deadline: true,
};

static ESCROW_LISTING_VARIANTS: [&ProtocolVariant; 3] = [&LISTING, &UNLISTING, &DIRECT_PURCHASE];
static STANDING_OFFER_VARIANTS: [&ProtocolVariant; 2] = [&OFFER_WITHDRAWAL, &OFFER_ACCEPTANCE];
static DIRECT_SALE_VARIANTS: [&ProtocolVariant; 1] = [&DIRECT_SALE];

/// The variants applicable to one trade kind, in match priority order.
///
/// Variants of the same trade are mutually exclusive by construction
/// (distinct sizes or incompatible slot-kind sequences), so the order only
/// decides whose diagnostics a caller sees first.
pub fn variants_for(trade: TradeKind) -> &'static [&'static ProtocolVariant] {
    match trade {
        TradeKind::EscrowListing => &ESCROW_LISTING_VARIANTS,
        TradeKind::StandingOffer => &STANDING_OFFER_VARIANTS,
        TradeKind::DirectSale => &DIRECT_SALE_VARIANTS,
    }
}

/// Look up a variant by id.
pub fn variant_by_id(id: VariantId) -> &'static ProtocolVariant {
    match id {
        VariantId::Listing => &LISTING,
        VariantId::Unlisting => &UNLISTING,
        VariantId::DirectPurchase => &DIRECT_PURCHASE,
        VariantId::OfferWithdrawal => &OFFER_WITHDRAWAL,
        VariantId::OfferAcceptance => &OFFER_ACCEPTANCE,
        VariantId::DirectSale => &DIRECT_SALE,
    }
}
