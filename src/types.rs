//! Common data types shared across the crate
//!
//! Defines the ledger-facing records (addresses, transaction records, groups)
//! and the verdict/rejection types produced by the validation engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum network fee in microalgos.
///
/// Every transaction in a valid group pays exactly this fee; over- or
/// under-paying is rejected to rule out fee-skimming between the parties.
pub const MIN_TXN_FEE: u64 = 1_000;

/// 32-byte account address.
///
/// Serialized as a 64-character hex string. Only equality matters to the
/// validator; checksum/format validation is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The zero address, used by the ledger to mean "no account".
    pub const ZERO: Address = Address([0u8; 32]);
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| AddressParseError::BadLength(b.len()))?;
        Ok(Address(bytes))
    }
}

/// Errors produced when parsing an address from its hex form.
#[derive(Error, Debug)]
pub enum AddressParseError {
    #[error("address is not valid hex: {0}")]
    BadHex(#[from] hex::FromHexError),

    #[error("address must be 32 bytes, got {0}")]
    BadLength(usize),
}

/// Transaction kind within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxnKind {
    Payment,
    AssetTransfer,
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxnKind::Payment => write!(f, "payment"),
            TxnKind::AssetTransfer => write!(f, "asset-transfer"),
        }
    }
}

/// Kind-specific fields of a transaction record.
///
/// Payments move microalgos and may close the sender's entire balance to
/// `close_remainder_to`. Asset transfers move units of one asset and may
/// close the sender's holding of that asset to `asset_close_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TxnPayload {
    Payment {
        receiver: Address,
        amount: u64,
        #[serde(default)]
        close_remainder_to: Option<Address>,
    },
    AssetTransfer {
        asset_receiver: Address,
        asset_amount: u64,
        asset_id: u64,
        #[serde(default)]
        asset_close_to: Option<Address>,
        /// Clawback sender; non-empty means the transfer is pulled out of a
        /// third account under clawback authority.
        #[serde(default)]
        asset_sender: Option<Address>,
    },
}

/// One ledger operation inside an atomic group.
///
/// Immutable once constructed; the validator only ever reads records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub sender: Address,
    pub fee: u64,
    /// Dedup token; normally empty.
    #[serde(default)]
    pub lease: Option<[u8; 32]>,
    /// Signing-authority reassignment target; normally empty.
    #[serde(default)]
    pub rekey_to: Option<Address>,
    /// First round at which the record is valid; only read for deadlines.
    #[serde(default)]
    pub first_valid_round: u64,
    #[serde(flatten)]
    pub payload: TxnPayload,
}

impl TransactionRecord {
    pub fn kind(&self) -> TxnKind {
        match self.payload {
            TxnPayload::Payment { .. } => TxnKind::Payment,
            TxnPayload::AssetTransfer { .. } => TxnKind::AssetTransfer,
        }
    }

    /// The receiving account: payment receiver or asset receiver.
    pub fn receiver(&self) -> Address {
        match &self.payload {
            TxnPayload::Payment { receiver, .. } => *receiver,
            TxnPayload::AssetTransfer { asset_receiver, .. } => *asset_receiver,
        }
    }

    /// Transferred quantity: microalgos for payments, units for assets.
    pub fn amount(&self) -> u64 {
        match &self.payload {
            TxnPayload::Payment { amount, .. } => *amount,
            TxnPayload::AssetTransfer { asset_amount, .. } => *asset_amount,
        }
    }

    /// Asset id, for asset transfers only.
    pub fn asset_id(&self) -> Option<u64> {
        match &self.payload {
            TxnPayload::Payment { .. } => None,
            TxnPayload::AssetTransfer { asset_id, .. } => Some(*asset_id),
        }
    }

    /// The close-out target relevant to this record's kind.
    pub fn close_to(&self) -> Option<Address> {
        match &self.payload {
            TxnPayload::Payment {
                close_remainder_to, ..
            } => *close_remainder_to,
            TxnPayload::AssetTransfer { asset_close_to, .. } => *asset_close_to,
        }
    }

    /// Clawback sender, for asset transfers only.
    pub fn clawback_sender(&self) -> Option<Address> {
        match &self.payload {
            TxnPayload::Payment { .. } => None,
            TxnPayload::AssetTransfer { asset_sender, .. } => *asset_sender,
        }
    }
}

/// An ordered, atomic batch of transaction records.
///
/// Atomicity (all-or-nothing execution) is enforced by the ledger; the
/// validator only inspects content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionGroup {
    pub records: Vec<TransactionRecord>,
}

impl TransactionGroup {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&TransactionRecord> {
        self.records.get(slot)
    }
}

/// Group-wide safety field checked by the generic invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvariantField {
    Fee,
    Clawback,
    Lease,
    Rekey,
}

impl std::fmt::Display for InvariantField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantField::Fee => write!(f, "fee"),
            InvariantField::Clawback => write!(f, "clawback"),
            InvariantField::Lease => write!(f, "lease"),
            InvariantField::Rekey => write!(f, "rekey"),
        }
    }
}

/// Why a group failed to match a protocol variant.
///
/// All rejections are recoverable: callers may try another variant or report
/// which leg of the proposed trade is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    #[error("group size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    #[error("slot {slot} violates group invariant {field}")]
    InvariantViolation { slot: usize, field: InvariantField },

    #[error("slot {slot} failed predicate {predicate}")]
    SlotPredicateFailed {
        slot: usize,
        predicate: &'static str,
    },

    #[error("cross-slot binding violated: {binding}")]
    CrossSlotBindingViolated { binding: &'static str },
}

/// Outcome of validating one group against a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Accepted {
        variant: crate::validation::VariantId,
    },
    Rejected {
        /// The variant whose diagnostics are reported (the closest match).
        variant: crate::validation::VariantId,
        reason: RejectReason,
    },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}
