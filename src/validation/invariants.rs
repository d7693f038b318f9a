//! Generic Group Invariants
//!
//! Ledger-wide safety checks applied to every protocol variant before any
//! business predicate runs:
//! - exact group size,
//! - every slot pays exactly the minimum network fee,
//! - no clawback senders,
//! - no leases,
//! - no rekeys.
//!
//! Each rules out a known griefing vector: fee deltas skim value between the
//! parties, a clawback transfer spends out of an account the signer does not
//! control, a crafted lease can block unrelated future transactions from the
//! same sender, and a rekey hijacks signing authority mid-flow.

use crate::types::{InvariantField, MIN_TXN_FEE, RejectReason, TransactionGroup};

/// Check the generic invariants of a group against an expected size.
///
/// Pure function of its inputs. Reports the first violation as
/// `InvariantViolation { slot, field }`; a size mismatch short-circuits
/// before any per-slot check.
pub fn check(group: &TransactionGroup, expected_size: usize) -> Result<(), RejectReason> {
    if group.len() != expected_size {
        return Err(RejectReason::SizeMismatch {
            expected: expected_size,
            got: group.len(),
        });
    }

    // One field at a time across the whole group: all fees, then all
    // clawbacks, then leases, then rekeys.
    for (slot, record) in group.records.iter().enumerate() {
        if record.fee != MIN_TXN_FEE {
            return Err(violation(slot, InvariantField::Fee));
        }
    }
    for (slot, record) in group.records.iter().enumerate() {
        if record.clawback_sender().is_some() {
            return Err(violation(slot, InvariantField::Clawback));
        }
    }
    for (slot, record) in group.records.iter().enumerate() {
        if record.lease.is_some() {
            return Err(violation(slot, InvariantField::Lease));
        }
    }
    for (slot, record) in group.records.iter().enumerate() {
        if record.rekey_to.is_some() {
            return Err(violation(slot, InvariantField::Rekey));
        }
    }

    Ok(())
}

fn violation(slot: usize, field: InvariantField) -> RejectReason {
    RejectReason::InvariantViolation { slot, field }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, TransactionRecord, TxnPayload};

    fn payment(sender: Address, receiver: Address, amount: u64) -> TransactionRecord {
        TransactionRecord {
            sender,
            fee: MIN_TXN_FEE,
            lease: None,
            rekey_to: None,
            first_valid_round: 0,
            payload: TxnPayload::Payment {
                receiver,
                amount,
                close_remainder_to: None,
            },
        }
    }

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[test]
    fn accepts_clean_group() {
        let group = TransactionGroup::new(vec![
            payment(addr(1), addr(2), 100),
            payment(addr(2), addr(1), 50),
        ]);
        assert!(check(&group, 2).is_ok());
    }

    #[test]
    fn size_mismatch_short_circuits() {
        // Nonzero fee delta in slot 0 must not be reported when the size is
        // already wrong.
        let mut record = payment(addr(1), addr(2), 100);
        record.fee = 0;
        let group = TransactionGroup::new(vec![record]);
        assert_eq!(
            check(&group, 3),
            Err(RejectReason::SizeMismatch {
                expected: 3,
                got: 1
            })
        );
    }

    #[test]
    fn rejects_fee_delta() {
        let mut record = payment(addr(1), addr(2), 100);
        record.fee = MIN_TXN_FEE + 1;
        let group = TransactionGroup::new(vec![payment(addr(1), addr(2), 1), record]);
        assert_eq!(
            check(&group, 2),
            Err(RejectReason::InvariantViolation {
                slot: 1,
                field: InvariantField::Fee
            })
        );
    }

    #[test]
    fn rejects_lease_and_rekey() {
        let mut leased = payment(addr(1), addr(2), 100);
        leased.lease = Some([7u8; 32]);
        let group = TransactionGroup::new(vec![leased]);
        assert_eq!(
            check(&group, 1),
            Err(RejectReason::InvariantViolation {
                slot: 0,
                field: InvariantField::Lease
            })
        );

        let mut rekeyed = payment(addr(1), addr(2), 100);
        rekeyed.rekey_to = Some(addr(9));
        let group = TransactionGroup::new(vec![rekeyed]);
        assert_eq!(
            check(&group, 1),
            Err(RejectReason::InvariantViolation {
                slot: 0,
                field: InvariantField::Rekey
            })
        );
    }

    #[test]
    fn checks_each_field_across_whole_group() {
        // A fee delta anywhere in the group is reported before a lease in an
        // earlier slot.
        let mut leased = payment(addr(1), addr(2), 100);
        leased.lease = Some([7u8; 32]);
        let mut underpaid = payment(addr(2), addr(1), 50);
        underpaid.fee = MIN_TXN_FEE - 1;
        let group = TransactionGroup::new(vec![leased, underpaid]);
        assert_eq!(
            check(&group, 2),
            Err(RejectReason::InvariantViolation {
                slot: 1,
                field: InvariantField::Fee
            })
        );
    }

    #[test]
    fn rejects_clawback_sender() {
        let record = TransactionRecord {
            sender: addr(1),
            fee: MIN_TXN_FEE,
            lease: None,
            rekey_to: None,
            first_valid_round: 0,
            payload: TxnPayload::AssetTransfer {
                asset_receiver: addr(2),
                asset_amount: 1,
                asset_id: 42,
                asset_close_to: None,
                asset_sender: Some(addr(3)),
            },
        };
        let group = TransactionGroup::new(vec![record]);
        assert_eq!(
            check(&group, 1),
            Err(RejectReason::InvariantViolation {
                slot: 0,
                field: InvariantField::Clawback
            })
        );
    }
}
