//! Integration tests for the custody wallet engine.
//!
//! These exercise the full lifecycle across module boundaries: creation,
//! approval accumulation, auto-execution at quorum, the explicit execution
//! fallback, cancellation, signer churn, and owner recovery.

use aegis_engine::config::ADDRESS_LENGTH;
use aegis_engine::dispatch::{DispatchOutcome, NullDispatcher, RecordingDispatcher};
use aegis_engine::events::WalletEvent;
use aegis_engine::identity::Address;
use aegis_engine::txn::TxId;
use aegis_engine::wallet::{CustodyWallet, WalletError};

/// Helper: an address whose 20 bytes are all `byte`.
fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; ADDRESS_LENGTH])
}

const OWNER: u8 = 0x01;
const SIGNER_A: u8 = 0x02;
const SIGNER_B: u8 = 0x03;
const RECOVERY: u8 = 0x0f;
const DESTINATION: u8 = 0x20;

/// Helper: owner 0x01, signers {A, B}, quorum 2, recovery 0x0f — the
/// deployment shape of the reference scenario.
fn two_of_two() -> CustodyWallet {
    CustodyWallet::new(
        addr(OWNER),
        vec![addr(SIGNER_A), addr(SIGNER_B)],
        2,
        addr(RECOVERY),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// The reference scenario: quorum 2, approve, approve, done
// ---------------------------------------------------------------------------

#[test]
fn quorum_two_full_lifecycle() {
    let mut wallet = two_of_two();
    let mut dispatcher = RecordingDispatcher::new();

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 1_000, vec![0x12, 0x34])
        .unwrap();

    // First approval: count 1, no execution, explicit execute refused.
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    assert_eq!(wallet.approval_count(&id), 1);
    assert!(!wallet.transaction(&id).unwrap().executed);
    assert!(matches!(
        wallet.execute_transaction(addr(SIGNER_A), id, &mut dispatcher),
        Err(WalletError::QuorumNotMet {
            approvals: 1,
            required: 2
        })
    ));

    // Second approval: quorum reached, executes within the same call.
    wallet
        .approve_transaction(addr(SIGNER_B), id, &mut dispatcher)
        .unwrap();
    assert!(wallet.transaction(&id).unwrap().executed);

    // Exactly one outbound call, carrying the stored triple.
    assert_eq!(dispatcher.calls.len(), 1);
    assert_eq!(dispatcher.calls[0].destination, addr(DESTINATION));
    assert_eq!(dispatcher.calls[0].value, 1_000);
    assert_eq!(dispatcher.calls[0].payload, vec![0x12, 0x34]);

    // Everything afterwards is AlreadyExecuted.
    assert!(matches!(
        wallet.approve_transaction(addr(SIGNER_A), id, &mut dispatcher),
        Err(WalletError::AlreadyExecuted(_))
    ));
    assert!(matches!(
        wallet.execute_transaction(addr(SIGNER_B), id, &mut dispatcher),
        Err(WalletError::AlreadyExecuted(_))
    ));
    assert!(matches!(
        wallet.cancel_transaction(addr(OWNER), id),
        Err(WalletError::AlreadyExecuted(_))
    ));

    // And the dispatcher was not called again.
    assert_eq!(dispatcher.calls.len(), 1);
}

#[test]
fn execution_happens_exactly_once_per_record() {
    let mut wallet = two_of_two();
    let mut dispatcher = RecordingDispatcher::new();

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 0, vec![])
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_B), id, &mut dispatcher)
        .unwrap();

    let executed = wallet
        .events()
        .events()
        .filter(|e| matches!(e, WalletEvent::Executed { .. }))
        .count();
    assert_eq!(executed, 1);
    assert_eq!(dispatcher.calls.len(), 1);
}

// ---------------------------------------------------------------------------
// Deterministic ids
// ---------------------------------------------------------------------------

#[test]
fn unique_id_is_predictable_before_creation() {
    let mut wallet = two_of_two();
    let predicted = CustodyWallet::unique_id(&addr(DESTINATION), 77, b"settle");

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 77, b"settle".to_vec())
        .unwrap();
    assert_eq!(id, predicted);
}

#[test]
fn different_triples_produce_different_ids() {
    let a = TxId::derive(&addr(DESTINATION), 100, b"abcdef");
    let b = TxId::derive(&addr(0x21), 200, b"123456");
    assert_ne!(a, b);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancel_before_approval_then_approve_is_not_found() {
    let mut wallet = two_of_two();
    let mut dispatcher = NullDispatcher;

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 0, vec![])
        .unwrap();
    wallet.cancel_transaction(addr(OWNER), id).unwrap();

    assert!(matches!(
        wallet.events().events().last().unwrap(),
        WalletEvent::Cancelled { id: eid } if *eid == id
    ));
    assert!(matches!(
        wallet.approve_transaction(addr(SIGNER_A), id, &mut dispatcher),
        Err(WalletError::NotFound(_))
    ));
}

#[test]
fn cancel_discards_recorded_approvals() {
    let mut wallet = two_of_two();
    let mut dispatcher = NullDispatcher;

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 0, vec![])
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    wallet.cancel_transaction(addr(OWNER), id).unwrap();

    // Re-create the same triple: same id, clean slate.
    let id2 = wallet
        .create_transaction(addr(SIGNER_B), addr(DESTINATION), 0, vec![])
        .unwrap();
    assert_eq!(id, id2);
    assert_eq!(wallet.approval_count(&id), 0);
    assert!(!wallet.has_approved(&id, &addr(SIGNER_A)));
}

#[test]
fn cancel_of_unknown_id_is_not_found() {
    let mut wallet = two_of_two();
    let id = CustodyWallet::unique_id(&addr(DESTINATION), 0, b"never");
    assert!(matches!(
        wallet.cancel_transaction(addr(OWNER), id),
        Err(WalletError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Signer churn under quorum
// ---------------------------------------------------------------------------

#[test]
fn removal_below_quorum_is_refused_and_state_unchanged() {
    let mut wallet = two_of_two();

    let result = wallet.remove_signer(addr(OWNER), addr(SIGNER_A));
    assert!(result.is_err());
    assert!(wallet.is_signer(&addr(SIGNER_A)));
    assert_eq!(wallet.signer_count(), 2);
}

#[test]
fn grow_then_shrink_roster() {
    let mut wallet = two_of_two();

    wallet.add_signer(addr(OWNER), addr(0x04)).unwrap();
    assert_eq!(wallet.signer_count(), 3);
    assert_eq!(wallet.signer_at(2), Some(addr(0x04)));

    wallet.remove_signer(addr(OWNER), addr(SIGNER_A)).unwrap();
    assert_eq!(wallet.signer_count(), 2);
    // Order of the survivors is preserved.
    assert_eq!(wallet.signer_at(0), Some(addr(SIGNER_B)));
    assert_eq!(wallet.signer_at(1), Some(addr(0x04)));
}

#[test]
fn only_owner_manages_signers() {
    let mut wallet = two_of_two();
    assert!(wallet.add_signer(addr(SIGNER_A), addr(0x04)).is_err());
    assert!(wallet.remove_signer(addr(SIGNER_A), addr(SIGNER_B)).is_err());
}

// ---------------------------------------------------------------------------
// Recovery channel
// ---------------------------------------------------------------------------

#[test]
fn recovery_scenario() {
    let mut wallet = two_of_two();

    // The recovery identity may not install itself.
    assert!(matches!(
        wallet.recover_wallet(addr(RECOVERY), addr(RECOVERY)),
        Err(WalletError::InvalidRecoveryTarget)
    ));

    // Any other target succeeds, unconditionally.
    wallet.recover_wallet(addr(RECOVERY), addr(0x09)).unwrap();
    assert_eq!(wallet.owner(), addr(0x09));

    // The new owner holds owner powers; the old one does not.
    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 0, vec![])
        .unwrap();
    assert!(wallet.cancel_transaction(addr(OWNER), id).is_err());
    wallet.cancel_transaction(addr(0x09), id).unwrap();
}

#[test]
fn recovery_refused_for_other_callers() {
    let mut wallet = two_of_two();
    for caller in [OWNER, SIGNER_A, 0x63] {
        assert!(matches!(
            wallet.recover_wallet(addr(caller), addr(0x09)),
            Err(WalletError::Unauthorized { .. })
        ));
    }
    assert_eq!(wallet.owner(), addr(OWNER));
}

// ---------------------------------------------------------------------------
// Fire-and-forget dispatch
// ---------------------------------------------------------------------------

#[test]
fn failed_dispatch_still_finalizes() {
    // The engine deliberately does not roll back `executed` when the
    // outbound call fails. This pins that behavior.
    let mut wallet = two_of_two();
    let mut dispatcher = RecordingDispatcher::failing();

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 5_000, vec![])
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_B), id, &mut dispatcher)
        .unwrap();

    assert_eq!(dispatcher.outcome, DispatchOutcome::Failed);
    assert_eq!(dispatcher.calls.len(), 1);
    assert!(wallet.transaction(&id).unwrap().executed);
    assert!(wallet
        .events()
        .events()
        .any(|e| matches!(e, WalletEvent::Executed { id: eid } if *eid == id)));

    // No retry is possible — the record is spent.
    assert!(matches!(
        wallet.execute_transaction(addr(SIGNER_A), id, &mut dispatcher),
        Err(WalletError::AlreadyExecuted(_))
    ));
}

// ---------------------------------------------------------------------------
// Event log shape
// ---------------------------------------------------------------------------

#[test]
fn event_log_records_the_whole_story() {
    let mut wallet = two_of_two();
    let mut dispatcher = NullDispatcher;

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 9, vec![0xaa])
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_B), id, &mut dispatcher)
        .unwrap();

    let events: Vec<_> = wallet.events().events().cloned().collect();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], WalletEvent::Created { .. }));
    assert!(matches!(events[1], WalletEvent::Approved { approver, .. } if approver == addr(SIGNER_A)));
    assert!(matches!(events[2], WalletEvent::Approved { approver, .. } if approver == addr(SIGNER_B)));
    assert!(matches!(events[3], WalletEvent::Executed { .. }));

    // Sequence numbers are gapless.
    for (i, entry) in wallet.events().entries().iter().enumerate() {
        assert_eq!(entry.seq, i as u64);
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn wallet_state_roundtrips_through_json() {
    let mut wallet = two_of_two();
    let mut dispatcher = NullDispatcher;

    let id = wallet
        .create_transaction(addr(SIGNER_A), addr(DESTINATION), 9, vec![0xaa])
        .unwrap();
    wallet
        .approve_transaction(addr(SIGNER_A), id, &mut dispatcher)
        .unwrap();
    wallet.add_signer(addr(OWNER), addr(0x04)).unwrap();

    let json = serde_json::to_string_pretty(&wallet).unwrap();
    let restored: CustodyWallet = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.owner(), wallet.owner());
    assert_eq!(restored.signer_count(), 3);
    assert_eq!(restored.approval_count(&id), 1);
    assert_eq!(restored.events().len(), wallet.events().len());

    // The restored wallet keeps operating where the old one left off.
    let mut restored = restored;
    restored
        .approve_transaction(addr(SIGNER_B), id, &mut dispatcher)
        .unwrap();
    assert!(restored.transaction(&id).unwrap().executed);
}
