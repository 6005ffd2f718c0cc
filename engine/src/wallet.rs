//! # Custody Wallet — Approval & Execution Engine
//!
//! [`CustodyWallet`] is the state machine the rest of the crate exists to
//! serve. It owns the signer roster, the transaction ledger, and the event
//! log, and exposes every operation the hosting runtime may invoke on
//! behalf of an authenticated caller.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──> Pending ──(approvals accumulate)──> Executed   (terminal)
//!               │
//!               └──(owner cancels)────────────> removed     (terminal)
//! ```
//!
//! Approval and execution are fused: the approval that reaches quorum
//! executes the transaction within the same call, closing the window
//! between reaching quorum and acting on it. [`execute_transaction`]
//! (callable by anyone) exists as the explicit retry path for the cases
//! the fused path skipped.
//!
//! ## Reentrancy
//!
//! The `executed` flag is set *before* the outbound dispatch. A dispatcher
//! that calls back into the engine for the same id observes spent state
//! and is rejected with `AlreadyExecuted`.
//!
//! [`execute_transaction`]: CustodyWallet::execute_transaction

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::events::{EventLog, WalletEvent};
use crate::identity::{Address, RosterError, SignerRoster};
use crate::txn::{TxId, TxRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during wallet operations.
///
/// Every variant is terminal for the triggering call and implies that no
/// state was written: all preconditions are checked before the first
/// mutation.
#[derive(Debug, Error)]
pub enum WalletError {
    /// A signer-set mutation failed (authorization, membership, quorum).
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// The caller lacks the role this operation requires.
    #[error("unauthorized: caller {caller} may not {action}")]
    Unauthorized {
        /// The address that attempted the operation.
        caller: Address,
        /// What was attempted.
        action: &'static str,
    },

    /// The referenced transaction has no active record — never created,
    /// or cancelled (the two are indistinguishable by design).
    #[error("transaction {0} does not exist")]
    NotFound(TxId),

    /// Explicit execution attempted before enough approvals were recorded.
    #[error("quorum not met: {approvals} of {required} required approvals")]
    QuorumNotMet {
        /// Distinct current signers that have approved.
        approvals: usize,
        /// The configured quorum.
        required: usize,
    },

    /// The transaction is already finalized.
    #[error("transaction {0} has already been executed")]
    AlreadyExecuted(TxId),

    /// Recovery attempted with the recovery identity itself as new owner.
    #[error("new owner must not be the recovery address")]
    InvalidRecoveryTarget,
}

// ---------------------------------------------------------------------------
// CustodyWallet
// ---------------------------------------------------------------------------

/// The quorum custody engine: roster + ledger + event log.
///
/// The host serializes all access — one shared store, run-to-completion
/// calls. The struct itself is plain owned data and snapshots to JSON in
/// one piece.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustodyWallet {
    /// Authorization table.
    roster: SignerRoster,

    /// Active transaction records, keyed by content-addressed id.
    /// A `BTreeMap` so snapshots serialize in a deterministic order.
    transactions: BTreeMap<TxId, TxRecord>,

    /// Insertion-ordered id list, append-only. Cancellation removes the
    /// record but never its list entries; re-creation appends again.
    transaction_list: Vec<TxId>,

    /// Append-only audit trail.
    events: EventLog,
}

impl CustodyWallet {
    /// Builds a wallet from its initial configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`RosterError`] for an empty signer list, duplicate
    /// initial signers, or an out-of-range quorum.
    pub fn new(
        owner: Address,
        signers: Vec<Address>,
        required_signatures: usize,
        recovery_address: Address,
    ) -> Result<Self, RosterError> {
        let roster = SignerRoster::new(owner, signers, required_signatures, recovery_address)?;
        tracing::info!(
            owner = %roster.owner(),
            signers = roster.signer_count(),
            quorum = roster.required_signatures(),
            "custody wallet created"
        );
        Ok(Self {
            roster,
            transactions: BTreeMap::new(),
            transaction_list: Vec::new(),
            events: EventLog::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.roster.owner()
    }

    /// The fixed recovery identity.
    pub fn recovery_address(&self) -> Address {
        self.roster.recovery_address()
    }

    /// The quorum threshold.
    pub fn required_signatures(&self) -> usize {
        self.roster.required_signatures()
    }

    /// Signer membership test.
    pub fn is_signer(&self, identity: &Address) -> bool {
        self.roster.is_signer(identity)
    }

    /// The signer at `index` in insertion order, if any.
    pub fn signer_at(&self, index: usize) -> Option<Address> {
        self.roster.signer_at(index)
    }

    /// Number of signers.
    pub fn signer_count(&self) -> usize {
        self.roster.signer_count()
    }

    /// The active record for `id`. `None` for ids that were never created
    /// — or that were cancelled, which looks identical from here.
    pub fn transaction(&self, id: &TxId) -> Option<&TxRecord> {
        self.transactions.get(id)
    }

    /// The id at `index` in the append-only creation list. Entries survive
    /// cancellation and repeat on re-creation.
    pub fn transaction_id_at(&self, index: usize) -> Option<TxId> {
        self.transaction_list.get(index).copied()
    }

    /// Length of the append-only creation list.
    pub fn transaction_count(&self) -> usize {
        self.transaction_list.len()
    }

    /// Whether `identity` has approved `id`. `false` for unknown ids.
    pub fn has_approved(&self, id: &TxId, identity: &Address) -> bool {
        self.transactions
            .get(id)
            .map(|record| record.has_approved(identity))
            .unwrap_or(false)
    }

    /// Number of *current* signers that have approved `id`. Approvals from
    /// since-removed signers are stored but do not count. `0` for unknown
    /// ids.
    pub fn approval_count(&self, id: &TxId) -> usize {
        self.transactions
            .get(id)
            .map(|record| self.counted_approvals(record))
            .unwrap_or(0)
    }

    /// The audit trail.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Computes the id the triple would be stored under — without creating
    /// anything. Pure; the public twin of the derivation used internally.
    pub fn unique_id(destination: &Address, value: u64, payload: &[u8]) -> TxId {
        TxId::derive(destination, value, payload)
    }

    // -----------------------------------------------------------------------
    // Transaction Ledger
    // -----------------------------------------------------------------------

    /// Creates a transaction proposing an outbound call.
    ///
    /// The id is a pure function of the triple. If a record already exists
    /// under that id — pending, executed, or re-created after cancellation
    /// — the slot is reinitialized: fresh record, empty approvals, and
    /// another entry in the creation list.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Unauthorized`] unless `caller` is a current
    /// signer.
    pub fn create_transaction(
        &mut self,
        caller: Address,
        destination: Address,
        value: u64,
        payload: Vec<u8>,
    ) -> Result<TxId, WalletError> {
        if !self.roster.is_signer(&caller) {
            return Err(WalletError::Unauthorized {
                caller,
                action: "create transactions",
            });
        }

        let id = TxId::derive(&destination, value, &payload);
        let previous = self
            .transactions
            .insert(id, TxRecord::new(destination, value, payload.clone()));
        self.transaction_list.push(id);

        if previous.is_some() {
            tracing::warn!(%id, "transaction slot reinitialized by identical triple");
        }
        tracing::info!(%id, %destination, value, creator = %caller, "transaction created");

        self.events.append(WalletEvent::Created {
            id,
            destination,
            value,
            payload,
        });
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Approval & Execution
    // -----------------------------------------------------------------------

    /// Records the caller's approval and executes the transaction if this
    /// approval reaches quorum.
    ///
    /// Approval is idempotent per signer, but the `Approved` event is
    /// emitted on every call — including repeats — so the audit trail
    /// mirrors what was asked, not just what changed.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Unauthorized`] unless `caller` is a current
    /// signer, [`WalletError::NotFound`] if no active record exists, and
    /// [`WalletError::AlreadyExecuted`] if the transaction is finalized.
    pub fn approve_transaction(
        &mut self,
        caller: Address,
        id: TxId,
        dispatcher: &mut dyn Dispatcher,
    ) -> Result<(), WalletError> {
        if !self.roster.is_signer(&caller) {
            return Err(WalletError::Unauthorized {
                caller,
                action: "approve transactions",
            });
        }

        let record = self
            .transactions
            .get_mut(&id)
            .ok_or(WalletError::NotFound(id))?;

        if record.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }

        let fresh = record.approve(caller);
        let approvals = {
            let record = &*record;
            self.roster
                .signers()
                .iter()
                .filter(|signer| record.has_approved(signer))
                .count()
        };
        let ready = approvals >= self.roster.required_signatures();

        tracing::info!(%id, approver = %caller, approvals, fresh, "transaction approved");
        self.events.append(WalletEvent::Approved {
            id,
            approver: caller,
        });

        if ready {
            self.finalize(id, dispatcher);
        }
        Ok(())
    }

    /// Explicit execution entry point. Callable by anyone — quorum, not
    /// identity, is the gate here.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotFound`] if no active record exists,
    /// [`WalletError::AlreadyExecuted`] if the transaction is finalized,
    /// and [`WalletError::QuorumNotMet`] if fewer than the required number
    /// of current signers have approved.
    pub fn execute_transaction(
        &mut self,
        caller: Address,
        id: TxId,
        dispatcher: &mut dyn Dispatcher,
    ) -> Result<(), WalletError> {
        let record = self.transactions.get(&id).ok_or(WalletError::NotFound(id))?;

        if record.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }

        let approvals = self.counted_approvals(record);
        let required = self.roster.required_signatures();
        if approvals < required {
            return Err(WalletError::QuorumNotMet {
                approvals,
                required,
            });
        }

        tracing::info!(%id, executor = %caller, approvals, "explicit execution");
        self.finalize(id, dispatcher);
        Ok(())
    }

    /// Cancels a pending transaction, discarding its record and approvals.
    ///
    /// The creation-list entries for the id remain; the id itself becomes
    /// indistinguishable from one that never existed.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Unauthorized`] unless `caller` is the owner,
    /// [`WalletError::NotFound`] if no active record exists, and
    /// [`WalletError::AlreadyExecuted`] if the transaction is finalized.
    pub fn cancel_transaction(&mut self, caller: Address, id: TxId) -> Result<(), WalletError> {
        if caller != self.roster.owner() {
            return Err(WalletError::Unauthorized {
                caller,
                action: "cancel transactions",
            });
        }

        let record = self.transactions.get(&id).ok_or(WalletError::NotFound(id))?;
        if record.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }

        self.transactions.remove(&id);
        tracing::info!(%id, "transaction cancelled");
        self.events.append(WalletEvent::Cancelled { id });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Signer Management
    // -----------------------------------------------------------------------

    /// Adds a signer. Owner only; see [`SignerRoster::add_signer`].
    pub fn add_signer(&mut self, caller: Address, identity: Address) -> Result<(), WalletError> {
        self.roster.add_signer(caller, identity)?;
        self.events.append(WalletEvent::SignerAdded { signer: identity });
        Ok(())
    }

    /// Removes a signer. Owner only, quorum-guarded; see
    /// [`SignerRoster::remove_signer`].
    pub fn remove_signer(&mut self, caller: Address, identity: Address) -> Result<(), WalletError> {
        self.roster.remove_signer(caller, identity)?;
        self.events
            .append(WalletEvent::SignerRemoved { signer: identity });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Recovery Channel
    // -----------------------------------------------------------------------

    /// Replaces the owner. Single-key escape hatch: no quorum, no signer
    /// involvement — only the fixed recovery identity may call this, and
    /// it may not install itself as owner.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Unauthorized`] unless `caller` is the
    /// recovery address, and [`WalletError::InvalidRecoveryTarget`] if
    /// `new_owner` equals the recovery address.
    pub fn recover_wallet(&mut self, caller: Address, new_owner: Address) -> Result<(), WalletError> {
        if caller != self.roster.recovery_address() {
            return Err(WalletError::Unauthorized {
                caller,
                action: "recover the wallet",
            });
        }
        if new_owner == self.roster.recovery_address() {
            return Err(WalletError::InvalidRecoveryTarget);
        }

        let previous = self.roster.replace_owner(new_owner);
        tracing::warn!(%previous, %new_owner, "owner replaced via recovery channel");
        self.events.append(WalletEvent::OwnerRecovered {
            previous,
            new_owner,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Distinct *current* signers with a recorded approval on `record`.
    fn counted_approvals(&self, record: &TxRecord) -> usize {
        self.roster
            .signers()
            .iter()
            .filter(|signer| record.has_approved(signer))
            .count()
    }

    /// Marks the record executed, performs the outbound call, emits the
    /// execution event. The flag flips before the dispatch so reentrant
    /// calls observe spent state; the dispatch outcome is logged and
    /// otherwise ignored.
    fn finalize(&mut self, id: TxId, dispatcher: &mut dyn Dispatcher) {
        let (destination, value, payload) = {
            let record = self
                .transactions
                .get_mut(&id)
                .expect("finalize called with a checked id");
            record.mark_executed();
            (record.destination, record.value, record.payload.clone())
        };

        let outcome = dispatcher.dispatch(&destination, value, &payload);
        match outcome {
            DispatchOutcome::Delivered => {
                tracing::info!(%id, %destination, value, "transaction executed");
            }
            DispatchOutcome::Failed => {
                // Not surfaced to the caller: the transaction stays executed.
                tracing::warn!(%id, %destination, value, "outbound dispatch failed");
            }
        }

        self.events.append(WalletEvent::Executed { id });
    }
}
