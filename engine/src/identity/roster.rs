//! # Signer Roster
//!
//! The authorization table of the engine: one owner, an ordered sequence of
//! unique signers, the quorum threshold, and the fixed recovery identity.
//!
//! ## Invariants
//!
//! - The signer sequence never contains duplicates.
//! - `1 <= required_signatures <= signers.len()` at all times; every
//!   mutation of the signer set re-checks this before writing.
//! - `recovery_address` is immutable after construction — there is no
//!   setter, deliberately.
//! - The owner is replaced only through the wallet's recovery channel;
//!   the setter is `pub(crate)` so no outside caller can reach it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during roster operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    /// The caller does not hold the role this operation requires.
    #[error("unauthorized: caller {caller} is not the owner")]
    Unauthorized {
        /// The address that attempted the operation.
        caller: Address,
    },

    /// The address is already in the signer set.
    #[error("address {0} is already a signer")]
    DuplicateSigner(Address),

    /// The address is not in the signer set.
    #[error("address {0} is not a signer")]
    UnknownSigner(Address),

    /// Removing the signer would drop the set below the quorum threshold.
    #[error("cannot remove signer: {remaining} signers would remain, quorum requires {required}")]
    QuorumViolation {
        /// Signer count after the attempted removal.
        remaining: usize,
        /// The configured quorum.
        required: usize,
    },

    /// The initial signer list was empty.
    #[error("signer set must not be empty")]
    EmptySignerSet,

    /// The quorum is zero or exceeds the signer count.
    #[error("quorum {required} out of range for {signers} signers")]
    QuorumOutOfRange {
        /// The requested quorum.
        required: usize,
        /// The size of the signer set.
        signers: usize,
    },
}

// ---------------------------------------------------------------------------
// SignerRoster
// ---------------------------------------------------------------------------

/// Owner, signers, quorum, and recovery identity.
///
/// The roster answers two questions for the rest of the engine: *is this
/// caller allowed to do that*, and *how many distinct approvals does a
/// transaction need*. It owns no transaction state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignerRoster {
    /// The identity entitled to manage the signer set and cancel
    /// transactions. Mutable only via the recovery channel.
    owner: Address,

    /// Ordered, duplicate-free signer sequence. Order is observable through
    /// [`signer_at`](Self::signer_at) and survives removals.
    signers: Vec<Address>,

    /// Minimum number of distinct signer approvals required to execute
    /// a transaction.
    required_signatures: usize,

    /// The identity entitled to replace the owner unilaterally.
    /// Immutable after construction.
    recovery_address: Address,
}

impl SignerRoster {
    /// Builds a roster from its initial configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::EmptySignerSet`] if `signers` is empty,
    /// [`RosterError::DuplicateSigner`] if the list repeats an address, and
    /// [`RosterError::QuorumOutOfRange`] unless
    /// `1 <= required_signatures <= signers.len()`.
    pub fn new(
        owner: Address,
        signers: Vec<Address>,
        required_signatures: usize,
        recovery_address: Address,
    ) -> Result<Self, RosterError> {
        if signers.is_empty() {
            return Err(RosterError::EmptySignerSet);
        }

        for (i, signer) in signers.iter().enumerate() {
            if signers[..i].contains(signer) {
                return Err(RosterError::DuplicateSigner(*signer));
            }
        }

        if required_signatures == 0 || required_signatures > signers.len() {
            return Err(RosterError::QuorumOutOfRange {
                required: required_signatures,
                signers: signers.len(),
            });
        }

        Ok(Self {
            owner,
            signers,
            required_signatures,
            recovery_address,
        })
    }

    /// Returns the current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Returns the recovery identity.
    pub fn recovery_address(&self) -> Address {
        self.recovery_address
    }

    /// Returns the quorum threshold.
    pub fn required_signatures(&self) -> usize {
        self.required_signatures
    }

    /// Returns the number of signers.
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Returns the signer at `index` in insertion order, if any.
    pub fn signer_at(&self, index: usize) -> Option<Address> {
        self.signers.get(index).copied()
    }

    /// Returns the full signer sequence in insertion order.
    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    /// Membership test. Pure — no side effects.
    pub fn is_signer(&self, identity: &Address) -> bool {
        self.signers.contains(identity)
    }

    /// Appends a new signer.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Unauthorized`] unless `caller` is the owner,
    /// and [`RosterError::DuplicateSigner`] if `identity` is already listed.
    pub fn add_signer(&mut self, caller: Address, identity: Address) -> Result<(), RosterError> {
        self.require_owner(caller)?;

        if self.signers.contains(&identity) {
            return Err(RosterError::DuplicateSigner(identity));
        }

        self.signers.push(identity);
        tracing::info!(signer = %identity, count = self.signers.len(), "signer added");
        Ok(())
    }

    /// Removes a signer, preserving the relative order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Unauthorized`] unless `caller` is the owner,
    /// [`RosterError::UnknownSigner`] if `identity` is not listed, and
    /// [`RosterError::QuorumViolation`] if the removal would leave fewer
    /// signers than the quorum requires.
    pub fn remove_signer(&mut self, caller: Address, identity: Address) -> Result<(), RosterError> {
        self.require_owner(caller)?;

        let position = self
            .signers
            .iter()
            .position(|s| *s == identity)
            .ok_or(RosterError::UnknownSigner(identity))?;

        let remaining = self.signers.len() - 1;
        if remaining < self.required_signatures {
            return Err(RosterError::QuorumViolation {
                remaining,
                required: self.required_signatures,
            });
        }

        self.signers.remove(position);
        tracing::info!(signer = %identity, count = self.signers.len(), "signer removed");
        Ok(())
    }

    /// Replaces the owner. Reachable only from the wallet's recovery
    /// channel — the authorization check lives there.
    ///
    /// Returns the previous owner.
    pub(crate) fn replace_owner(&mut self, new_owner: Address) -> Address {
        std::mem::replace(&mut self.owner, new_owner)
    }

    fn require_owner(&self, caller: Address) -> Result<(), RosterError> {
        if caller != self.owner {
            return Err(RosterError::Unauthorized { caller });
        }
        Ok(())
    }
}
