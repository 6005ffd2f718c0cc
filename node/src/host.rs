//! # In-Memory Host Runtime
//!
//! Supplies everything the engine's specification treats as external:
//! caller identity (explicit per command), serialized execution (the
//! wallet sits behind a `parking_lot::RwLock`), and the outbound call
//! primitive — an account ledger that moves value from the wallet's
//! treasury to destination accounts.
//!
//! The whole host state (wallet + ledger) persists as one JSON snapshot,
//! so a sequence of `run` invocations against the same state file behaves
//! like one continuous session.

use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use aegis_engine::dispatch::{DispatchOutcome, Dispatcher};
use aegis_engine::identity::Address;
use aegis_engine::txn::record::hex_bytes;
use aegis_engine::txn::TxId;
use aegis_engine::wallet::CustodyWallet;

// ---------------------------------------------------------------------------
// AccountLedger
// ---------------------------------------------------------------------------

/// Balances for the wallet treasury and every destination the wallet has
/// ever paid. This is the host's stand-in for the real value-transfer
/// machinery; the engine only ever sees it as a [`Dispatcher`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Value available for outbound transfers.
    treasury: u64,
    /// Credited destination accounts.
    accounts: BTreeMap<Address, u64>,
}

impl AccountLedger {
    /// A ledger with the given initial treasury.
    pub fn with_treasury(treasury: u64) -> Self {
        Self {
            treasury,
            accounts: BTreeMap::new(),
        }
    }

    /// Current treasury balance.
    pub fn treasury(&self) -> u64 {
        self.treasury
    }

    /// Balance credited to `account` so far.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Credits the treasury.
    pub fn deposit(&mut self, amount: u64) -> Result<u64> {
        self.treasury = self
            .treasury
            .checked_add(amount)
            .context("treasury balance overflow")?;
        Ok(self.treasury)
    }
}

impl Dispatcher for AccountLedger {
    /// Moves `value` from the treasury to `destination`. The payload is
    /// opaque to this host — a richer runtime would interpret it.
    ///
    /// Both sides of the transfer are checked before either is written;
    /// a ledger that cannot complete the move reports `Failed` and stays
    /// untouched. The engine, by contract, ignores that report.
    fn dispatch(&mut self, destination: &Address, value: u64, _payload: &[u8]) -> DispatchOutcome {
        if value == 0 {
            return DispatchOutcome::Delivered;
        }

        let debited = match self.treasury.checked_sub(value) {
            Some(rest) => rest,
            None => {
                tracing::warn!(%destination, value, treasury = self.treasury, "insufficient treasury");
                return DispatchOutcome::Failed;
            }
        };
        let credited = match self.balance_of(destination).checked_add(value) {
            Some(total) => total,
            None => return DispatchOutcome::Failed,
        };

        self.treasury = debited;
        self.accounts.insert(*destination, credited);
        DispatchOutcome::Delivered
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One scripted operation, without its caller.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Propose an outbound call.
    Create {
        destination: Address,
        value: u64,
        #[serde(default, with = "hex_bytes")]
        payload: Vec<u8>,
    },
    /// Approve a pending transaction (may auto-execute at quorum).
    Approve { id: TxId },
    /// Explicitly execute a quorum-satisfied transaction.
    Execute { id: TxId },
    /// Cancel a pending transaction.
    Cancel { id: TxId },
    /// Add a signer to the roster.
    AddSigner { signer: Address },
    /// Remove a signer from the roster.
    RemoveSigner { signer: Address },
    /// Replace the owner via the recovery channel.
    Recover { new_owner: Address },
    /// Credit the wallet treasury. Host-level; no engine state changes.
    Deposit { amount: u64 },
}

/// One line of a command script: who is calling, and what they ask for.
///
/// ```json
/// {"caller": "0202...02", "op": "approve", "id": "4f1c..."}
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct Command {
    /// The authenticated caller identity. In a real deployment this comes
    /// from the transport; here the script states it outright.
    pub caller: Address,
    #[serde(flatten)]
    pub op: Op,
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Serialized snapshot of the whole host: engine state plus ledger.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    wallet: CustodyWallet,
    ledger: AccountLedger,
}

/// The hosting runtime: one wallet, one ledger, serialized access.
pub struct Host {
    wallet: RwLock<CustodyWallet>,
    ledger: Mutex<AccountLedger>,
}

impl Host {
    /// Wraps a freshly configured wallet and ledger.
    pub fn new(wallet: CustodyWallet, ledger: AccountLedger) -> Self {
        Self {
            wallet: RwLock::new(wallet),
            ledger: Mutex::new(ledger),
        }
    }

    /// Loads a host from a JSON state file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse state file {}", path.display()))?;
        Ok(Self::new(snapshot.wallet, snapshot.ledger))
    }

    /// Writes the host to a JSON state file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = Snapshot {
            wallet: self.wallet.read().clone(),
            ledger: self.ledger.lock().clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot).context("failed to serialize state")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write state file {}", path.display()))?;
        Ok(())
    }

    /// Read access to the wallet, for status and event output.
    pub fn wallet(&self) -> RwLockReadGuard<'_, CustodyWallet> {
        self.wallet.read()
    }

    /// Current treasury balance.
    pub fn treasury(&self) -> u64 {
        self.ledger.lock().treasury()
    }

    /// Balance credited to `account`.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.ledger.lock().balance_of(account)
    }

    /// Applies one command. Engine-level failures come back as errors;
    /// they are user-visible outcomes, and the state stays unchanged.
    ///
    /// Returns the transaction id the command touched, if any.
    pub fn apply(&self, command: Command) -> Result<Option<TxId>> {
        let caller = command.caller;
        match command.op {
            Op::Create {
                destination,
                value,
                payload,
            } => {
                let id = self
                    .wallet
                    .write()
                    .create_transaction(caller, destination, value, payload)?;
                Ok(Some(id))
            }
            Op::Approve { id } => {
                let mut wallet = self.wallet.write();
                let mut ledger = self.ledger.lock();
                wallet.approve_transaction(caller, id, &mut *ledger)?;
                Ok(Some(id))
            }
            Op::Execute { id } => {
                let mut wallet = self.wallet.write();
                let mut ledger = self.ledger.lock();
                wallet.execute_transaction(caller, id, &mut *ledger)?;
                Ok(Some(id))
            }
            Op::Cancel { id } => {
                self.wallet.write().cancel_transaction(caller, id)?;
                Ok(Some(id))
            }
            Op::AddSigner { signer } => {
                self.wallet.write().add_signer(caller, signer)?;
                Ok(None)
            }
            Op::RemoveSigner { signer } => {
                self.wallet.write().remove_signer(caller, signer)?;
                Ok(None)
            }
            Op::Recover { new_owner } => {
                self.wallet.write().recover_wallet(caller, new_owner)?;
                Ok(None)
            }
            Op::Deposit { amount } => {
                if !self.wallet.read().is_signer(&caller) && self.wallet.read().owner() != caller {
                    bail!("only signers or the owner may fund the treasury");
                }
                let balance = self.ledger.lock().deposit(amount)?;
                tracing::info!(amount, balance, "treasury funded");
                Ok(None)
            }
        }
    }
}
