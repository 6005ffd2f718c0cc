// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AEGIS — Quorum Custody Engine
//!
//! AEGIS gates the execution of arbitrary outbound actions — a call to a
//! destination carrying a value and a payload — behind approval by a
//! configurable quorum of a designated signer set. Think of it as the
//! authorization core of a multi-signature custody wallet, minus the chain:
//! the hosting runtime supplies caller identity, serialized execution, and
//! the actual value transfer; this crate supplies the state machine that
//! decides *whether* the transfer may happen.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! custody engine:
//!
//! - **identity** — Addresses and the signer roster: owner, signers, quorum,
//!   recovery identity.
//! - **txn** — Transaction records and deterministic, content-addressed
//!   transaction ids.
//! - **wallet** — The approval & execution engine: create, approve,
//!   execute, cancel, recover.
//! - **events** — The append-only event log every state change lands in.
//! - **dispatch** — The seam to the outside world: one trait, one method,
//!   one outbound call.
//! - **config** — Protocol constants. Magic numbers live here or nowhere.
//!
//! ## Design Philosophy
//!
//! 1. Every precondition is checked before the first write — a failed call
//!    leaves state untouched.
//! 2. State transitions are explicit and terminal flags stay terminal:
//!    an executed transaction can never be approved, executed, or cancelled
//!    again.
//! 3. The `executed` flag is set *before* the outbound dispatch, so a
//!    reentrant call observes spent state.
//! 4. Every public type is serializable (serde) for persistence and
//!    transport.

pub mod config;
pub mod dispatch;
pub mod events;
pub mod identity;
pub mod txn;
pub mod wallet;
