//! Access-Controlled Issuance Registry
//!
//! This crate implements a registry for a bounded set of uniquely-numbered
//! tokens. Creation is gated behind a payment threshold, a global mint gate,
//! and a one-token-per-holder limit; all configuration changes are restricted
//! to a single administrator/relay caller pair.
//!
//! Ownership bookkeeping is delegated to the external [`Ledger`]
//! collaborator. The deployer that originates a registry instance is expected
//! to be the sole identity matching the stored relay, and to authenticate the
//! human administrator before forwarding administrative calls.
//!
//! # Key Types
//!
//! - [`IssuanceRegistry`]: the registry state machine
//! - [`RegistryConfig`]: construction parameters
//! - [`CallContext`]: explicit two-hop caller identity
//! - [`Ledger`]: external system of record for ownership
//!
//! # Execution
//!
//! Use [`apply_mint`] to issue tokens with full validation. Every operation
//! runs to completion on an exclusive borrow: a call either fully commits or
//! returns an error having changed nothing.

pub mod errors;
pub mod events;
pub mod mint;
pub mod registry;

pub use errors::{RegistryError, RegistryResult};
pub use events::{RegistryEvent, RegistryEventListener, RegistryEventPublisher, TestEventListener};
pub use mint::{apply_mint, Ledger, LedgerRejection, MintReceipt};
pub use registry::{CallContext, IssuanceRegistry, MintGate, RegistryConfig};
