//! Issuance registry primitives.
//! Stable, protocol-neutral, behavior-free.
//!
//! Rule: no bare integers or byte arrays in registry state. Ever.

pub mod primitives;

pub use primitives::{Address, Amount, TokenId};
