//! Mint Execution
//!
//! The `apply_mint` function is the canonical way to issue a token with
//! full validation against the registry state and the external ledger.

use thiserror::Error;

use lib_types::{Address, Amount, TokenId};

use crate::errors::{RegistryError, RegistryResult};
use crate::registry::IssuanceRegistry;

/// Rejection raised by a ledger when an issuance cannot be recorded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct LedgerRejection {
    /// Ledger-supplied reason, propagated verbatim to the mint caller
    pub reason: String,
}

impl LedgerRejection {
    /// Create a rejection with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External system of record for token ownership and balances
///
/// All methods take `&self` to allow shared access. Implementations use
/// interior mutability or their own internal synchronization.
pub trait Ledger {
    /// Number of tokens currently held by `holder`
    fn balance_of(&self, holder: &Address) -> u64;

    /// Record issuance of token `id` to `holder`
    ///
    /// Irreversible once confirmed. A rejection fails the whole mint.
    fn record_issuance(&self, id: TokenId, holder: &Address) -> Result<(), LedgerRejection>;
}

/// Result of a successful mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    /// The id assigned to the newly issued token
    pub token_id: TokenId,
    /// Holder the token was issued to
    pub recipient: Address,
    /// Payment attached to the call
    pub payment: Amount,
}

/// Apply a mint with full validation
///
/// # Enforcement
///
/// This function enforces:
/// - **Gate**: the mint gate must be enabled
/// - **Payment**: the attached payment must cover the unit price
/// - **Holder limit**: the recipient must hold no token yet
/// - **Atomicity**: the ledger confirms the issuance before any registry
///   mutation, so a rejection leaves the registry untouched
///
/// # Arguments
///
/// * `ledger` - System of record implementing [`Ledger`]
/// * `registry` - Registry state (will be mutated on success)
/// * `recipient` - Holder to issue the token to
/// * `payment` - Payment attached to the call, in minor currency units
/// * `sealed_secret` - Opaque payload replacing the stored secret
///
/// # Returns
///
/// * `Ok(MintReceipt)` - Issuance details, including the assigned id
/// * `Err(RegistryError)` - Error describing the rejected call
pub fn apply_mint(
    ledger: &dyn Ledger,
    registry: &mut IssuanceRegistry,
    recipient: Address,
    payment: Amount,
    sealed_secret: String,
) -> RegistryResult<MintReceipt> {
    // ========================================================================
    // Check 1: Gate
    // ========================================================================
    if !registry.mint_enabled() {
        return Err(RegistryError::MintingDisabled);
    }

    // ========================================================================
    // Check 2: Payment covers the unit price
    // ========================================================================
    if payment < registry.unit_price() {
        return Err(RegistryError::InsufficientPayment {
            sent: payment,
            required: registry.unit_price(),
        });
    }

    // ========================================================================
    // Check 3: One token per holder
    // ========================================================================
    if ledger.balance_of(&recipient) >= 1 {
        return Err(RegistryError::HolderLimitExceeded);
    }

    // ========================================================================
    // Record on the ledger, then commit locally
    // ========================================================================
    // The ledger call precedes every registry mutation; a rejection here
    // means nothing changed.
    let id = registry.peek_next_id();
    ledger
        .record_issuance(id, &recipient)
        .map_err(|rejection| RegistryError::LedgerRecordingFailed(rejection.reason))?;

    let token_id = registry.commit_mint(recipient, sealed_secret);

    tracing::debug!("Minted token {} to {:?}", token_id, recipient);

    Ok(MintReceipt {
        token_id,
        recipient,
        payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CallContext, RegistryConfig};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Mock ledger for testing
    ///
    /// Holds per-address token lists and an optional injected rejection for
    /// the next `record_issuance` call.
    struct MockLedger {
        holdings: RefCell<HashMap<Address, Vec<TokenId>>>,
        reject_with: RefCell<Option<String>>,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                holdings: RefCell::new(HashMap::new()),
                reject_with: RefCell::new(None),
            }
        }

        fn reject_next(&self, reason: &str) {
            *self.reject_with.borrow_mut() = Some(reason.to_string());
        }

        fn tokens_of(&self, holder: &Address) -> Vec<TokenId> {
            self.holdings
                .borrow()
                .get(holder)
                .cloned()
                .unwrap_or_default()
        }
    }

    impl Ledger for MockLedger {
        fn balance_of(&self, holder: &Address) -> u64 {
            self.holdings
                .borrow()
                .get(holder)
                .map(|tokens| tokens.len() as u64)
                .unwrap_or(0)
        }

        fn record_issuance(&self, id: TokenId, holder: &Address) -> Result<(), LedgerRejection> {
            if let Some(reason) = self.reject_with.borrow_mut().take() {
                return Err(LedgerRejection::new(reason));
            }
            self.holdings
                .borrow_mut()
                .entry(*holder)
                .or_default()
                .push(id);
            Ok(())
        }
    }

    fn admin() -> Address {
        Address::new([1u8; 32])
    }

    fn relay() -> Address {
        Address::new([2u8; 32])
    }

    fn admin_ctx() -> CallContext {
        CallContext::relayed(admin(), relay())
    }

    fn create_test_registry(mint_enabled: bool, unit_price: Amount) -> IssuanceRegistry {
        IssuanceRegistry::new(RegistryConfig {
            display_identifier: "ipfs://registry-metadata".to_string(),
            capacity: 10,
            unit_price,
            mint_enabled,
            administrator: admin(),
            relay: relay(),
            secret: "sealed-0".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_mint_assigns_sequential_ids() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);

        let a = Address::new([10u8; 32]);
        let b = Address::new([11u8; 32]);

        let first = apply_mint(&ledger, &mut registry, a, 100, "s1".to_string()).unwrap();
        let second = apply_mint(&ledger, &mut registry, b, 100, "s2".to_string()).unwrap();

        assert_eq!(first.token_id, TokenId::new(0));
        assert_eq!(second.token_id, TokenId::new(1));
        assert_eq!(registry.issued(), 2);
        assert_eq!(registry.remaining_capacity(), 8);

        assert_eq!(ledger.tokens_of(&a), vec![TokenId::new(0)]);
        assert_eq!(ledger.tokens_of(&b), vec![TokenId::new(1)]);
    }

    #[test]
    fn test_mint_disabled() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(false, 100);

        let result = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            100,
            "s1".to_string(),
        );
        assert!(matches!(result, Err(RegistryError::MintingDisabled)));
        assert_eq!(registry.issued(), 0);
    }

    #[test]
    fn test_mint_insufficient_payment() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);

        let result = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            50,
            "s1".to_string(),
        );
        assert_eq!(
            result,
            Err(RegistryError::InsufficientPayment {
                sent: 50,
                required: 100,
            })
        );
        assert_eq!(registry.issued(), 0);
    }

    #[test]
    fn test_mint_overpayment_is_accepted() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);

        let receipt = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            250,
            "s1".to_string(),
        )
        .unwrap();
        assert_eq!(receipt.payment, 250);
    }

    #[test]
    fn test_mint_free_when_price_zero() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 0);

        let result = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            0,
            "s1".to_string(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_mint_holder_limit() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);

        let a = Address::new([10u8; 32]);
        apply_mint(&ledger, &mut registry, a, 100, "s1".to_string()).unwrap();

        let result = apply_mint(&ledger, &mut registry, a, 100, "s2".to_string());
        assert!(matches!(result, Err(RegistryError::HolderLimitExceeded)));

        // The rejected attempt changed nothing: balance stays at one.
        assert_eq!(ledger.balance_of(&a), 1);
        assert_eq!(registry.issued(), 1);
        assert_eq!(registry.secret(), "s1");
    }

    #[test]
    fn test_mint_overwrites_secret() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);

        apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            100,
            "s1".to_string(),
        )
        .unwrap();
        assert_eq!(registry.secret(), "s1");

        apply_mint(
            &ledger,
            &mut registry,
            Address::new([11u8; 32]),
            100,
            "s2".to_string(),
        )
        .unwrap();
        assert_eq!(registry.secret(), "s2");
    }

    #[test]
    fn test_mint_ledger_rejection_leaves_registry_untouched() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 100);
        registry.take_events();

        ledger.reject_next("holder identity invalid");
        let result = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            100,
            "s1".to_string(),
        );
        assert_eq!(
            result,
            Err(RegistryError::LedgerRecordingFailed(
                "holder identity invalid".to_string()
            ))
        );

        // All-or-nothing: counter, secret, and journal are unchanged.
        assert_eq!(registry.issued(), 0);
        assert_eq!(registry.secret(), "sealed-0");
        assert!(registry.take_events().is_empty());

        // The same inputs succeed once the ledger accepts.
        let receipt = apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            100,
            "s1".to_string(),
        )
        .unwrap();
        assert_eq!(receipt.token_id, TokenId::new(0));
    }

    #[test]
    fn test_mint_does_not_consult_capacity() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 0);
        registry.set_capacity(&admin_ctx(), 1).unwrap();

        // Capacity is a soft ceiling on administrative updates, not a mint
        // precondition: issuance proceeds past it.
        apply_mint(
            &ledger,
            &mut registry,
            Address::new([10u8; 32]),
            0,
            "s1".to_string(),
        )
        .unwrap();
        let receipt = apply_mint(
            &ledger,
            &mut registry,
            Address::new([11u8; 32]),
            0,
            "s2".to_string(),
        )
        .unwrap();
        assert_eq!(receipt.token_id, TokenId::new(1));
        assert_eq!(registry.remaining_capacity(), 0);
    }

    #[test]
    fn test_holder_balances_never_exceed_one() {
        let ledger = MockLedger::new();
        let mut registry = create_test_registry(true, 0);

        let holders = [
            Address::new([10u8; 32]),
            Address::new([11u8; 32]),
            Address::new([12u8; 32]),
        ];

        for holder in &holders {
            apply_mint(&ledger, &mut registry, *holder, 0, "s".to_string()).unwrap();
            // A second attempt for every holder is rejected.
            assert!(matches!(
                apply_mint(&ledger, &mut registry, *holder, 0, "s".to_string()),
                Err(RegistryError::HolderLimitExceeded)
            ));
        }

        for holder in &holders {
            assert!(ledger.balance_of(holder) <= 1);
        }
        assert_eq!(registry.issued(), holders.len() as u64);
    }
}
