//! Issuance Registry State and Administration
//!
//! The canonical registry structure plus its administrative operations.
//! Every state-changing call either fully commits or returns an error having
//! changed nothing; `&mut self` receivers serialize all mutations.

use serde::{Deserialize, Serialize};

use lib_types::{Address, Amount, TokenId};

use crate::errors::{RegistryError, RegistryResult};
use crate::events::RegistryEvent;

// ============================================================================
// CALL CONTEXT
// ============================================================================

/// Caller identities attached to a registry call
///
/// Capability-bound authorization: the ultimate origin of the call chain and
/// the immediate calling entity are explicit values, never ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Identity that initiated the call chain
    pub origin: Address,
    /// Immediate entity delivering the call
    pub caller: Address,
}

impl CallContext {
    /// Context for a direct call: origin and immediate caller coincide
    pub fn direct(origin: Address) -> Self {
        Self {
            origin,
            caller: origin,
        }
    }

    /// Context for a relayed call: `caller` forwards on behalf of `origin`
    pub fn relayed(origin: Address, caller: Address) -> Self {
        Self { origin, caller }
    }
}

// ============================================================================
// MINT GATE
// ============================================================================

/// Gate controlling whether minting is currently permitted
///
/// Transitions are edge-triggered: each one asserts the opposite prior
/// state, so a repeated enable (or disable) is a rejected call rather than a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintGate {
    /// Mint calls may proceed
    Enabled,
    /// Mint calls are rejected
    Disabled,
}

impl MintGate {
    /// Check whether the gate currently admits mint calls
    pub fn is_enabled(&self) -> bool {
        matches!(self, MintGate::Enabled)
    }

    /// Transition Disabled -> Enabled
    fn enable(&mut self) -> RegistryResult<()> {
        match self {
            MintGate::Enabled => Err(RegistryError::AlreadyEnabled),
            MintGate::Disabled => {
                *self = MintGate::Enabled;
                Ok(())
            }
        }
    }

    /// Transition Enabled -> Disabled
    fn disable(&mut self) -> RegistryResult<()> {
        match self {
            MintGate::Disabled => Err(RegistryError::AlreadyDisabled),
            MintGate::Enabled => {
                *self = MintGate::Disabled;
                Ok(())
            }
        }
    }
}

impl From<bool> for MintGate {
    fn from(enabled: bool) -> Self {
        if enabled {
            MintGate::Enabled
        } else {
            MintGate::Disabled
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Construction parameters for a registry instance
///
/// Supplied once; administrator and relay are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Opaque metadata pointer shown to off-system resolvers
    pub display_identifier: String,
    /// Soft ceiling on the number of tokens intended to be issued
    pub capacity: u64,
    /// Minimum payment required per mint, in minor currency units
    pub unit_price: Amount,
    /// Whether minting starts out enabled
    pub mint_enabled: bool,
    /// Identity authorized to request configuration changes
    pub administrator: Address,
    /// Sole identity permitted to deliver administrative calls
    pub relay: Address,
    /// Initial sealed secret payload
    pub secret: String,
}

impl RegistryConfig {
    /// Check construction invariants
    ///
    /// **Invariant**: administrator and relay must be non-zero.
    fn validate(&self) -> RegistryResult<()> {
        if self.administrator.is_zero() {
            return Err(RegistryError::InvalidConfiguration(
                "administrator address must be non-zero".to_string(),
            ));
        }
        if self.relay.is_zero() {
            return Err(RegistryError::InvalidConfiguration(
                "relay address must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ISSUANCE REGISTRY
// ============================================================================

/// The registry state machine
///
/// Owns all mutable state for one deployment: the monotonic id counter, the
/// mint gate, pricing, and the authorized administrator/relay pair. Ownership
/// bookkeeping lives behind the [`crate::mint::Ledger`] collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRegistry {
    /// Next id to assign; equals the number of tokens issued so far
    next_id: u64,
    /// Opaque metadata pointer, administrator-mutable
    display_identifier: String,
    /// Minimum payment per mint (zero means free issuance)
    unit_price: Amount,
    /// Soft ceiling; never allowed below `next_id` by administrative updates
    capacity: u64,
    /// Whether mint calls are currently admitted
    gate: MintGate,
    /// Identity authorized to request changes; immutable after construction
    administrator: Address,
    /// Sole caller permitted to deliver administrative calls; immutable
    relay: Address,
    /// Sealed secret payload associated with the most recent mint
    secret: String,
    /// Committed transitions not yet drained by the host
    events: Vec<RegistryEvent>,
}

impl IssuanceRegistry {
    /// Create a new registry instance
    ///
    /// Records the `Initialized` event exactly once, carrying the
    /// construction parameters for off-system observers.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;

        let RegistryConfig {
            display_identifier,
            capacity,
            unit_price,
            mint_enabled,
            administrator,
            relay,
            secret,
        } = config;

        let initialized = RegistryEvent::Initialized {
            display_identifier: display_identifier.clone(),
            capacity,
            unit_price,
            administrator,
            mint_enabled,
        };

        tracing::info!(
            "Issuance registry created: capacity {}, unit price {}, minting {}",
            capacity,
            unit_price,
            if mint_enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            next_id: 0,
            display_identifier,
            unit_price,
            capacity,
            gate: MintGate::from(mint_enabled),
            administrator,
            relay,
            secret,
            events: vec![initialized],
        })
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Two-hop administrative authorization
    ///
    /// The call origin must be the stored administrator AND the immediate
    /// caller must be the stored relay. A correct origin forwarded by any
    /// other entity fails, as does the relay forwarding any other origin.
    pub fn require_administrative(&self, ctx: &CallContext) -> RegistryResult<()> {
        if ctx.origin != self.administrator || ctx.caller != self.relay {
            tracing::warn!(
                "Rejected administrative call: origin {:?}, caller {:?}",
                ctx.origin,
                ctx.caller
            );
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }

    // ========================================================================
    // Administrative operations
    // ========================================================================

    /// Open the mint gate
    ///
    /// Fails with [`RegistryError::AlreadyEnabled`] if the gate is open.
    pub fn enable_minting(&mut self, ctx: &CallContext) -> RegistryResult<()> {
        self.require_administrative(ctx)?;
        self.gate.enable()?;
        self.events.push(RegistryEvent::MintingEnabled);
        tracing::info!("Minting enabled");
        Ok(())
    }

    /// Close the mint gate
    ///
    /// Fails with [`RegistryError::AlreadyDisabled`] if the gate is closed.
    pub fn disable_minting(&mut self, ctx: &CallContext) -> RegistryResult<()> {
        self.require_administrative(ctx)?;
        self.gate.disable()?;
        self.events.push(RegistryEvent::MintingDisabled);
        tracing::info!("Minting disabled");
        Ok(())
    }

    /// Overwrite the display identifier
    pub fn set_display_identifier(
        &mut self,
        ctx: &CallContext,
        display_identifier: String,
    ) -> RegistryResult<()> {
        self.require_administrative(ctx)?;
        self.display_identifier = display_identifier.clone();
        self.events
            .push(RegistryEvent::DisplayIdentifierUpdated { display_identifier });
        Ok(())
    }

    /// Overwrite the sealed secret payload
    ///
    /// No authorization guard: any caller may replace the secret. The
    /// payload is pre-encrypted, so the registry treats it as opaque bytes.
    pub fn set_secret(&mut self, secret: String) {
        self.secret = secret;
    }

    /// Overwrite the unit price (zero is valid and means free issuance)
    pub fn set_unit_price(&mut self, ctx: &CallContext, unit_price: Amount) -> RegistryResult<()> {
        self.require_administrative(ctx)?;
        self.unit_price = unit_price;
        self.events.push(RegistryEvent::UnitPriceUpdated { unit_price });
        tracing::info!("Unit price set to {}", unit_price);
        Ok(())
    }

    /// Overwrite the capacity
    ///
    /// Fails with [`RegistryError::CapacityBelowIssued`] if the new value is
    /// below the number of tokens already issued.
    pub fn set_capacity(&mut self, ctx: &CallContext, capacity: u64) -> RegistryResult<()> {
        self.require_administrative(ctx)?;
        if capacity < self.next_id {
            return Err(RegistryError::CapacityBelowIssued {
                requested: capacity,
                issued: self.next_id,
            });
        }
        self.capacity = capacity;
        self.events.push(RegistryEvent::CapacityUpdated { capacity });
        tracing::info!("Capacity set to {}", capacity);
        Ok(())
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// Current display identifier
    pub fn display_identifier(&self) -> &str {
        &self.display_identifier
    }

    /// Current unit price in minor currency units
    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// Current capacity ceiling
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Whether mint calls are currently admitted
    pub fn mint_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Sealed secret payload from the most recent mint (or set_secret call)
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Number of tokens issued so far; ids assigned are `0..issued()`
    pub fn issued(&self) -> u64 {
        self.next_id
    }

    /// Capacity remaining under the current ceiling
    pub fn remaining_capacity(&self) -> u64 {
        self.capacity.saturating_sub(self.next_id)
    }

    /// The immutable administrator identity
    pub fn administrator(&self) -> Address {
        self.administrator
    }

    /// The immutable relay identity
    pub fn relay(&self) -> Address {
        self.relay
    }

    // ========================================================================
    // Event journal
    // ========================================================================

    /// Drain committed-transition events for forwarding to observers
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Mint commit path (crate-internal)
    // ========================================================================

    /// The id the next successful mint will assign
    pub(crate) fn peek_next_id(&self) -> TokenId {
        TokenId::new(self.next_id)
    }

    /// Commit a mint after the ledger has confirmed the issuance
    ///
    /// Increments the counter, replaces the secret, and records the event.
    pub(crate) fn commit_mint(&mut self, recipient: Address, sealed_secret: String) -> TokenId {
        let token_id = TokenId::new(self.next_id);
        self.next_id += 1;
        self.secret = sealed_secret;
        self.events.push(RegistryEvent::Minted {
            token_id,
            recipient,
        });
        token_id
    }
}

// ============================================================================
// TESTS
// ============================================================================
