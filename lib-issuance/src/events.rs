//! Registry Event Emission Infrastructure
//!
//! Committed registry transitions are journaled by the registry itself and
//! drained by the host (`IssuanceRegistry::take_events`). This module
//! provides the transport for off-system observers: the event enum, an async
//! publisher, and the listener trait implementations subscribe through.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use lib_types::{Address, Amount, TokenId};

// ============================================================================
// EVENT TYPES
// ============================================================================

/// Registry transitions observable from outside the system
///
/// One `Initialized` is recorded per registry lifetime, at construction. The
/// remaining variants are recorded after each corresponding successful
/// state-changing call. Rejected calls record nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Registry constructed with these parameters
    Initialized {
        display_identifier: String,
        capacity: u64,
        unit_price: Amount,
        administrator: Address,
        mint_enabled: bool,
    },

    /// Token issued
    Minted {
        token_id: TokenId,
        recipient: Address,
    },

    /// Mint gate opened
    MintingEnabled,

    /// Mint gate closed
    MintingDisabled,

    /// Unit price overwritten
    UnitPriceUpdated { unit_price: Amount },

    /// Capacity overwritten
    CapacityUpdated { capacity: u64 },

    /// Display identifier overwritten
    DisplayIdentifierUpdated { display_identifier: String },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Initialized { capacity, .. } => {
                write!(f, "Initialized(capacity={})", capacity)
            }
            RegistryEvent::Minted {
                token_id,
                recipient,
            } => {
                write!(
                    f,
                    "Minted(id={}, recipient={})",
                    token_id,
                    hex::encode(&recipient.as_bytes()[..8])
                )
            }
            RegistryEvent::MintingEnabled => write!(f, "MintingEnabled"),
            RegistryEvent::MintingDisabled => write!(f, "MintingDisabled"),
            RegistryEvent::UnitPriceUpdated { unit_price } => {
                write!(f, "UnitPriceUpdated(price={})", unit_price)
            }
            RegistryEvent::CapacityUpdated { capacity } => {
                write!(f, "CapacityUpdated(capacity={})", capacity)
            }
            RegistryEvent::DisplayIdentifierUpdated { .. } => {
                write!(f, "DisplayIdentifierUpdated")
            }
        }
    }
}

// ============================================================================
// EVENT LISTENER TRAIT
// ============================================================================

/// Trait for entities that listen to registry events
#[async_trait]
pub trait RegistryEventListener: Send {
    /// Called for each published event
    ///
    /// Async so listeners can perform their own I/O without blocking other
    /// listeners or the publishing host.
    async fn on_event(&mut self, event: RegistryEvent) -> Result<()>;
}

// ============================================================================
// EVENT PUBLISHER
// ============================================================================

/// Thread-safe publisher fanning registry events out to subscribers
#[derive(Clone)]
pub struct RegistryEventPublisher {
    /// Listeners subscribed to events
    listeners: Arc<Mutex<Vec<Box<dyn RegistryEventListener>>>>,
}

impl std::fmt::Debug for RegistryEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEventPublisher").finish()
    }
}

impl RegistryEventPublisher {
    /// Create a new event publisher
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to registry events
    pub async fn subscribe(&self, listener: Box<dyn RegistryEventListener>) -> Result<()> {
        let mut listeners = self.listeners.lock().await;
        listeners.push(listener);
        Ok(())
    }

    /// Publish one event to all subscribers
    pub async fn publish(&self, event: RegistryEvent) -> Result<()> {
        let mut listeners = self.listeners.lock().await;

        for listener in listeners.iter_mut() {
            if let Err(e) = listener.on_event(event.clone()).await {
                tracing::warn!("Event listener error: {}", e);
                // Continue notifying other listeners even if one fails
            }
        }

        Ok(())
    }

    /// Publish a drained journal in order
    pub async fn publish_all(&self, events: Vec<RegistryEvent>) -> Result<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    /// Number of subscribed listeners
    pub async fn listener_count(&self) -> Result<usize> {
        let listeners = self.listeners.lock().await;
        Ok(listeners.len())
    }
}

impl Default for RegistryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SIMPLE TEST LISTENER
// ============================================================================

/// Listener that captures events for testing
#[derive(Debug, Clone)]
pub struct TestEventListener {
    /// Events captured
    pub events: Arc<Mutex<Vec<RegistryEvent>>>,
}

impl TestEventListener {
    /// Create a new test listener
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get captured events
    pub async fn get_events(&self) -> Result<Vec<RegistryEvent>> {
        let events = self.events.lock().await;
        Ok(events.clone())
    }
}

impl Default for TestEventListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryEventListener for TestEventListener {
    async fn on_event(&mut self, event: RegistryEvent) -> Result<()> {
        let mut events = self.events.lock().await;
        events.push(event);
        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
