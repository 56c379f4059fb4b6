//! # Signal Fabric
//!
//! The seam between nodes and whatever routes their signals.
//!
//! [`SignalPort`] is the contract: a node receives notifications and talks
//! back through it — emitting output values and managing its tick
//! subscription. [`Fabric`] is the reference collaborator, an in-memory
//! dispatcher owning the node arena, the wire table, and the set of
//! tick-subscribed nodes. A host engine with its own signal routing
//! implements `SignalPort` instead and drives nodes directly.

pub mod dispatcher;

use crate::model::{PortId, Signal};

pub use dispatcher::Fabric;

/// Outbound calls a node makes on its collaborator.
pub trait SignalPort {
    /// Broadcast a new output value on `port`.
    fn send_signal(&mut self, port: PortId, value: Signal);

    /// Opt in to the periodic tick broadcast. Nodes guard this with their
    /// own flag, so a correct collaborator never sees a double subscribe.
    fn subscribe_tick(&mut self);

    /// Opt out of the periodic tick broadcast.
    fn unsubscribe_tick(&mut self);
}

/// A `SignalPort` that records everything it is asked to do. The reference
/// sink for tests and for hosts that want to inspect emissions manually.
#[derive(Debug, Default)]
pub struct Recorder {
    pub sent: Vec<(PortId, Signal)>,
    pub tick_subscribes: usize,
    pub tick_unsubscribes: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&(PortId, Signal)> {
        self.sent.last()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl SignalPort for Recorder {
    fn send_signal(&mut self, port: PortId, value: Signal) {
        self.sent.push((port, value));
    }

    fn subscribe_tick(&mut self) {
        self.tick_subscribes += 1;
    }

    fn unsubscribe_tick(&mut self) {
        self.tick_unsubscribes += 1;
    }
}
