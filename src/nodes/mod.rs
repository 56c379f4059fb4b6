//! # Logic Nodes
//!
//! One module per node kind, plus the tagged [`Node`] enum the fabric
//! dispatches on. Kind dispatch is pattern matching, not trait objects:
//! the set of node kinds is closed.

pub mod edge;
pub mod gate;
pub mod inline;
pub mod mux;
pub mod remap;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{PortId, Signal};

pub use edge::EdgeDetector;
pub use gate::{GateMode, GateNode};
pub use inline::InlineGateNode;
pub use mux::{MuxDirection, MuxNode};
pub use remap::{Mapping, RemapNode};
pub use source::SourceNode;

/// A logic node of any kind. Owned exclusively by the fabric arena; nodes
/// never hold references to each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state")]
pub enum Node {
    Gate(GateNode),
    InlineGate(InlineGateNode),
    Mux(MuxNode),
    Remap(RemapNode),
    Edge(EdgeDetector),
    Source(SourceNode),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Gate(_) => "gate",
            Node::InlineGate(_) => "inline-gate",
            Node::Mux(_) => "mux",
            Node::Remap(_) => "remap",
            Node::Edge(_) => "edge-detector",
            Node::Source(_) => "source",
        }
    }

    /// Ports this node accepts value-changed notifications on.
    pub fn input_ports(&self) -> &'static [PortId] {
        match self {
            Node::Gate(_) => &[gate::IN_A, gate::IN_B],
            Node::InlineGate(_) => &[inline::IO],
            Node::Mux(_) => &[mux::INPUT, mux::CONTROL1, mux::CONTROL2],
            Node::Remap(_) => &[remap::INPUT],
            Node::Edge(_) => &[edge::INPUT],
            Node::Source(_) => &[],
        }
    }

    /// Ports this node emits on.
    pub fn output_ports(&self) -> &'static [PortId] {
        match self {
            Node::Gate(_) => &[gate::OUT],
            Node::InlineGate(_) => &[inline::IO],
            Node::Mux(_) => &[mux::OUT],
            Node::Remap(_) => &[remap::OUT],
            Node::Edge(_) => &[edge::OUT],
            Node::Source(_) => &[source::OUT],
        }
    }

    /// Whether a freshly-added instance holds a tick subscription.
    pub fn starts_ticking(&self) -> bool {
        match self {
            Node::Edge(n) => n.is_ticking(),
            _ => false,
        }
    }

    /// Inbound value-changed notification. Unrecognized port ids are a
    /// no-op for every kind.
    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        match self {
            Node::Gate(n) => n.on_value_changed(port_id, value, port),
            Node::InlineGate(n) => n.on_value_changed(port_id, value, port),
            Node::Mux(n) => n.on_value_changed(port_id, value, port),
            Node::Remap(n) => n.on_value_changed(port_id, value, port),
            Node::Edge(n) => n.on_value_changed(port_id, value, port),
            Node::Source(_) => {}
        }
    }

    /// Discrete simulation step. Only the sequential kind reacts.
    pub fn on_tick(&mut self, port: &mut dyn SignalPort) {
        if let Node::Edge(n) = self {
            n.on_tick(port);
        }
    }

    /// Recompute from stored registers and re-emit. Called after a node is
    /// wired up post-spawn or post-load.
    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        match self {
            Node::Gate(n) => n.refresh(port),
            Node::InlineGate(n) => n.refresh(port),
            Node::Mux(n) => n.refresh(port),
            Node::Remap(n) => n.refresh(port),
            // sequential: output only ever changes on a tick boundary
            Node::Edge(_) => {}
            Node::Source(n) => n.refresh(port),
        }
    }

    /// Current output register.
    pub fn output(&self) -> Signal {
        match self {
            Node::Gate(n) => n.output(),
            Node::InlineGate(n) => n.output(),
            Node::Mux(n) => n.output(),
            Node::Remap(n) => n.output(),
            Node::Edge(n) => n.output(),
            Node::Source(n) => n.output(),
        }
    }

    // ------------------------------------------------------------------
    // Kind accessors
    // ------------------------------------------------------------------

    pub fn as_gate(&self) -> Option<&GateNode> {
        match self {
            Node::Gate(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_gate_mut(&mut self) -> Option<&mut GateNode> {
        match self {
            Node::Gate(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_inline_gate_mut(&mut self) -> Option<&mut InlineGateNode> {
        match self {
            Node::InlineGate(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_mux(&self) -> Option<&MuxNode> {
        match self {
            Node::Mux(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_remap(&self) -> Option<&RemapNode> {
        match self {
            Node::Remap(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_remap_mut(&mut self) -> Option<&mut RemapNode> {
        match self {
            Node::Remap(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeDetector> {
        match self {
            Node::Edge(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_source_mut(&mut self) -> Option<&mut SourceNode> {
        match self {
            Node::Source(n) => Some(n),
            _ => None,
        }
    }
}
