//! In-memory signal dispatcher.
//!
//! This is the reference implementation of the routing collaborator. It
//! owns an arena of nodes keyed by `NodeId`, a directed wire table from
//! output ports to input ports, and the set of currently tick-subscribed
//! node ids.
//!
//! Delivery is queue-based: a node's state is fully updated before any of
//! its emissions is routed, so a synchronous fan-back into another node
//! (or itself) never observes partial state. A propagation budget bounds
//! combinational cycles — exhausting it logs a warning and drops the rest
//! of the cascade instead of diverging; the simulation keeps running.

use std::collections::{BTreeSet, VecDeque};

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::model::{BitIndex, NodeId, PortId, Signal};
use crate::nodes::{
    EdgeDetector, GateMode, GateNode, InlineGateNode, Mapping, MuxDirection, MuxNode, Node,
    RemapNode, SourceNode,
};
use crate::{Error, Result};

use super::SignalPort;

/// Deliveries processed per external call before a cascade is presumed to
/// be a combinational cycle and dropped.
const PROPAGATION_BUDGET: usize = 10_000;

/// One wire destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    node: NodeId,
    port: PortId,
}

/// Buffers a single node's outbound calls during one delivery, so routing
/// happens only after the node's handler has returned.
#[derive(Debug, Default)]
struct Mailbox {
    outgoing: SmallVec<[(PortId, Signal); 2]>,
    tick: Option<bool>,
}

impl SignalPort for Mailbox {
    fn send_signal(&mut self, port: PortId, value: Signal) {
        self.outgoing.push((port, value));
    }

    fn subscribe_tick(&mut self) {
        self.tick = Some(true);
    }

    fn unsubscribe_tick(&mut self) {
        self.tick = Some(false);
    }
}

/// The signal-routing fabric: node arena + wire table + tick set.
#[derive(Debug, Default)]
pub struct Fabric {
    nodes: HashMap<NodeId, Node>,
    /// (source node, output port) → fan-out destinations
    wires: HashMap<(NodeId, PortId), SmallVec<[Endpoint; 2]>>,
    /// Tick-subscribed nodes, ascending id for deterministic replay.
    active: BTreeSet<NodeId>,
    next_id: u64,
}

impl Fabric {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Arena
    // ========================================================================

    /// Insert a node (typically one restored from persisted state) and
    /// return its id. Does not re-emit; call [`Fabric::refresh`] once the
    /// node is wired up.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        if node.starts_ticking() {
            self.active.insert(id);
        }
        self.nodes.insert(id, node);
        id
    }

    pub fn add_gate(&mut self, mode: GateMode) -> NodeId {
        self.add_node(Node::Gate(GateNode::new(mode)))
    }

    pub fn add_inline_gate(&mut self, mode: GateMode) -> NodeId {
        self.add_node(Node::InlineGate(InlineGateNode::new(mode)))
    }

    pub fn add_mux(&mut self, direction: MuxDirection) -> NodeId {
        self.add_node(Node::Mux(MuxNode::new(direction)))
    }

    pub fn add_remap(&mut self) -> NodeId {
        self.add_node(Node::Remap(RemapNode::new()))
    }

    pub fn add_edge_detector(&mut self) -> NodeId {
        self.add_node(Node::Edge(EdgeDetector::new()))
    }

    pub fn add_source(&mut self) -> NodeId {
        self.add_node(Node::Source(SourceNode::new()))
    }

    /// Remove a node, its wires, and — if it was Active — its tick
    /// subscription. No dangling subscription survives destruction.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        let node = self.nodes.remove(&id).ok_or(Error::NodeNotFound(id))?;
        self.active.remove(&id);
        self.wires.retain(|(src, _), ends| {
            if *src == id {
                return false;
            }
            ends.retain(|e| e.node != id);
            !ends.is_empty()
        });
        Ok(node)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }

    /// Current output register of a node.
    pub fn output(&self, id: NodeId) -> Result<Signal> {
        self.get(id).map(Node::output)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// How many nodes currently hold a tick subscription.
    pub fn ticking_count(&self) -> usize {
        self.active.len()
    }

    // ========================================================================
    // Wiring
    // ========================================================================

    /// Wire an output port to an input port. Both endpoints are validated
    /// against the ports their node kind actually exposes.
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: PortId,
        dst: NodeId,
        dst_port: PortId,
    ) -> Result<()> {
        let src_node = self.nodes.get(&src).ok_or(Error::NodeNotFound(src))?;
        if !src_node.output_ports().contains(&src_port) {
            return Err(Error::UnknownPort { node: src, kind: src_node.kind(), port: src_port });
        }
        let dst_node = self.nodes.get(&dst).ok_or(Error::NodeNotFound(dst))?;
        if !dst_node.input_ports().contains(&dst_port) {
            return Err(Error::UnknownPort { node: dst, kind: dst_node.kind(), port: dst_port });
        }
        self.wires
            .entry((src, src_port))
            .or_default()
            .push(Endpoint { node: dst, port: dst_port });
        Ok(())
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Inject an external value change (e.g. from the host's wire network)
    /// and propagate the resulting cascade to completion.
    pub fn signal(&mut self, node: NodeId, port: PortId, value: Signal) -> Result<()> {
        if !self.nodes.contains_key(&node) {
            return Err(Error::NodeNotFound(node));
        }
        let mut queue = VecDeque::from([(node, port, value)]);
        self.drain(&mut queue);
        Ok(())
    }

    /// One discrete simulation step: deliver the tick broadcast to every
    /// subscribed node, then propagate their emissions.
    pub fn tick(&mut self) {
        let subscribed: Vec<NodeId> = self.active.iter().copied().collect();
        let mut queue = VecDeque::new();
        for id in subscribed {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let mut mailbox = Mailbox::default();
            node.on_tick(&mut mailbox);
            self.settle(id, mailbox, &mut queue);
        }
        self.drain(&mut queue);
    }

    /// Re-evaluate a node from its stored registers and broadcast the
    /// result. Used after wiring up a restored node.
    pub fn refresh(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        let mut mailbox = Mailbox::default();
        node.refresh(&mut mailbox);
        let mut queue = VecDeque::new();
        self.settle(id, mailbox, &mut queue);
        self.drain(&mut queue);
        Ok(())
    }

    fn drain(&mut self, queue: &mut VecDeque<(NodeId, PortId, Signal)>) {
        let mut budget = PROPAGATION_BUDGET;
        while let Some((id, port_id, value)) = queue.pop_front() {
            if budget == 0 {
                warn!(node = %id, "propagation budget exhausted, dropping cascade");
                queue.clear();
                return;
            }
            budget -= 1;
            // a node removed mid-cascade just stops the branch
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            trace!(node = %id, port = %port_id, value = %value, "deliver");
            let mut mailbox = Mailbox::default();
            node.on_value_changed(port_id, value, &mut mailbox);
            self.settle(id, mailbox, queue);
        }
    }

    /// Apply a handled node's buffered effects: tick set membership first,
    /// then route its emissions along the wires.
    fn settle(
        &mut self,
        id: NodeId,
        mailbox: Mailbox,
        queue: &mut VecDeque<(NodeId, PortId, Signal)>,
    ) {
        match mailbox.tick {
            Some(true) => {
                self.active.insert(id);
            }
            Some(false) => {
                self.active.remove(&id);
            }
            None => {}
        }
        for (port, value) in mailbox.outgoing {
            trace!(node = %id, port = %port, value = %value, "emit");
            if let Some(ends) = self.wires.get(&(id, port)) {
                for end in ends {
                    queue.push_back((end.node, end.port, value));
                }
            }
        }
    }

    // ========================================================================
    // Configuration operations
    // ========================================================================

    /// Switch a gate's combinator; forces re-evaluation and re-emission.
    pub fn set_gate_mode(&mut self, id: NodeId, mode: GateMode) -> Result<()> {
        self.configure(id, "gate", |node, port| {
            let gate = node.as_gate_mut()?;
            gate.set_mode(mode, port);
            Some(())
        })
    }

    /// Switch an inline gate's combinator.
    pub fn set_inline_mode(&mut self, id: NodeId, mode: GateMode) -> Result<()> {
        self.configure(id, "inline-gate", |node, port| {
            let gate = node.as_inline_gate_mut()?;
            gate.set_mode(mode, port);
            Some(())
        })
    }

    /// Re-pick an inline gate's input and output lines.
    pub fn set_inline_selectors(
        &mut self,
        id: NodeId,
        in_bit_a: BitIndex,
        in_bit_b: BitIndex,
        out_bit: BitIndex,
    ) -> Result<()> {
        self.configure(id, "inline-gate", |node, port| {
            let gate = node.as_inline_gate_mut()?;
            gate.set_selectors(in_bit_a, in_bit_b, out_bit, port);
            Some(())
        })
    }

    /// Re-wire one output position of a remapper.
    pub fn set_remap_bit(&mut self, id: NodeId, slot: usize, source: Option<BitIndex>) -> Result<()> {
        self.configure(id, "remap", |node, port| {
            let remap = node.as_remap_mut()?;
            remap.set_mapping(slot, source, port);
            Some(())
        })
    }

    /// Replace a remapper's whole table (identity/clear presets included).
    pub fn set_remap_table(&mut self, id: NodeId, mapping: Mapping) -> Result<()> {
        self.configure(id, "remap", |node, port| {
            let remap = node.as_remap_mut()?;
            remap.set_table(mapping, port);
            Some(())
        })
    }

    /// Drive one line of a constant source.
    pub fn set_source_bit(&mut self, id: NodeId, pos: BitIndex, on: bool) -> Result<()> {
        self.configure(id, "source", |node, port| {
            let source = node.as_source_mut()?;
            source.set_bit(pos, on, port);
            Some(())
        })
    }

    /// Replace a constant source's whole value.
    pub fn set_source_value(&mut self, id: NodeId, value: Signal) -> Result<()> {
        self.configure(id, "source", |node, port| {
            let source = node.as_source_mut()?;
            source.set_value(value, port);
            Some(())
        })
    }

    fn configure<F>(&mut self, id: NodeId, expected: &'static str, op: F) -> Result<()>
    where
        F: FnOnce(&mut Node, &mut dyn SignalPort) -> Option<()>,
    {
        let node = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        let found = node.kind();
        let mut mailbox = Mailbox::default();
        op(node, &mut mailbox).ok_or(Error::KindMismatch { node: id, expected, found })?;
        let mut queue = VecDeque::new();
        self.settle(id, mailbox, &mut queue);
        self.drain(&mut queue);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
