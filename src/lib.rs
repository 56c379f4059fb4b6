//! # dense-logic — Multi-bit Signal Evaluation Core
//!
//! The evaluation kernel for a family of 4-bit logic elements: dense gates,
//! a multiplexer/demultiplexer pair, a bit-permutation remapper, an edge
//! detector, an inline bit-sliced gate, and a constant source — plus the
//! discrete-time update model that drives the sequential element.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: [`SignalPort`] is the contract between nodes and
//!    whatever routes their signals
//! 2. **Clean DTOs**: [`Signal`], [`NodeId`], [`PortId`] cross all boundaries
//! 3. **Evaluators own nothing**: gate/mux/remap evaluation is a pure function
//! 4. **Kind dispatch is closed**: [`Node`] is a tagged enum, matched, never
//!    downcast
//!
//! ## Quick Start
//!
//! ```rust
//! use dense_logic::{Fabric, GateMode, Signal};
//! use dense_logic::nodes::{edge, gate};
//!
//! # fn example() -> dense_logic::Result<()> {
//! let mut fabric = Fabric::new();
//! let g = fabric.add_gate(GateMode::Xor);
//! let e = fabric.add_edge_detector();
//! fabric.connect(g, gate::OUT, e, edge::INPUT)?;
//!
//! fabric.signal(g, gate::IN_A, Signal::ribbon(0b1100))?;
//! fabric.tick();
//! assert_eq!(fabric.output(e)?.value(), 0b1100);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## What lives where
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | `Signal` bit-vectors, node/port ids — pure data |
//! | [`nodes`] | the six node kinds and their evaluation functions |
//! | [`fabric`] | `SignalPort` contract + the reference dispatcher |
//!
//! Placement, rendering, persistence, and engine lifecycle are the host's
//! business: nodes expose their persisted fields via `serde` and everything
//! else through [`SignalPort`].

// ============================================================================
// Modules
// ============================================================================

pub mod fabric;
pub mod model;
pub mod nodes;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{BitIndex, NodeId, PortId, Signal, Width};

// ============================================================================
// Re-exports: Nodes
// ============================================================================

pub use nodes::{
    EdgeDetector, GateMode, GateNode, InlineGateNode, Mapping, MuxDirection, MuxNode, Node,
    RemapNode, SourceNode,
};

// ============================================================================
// Re-exports: Fabric
// ============================================================================

pub use fabric::{Fabric, Recorder, SignalPort};

// ============================================================================
// Error Types
// ============================================================================

/// Fabric-level failures. Node evaluation itself is total: corrupted
/// configuration clamps rather than erroring, and unrecognized ports are
/// ignored, so errors only arise from wiring and lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no node with id {0}")]
    NodeNotFound(NodeId),

    #[error("node {node} ({kind}) has no port {port}")]
    UnknownPort {
        node: NodeId,
        kind: &'static str,
        port: PortId,
    },

    #[error("node {node} is a {found}, expected a {expected}")]
    KindMismatch {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
