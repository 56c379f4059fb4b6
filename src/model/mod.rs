//! # Signal Model
//!
//! Pure data types that cross every boundary: nodes ↔ fabric ↔ host.
//!
//! Design rule: no node state, no dispatch, no I/O here. This module is
//! values only.

pub mod port;
pub mod signal;

pub use port::{NodeId, PortId};
pub use signal::{BitIndex, Signal, Width};
