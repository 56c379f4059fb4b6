//! Constant signal source: a user-settable 4-bit value with no inputs.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{BitIndex, PortId, Signal, Width};

pub const OUT: PortId = PortId("DenseInput_OUT");

/// A 4-bit constant source. The output register IS the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceNode {
    out: Signal,
}

impl SourceNode {
    pub fn new() -> Self {
        Self { out: Signal::zero(Width::Four) }
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    /// Drive one line high or low and re-emit.
    pub fn set_bit(&mut self, pos: BitIndex, on: bool, port: &mut dyn SignalPort) {
        self.out = self.out.with_bit(pos.get(), on);
        self.emit(port);
    }

    /// Replace the whole value and re-emit.
    pub fn set_value(&mut self, value: Signal, port: &mut dyn SignalPort) {
        self.out = value.to_width(Width::Four);
        self.emit(port);
    }

    /// Re-broadcast the stored value (after spawn or load).
    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        self.emit(port);
    }

    fn emit(&self, port: &mut dyn SignalPort) {
        port.send_signal(OUT, self.out);
    }
}

impl Default for SourceNode {
    fn default() -> Self {
        Self::new()
    }
}
