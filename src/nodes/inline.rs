//! Inline gate: a 1-bit gate spliced onto a single bidirectional ribbon
//! port. Two selectable input lines feed the combinator; the result drives
//! one selectable output line.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{BitIndex, PortId, Signal, Width};
use crate::nodes::gate::{evaluate, GateMode};

pub const IO: PortId = PortId("InlineGate_IO");

/// A bit-sliced gate sharing one port for input and output.
///
/// Because its own emission echoes back on the shared port, the node only
/// re-evaluates when the incoming value genuinely differs from the stored
/// input register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineGateNode {
    input: Signal,
    mode: GateMode,
    in_bit_a: BitIndex,
    in_bit_b: BitIndex,
    out_bit: BitIndex,
    #[serde(skip)]
    out: Signal,
}

impl InlineGateNode {
    pub fn new(mode: GateMode) -> Self {
        Self {
            input: Signal::zero(Width::Four),
            mode,
            in_bit_a: BitIndex::clamped(0),
            in_bit_b: BitIndex::clamped(1),
            out_bit: BitIndex::clamped(0),
            out: Signal::zero(Width::Four),
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    pub fn selectors(&self) -> (BitIndex, BitIndex, BitIndex) {
        (self.in_bit_a, self.in_bit_b, self.out_bit)
    }

    pub fn set_mode(&mut self, mode: GateMode, port: &mut dyn SignalPort) {
        self.mode = mode;
        self.update(port);
    }

    /// Re-pick which lines feed the gate and which line it drives.
    pub fn set_selectors(
        &mut self,
        in_bit_a: BitIndex,
        in_bit_b: BitIndex,
        out_bit: BitIndex,
        port: &mut dyn SignalPort,
    ) {
        self.in_bit_a = in_bit_a;
        self.in_bit_b = in_bit_b;
        self.out_bit = out_bit;
        self.update(port);
    }

    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        if port_id != IO {
            return;
        }
        let value = value.to_width(Width::Four);
        // change-gated: the shared port feeds our own emission back
        if value == self.input {
            return;
        }
        self.input = value;
        self.update(port);
    }

    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        self.update(port);
    }

    fn update(&mut self, port: &mut dyn SignalPort) {
        let a = Signal::bit(self.input.bit_at(self.in_bit_a.get()));
        let b = Signal::bit(self.input.bit_at(self.in_bit_b.get()));
        let result = evaluate(a, b, self.mode);
        self.out = Signal::ribbon(result.value() << self.out_bit.get());
        port.send_signal(IO, self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Recorder;

    fn idx(raw: u8) -> BitIndex {
        BitIndex::new(raw).unwrap()
    }

    #[test]
    fn test_bit_sliced_xor() {
        let mut node = InlineGateNode::new(GateMode::Xor);
        let mut rec = Recorder::new();
        node.set_selectors(idx(1), idx(3), idx(0), &mut rec);
        rec.clear();

        node.on_value_changed(IO, Signal::ribbon(0b1010), &mut rec);
        // bit1=1, bit3=1 → xor = 0, shifted to bit 0
        assert_eq!(node.output().value(), 0b0000);

        node.on_value_changed(IO, Signal::ribbon(0b0010), &mut rec);
        assert_eq!(node.output().value(), 0b0001);
    }

    #[test]
    fn test_complement_masked_to_one_bit() {
        let mut node = InlineGateNode::new(GateMode::Xnor);
        let mut rec = Recorder::new();
        node.set_selectors(idx(1), idx(3), idx(2), &mut rec);
        node.on_value_changed(IO, Signal::ribbon(0b1010), &mut rec);
        // xnor(1,1) = 1, one bit wide, shifted to bit 2
        assert_eq!(node.output().value(), 0b0100);

        node.on_value_changed(IO, Signal::ribbon(0b0010), &mut rec);
        // xnor(1,0) = 0: the complement never smears past the output bit
        assert_eq!(node.output().value(), 0);
    }

    #[test]
    fn test_echo_does_not_retrigger() {
        let mut node = InlineGateNode::new(GateMode::Or);
        let mut rec = Recorder::new();
        node.on_value_changed(IO, Signal::ribbon(0b0010), &mut rec);
        assert_eq!(rec.sent.len(), 1);

        // identical value again: the change-gate swallows it
        node.on_value_changed(IO, Signal::ribbon(0b0010), &mut rec);
        assert_eq!(rec.sent.len(), 1);
    }
}
