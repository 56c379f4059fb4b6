//! Dense logic gate: one of six boolean combinators over two 4-bit ribbons.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{PortId, Signal, Width};

pub const IN_A: PortId = PortId("DenseGate_IN1");
pub const IN_B: PortId = PortId("DenseGate_IN2");
pub const OUT: PortId = PortId("DenseGate_OUT");

/// The boolean combinator a gate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateMode {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl GateMode {
    pub const ALL: [GateMode; 6] = [
        GateMode::And,
        GateMode::Or,
        GateMode::Xor,
        GateMode::Nand,
        GateMode::Nor,
        GateMode::Xnor,
    ];

    /// Recover a mode from a raw persisted integer, clamping out-of-range
    /// values to `And` rather than failing a running simulation.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => GateMode::And,
            1 => GateMode::Or,
            2 => GateMode::Xor,
            3 => GateMode::Nand,
            4 => GateMode::Nor,
            5 => GateMode::Xnor,
            _ => {
                tracing::warn!(raw, "unknown gate mode, clamping to AND");
                GateMode::And
            }
        }
    }
}

/// Apply `mode` to two equal-width operands. Pure.
///
/// The complement forms mask back to the operand width: NOT over a 4-bit
/// ribbon flips exactly 4 bits, not the native integer width.
pub fn evaluate(a: Signal, b: Signal, mode: GateMode) -> Signal {
    match mode {
        GateMode::And => a & b,
        GateMode::Or => a | b,
        GateMode::Xor => a ^ b,
        GateMode::Nand => !(a & b),
        GateMode::Nor => !(a | b),
        GateMode::Xnor => !(a ^ b),
    }
}

/// A two-input 4-bit gate node.
///
/// Inputs persist across a save/reload cycle; the output is transient and
/// recomputed by [`GateNode::refresh`] after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateNode {
    in_a: Signal,
    in_b: Signal,
    mode: GateMode,
    #[serde(skip)]
    out: Signal,
}

impl GateNode {
    pub fn new(mode: GateMode) -> Self {
        Self {
            in_a: Signal::zero(Width::Four),
            in_b: Signal::zero(Width::Four),
            mode,
            out: Signal::zero(Width::Four),
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn inputs(&self) -> (Signal, Signal) {
        (self.in_a, self.in_b)
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    /// Change the combinator. Forces re-evaluation and re-emission even if
    /// the output value is unchanged.
    pub fn set_mode(&mut self, mode: GateMode, port: &mut dyn SignalPort) {
        self.mode = mode;
        self.update(port);
    }

    /// Inbound value-changed notification. Unrecognized ports are a no-op;
    /// recognized ports store the value and unconditionally re-emit.
    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        if port_id == IN_A {
            self.in_a = value.to_width(Width::Four);
        } else if port_id == IN_B {
            self.in_b = value.to_width(Width::Four);
        } else {
            return;
        }
        self.update(port);
    }

    /// Recompute and re-emit from current registers (after spawn or load).
    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        self.update(port);
    }

    fn update(&mut self, port: &mut dyn SignalPort) {
        self.out = evaluate(self.in_a, self.in_b, self.mode);
        port.send_signal(OUT, self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Recorder;

    #[test]
    fn test_basic_combinators() {
        let a = Signal::ribbon(0b1100);
        let b = Signal::ribbon(0b1010);
        assert_eq!(evaluate(a, b, GateMode::And).value(), 0b1000);
        assert_eq!(evaluate(a, b, GateMode::Or).value(), 0b1110);
        assert_eq!(evaluate(a, b, GateMode::Xor).value(), 0b0110);
    }

    #[test]
    fn test_complements_stay_within_width() {
        for a in 0..16u8 {
            for b in 0..16u8 {
                let (a, b) = (Signal::ribbon(a), Signal::ribbon(b));
                for mode in GateMode::ALL {
                    assert!(evaluate(a, b, mode).value() < 16);
                }
                assert_eq!(
                    evaluate(a, b, GateMode::Nand),
                    !evaluate(a, b, GateMode::And),
                );
            }
        }
    }

    #[test]
    fn test_value_changed_updates_and_emits() {
        let mut gate = GateNode::new(GateMode::And);
        let mut rec = Recorder::new();

        gate.on_value_changed(IN_A, Signal::ribbon(0b1100), &mut rec);
        gate.on_value_changed(IN_B, Signal::ribbon(0b1010), &mut rec);

        assert_eq!(gate.output().value(), 0b1000);
        assert_eq!(rec.sent.len(), 2);
        assert_eq!(rec.sent[1], (OUT, Signal::ribbon(0b1000)));
    }

    #[test]
    fn test_unknown_port_is_noop() {
        let mut gate = GateNode::new(GateMode::Or);
        let mut rec = Recorder::new();
        gate.on_value_changed(PortId("bogus"), Signal::ribbon(0b1111), &mut rec);
        assert!(rec.sent.is_empty());
        assert_eq!(gate.output().value(), 0);
    }

    #[test]
    fn test_set_mode_reevaluates() {
        let mut gate = GateNode::new(GateMode::And);
        let mut rec = Recorder::new();
        gate.on_value_changed(IN_A, Signal::ribbon(0b1100), &mut rec);
        gate.on_value_changed(IN_B, Signal::ribbon(0b1010), &mut rec);
        rec.clear();

        gate.set_mode(GateMode::Nor, &mut rec);
        assert_eq!(gate.output().value(), 0b0001);
        assert_eq!(rec.sent, vec![(OUT, Signal::ribbon(0b0001))]);
    }

    #[test]
    fn test_mode_from_raw_clamps() {
        assert_eq!(GateMode::from_raw(5), GateMode::Xnor);
        assert_eq!(GateMode::from_raw(-1), GateMode::And);
        assert_eq!(GateMode::from_raw(99), GateMode::And);
    }
}
