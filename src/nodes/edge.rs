//! Edge detector: once per tick, emits the bitwise difference between the
//! current input and the value sampled at the previous tick.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{PortId, Signal, Width};

pub const INPUT: PortId = PortId("EdgeDetector_IN");
pub const OUT: PortId = PortId("EdgeDetector_OUT");

fn ticking_default() -> bool {
    true
}

/// A sequential node: output depends on history across ticks, not on the
/// instantaneous input.
///
/// Two states, guarded solely by `ticking`:
/// - **Idle**: not subscribed to the tick broadcast; output is stable zero.
/// - **Active**: subscribed; each tick either emits the XOR of the last two
///   samples, clears a stale pulse, or drops back to Idle.
///
/// A fresh or freshly-loaded detector starts Active for at least one tick,
/// so a pulse that was mid-flight at save time still gets flushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDetector {
    input: Signal,
    sampled: Signal,
    #[serde(skip)]
    out: Signal,
    #[serde(skip, default = "ticking_default")]
    ticking: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self {
            input: Signal::zero(Width::Four),
            sampled: Signal::zero(Width::Four),
            out: Signal::zero(Width::Four),
            ticking: true,
        }
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    pub fn input(&self) -> Signal {
        self.input
    }

    /// Whether the node currently holds a tick subscription.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Store the new input. Does NOT re-evaluate the output — that only
    /// happens on a tick boundary. Wakes the node if it was Idle.
    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        if port_id != INPUT {
            return;
        }
        self.input = value.to_width(Width::Four);
        if !self.ticking {
            self.ticking = true;
            port.subscribe_tick();
        }
    }

    /// One discrete simulation step.
    pub fn on_tick(&mut self, port: &mut dyn SignalPort) {
        let mut changed = false;
        if self.input != self.sampled {
            self.out = self.input ^ self.sampled;
            changed = true;
        } else if !self.out.is_zero() {
            // spend one extra tick clearing the stale pulse, so every
            // transition is high for exactly one tick
            self.out = Signal::zero(Width::Four);
            changed = true;
        }
        if changed {
            port.send_signal(OUT, self.out);
            self.sampled = self.input;
        } else if self.ticking {
            // quiescent: stop consuming ticks until the next input change
            self.ticking = false;
            port.unsubscribe_tick();
        }
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::Recorder;

    #[test]
    fn test_pulse_lifecycle() {
        let mut node = EdgeDetector::new();
        let mut rec = Recorder::new();

        // fresh node is Active but quiescent: first tick puts it to sleep
        node.on_tick(&mut rec);
        assert!(!node.is_ticking());
        assert_eq!(rec.tick_unsubscribes, 1);
        assert!(rec.sent.is_empty());

        // input change wakes it
        node.on_value_changed(INPUT, Signal::ribbon(0b0001), &mut rec);
        assert!(node.is_ticking());
        assert_eq!(rec.tick_subscribes, 1);
        assert!(rec.sent.is_empty()); // no output until the tick

        // tick 1: pulse goes high
        node.on_tick(&mut rec);
        assert_eq!(node.output().value(), 0b0001);
        assert_eq!(rec.sent, vec![(OUT, Signal::ribbon(0b0001))]);

        // tick 2: pulse clears
        node.on_tick(&mut rec);
        assert_eq!(node.output().value(), 0);
        assert_eq!(rec.sent.last(), Some(&(OUT, Signal::ribbon(0))));
        assert!(node.is_ticking());

        // tick 3: quiescent, back to Idle
        node.on_tick(&mut rec);
        assert!(!node.is_ticking());
        assert_eq!(rec.tick_unsubscribes, 2);
    }

    #[test]
    fn test_multi_bit_difference() {
        let mut node = EdgeDetector::new();
        let mut rec = Recorder::new();
        node.on_value_changed(INPUT, Signal::ribbon(0b1010), &mut rec);
        node.on_tick(&mut rec);
        assert_eq!(node.output().value(), 0b1010);

        // falling edge on bit 3, rising on bit 0 within the same tick
        node.on_value_changed(INPUT, Signal::ribbon(0b0011), &mut rec);
        node.on_tick(&mut rec);
        assert_eq!(node.output().value(), 0b1001);
    }

    #[test]
    fn test_input_changes_between_ticks_collapse() {
        let mut node = EdgeDetector::new();
        let mut rec = Recorder::new();
        // flush the spawn-time subscription so the node is Idle
        node.on_tick(&mut rec);
        assert_eq!(rec.tick_subscribes, 0);

        // several notifications before a tick: only the latest sample counts
        node.on_value_changed(INPUT, Signal::ribbon(0b0001), &mut rec);
        node.on_value_changed(INPUT, Signal::ribbon(0b0011), &mut rec);
        node.on_value_changed(INPUT, Signal::ribbon(0b0010), &mut rec);
        assert_eq!(rec.tick_subscribes, 1); // subscription is idempotent

        node.on_tick(&mut rec);
        assert_eq!(node.output().value(), 0b0010);
    }

    #[test]
    fn test_deserialized_node_starts_ticking() {
        let mut node = EdgeDetector::new();
        let mut rec = Recorder::new();
        node.on_value_changed(INPUT, Signal::ribbon(0b0100), &mut rec);
        node.on_tick(&mut rec);

        let json = serde_json::to_string(&node).unwrap();
        let restored: EdgeDetector = serde_json::from_str(&json).unwrap();
        assert!(restored.is_ticking());
        assert_eq!(restored.input(), node.input());
        // transient output is rebuilt, not persisted
        assert_eq!(restored.output().value(), 0);
    }
}
