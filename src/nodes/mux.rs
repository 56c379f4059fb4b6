//! Multiplexer / demultiplexer: two 1-bit control lines address one of the
//! four data lines.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{PortId, Signal, Width};

pub const INPUT: PortId = PortId("DenseMux_IN");
pub const OUT: PortId = PortId("DenseMux_OUT");
pub const CONTROL1: PortId = PortId("DenseMux_CTRL1");
pub const CONTROL2: PortId = PortId("DenseMux_CTRL2");

/// Routing direction, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuxDirection {
    /// 4-bit data in, addressed bit out on a single wire.
    Mux,
    /// single wire in, one-hot 4-bit ribbon out at the addressed position.
    Demux,
}

/// Combine the two control lines into a bit address.
///
/// Both controls are stored at width 1, so the address is always in `0..=3`
/// and no bounds check is needed downstream.
fn address(ctrl1: Signal, ctrl2: Signal) -> u8 {
    ctrl1.value() + 2 * ctrl2.value()
}

/// The mux/demux routing function. Pure.
pub fn decode(data: Signal, ctrl1: Signal, ctrl2: Signal, direction: MuxDirection) -> Signal {
    let addr = address(ctrl1, ctrl2);
    match direction {
        MuxDirection::Mux => Signal::bit(data.bit_at(addr)),
        MuxDirection::Demux => {
            if data.is_high() {
                Signal::ribbon(1 << addr)
            } else {
                Signal::zero(Width::Four)
            }
        }
    }
}

/// A mux or demux node. Output is a pure function of the three input
/// registers; there is no internal memory beyond them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxNode {
    data: Signal,
    ctrl1: Signal,
    ctrl2: Signal,
    direction: MuxDirection,
    #[serde(skip)]
    out: Signal,
}

impl MuxNode {
    pub fn new(direction: MuxDirection) -> Self {
        Self {
            data: Signal::zero(Width::Four),
            ctrl1: Signal::zero(Width::One),
            ctrl2: Signal::zero(Width::One),
            direction,
            out: Signal::zero(match direction {
                MuxDirection::Mux => Width::One,
                MuxDirection::Demux => Width::Four,
            }),
        }
    }

    pub fn direction(&self) -> MuxDirection {
        self.direction
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        if port_id == INPUT {
            self.data = value.to_width(Width::Four);
        } else if port_id == CONTROL1 {
            self.ctrl1 = value.to_width(Width::One);
        } else if port_id == CONTROL2 {
            self.ctrl2 = value.to_width(Width::One);
        } else {
            return;
        }
        self.update(port);
    }

    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        self.update(port);
    }

    fn update(&mut self, port: &mut dyn SignalPort) {
        self.out = decode(self.data, self.ctrl1, self.ctrl2, self.direction);
        port.send_signal(OUT, self.out);
    }
}
