//! Signal remapper: re-orders the four lines of a ribbon per a configurable
//! mapping table.

use serde::{Deserialize, Serialize};

use crate::fabric::SignalPort;
use crate::model::{BitIndex, PortId, Signal, Width};

pub const INPUT: PortId = PortId("SignalRemapper_IN");
pub const OUT: PortId = PortId("SignalRemapper_OUT");

/// Persisted marker for "no source bit" in the raw mapping form.
pub const NO_BIT: i8 = -1;

/// Per-output-position source selection. `mapping[i] = Some(j)` wires output
/// line `i` to input line `j`; `None` drives output line `i` low. Several
/// outputs may read the same input line; input lines may go unused.
///
/// Serializes as `[i8; 4]` with `-1` for "no source"; out-of-range values in
/// a corrupted save clamp on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i8; 4]", into = "[i8; 4]")]
pub struct Mapping([Option<BitIndex>; 4]);

impl Mapping {
    /// Every output line reads its own input line.
    pub fn identity() -> Self {
        Self([
            BitIndex::new(0),
            BitIndex::new(1),
            BitIndex::new(2),
            BitIndex::new(3),
        ])
    }

    /// Every output line driven low.
    pub fn cleared() -> Self {
        Self([None; 4])
    }

    pub fn get(&self, slot: usize) -> Option<BitIndex> {
        self.0.get(slot).copied().flatten()
    }

    /// Set one output position's source. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, source: Option<BitIndex>) {
        if let Some(entry) = self.0.get_mut(slot) {
            *entry = source;
        }
    }

    /// Raw setter for values arriving from persisted or UI state: anything
    /// below zero means "no source", anything above the ribbon clamps.
    pub fn set_raw(&mut self, slot: usize, raw: i8) {
        let source = if raw < 0 {
            None
        } else {
            Some(BitIndex::clamped(raw))
        };
        self.set(slot, source);
    }

    /// Apply the permutation. Pure.
    pub fn apply(&self, input: Signal) -> Signal {
        let mut out = Signal::zero(Width::Four);
        for (pos, source) in self.0.iter().enumerate() {
            if let Some(src) = source {
                out = out.with_bit(pos as u8, input.bit_at(src.get()));
            }
        }
        out
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[i8; 4]> for Mapping {
    fn from(raw: [i8; 4]) -> Self {
        let mut mapping = Self::cleared();
        for (slot, &value) in raw.iter().enumerate() {
            mapping.set_raw(slot, value);
        }
        mapping
    }
}

impl From<Mapping> for [i8; 4] {
    fn from(mapping: Mapping) -> [i8; 4] {
        mapping.0.map(|source| source.map_or(NO_BIT, |s| s.get() as i8))
    }
}

/// A bit-permutation node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemapNode {
    input: Signal,
    mapping: Mapping,
    #[serde(skip)]
    out: Signal,
}

impl RemapNode {
    pub fn new() -> Self {
        Self {
            input: Signal::zero(Width::Four),
            mapping: Mapping::identity(),
            out: Signal::zero(Width::Four),
        }
    }

    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    pub fn output(&self) -> Signal {
        self.out
    }

    pub fn on_value_changed(&mut self, port_id: PortId, value: Signal, port: &mut dyn SignalPort) {
        if port_id != INPUT {
            return;
        }
        self.input = value.to_width(Width::Four);
        self.update(port);
    }

    /// Re-wire one output position. Re-evaluates and re-emits.
    pub fn set_mapping(&mut self, slot: usize, source: Option<BitIndex>, port: &mut dyn SignalPort) {
        self.mapping.set(slot, source);
        self.update(port);
    }

    /// Replace the whole table (presets, copy-settings). Re-evaluates.
    pub fn set_table(&mut self, mapping: Mapping, port: &mut dyn SignalPort) {
        self.mapping = mapping;
        self.update(port);
    }

    pub fn refresh(&mut self, port: &mut dyn SignalPort) {
        self.update(port);
    }

    fn update(&mut self, port: &mut dyn SignalPort) {
        self.out = self.mapping.apply(self.input);
        port.send_signal(OUT, self.out);
    }
}

impl Default for RemapNode {
    fn default() -> Self {
        Self::new()
    }
}
