//! Fixed-width bit-vector signal values.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// Logical width of a signal: a single wire or a 4-bit ribbon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    One,
    Four,
}

impl Width {
    pub const fn bits(self) -> u8 {
        match self {
            Width::One => 1,
            Width::Four => 4,
        }
    }

    pub const fn mask(self) -> u8 {
        match self {
            Width::One => 0b1,
            Width::Four => 0b1111,
        }
    }
}

/// A fixed-width unsigned signal value.
///
/// Invariant: the stored value always satisfies `0 <= v < 2^W`. Every
/// constructor and every operator masks to width, including the complement —
/// a NOT over a 4-bit ribbon flips exactly 4 bits, never the native integer
/// width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SignalRepr", into = "SignalRepr")]
pub struct Signal {
    value: u8,
    width: Width,
}

/// Serialized form. Conversion back through `From` re-masks, so a corrupted
/// save clamps into the valid domain instead of breaking the invariant.
#[derive(Serialize, Deserialize)]
struct SignalRepr {
    width: Width,
    value: u8,
}

impl From<SignalRepr> for Signal {
    fn from(repr: SignalRepr) -> Self {
        Signal::new(repr.width, repr.value)
    }
}

impl From<Signal> for SignalRepr {
    fn from(s: Signal) -> Self {
        SignalRepr { width: s.width, value: s.value }
    }
}

impl Signal {
    pub fn new(width: Width, value: u8) -> Self {
        Self { value: value & width.mask(), width }
    }

    /// A single-wire signal.
    pub fn bit(on: bool) -> Self {
        Self { value: on as u8, width: Width::One }
    }

    /// A 4-bit ribbon signal (value masked to 4 bits).
    pub fn ribbon(value: u8) -> Self {
        Self::new(Width::Four, value)
    }

    pub fn zero(width: Width) -> Self {
        Self { value: 0, width }
    }

    pub const fn value(self) -> u8 {
        self.value
    }

    pub const fn width(self) -> Width {
        self.width
    }

    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Truthiness of the whole signal: any line high.
    pub const fn is_high(self) -> bool {
        self.value != 0
    }

    /// Value of the line at `pos`. Positions beyond the width read as low.
    pub const fn bit_at(self, pos: u8) -> bool {
        pos < self.width.bits() && (self.value >> pos) & 1 == 1
    }

    /// Copy of `self` with the line at `pos` driven to `on`.
    /// Positions beyond the width are ignored.
    pub fn with_bit(self, pos: u8, on: bool) -> Self {
        if pos >= self.width.bits() {
            return self;
        }
        let value = if on {
            self.value | (1 << pos)
        } else {
            self.value & !(1 << pos)
        };
        Self { value, width: self.width }
    }

    /// Reinterpret the raw value at another width (masking as needed).
    /// This is how a node coerces whatever arrives on a port into the
    /// register width that port expects.
    pub fn to_width(self, width: Width) -> Self {
        Self::new(width, self.value)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::zero(Width::Four)
    }
}

impl From<bool> for Signal {
    fn from(on: bool) -> Self {
        Signal::bit(on)
    }
}

// Operand widths are expected to match; the result takes the left width.
impl BitAnd for Signal {
    type Output = Signal;
    fn bitand(self, rhs: Signal) -> Signal {
        debug_assert_eq!(self.width, rhs.width);
        Signal::new(self.width, self.value & rhs.value)
    }
}

impl BitOr for Signal {
    type Output = Signal;
    fn bitor(self, rhs: Signal) -> Signal {
        debug_assert_eq!(self.width, rhs.width);
        Signal::new(self.width, self.value | rhs.value)
    }
}

impl BitXor for Signal {
    type Output = Signal;
    fn bitxor(self, rhs: Signal) -> Signal {
        debug_assert_eq!(self.width, rhs.width);
        Signal::new(self.width, self.value ^ rhs.value)
    }
}

impl Not for Signal {
    type Output = Signal;
    fn not(self) -> Signal {
        Signal::new(self.width, !self.value)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.width.bits() as usize)
    }
}

/// A bit position within a 4-bit ribbon (`0..=3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i8", into = "i8")]
pub struct BitIndex(u8);

impl BitIndex {
    /// Strict constructor: `None` for positions outside the ribbon.
    pub const fn new(raw: u8) -> Option<Self> {
        if raw < Width::Four.bits() {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Clamping constructor: out-of-range positions are pulled to the
    /// nearest valid one. Self-repair for corrupted configuration.
    pub fn clamped(raw: i8) -> Self {
        let max = (Width::Four.bits() - 1) as i8;
        if raw < 0 || raw > max {
            tracing::warn!(raw, "bit index out of range, clamping");
        }
        Self(raw.clamp(0, max) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<i8> for BitIndex {
    fn from(raw: i8) -> Self {
        Self::clamped(raw)
    }
}

impl From<BitIndex> for i8 {
    fn from(idx: BitIndex) -> i8 {
        idx.0 as i8
    }
}

impl fmt::Display for BitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
