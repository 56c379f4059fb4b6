//! End-to-end tests for the pure evaluation functions: gate combinators,
//! mux/demux address decode, and bit permutation.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use dense_logic::nodes::{gate, mux, remap};
use dense_logic::{BitIndex, GateMode, Mapping, MuxDirection, Signal};

// ============================================================================
// 1. Gate truth tables
// ============================================================================

#[test]
fn test_gate_truth_tables() {
    let a = Signal::ribbon(0b1100);
    let b = Signal::ribbon(0b1010);

    assert_eq!(gate::evaluate(a, b, GateMode::And).value(), 0b1000);
    assert_eq!(gate::evaluate(a, b, GateMode::Or).value(), 0b1110);
    assert_eq!(gate::evaluate(a, b, GateMode::Xor).value(), 0b0110);
    assert_eq!(gate::evaluate(a, b, GateMode::Nand).value(), 0b0111);
    assert_eq!(gate::evaluate(a, b, GateMode::Nor).value(), 0b0001);
    assert_eq!(gate::evaluate(a, b, GateMode::Xnor).value(), 0b1001);
}

// ============================================================================
// 2. Complements are width-masked, exhaustively
// ============================================================================

#[test]
fn test_complement_pairs_over_full_domain() {
    let pairs = [
        (GateMode::And, GateMode::Nand),
        (GateMode::Or, GateMode::Nor),
        (GateMode::Xor, GateMode::Xnor),
    ];
    for a in 0..16u8 {
        for b in 0..16u8 {
            let (a, b) = (Signal::ribbon(a), Signal::ribbon(b));
            for (plain, complement) in pairs {
                let flipped = !gate::evaluate(a, b, plain);
                assert_eq!(gate::evaluate(a, b, complement), flipped);
                assert!(flipped.value() < 16, "complement escaped 4 bits");
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_nand_is_masked_not_of_and(a in 0u8..16, b in 0u8..16) {
        let (a, b) = (Signal::ribbon(a), Signal::ribbon(b));
        let nand = gate::evaluate(a, b, GateMode::Nand);
        prop_assert_eq!(nand, !gate::evaluate(a, b, GateMode::And));
        prop_assert!(nand.value() < 16);
    }

    #[test]
    fn prop_mux_selects_exactly_the_addressed_bit(
        data in 0u8..16,
        c1 in proptest::bool::ANY,
        c2 in proptest::bool::ANY,
    ) {
        let data = Signal::ribbon(data);
        let out = mux::decode(data, Signal::bit(c1), Signal::bit(c2), MuxDirection::Mux);
        let addr = c1 as u8 + 2 * c2 as u8;
        prop_assert_eq!(out.value() == 1, data.bit_at(addr));
    }
}

// ============================================================================
// 3. Address decode
// ============================================================================

#[test]
fn test_mux_addressing() {
    let data = Signal::ribbon(0b0101);
    // addr = 1 + 2*1 = 3 → bit 3 of 0101 is 0
    let out = mux::decode(data, Signal::bit(true), Signal::bit(true), MuxDirection::Mux);
    assert_eq!(out.value(), 0);
    // addr = 2 → bit 2 of 0101 is 1
    let out = mux::decode(data, Signal::bit(false), Signal::bit(true), MuxDirection::Mux);
    assert_eq!(out.value(), 1);
}

#[test]
fn test_demux_addressing() {
    // data bit high, addr = 0 + 2*1 = 2
    let out = mux::decode(
        Signal::bit(true),
        Signal::bit(false),
        Signal::bit(true),
        MuxDirection::Demux,
    );
    assert_eq!(out.value(), 0b0100);

    // at most one bit set, for every address
    for c1 in [false, true] {
        for c2 in [false, true] {
            let out = mux::decode(
                Signal::bit(true),
                Signal::bit(c1),
                Signal::bit(c2),
                MuxDirection::Demux,
            );
            assert_eq!(out.value().count_ones(), 1);
        }
    }
}

// ============================================================================
// 4. Bit permutation
// ============================================================================

#[test]
fn test_remap_scenario() {
    let mut mapping = Mapping::cleared();
    mapping.set(0, BitIndex::new(3));
    mapping.set(2, BitIndex::new(0));
    mapping.set(3, BitIndex::new(0));

    assert_eq!(mapping.apply(Signal::ribbon(0b1011)).value(), 0b1101);
}

#[test]
fn test_remap_duplicate_sources_allowed() {
    // all four outputs reading the same input line is legal
    let mut mapping = Mapping::cleared();
    for slot in 0..4 {
        mapping.set(slot, BitIndex::new(1));
    }
    assert_eq!(mapping.apply(Signal::ribbon(0b0010)).value(), 0b1111);
    assert_eq!(mapping.apply(Signal::ribbon(0b1101)).value(), 0);
}

// ============================================================================
// 5. Node-level idempotence (repeated identical notifications)
// ============================================================================

#[test]
fn test_gate_node_reemits_identical_values() {
    use dense_logic::{GateNode, Recorder};

    let mut node = GateNode::new(GateMode::And);
    let mut rec = Recorder::new();
    for _ in 0..3 {
        node.on_value_changed(gate::IN_A, Signal::ribbon(0b1111), &mut rec);
    }
    assert_eq!(rec.sent.len(), 3);
    assert!(rec.sent.iter().all(|s| *s == (gate::OUT, Signal::ribbon(0))));
    assert_eq!(node.output().value(), 0);
}

#[test]
fn test_remap_node_reemits_on_input() {
    use dense_logic::{Recorder, RemapNode};

    let mut node = RemapNode::new();
    let mut rec = Recorder::new();
    node.on_value_changed(remap::INPUT, Signal::ribbon(0b0110), &mut rec);
    node.on_value_changed(remap::INPUT, Signal::ribbon(0b0110), &mut rec);
    assert_eq!(rec.sent.len(), 2);
    assert_eq!(rec.sent[0], rec.sent[1]);
}
