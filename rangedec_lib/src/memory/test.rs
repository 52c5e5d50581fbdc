use num_traits::{FromPrimitive, ToPrimitive};
use crate::config::Configuration;
use super::decoder::{AddressDecoder, ErrorCode, LookupRequest, LookupResult, SearchStrategy, Selection};

fn eight_by_eight() -> AddressDecoder {
    AddressDecoder::new(Configuration::new(8, 32, vec![8; 8]).unwrap()).unwrap()
}

#[test]
fn test_decode_hits() {
    let d = eight_by_eight();

    assert_eq!(d.mask().bits(), 6);
    assert_eq!(d.mask().mask(), 0x3f);

    assert_eq!(d.decode_address(0), LookupResult::hit(0, 0));
    assert_eq!(d.decode_address(9), LookupResult::hit(1, 1));
    assert_eq!(d.decode_address(63), LookupResult::hit(7, 7));
}

#[test]
fn test_decode_mirrors() {
    let d = eight_by_eight();

    // Bits above the 64 byte window are dropped before comparing
    assert_eq!(d.decode_address(64), LookupResult::hit(0, 0));
    assert_eq!(d.decode_address(200), LookupResult::hit(1, 0));
    assert_eq!(d.decode_address(0xff), LookupResult::hit(7, 7));
}

#[test]
fn test_decode_out_of_range() {
    // 40 addresses: 6 bit window, 40..=63 is a hole
    let d = AddressDecoder::new(Configuration::new(8, 8, vec![16, 16, 8]).unwrap()).unwrap();

    assert_eq!(d.decode_address(39), LookupResult::hit(2, 7));

    let r = d.decode_address(40);
    assert_eq!(r, LookupResult::out_of_range(40));
    assert_eq!(r.selection(), Selection::OutOfRange { address: 40 });

    // The raw address is reported, not the masked one
    let r = d.decode_address(0xe8);
    assert_eq!(r.error, ErrorCode::AddressOutOfRange);
    assert_eq!(r.error_address, 0xe8);
    assert_eq!(r.selected, None);
    assert_eq!(r.offset, 0);
}

#[test]
fn test_decode_gated() {
    let d = eight_by_eight();

    for addr in [0, 9, 64, 0xff] {
        let req = LookupRequest::new(addr);

        assert_eq!(d.decode(req.with_enable(false)), LookupResult::IDLE);
        assert_eq!(d.decode(req.with_select(false)), LookupResult::IDLE);
        assert_eq!(
            d.decode(req.with_enable(false).with_select(false)),
            LookupResult::IDLE
        );
    }

    // Gating wins over an out of range address too
    let d = AddressDecoder::new(Configuration::new(8, 8, vec![3]).unwrap()).unwrap();
    assert!(d.decode_address(3).is_error());
    assert_eq!(
        d.decode(LookupRequest::new(3).with_select(false)).selection(),
        Selection::Idle
    );
}

#[test]
fn test_strategies_agree() {
    let sizes: Vec<u64> = (1..=40).collect();
    let config = Configuration::new(12, 16, sizes).unwrap();

    let linear = AddressDecoder::new(config.clone())
        .unwrap()
        .with_strategy(SearchStrategy::Linear);
    let binary = AddressDecoder::new(config)
        .unwrap()
        .with_strategy(SearchStrategy::Binary);

    for addr in 0..(1u64 << 12) {
        assert_eq!(
            linear.decode_address(addr),
            binary.decode_address(addr),
            "0x{:x}",
            addr
        );
    }
}

#[test]
fn test_select_lines() {
    let d = eight_by_eight();

    let lines = d.select_lines(LookupRequest::new(9));
    assert_eq!(lines.len(), 8);
    assert_eq!(lines.iter().filter(|&&l| l).count(), 1);
    assert!(lines[1]);

    let idle = d.select_lines(LookupRequest::new(9).with_enable(false));
    assert!(idle.iter().all(|&l| !l));
}

#[test]
fn test_selection_round_trip() {
    for s in [
        Selection::Idle,
        Selection::Region {
            index: 3,
            offset: 5,
        },
        Selection::OutOfRange { address: 0x40 },
    ] {
        assert_eq!(LookupResult::from(s).selection(), s);
    }
}

#[test]
fn test_error_code_values() {
    assert_eq!(ErrorCode::None.to_u8(), Some(0));
    assert_eq!(ErrorCode::AddressOutOfRange.to_u8(), Some(1));
    assert_eq!(ErrorCode::from_u8(1), Some(ErrorCode::AddressOutOfRange));
    assert_eq!(ErrorCode::from_u8(2), None);
}

#[test]
fn test_single_address_map() {
    // Total size 1: zero bit window, every address mirrors address 0
    let d = AddressDecoder::new(Configuration::new(16, 8, vec![1]).unwrap()).unwrap();

    assert_eq!(d.mask().bits(), 0);
    assert_eq!(d.decode_address(0), LookupResult::hit(0, 0));
    assert_eq!(d.decode_address(0xffff), LookupResult::hit(0, 0));
}

#[test]
fn test_full_width_bus() {
    let d = AddressDecoder::new(Configuration::new(64, 64, vec![1 << 63, 1 << 63]).unwrap())
        .unwrap();

    assert_eq!(d.mask().mask(), u64::MAX);
    assert_eq!(d.decode_address(u64::MAX), LookupResult::hit(1, (1 << 63) - 1));
    assert_eq!(d.decode_address(1 << 63), LookupResult::hit(1, 0));
    assert_eq!(d.decode_address((1 << 63) - 1), LookupResult::hit(0, (1 << 63) - 1));
}
