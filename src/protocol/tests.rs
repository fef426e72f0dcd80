// src/protocol/tests.rs

use super::*;
use chrono::NaiveDate;

#[test]
fn clear_frames_carry_the_mode() {
    assert_eq!(
        clear(ClearMode::Full).as_bytes(),
        &[0x11, 1, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        clear(ClearMode::ResetCursor).as_bytes(),
        &[0x11, 2, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn builtin_clock_trigger_is_fixed() {
    let frame = trigger_builtin_clock();
    assert_eq!(frame.command(), Some(Command::BuiltinClock));
    assert_eq!(frame.as_bytes(), &[0x31, 3, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn clock_data_packs_decimal_digits_as_nibbles() {
    let now = NaiveDate::from_ymd_opt(2024, 9, 14)
        .unwrap()
        .and_hms_opt(14, 5, 9)
        .unwrap();
    let [data, trigger] = builtin_clock(&now);

    assert_eq!(data.header(), 0xD7);
    // 2024-09-14 is a Saturday.
    assert_eq!(data.payload(), &[0x09, 0x05, 0x14, 6, 0x14, 0x09, 0x24]);
    assert_eq!(trigger, trigger_builtin_clock());
}

#[test]
fn clock_data_sunday_is_zero_and_weekday_is_not_packed() {
    let data = ClockData {
        second: 59,
        minute: 59,
        hour: 23,
        weekday: 0,
        day: 31,
        month: 12,
        year: 2099,
    };
    assert_eq!(
        clock_data(&data).payload(),
        &[0x59, 0x59, 0x23, 0, 0x31, 0x12, 0x99]
    );
}

#[test]
fn clock_data_clamps_years_outside_the_century() {
    let mut data = ClockData {
        second: 0,
        minute: 0,
        hour: 0,
        weekday: 4,
        day: 1,
        month: 1,
        year: 1999,
    };
    assert_eq!(clock_data(&data).payload()[6], 0x00);
    data.year = 2150;
    assert_eq!(clock_data(&data).payload()[6], 0x99);
}

#[test]
fn text_longer_than_one_frame_is_chunked() {
    let frames = encode_text(b"ABCDEFGHIJ", 20);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].as_bytes(), b"\x97ABCDEFG");
    assert_eq!(frames[1].header(), 0x93);
    assert_eq!(frames[1].payload(), b"HIJ");
    assert_eq!(&frames[1].as_bytes()[4..], &[0, 0, 0, 0]);
}

#[test]
fn exact_multiple_emits_no_trailing_empty_frame() {
    let frames = text(b"ABCDEFGHIJKLMN");
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|f| f.header() == 0x97));
    assert!(text(b"").is_empty());
}

#[test_log::test]
fn text_is_truncated_to_display_width() {
    let row = [b'x'; 25];
    let frames = encode_text(&row, 20);
    let sent: usize = frames.iter().map(Packet::payload_len).sum();
    assert_eq!(sent, 20);
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].header(), 0x96);
}

#[test]
fn icon_mask_is_split_into_five_bit_groups() {
    let mask = (1 << 4) | (5 << 15);
    let frame = icons(mask).unwrap();
    assert_eq!(frame.as_bytes(), &[0x74, 5, 0, 0, 0x10, 0, 0, 0]);

    let all = icons(ICON_MASK_LIMIT).unwrap();
    assert_eq!(all.payload(), &[0x1F, 0x1F, 0x1F, 0x1F]);
}

#[test]
fn icon_mask_beyond_twenty_bits_is_rejected() {
    assert_eq!(
        icons(1 << 20),
        Err(ProtocolError::IconMaskOutOfRange(1 << 20))
    );
}

#[test]
fn packet_debug_prints_hex_bytes() {
    assert_eq!(
        format!("{:?}", clear(ClearMode::Full)),
        "Packet(11 01 00 00 00 00 00 00)"
    );
}
