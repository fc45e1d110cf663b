#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_accented() {
    assert_eq!(truncate("Alimentación", 8), "Aliment…");
}

#[test]
fn test_truncate_one_char() {
    assert_eq!(truncate("hello", 1), "…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-$42.50");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(1234567.89)), "$1,234,567.89");
}

#[test]
fn test_format_amount_pads_decimals() {
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
    assert_eq!(format_amount(dec!(5)), "$5.00");
}

#[test]
fn test_format_amount_rounds_half_up() {
    assert_eq!(format_amount(dec!(2.005)), "$2.01");
    assert_eq!(format_amount(dec!(1234567.891)), "$1,234,567.89");
}

// ── format_whole / format_percent ─────────────────────────────

#[test]
fn test_format_whole() {
    assert_eq!(format_whole(dec!(1234.6)), "$1,235");
    assert_eq!(format_whole(dec!(0)), "$0");
    assert_eq!(format_whole(dec!(-80.2)), "-$80");
}

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(dec!(33.3333)), "33%");
    assert_eq!(format_percent(dec!(66.6667)), "67%");
    assert_eq!(format_percent(dec!(100.00)), "100%");
}

// ── text_bar ──────────────────────────────────────────────────

#[test]
fn test_text_bar_widths() {
    assert_eq!(text_bar(0.0, 4), "░░░░");
    assert_eq!(text_bar(50.0, 4), "██░░");
    assert_eq!(text_bar(100.0, 4), "████");
}

#[test]
fn test_text_bar_clamps() {
    assert_eq!(text_bar(250.0, 3), "███");
    assert_eq!(text_bar(-10.0, 3), "░░░");
}

// ── paint ─────────────────────────────────────────────────────

#[test]
fn test_paint_hex() {
    assert_eq!(paint("Casa", "#4f46e5"), "\x1b[38;2;79;70;229mCasa\x1b[0m");
}

#[test]
fn test_paint_invalid_color_is_plain() {
    assert_eq!(paint("Casa", ""), "Casa");
    assert_eq!(paint("Casa", "#abc"), "Casa");
    assert_eq!(paint("Casa", "#zzzzzz"), "Casa");
}
