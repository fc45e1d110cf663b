#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use super::*;
use crate::aggregate::{summarize, weekly_series, Period};

fn expense(id: &str, amount: Decimal, category: &str, d: u32) -> Expense {
    Expense {
        id: id.into(),
        amount,
        description: format!("gasto {id}"),
        category: category.into(),
        date: Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap(),
    }
}

fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

// ── Week ──────────────────────────────────────────────────────

#[test]
fn test_week_marks_today_once() {
    let all = vec![expense("a", dec!(30), "Casa", 10)];
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let series = weekly_series(&all, today, &Utc);
    let text = render(|out| week(out, &series));

    assert!(text.starts_with("Last 7 days: $30.00\n"));
    assert_eq!(text.matches("< today").count(), 1);
    let last = text.lines().last().unwrap();
    assert!(last.starts_with("Sun 10-03"), "{last}");
    assert!(last.contains(&"█".repeat(BAR_WIDTH)));
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_summary_with_budget_left() {
    let all = vec![
        expense("a", dec!(300), "Casa", 1),
        expense("b", dec!(100), "Salud", 2),
    ];
    let s = summarize(&all, &Category::defaults(), Period::Month { year: 2024, month: 3 }, &Utc);
    let text = render(|out| summary(out, &s, Some(dec!(1000)), false));

    assert!(text.starts_with("March 2024\n"));
    assert!(text.contains("$400.00"));
    assert!(text.contains("Left"));
    assert!(text.contains("$600.00"));
    assert!(text.contains("40%"));
    let casa = text.lines().position(|l| l.contains("Casa")).unwrap();
    let salud = text.lines().position(|l| l.contains("Salud")).unwrap();
    assert!(casa < salud);
    assert!(!text.contains(DANGLING_NOTE));
}

#[test]
fn test_summary_over_budget() {
    let all = vec![expense("a", dec!(1200), "Casa", 1)];
    let s = summarize(&all, &Category::defaults(), Period::Month { year: 2024, month: 3 }, &Utc);
    let text = render(|out| summary(out, &s, Some(dec!(1000)), false));
    assert!(text.contains("Over budget"));
    assert!(text.contains("$200.00"));
    assert!(text.contains("120%"));
}

#[test]
fn test_summary_hides_unset_budget() {
    let all = vec![expense("a", dec!(10), "Casa", 1)];
    let s = summarize(&all, &Category::defaults(), Period::Year(2024), &Utc);
    let text = render(|out| summary(out, &s, Some(dec!(0)), false));
    assert!(!text.contains("Budget"));
    let text = render(|out| summary(out, &s, None, false));
    assert!(!text.contains("Budget"));
}

#[test]
fn test_summary_flags_dangling_category() {
    let all = vec![expense("a", dec!(10), "Juegos", 1)];
    let s = summarize(&all, &Category::defaults(), Period::Year(2024), &Utc);
    let text = render(|out| summary(out, &s, None, false));
    assert!(text.contains("Juegos *"));
    assert!(text.contains(DANGLING_NOTE));
}

#[test]
fn test_summary_empty_period() {
    let s = summarize(&[], &Category::defaults(), Period::Year(2024), &Utc);
    let text = render(|out| summary(out, &s, None, false));
    assert!(text.contains("$0.00"));
    assert!(text.contains("No expenses in this period"));
}

// ── Lists ─────────────────────────────────────────────────────

#[test]
fn test_expense_list_rows() {
    let all = vec![expense("a1", dec!(12.5), "Casa", 5), expense("b2", dec!(3), "Juegos", 4)];
    let refs: Vec<&Expense> = all.iter().collect();
    let text = render(|out| expenses(out, &refs, &Category::defaults(), &Utc, false));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("05-03-2024  gasto a1"));
    assert!(lines[0].ends_with("$12.50  a1"));
    assert!(lines[1].contains("Juegos *"));
    assert_eq!(lines[2], DANGLING_NOTE);
}

#[test]
fn test_expense_list_empty() {
    let text = render(|out| expenses(out, &[], &[], &Utc, false));
    assert_eq!(text, "No expenses\n");
}

#[test]
fn test_category_table_counts_uses() {
    let all = vec![expense("a", dec!(1), "Casa", 1), expense("b", dec!(2), "Casa", 2)];
    let text = render(|out| categories(out, &Category::defaults(), &all));
    let casa = text.lines().find(|l| l.starts_with("Casa")).unwrap();
    assert!(casa.contains("#4f46e5"));
    assert!(casa.contains("home"));
    assert!(casa.ends_with(" 2"));
    assert_eq!(text.lines().count(), 12);
}
