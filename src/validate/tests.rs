#![allow(clippy::unwrap_used)]

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use super::*;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn madrid() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

// ── parse_amount ──────────────────────────────────────────────

#[test]
fn test_amount_dot_separator() {
    assert_eq!(parse_amount("12.50").unwrap(), dec!(12.5));
}

#[test]
fn test_amount_comma_separator() {
    assert_eq!(parse_amount("12,50").unwrap(), dec!(12.5));
}

#[test]
fn test_amount_strips_symbols_and_spaces() {
    assert_eq!(parse_amount("$ 8").unwrap(), dec!(8));
    assert_eq!(parse_amount(" 3.99 € ").unwrap(), dec!(3.99));
}

#[test]
fn test_amount_partial_separators() {
    assert_eq!(parse_amount(".5").unwrap(), dec!(0.5));
    assert_eq!(parse_amount("7.").unwrap(), dec!(7));
}

#[test]
fn test_amount_rejects_multiple_separators() {
    assert_eq!(
        parse_amount("1.2.3"),
        Err(ValidationError::MultipleSeparators("1.2.3".into()))
    );
    assert!(matches!(
        parse_amount("1,234.50"),
        Err(ValidationError::MultipleSeparators(_))
    ));
}

#[test]
fn test_amount_rejects_negative() {
    assert_eq!(parse_amount("-5"), Err(ValidationError::NotPositive));
    assert_eq!(parse_amount(" -0.5"), Err(ValidationError::NotPositive));
    assert_eq!(parse_amount("$-5"), Err(ValidationError::NotPositive));
    assert_eq!(parse_amount("5-"), Err(ValidationError::NotPositive));
}

#[test]
fn test_amount_rejects_zero() {
    assert_eq!(parse_amount("0"), Err(ValidationError::NotPositive));
    assert_eq!(parse_amount("0,00"), Err(ValidationError::NotPositive));
}

#[test]
fn test_amount_rejects_non_numeric() {
    assert_eq!(parse_amount(""), Err(ValidationError::EmptyAmount));
    assert_eq!(parse_amount("   "), Err(ValidationError::EmptyAmount));
    assert_eq!(parse_amount("abc"), Err(ValidationError::NotANumber("abc".into())));
    assert_eq!(parse_amount("."), Err(ValidationError::NotANumber(".".into())));
}

#[test]
fn test_amount_upper_limit() {
    assert_eq!(parse_amount("1000000000000").unwrap(), MAX_AMOUNT);
    assert_eq!(parse_amount("1000000000000,01"), Err(ValidationError::TooLarge));
    assert_eq!(
        parse_amount("800000000000000000000000000"),
        Err(ValidationError::TooLarge)
    );
    assert_eq!(
        parse_amount("79228162514264337593543950335"),
        Err(ValidationError::TooLarge)
    );
    assert_eq!(
        parse_amount("792281625142643375935439503350"),
        Err(ValidationError::TooLarge)
    );
}

// ── parse_budget ──────────────────────────────────────────────

#[test]
fn test_budget_allows_zero() {
    assert_eq!(parse_budget("0").unwrap(), dec!(0));
    assert_eq!(parse_budget("1500,75").unwrap(), dec!(1500.75));
}

#[test]
fn test_budget_rejects_negative() {
    assert_eq!(parse_budget("-100"), Err(ValidationError::NegativeBudget));
    assert_eq!(parse_budget("x"), Err(ValidationError::NotANumber("x".into())));
}

#[test]
fn test_budget_upper_limit() {
    assert_eq!(parse_budget("5000000000000"), Err(ValidationError::TooLarge));
    assert_eq!(parse_budget("$-1"), Err(ValidationError::NegativeBudget));
}

// ── Dates ─────────────────────────────────────────────────────

#[test]
fn test_form_day_quick_picks() {
    let today = day(2024, 3, 1);
    assert_eq!(parse_form_day("today", today).unwrap(), today);
    assert_eq!(parse_form_day("Hoy", today).unwrap(), today);
    assert_eq!(parse_form_day("", today).unwrap(), today);
    assert_eq!(parse_form_day("yesterday", today).unwrap(), day(2024, 2, 29));
    assert_eq!(parse_form_day("AYER", today).unwrap(), day(2024, 2, 29));
}

#[test]
fn test_form_day_formats() {
    let today = day(2024, 3, 1);
    assert_eq!(parse_form_day("05-01-2024", today).unwrap(), day(2024, 1, 5));
    assert_eq!(parse_form_day("2024-01-05", today).unwrap(), day(2024, 1, 5));
    assert!(matches!(
        parse_form_day("31-02-2024", today),
        Err(ValidationError::InvalidDate(_))
    ));
    assert!(parse_form_day("next week", today).is_err());
}

#[test]
fn test_format_form_date() {
    assert_eq!(format_form_date(day(2024, 1, 5)), "05-01-2024");
}

#[test]
fn test_midday_instant_keeps_local_day() {
    let instant = midday_instant(day(2024, 1, 5), &madrid()).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());

    let far_east = FixedOffset::east_opt(13 * 3600).unwrap();
    let instant = midday_instant(day(2024, 1, 5), &far_east).unwrap();
    assert_eq!(instant.with_timezone(&far_east).date_naive(), day(2024, 1, 5));
}

// ── ExpenseForm ───────────────────────────────────────────────

fn form(amount: &str, description: &str) -> ExpenseForm {
    ExpenseForm {
        amount: amount.into(),
        description: description.into(),
        category: Some("Casa".into()),
        date: "05-01-2024".into(),
    }
}

#[test]
fn test_form_produces_normalized_record() {
    let cats = Category::defaults();
    let e = form("12,50", "  Luz  ")
        .validate(&cats, day(2024, 1, 10), &madrid())
        .unwrap();
    assert_eq!(e.amount(), dec!(12.5));
    assert_eq!(e.description(), "Luz");
    assert_eq!(e.category(), "Casa");
    assert_eq!(e.date(), Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
}

#[test]
fn test_form_requires_description_first() {
    let cats = Category::defaults();
    let err = form("", "   ")
        .validate(&cats, day(2024, 1, 10), &Utc)
        .unwrap_err();
    assert_eq!(err, ValidationError::MissingDescription);
}

#[test]
fn test_form_rejects_bad_amount() {
    let cats = Category::defaults();
    let err = form("0", "Nada").validate(&cats, day(2024, 1, 10), &Utc).unwrap_err();
    assert_eq!(err, ValidationError::NotPositive);
    assert_eq!(err.to_string(), "Please enter a valid amount greater than 0");
}

#[test]
fn test_form_defaults_category() {
    let mut f = form("3", "Pan");
    f.category = None;
    let e = f.validate(&Category::defaults(), day(2024, 1, 10), &Utc).unwrap();
    assert_eq!(e.category(), "Alimentación");

    let e = f.validate(&[], day(2024, 1, 10), &Utc).unwrap();
    assert_eq!(e.category(), DEFAULT_CATEGORY_NAME);

    f.category = Some("  ".into());
    assert_eq!(
        f.validate(&[], day(2024, 1, 10), &Utc),
        Err(ValidationError::MissingCategory)
    );
}

#[test]
fn test_blank_form_is_dated_today() {
    let f = ExpenseForm::blank(day(2024, 1, 10));
    assert_eq!(f.date, "10-01-2024");
    assert!(f.amount.is_empty() && f.category.is_none());
}

#[test]
fn test_edit_form_roundtrips_expense() {
    let tz = madrid();
    let body = NewExpense::checked(
        dec!(12.50),
        "Luz",
        "Casa",
        Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
    )
    .unwrap();
    let stored = Expense::from_parts("e1".into(), body.clone());

    let f = ExpenseForm::from_expense(&stored, &tz);
    assert_eq!(f.amount, "12.5");
    assert_eq!(f.date, "05-01-2024");
    assert_eq!(f.validate(&[], day(2024, 2, 1), &tz).unwrap(), body);
}

// ── CategoryForm ──────────────────────────────────────────────

#[test]
fn test_category_form_defaults() {
    let cat = CategoryForm {
        name: " Gym ".into(),
        ..Default::default()
    }
    .validate(&Category::defaults())
    .unwrap();
    assert_eq!(cat.name, "Gym");
    assert_eq!(cat.color, "#ea580c");
    assert_eq!(cat.icon, "star");
}

#[test]
fn test_category_form_color_by_name_or_hex() {
    let named = CategoryForm {
        name: "Gym".into(),
        color: Some("pink".into()),
        icon: Some("fitness".into()),
    };
    assert_eq!(named.validate(&[]).unwrap().color, "#db2777");

    let hex = CategoryForm {
        name: "Gym".into(),
        color: Some("#AABBCC".into()),
        icon: None,
    };
    assert_eq!(hex.validate(&[]).unwrap().color, "#aabbcc");

    let bad = CategoryForm {
        name: "Gym".into(),
        color: Some("#abc".into()),
        icon: None,
    };
    assert_eq!(bad.validate(&[]), Err(ValidationError::InvalidColor("#abc".into())));
}

#[test]
fn test_category_form_rejects_duplicates_and_blanks() {
    let cats = Category::defaults();
    let dup = CategoryForm {
        name: "Casa".into(),
        ..Default::default()
    };
    assert_eq!(
        dup.validate(&cats),
        Err(ValidationError::DuplicateCategory("Casa".into()))
    );

    let blank = CategoryForm::default();
    assert_eq!(blank.validate(&cats), Err(ValidationError::MissingCategoryName));

    let no_icon = CategoryForm {
        name: "Gym".into(),
        color: None,
        icon: Some(" ".into()),
    };
    assert_eq!(no_icon.validate(&cats), Err(ValidationError::MissingIcon));

    let odd_icon = CategoryForm {
        name: "Gym".into(),
        color: None,
        icon: Some("dumbbell".into()),
    };
    assert_eq!(
        odd_icon.validate(&cats),
        Err(ValidationError::UnknownIcon("dumbbell".into()))
    );
}
