//! Spending aggregation over a snapshot of expenses.
//!
//! Everything here is pure: callers pass the reference day and the time zone
//! used to turn stored instants into local calendar days.

mod chart;

use chrono::{Datelike, Days, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::models::{Category, Expense, FALLBACK_COLOR, FALLBACK_ICON};

pub(crate) use chart::{bar_height_percent, budget_balance, donut_svg, max_spend, progress_width};

pub(crate) const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Local calendar day of an expense.
pub(crate) fn local_day<Tz: TimeZone>(expense: &Expense, tz: &Tz) -> NaiveDate {
    expense.date.with_timezone(tz).date_naive()
}

/// Sum of the amounts. Saturates at `Decimal::MAX` instead of overflowing.
pub(crate) fn total<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Decimal {
    sum_amounts(expenses.into_iter().map(|e| e.amount))
}

pub(crate) fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or(Decimal::MAX)
    })
}

/// `part` as a percentage of `whole`, zero when `whole` is zero.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

// ── Weekly series ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DaySpend {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub amount: Decimal,
    pub is_today: bool,
}

/// Seven entries, oldest first, ending on `today`.
pub(crate) fn weekly_series<Tz: TimeZone>(
    expenses: &[Expense],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DaySpend> {
    (0..7u64)
        .rev()
        .map(|back| {
            let date = today - Days::new(back);
            let amount = total(expenses.iter().filter(|e| local_day(e, tz) == date));
            DaySpend {
                date,
                day_name: WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
                amount,
                is_today: back == 0,
            }
        })
        .collect()
}

// ── Periods ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Period {
    pub(crate) fn month_of(day: NaiveDate) -> Self {
        Self::Month {
            year: day.year(),
            month: day.month(),
        }
    }

    pub(crate) fn year_of(day: NaiveDate) -> Self {
        Self::Year(day.year())
    }

    /// `YYYY-MM`
    pub(crate) fn parse_month(s: &str) -> Option<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
        Some(Self::month_of(first))
    }

    /// `YYYY`
    pub(crate) fn parse_year(s: &str) -> Option<Self> {
        let year: i32 = s.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(year, 1, 1).map(Self::year_of)
    }

    pub(crate) fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            Self::Month { year, month } => day.year() == year && day.month() == month,
            Self::Year(year) => day.year() == year,
        }
    }

    /// Step by whole months or years.
    pub(crate) fn shift(self, offset: i32) -> Self {
        match self {
            Self::Month { year, month } => {
                let index = year * 12 + (month as i32 - 1) + offset;
                Self::Month {
                    year: index.div_euclid(12),
                    month: index.rem_euclid(12) as u32 + 1,
                }
            }
            Self::Year(year) => Self::Year(year + offset),
        }
    }

    /// `2024-03` or `2024`.
    pub(crate) fn key(&self) -> String {
        match *self {
            Self::Month { year, month } => format!("{year:04}-{month:02}"),
            Self::Year(year) => format!("{year:04}"),
        }
    }

    /// `March 2024` or `2024`.
    pub(crate) fn label(&self) -> String {
        match *self {
            Self::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| self.key()),
            Self::Year(year) => year.to_string(),
        }
    }
}

pub(crate) fn period_expenses<'a, Tz: TimeZone>(
    expenses: &'a [Expense],
    period: Period,
    tz: &Tz,
) -> Vec<&'a Expense> {
    expenses
        .iter()
        .filter(|e| period.contains(local_day(e, tz)))
        .collect()
}

// ── Breakdown ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategorySpend {
    pub name: String,
    pub color: String,
    pub icon: String,
    pub total: Decimal,
    pub percentage: Decimal,
    /// False when the expenses reference a category that no longer exists.
    pub known: bool,
}

/// Per-category totals over `expenses`, largest first.
///
/// Only categories with spend are listed. Expenses whose category name is not
/// in `categories` are grouped under that name with fallback styling, so the
/// totals always add up to the overall total.
pub(crate) fn breakdown(expenses: &[&Expense], categories: &[Category]) -> Vec<CategorySpend> {
    let period_total = total(expenses.iter().copied());
    let sum_for = |name: &str| total(expenses.iter().copied().filter(|e| e.category == name));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();

    for cat in categories {
        if !seen.insert(cat.name.as_str()) {
            continue;
        }
        let amount = sum_for(cat.name.as_str());
        rows.push(CategorySpend {
            name: cat.name.clone(),
            color: cat.color_or_default().to_string(),
            icon: cat.icon_or_default().to_string(),
            total: amount,
            percentage: percent_of(amount, period_total),
            known: true,
        });
    }

    for e in expenses {
        if !seen.insert(e.category.as_str()) {
            continue;
        }
        let amount = sum_for(e.category.as_str());
        rows.push(CategorySpend {
            name: e.category.clone(),
            color: FALLBACK_COLOR.to_string(),
            icon: FALLBACK_ICON.to_string(),
            total: amount,
            percentage: percent_of(amount, period_total),
            known: false,
        });
    }

    rows.retain(|r| r.total > Decimal::ZERO);
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Everything the month and year views show.
#[derive(Debug, Clone)]
pub(crate) struct PeriodSummary<'a> {
    pub period: Period,
    pub expenses: Vec<&'a Expense>,
    pub total: Decimal,
    pub breakdown: Vec<CategorySpend>,
}

pub(crate) fn summarize<'a, Tz: TimeZone>(
    expenses: &'a [Expense],
    categories: &[Category],
    period: Period,
    tz: &Tz,
) -> PeriodSummary<'a> {
    let selected = period_expenses(expenses, period, tz);
    let total = total(selected.iter().copied());
    let breakdown = breakdown(&selected, categories);
    PeriodSummary {
        period,
        expenses: selected,
        total,
        breakdown,
    }
}

/// Newest first; ties keep their original order.
pub(crate) fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}
