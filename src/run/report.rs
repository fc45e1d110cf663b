use chrono::TimeZone;
use rust_decimal::Decimal;
use std::io::{self, Write};

use crate::aggregate::{
    bar_height_percent, budget_balance, local_day, max_spend, percent_of, progress_width,
    sum_amounts, DaySpend, PeriodSummary,
};
use crate::format::{format_amount, format_percent, paint, text_bar, truncate};
use crate::models::{Category, CategoryStyle, Expense};
use crate::validate::format_form_date;

const BAR_WIDTH: usize = 20;
const RULE_WIDTH: usize = 56;
const DANGLING_NOTE: &str = "* category no longer exists";

fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "─".repeat(RULE_WIDTH))
}

/// Category label padded to `width`, with a `*` when the category is gone.
fn category_cell(name: &str, known: bool, width: usize, color: &str, ansi: bool) -> String {
    let label = if known {
        truncate(name, width)
    } else {
        format!("{} *", truncate(name, width.saturating_sub(2)))
    };
    let padded = format!("{label:<width$}");
    if ansi {
        paint(&padded, color)
    } else {
        padded
    }
}

/// Seven-day bar chart, oldest day first.
pub(crate) fn week(out: &mut impl Write, series: &[DaySpend]) -> io::Result<()> {
    let max = max_spend(series);
    let total = sum_amounts(series.iter().map(|d| d.amount));
    writeln!(out, "Last 7 days: {}", format_amount(total))?;
    rule(out)?;
    for day in series {
        let marker = if day.is_today { "  < today" } else { "" };
        writeln!(
            out,
            "{} {}  {}  {:>12}{marker}",
            day.day_name,
            day.date.format("%d-%m"),
            text_bar(bar_height_percent(day.amount, max), BAR_WIDTH),
            format_amount(day.amount),
        )?;
    }
    Ok(())
}

/// Month or year header with totals, budget state and the category breakdown.
///
/// `budget` is only shown when it is set and positive. With `ansi`, category
/// names are drawn in their own color.
pub(crate) fn summary(
    out: &mut impl Write,
    summary: &PeriodSummary<'_>,
    budget: Option<Decimal>,
    ansi: bool,
) -> io::Result<()> {
    writeln!(out, "{}", summary.period.label())?;
    rule(out)?;
    writeln!(out, "  {:<14}{:>16}", "Spent", format_amount(summary.total))?;
    writeln!(out, "  {:<14}{:>16}", "Expenses", summary.expenses.len())?;

    if let Some(budget) = budget.filter(|b| *b > Decimal::ZERO) {
        let balance = budget_balance(budget, summary.total);
        let used = percent_of(summary.total, budget);
        writeln!(out, "  {:<14}{:>16}", "Budget", format_amount(budget))?;
        if balance < Decimal::ZERO {
            writeln!(out, "  {:<14}{:>16}", "Over budget", format_amount(balance.abs()))?;
        } else {
            writeln!(out, "  {:<14}{:>16}", "Left", format_amount(balance))?;
        }
        writeln!(
            out,
            "  {:<14}{}  {}",
            "Used",
            text_bar(progress_width(used), BAR_WIDTH),
            format_percent(used)
        )?;
    }

    if summary.breakdown.is_empty() {
        writeln!(out)?;
        writeln!(out, "No expenses in this period")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "By category:")?;
    for row in &summary.breakdown {
        writeln!(
            out,
            "  {} {:<14} {}  {:>4}  {:>12}",
            category_cell(&row.name, row.known, 16, &row.color, ansi),
            row.icon,
            text_bar(progress_width(row.percentage), BAR_WIDTH),
            format_percent(row.percentage),
            format_amount(row.total),
        )?;
    }
    if summary.breakdown.iter().any(|r| !r.known) {
        writeln!(out, "  {DANGLING_NOTE}")?;
    }
    Ok(())
}

/// One line per expense: local date, description, category, icon, amount and id.
pub(crate) fn expenses<Tz: TimeZone>(
    out: &mut impl Write,
    expenses: &[&Expense],
    categories: &[Category],
    tz: &Tz,
    ansi: bool,
) -> io::Result<()> {
    if expenses.is_empty() {
        return writeln!(out, "No expenses");
    }
    let mut dangling = false;
    for e in expenses {
        let style = CategoryStyle::resolve(categories, &e.category);
        dangling |= !style.known;
        writeln!(
            out,
            "{}  {:<28} {} {:<14} {:>12}  {}",
            format_form_date(local_day(e, tz)),
            truncate(&e.description, 28),
            category_cell(&e.category, style.known, 16, &style.color, ansi),
            style.icon,
            format_amount(e.amount),
            e.id,
        )?;
    }
    if dangling {
        writeln!(out, "{DANGLING_NOTE}")?;
    }
    Ok(())
}

/// Categories with their color, icon and how many expenses use them.
pub(crate) fn categories(
    out: &mut impl Write,
    categories: &[Category],
    expenses: &[Expense],
) -> io::Result<()> {
    writeln!(out, "{:<20} {:<9} {:<16} Uses", "Name", "Color", "Icon")?;
    rule(out)?;
    for cat in categories {
        let uses = expenses.iter().filter(|e| e.category == cat.name).count();
        writeln!(
            out,
            "{:<20} {:<9} {:<16} {uses}",
            truncate(&cat.name, 20),
            cat.color_or_default(),
            cat.icon_or_default(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
