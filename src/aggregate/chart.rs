use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::f64::consts::PI;
use std::fmt::Write;

use super::{CategorySpend, DaySpend};
use crate::format::format_whole;

/// Placeholder disc color when there is nothing to chart.
const EMPTY_FILL: &str = "#f3f4f6";
/// Smallest visible bar for a day with any spend, in percent of the track.
const MIN_BAR_PERCENT: f64 = 5.0;

/// Scale of the weekly chart: the largest day, never below 1.
pub(crate) fn max_spend(series: &[DaySpend]) -> Decimal {
    series
        .iter()
        .map(|d| d.amount)
        .fold(Decimal::ONE, Decimal::max)
}

pub(crate) fn bar_height_percent(amount: Decimal, max: Decimal) -> f64 {
    if amount.is_zero() || max.is_zero() {
        return 0.0;
    }
    let ratio = (amount / max * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);
    ratio.clamp(MIN_BAR_PERCENT, 100.0)
}

pub(crate) fn progress_width(percentage: Decimal) -> f64 {
    percentage.to_f64().unwrap_or(0.0).clamp(0.0, 100.0)
}

/// Budget left for the month. Negative when overspent.
pub(crate) fn budget_balance(monthly_budget: Decimal, spent: Decimal) -> Decimal {
    monthly_budget.checked_sub(spent).unwrap_or(Decimal::MIN)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DonutSlice {
    pub name: String,
    pub color: String,
    pub start_percent: f64,
    pub end_percent: f64,
    pub path: String,
}

/// Pie slices for a breakdown, clockwise from 12 o'clock, inside a
/// `size`×`size` box.
pub(crate) fn donut_slices(breakdown: &[CategorySpend], size: f64) -> Vec<DonutSlice> {
    let mut cumulative = 0.0;
    breakdown
        .iter()
        .map(|cat| {
            let start = cumulative;
            cumulative += cat.percentage.to_f64().unwrap_or(0.0);
            DonutSlice {
                name: cat.name.clone(),
                color: cat.color.clone(),
                start_percent: start,
                end_percent: cumulative,
                path: slice_path(start, cumulative, size / 2.0),
            }
        })
        .collect()
}

fn point_at(percent: f64, radius: f64) -> (f64, f64) {
    let angle = (percent / 100.0 * 360.0 - 90.0) * PI / 180.0;
    (radius + radius * angle.cos(), radius + radius * angle.sin())
}

/// SVG path for the wedge between two cumulative percentages.
///
/// A wedge covering the whole circle is drawn as two half arcs, since an arc
/// whose endpoints coincide renders nothing.
pub(crate) fn slice_path(start_percent: f64, end_percent: f64, radius: f64) -> String {
    let c = radius;
    if end_percent - start_percent >= 99.999 {
        return format!(
            "M {c} 0 A {r} {r} 0 1 1 {c} {d} A {r} {r} 0 1 1 {c} 0 Z",
            r = radius,
            d = 2.0 * radius
        );
    }
    let (x1, y1) = point_at(start_percent, radius);
    let (x2, y2) = point_at(end_percent, radius);
    let large_arc = u8::from(end_percent - start_percent > 50.0);
    format!("M {c} {c} L {x1:.3} {y1:.3} A {radius} {radius} 0 {large_arc} 1 {x2:.3} {y2:.3} Z")
}

/// A standalone SVG donut with the total in the hole. Shows a plain grey disc
/// when `total` is zero.
pub(crate) fn donut_svg(total: Decimal, breakdown: &[CategorySpend], size: f64) -> String {
    let r = size / 2.0;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    );
    svg.push('\n');
    if total > Decimal::ZERO {
        for slice in donut_slices(breakdown, size) {
            if slice.end_percent <= slice.start_percent {
                continue;
            }
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="{}"><title>{}</title></path>"#,
                slice.path,
                slice.color,
                escape(&slice.name)
            );
        }
    } else {
        let _ = writeln!(svg, r#"  <circle cx="{r}" cy="{r}" r="{r}" fill="{EMPTY_FILL}"/>"#);
    }
    let hole = r * 0.6;
    let _ = writeln!(svg, r##"  <circle cx="{r}" cy="{r}" r="{hole}" fill="#ffffff"/>"##);
    let _ = writeln!(
        svg,
        r#"  <text x="{r}" y="{r}" text-anchor="middle" dominant-baseline="middle" font-weight="bold">{}</text>"#,
        escape(&format_whole(total))
    );
    svg.push_str("</svg>\n");
    svg
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "chart_tests.rs"]
mod tests;
