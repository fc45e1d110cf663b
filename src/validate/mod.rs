//! Entry-form validation: the only path from raw user input to stored records.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::ValidationError;
use crate::models::{
    Category, Expense, NewExpense, DEFAULT_CATEGORY_NAME, DEFAULT_ICON, ICONS, MAX_AMOUNT,
    PALETTE,
};

/// Day format used by the entry form.
pub(crate) const FORM_DATE_FORMAT: &str = "%d-%m-%Y";

fn hex_color() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").ok()).as_ref()
}

/// Sanitize amount text into a non-negative decimal.
///
/// Anything other than digits and separators is dropped. Either `.` or `,` is
/// accepted as the decimal separator, but only one separator may appear.
/// A minus sign anywhere is an explicit negative and is rejected rather than
/// stripped. Values above [`MAX_AMOUNT`] are rejected.
fn parse_decimal_text(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }
    if trimmed.contains('-') {
        return Err(ValidationError::NotPositive);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();
    let separators = cleaned.chars().filter(|c| matches!(c, '.' | ',')).count();
    if separators > 1 {
        return Err(ValidationError::MultipleSeparators(trimmed.to_string()));
    }

    let mut normalized = cleaned.replace(',', ".");
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotANumber(trimmed.to_string()));
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.push('0');
    }

    let value = Decimal::from_str(&normalized).map_err(|_| {
        if normalized.split('.').next().is_some_and(|int| int.len() > 28) {
            ValidationError::TooLarge
        } else {
            ValidationError::NotANumber(trimmed.to_string())
        }
    })?;
    if value > MAX_AMOUNT {
        return Err(ValidationError::TooLarge);
    }
    Ok(value)
}

/// Parse an expense amount. Must be strictly positive.
///
/// ```text
/// "12.50" → 12.5    "12,50" → 12.5    "$ 8" → 8
/// "1.2.3" → error   "-5"    → error   "0"   → error
/// ```
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let value = parse_decimal_text(raw)?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive);
    }
    Ok(value)
}

/// Parse the monthly budget prompt. Zero clears the budget.
pub(crate) fn parse_budget(raw: &str) -> Result<Decimal, ValidationError> {
    parse_decimal_text(raw).map_err(|e| match e {
        ValidationError::NotPositive => ValidationError::NegativeBudget,
        other => other,
    })
}

pub(crate) fn format_form_date(day: NaiveDate) -> String {
    day.format(FORM_DATE_FORMAT).to_string()
}

/// Resolve the form's date field to a calendar day.
///
/// Accepts `today`/`hoy`, `yesterday`/`ayer`, `dd-mm-yyyy`, and `yyyy-mm-dd`.
pub(crate) fn parse_form_day(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    match raw.to_lowercase().as_str() {
        "" | "today" | "hoy" => return Ok(today),
        "yesterday" | "ayer" => {
            return today
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))
        }
        _ => {}
    }
    NaiveDate::parse_from_str(raw, FORM_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Pin a calendar day to 12:00 local time so that converting to UTC never
/// moves it to a neighbouring day.
pub(crate) fn midday_instant<Tz: TimeZone>(
    day: NaiveDate,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let naive = day
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| ValidationError::InvalidDate(format_form_date(day)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::InvalidDate(format_form_date(day)))
}

/// Raw text of the add/edit expense form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub category: Option<String>,
    pub date: String,
}

impl ExpenseForm {
    /// Empty form dated today.
    pub(crate) fn blank(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            description: String::new(),
            category: None,
            date: format_form_date(today),
        }
    }

    /// Form pre-filled from a stored expense, for editing.
    pub(crate) fn from_expense<Tz: TimeZone>(expense: &Expense, tz: &Tz) -> Self {
        Self {
            amount: expense.amount.normalize().to_string(),
            description: expense.description.clone(),
            category: Some(expense.category.clone()),
            date: format_form_date(expense.date.with_timezone(tz).date_naive()),
        }
    }

    /// Check every field and build the record to store.
    ///
    /// Description is checked first so an empty form reports the missing
    /// description before the amount. Without an explicit category the first
    /// known category is used, falling back to `Otros`.
    pub(crate) fn validate<Tz: TimeZone>(
        &self,
        categories: &[Category],
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<NewExpense, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let amount = parse_amount(&self.amount)?;
        let category = match self.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            Some(_) => return Err(ValidationError::MissingCategory),
            None => categories
                .first()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string()),
        };
        let day = parse_form_day(&self.date, today)?;
        let date = midday_instant(day, tz)?;
        NewExpense::checked(amount, &self.description, &category, date)
    }
}

/// Raw input of the category creator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CategoryForm {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryForm {
    /// Names must be unique among `existing`; color defaults to the first
    /// palette entry and icon to `star`. Icons come from the fixed icon set.
    pub(crate) fn validate(&self, existing: &[Category]) -> Result<Category, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingCategoryName);
        }
        if Category::find_by_name(existing, name).is_some() {
            return Err(ValidationError::DuplicateCategory(name.to_string()));
        }

        let color = match self.color.as_deref().map(str::trim) {
            None => PALETTE[0].1.to_string(),
            Some(c) => resolve_color(c)?,
        };

        let icon = match self.icon.as_deref().map(str::trim) {
            None => DEFAULT_ICON.to_string(),
            Some("") => return Err(ValidationError::MissingIcon),
            Some(i) if ICONS.contains(&i) => i.to_string(),
            Some(i) => return Err(ValidationError::UnknownIcon(i.to_string())),
        };

        Ok(Category::new(name.to_string(), color, icon))
    }
}

/// A `#rrggbb` value, or the name of a palette color.
fn resolve_color(raw: &str) -> Result<String, ValidationError> {
    if let Some((_, hex)) = PALETTE.iter().find(|(n, _)| n.eq_ignore_ascii_case(raw)) {
        return Ok(hex.to_string());
    }
    if hex_color().is_some_and(|re| re.is_match(raw)) {
        Ok(raw.to_lowercase())
    } else {
        Err(ValidationError::InvalidColor(raw.to_string()))
    }
}

#[cfg(test)]
mod tests;
