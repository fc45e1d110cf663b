use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The per-user `settings/general` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Settings {
    #[serde(rename = "monthlyBudget", with = "rust_decimal::serde::float", default)]
    pub monthly_budget: Decimal,
}

impl Settings {
    pub(crate) fn new(monthly_budget: Decimal) -> Self {
        Self { monthly_budget }
    }
}
