mod category;
mod expense;
mod settings;

pub(crate) use category::{
    Category, CategoryStyle, DEFAULT_CATEGORY_NAME, DEFAULT_ICON, FALLBACK_COLOR, FALLBACK_ICON,
    ICONS, PALETTE,
};
pub(crate) use expense::{Expense, NewExpense, MAX_AMOUNT};
pub(crate) use settings::Settings;
