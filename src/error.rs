use thiserror::Error;

/// A rejected form field. The message is what the user sees next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("Please enter an amount")]
    EmptyAmount,
    #[error("Please enter a valid amount greater than 0")]
    NotPositive,
    #[error("Amount '{0}' has more than one decimal separator")]
    MultipleSeparators(String),
    #[error("'{0}' is not a valid amount")]
    NotANumber(String),
    #[error("Amount cannot exceed 1,000,000,000,000")]
    TooLarge,
    #[error("Budget cannot be negative")]
    NegativeBudget,
    #[error("Description is required")]
    MissingDescription,
    #[error("Category is required")]
    MissingCategory,
    #[error("Invalid date '{0}', expected dd-mm-yyyy, 'today' or 'yesterday'")]
    InvalidDate(String),
    #[error("Category name is required")]
    MissingCategoryName,
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("Icon name is required")]
    MissingIcon,
    #[error("Unknown icon '{0}'")]
    UnknownIcon(String),
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
