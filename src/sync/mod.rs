//! Live view of one user's expenses, categories and budget.
//!
//! A [`Subscription`] watches the three collections, keeps the latest decoded
//! snapshot and routes writes back to the store. Read failures are logged and
//! leave the previous snapshot in place. Dropping the subscription ends it.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::mpsc::Receiver;

use crate::aggregate::sort_newest_first;
use crate::db::{Change, Collection, CollectionPath, Database, DocPath};
use crate::error::StoreError;
use crate::models::{Category, Expense, NewExpense, Settings, MAX_AMOUNT};
use crate::session::Session;
use crate::validate::CategoryForm;

const WRITE_FAILED: &str = "Could not save changes. Check storage permissions";

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Snapshot {
    /// Newest first.
    pub expenses: Vec<Expense>,
    /// In insertion order.
    pub categories: Vec<Category>,
    pub monthly_budget: Decimal,
}

pub(crate) struct Subscription<'db> {
    db: &'db Database,
    session: Session,
    expenses: CollectionPath,
    categories: CollectionPath,
    settings: DocPath,
    expenses_rx: Option<Receiver<Change>>,
    categories_rx: Option<Receiver<Change>>,
    settings_rx: Option<Receiver<Change>>,
    snapshot: Snapshot,
}

/// Subscribe `session` to the data of `user_id` and load the first snapshot.
///
/// Seeds the default categories when the account has none.
pub(crate) fn subscribe<'db>(db: &'db Database, session: Session, user_id: &str) -> Subscription<'db> {
    let path = |c| CollectionPath::for_user(session.app_id(), user_id, c);
    let expenses = path(Collection::Expenses);
    let categories = path(Collection::Categories);
    let settings = path(Collection::Settings).doc("general");

    let watch = |collection: &CollectionPath| match db.watch(&session, collection) {
        Ok(rx) => Some(rx),
        Err(err) => {
            log_read_error(collection.as_str(), &err);
            None
        }
    };
    let expenses_rx = watch(&expenses);
    let categories_rx = watch(&categories);
    let settings_rx = watch(&settings.collection);

    let mut sub = Subscription {
        db,
        session,
        expenses,
        categories,
        settings,
        expenses_rx,
        categories_rx,
        settings_rx,
        snapshot: Snapshot::default(),
    };
    sub.reload_expenses();
    sub.reload_categories();
    sub.reload_settings();
    // Seeding notified our own watchers; that state is already loaded.
    sub.pending();
    tracing::debug!(user = user_id, "subscribed");
    sub
}

fn log_read_error(what: &str, err: &StoreError) {
    if err.is_permission_denied() {
        tracing::error!("{what} permission error: {err}");
    } else {
        tracing::error!("failed to read {what}: {err}");
    }
}

fn drain(rx: Option<&Receiver<Change>>) -> bool {
    rx.is_some_and(|rx| {
        rx.try_iter()
            .inspect(|c| tracing::trace!(collection = %c.collection, doc_id = %c.doc_id, kind = ?c.kind, "change"))
            .count()
            > 0
    })
}

impl<'db> Subscription<'db> {
    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Apply pending change notifications. Returns whether anything changed.
    pub(crate) fn poll(&mut self) -> bool {
        let (expenses, categories, settings) = self.pending();
        if expenses {
            self.reload_expenses();
        }
        if categories {
            self.reload_categories();
        }
        if settings {
            self.reload_settings();
        }
        expenses || categories || settings
    }

    fn pending(&self) -> (bool, bool, bool) {
        (
            drain(self.expenses_rx.as_ref()),
            drain(self.categories_rx.as_ref()),
            drain(self.settings_rx.as_ref()),
        )
    }

    // ── Loading ───────────────────────────────────────────────

    fn reload_expenses(&mut self) {
        match self.load_expenses() {
            Ok(expenses) => self.snapshot.expenses = expenses,
            Err(err) => log_read_error("expenses", &err),
        }
    }

    fn load_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let docs = self.db.list(&self.session, &self.expenses)?;
        let mut expenses: Vec<Expense> = docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<NewExpense>(doc.data) {
                Ok(body) => Some(Expense::from_parts(doc.id, body)),
                Err(err) => {
                    tracing::warn!(doc_id = %doc.id, "skipping malformed expense: {err}");
                    None
                }
            })
            .collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    fn reload_categories(&mut self) {
        match self.load_categories() {
            Ok(categories) => self.snapshot.categories = categories,
            Err(err) => log_read_error("categories", &err),
        }
    }

    fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut docs = self.db.list(&self.session, &self.categories)?;
        if docs.is_empty() {
            let defaults = Category::defaults()
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            self.db.add_batch(&self.session, &self.categories, &defaults)?;
            tracing::info!(count = defaults.len(), "seeded default categories");
            docs = self.db.list(&self.session, &self.categories)?;
        }
        Ok(docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Category>(doc.data) {
                Ok(cat) => Some(Category {
                    id: Some(doc.id),
                    ..cat
                }),
                Err(err) => {
                    tracing::warn!(doc_id = %doc.id, "skipping malformed category: {err}");
                    None
                }
            })
            .collect())
    }

    fn reload_settings(&mut self) {
        match self.load_budget() {
            Ok(Some(budget)) => self.snapshot.monthly_budget = budget,
            Ok(None) => {}
            Err(err) => log_read_error("settings", &err),
        }
    }

    /// The stored budget, or `None` when the document or field is missing.
    fn load_budget(&self) -> Result<Option<Decimal>, StoreError> {
        let Some(doc) = self.db.get(&self.session, &self.settings)? else {
            return Ok(None);
        };
        if doc.data.get("monthlyBudget").is_none() {
            return Ok(None);
        }
        let settings: Settings = serde_json::from_value(doc.data)?;
        let budget = settings.monthly_budget;
        if budget < Decimal::ZERO || budget > MAX_AMOUNT {
            tracing::warn!(%budget, "ignoring out-of-range budget");
            return Ok(None);
        }
        Ok(Some(budget))
    }

    // ── Writes ────────────────────────────────────────────────

    pub(crate) fn add_expense(&self, expense: &NewExpense) -> Result<String> {
        let data = serde_json::to_value(expense)?;
        let id = self
            .db
            .add(&self.session, &self.expenses, &data)
            .inspect_err(|err| tracing::error!("add expense failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(doc_id = %id, amount = %expense.amount(), "added expense");
        Ok(id)
    }

    pub(crate) fn update_expense(&self, id: &str, expense: &NewExpense) -> Result<()> {
        let data = serde_json::to_value(expense)?;
        self.db
            .update(&self.session, &self.expenses.doc(id), &data)
            .inspect_err(|err| tracing::error!("update expense failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(doc_id = id, "updated expense");
        Ok(())
    }

    /// Returns whether the expense existed.
    pub(crate) fn delete_expense(&self, id: &str) -> Result<bool> {
        let removed = self
            .db
            .delete(&self.session, &self.expenses.doc(id))
            .inspect_err(|err| tracing::error!("delete expense failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(doc_id = id, removed, "deleted expense");
        Ok(removed)
    }

    /// Validate against the current categories and store the new one.
    pub(crate) fn add_category(&self, form: &CategoryForm) -> Result<Category> {
        let category = form.validate(&self.snapshot.categories)?;
        let data = serde_json::to_value(&category)?;
        let id = self
            .db
            .add(&self.session, &self.categories, &data)
            .inspect_err(|err| tracing::error!("add category failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(doc_id = %id, name = %category.name, "added category");
        Ok(Category {
            id: Some(id),
            ..category
        })
    }

    /// Remove every category called `name`. Expenses that reference it are
    /// kept and fall back to default styling. Returns how many were removed.
    pub(crate) fn delete_category(&self, name: &str) -> Result<usize> {
        let in_use = self
            .snapshot
            .expenses
            .iter()
            .filter(|e| e.category == name)
            .count();
        if in_use > 0 {
            tracing::warn!(category = name, expenses = in_use, "deleting category still in use");
        }
        let removed = self
            .db
            .delete_where(&self.session, &self.categories, "name", name)
            .inspect_err(|err| tracing::error!("delete category failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(category = name, removed, "deleted category");
        Ok(removed)
    }

    /// Merge `monthlyBudget` into the settings document.
    pub(crate) fn set_budget(&self, amount: Decimal) -> Result<()> {
        let data: Value = serde_json::to_value(Settings::new(amount))?;
        self.db
            .set(&self.session, &self.settings, &data, true)
            .inspect_err(|err| tracing::error!("set budget failed: {err}"))
            .context(WRITE_FAILED)?;
        tracing::info!(budget = %amount, "set monthly budget");
        Ok(())
    }
}

impl Drop for Subscription<'_> {
    fn drop(&mut self) {
        tracing::debug!(user = %self.session.user_id(), "unsubscribed");
    }
}
