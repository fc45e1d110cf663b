use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use super::report;
use crate::aggregate::{self, donut_svg, period_expenses, summarize, Period};
use crate::config::Config;
use crate::db::{Collection, Database};
use crate::export;
use crate::format::format_amount;
use crate::models::Category;
use crate::session::{self, Session};
use crate::sync::{self, Subscription};
use crate::validate::{parse_budget, CategoryForm, ExpenseForm};

const DONUT_SIZE: f64 = 200.0;

pub(crate) fn as_cli(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let command = args.get(1).map(String::as_str).unwrap_or("week");
    let rest = args.get(2..).unwrap_or_default();
    match command {
        "add" | "a" => cli_add(rest, &open(db, config)?),
        "edit" => cli_edit(rest, &open(db, config)?),
        "delete" | "rm" => cli_delete(rest, &open(db, config)?),
        "list" | "ls" => cli_list(rest, &open(db, config)?),
        "week" | "w" => cli_week(&open(db, config)?),
        "month" | "m" => cli_month(rest, &open(db, config)?),
        "year" | "y" => cli_year(rest, &open(db, config)?),
        "categories" => cli_categories(&open(db, config)?),
        "category" => cli_category(rest, &open(db, config)?),
        "budget" => cli_budget(rest, &mut open(db, config)?),
        "export" => cli_export(rest, &open(db, config)?),
        "whoami" => cli_whoami(&session::current(db, &config.app_id)?),
        "login" => {
            let user = rest
                .first()
                .context("Usage: gastos login <user>")?;
            let s = session::login(db, &config.app_id, user)?;
            println!("Signed in as {}", s.user_id());
            Ok(())
        }
        "logout" => {
            session::logout(db)?;
            println!("Signed out");
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("gastos {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("gastos: personal expense tracker");
    println!();
    println!("Usage: gastos [command]");
    println!();
    println!("Commands:");
    println!("  (none), week                  Spending over the last 7 days");
    println!("  add <amount> <description>    Record an expense");
    println!("    --category <name>           Category (default: first category)");
    println!("    --date <dd-mm-yyyy>         Day, or 'today' / 'yesterday' (default: today)");
    println!("  edit <id>                     Change an expense");
    println!("    --amount, --description, --category, --date");
    println!("  delete <id>                   Delete an expense");
    println!("  list [YYYY-MM]                List expenses, newest first (default: all)");
    println!("  month [YYYY-MM]               Monthly summary with budget and categories");
    println!("    --svg <path>                Also write the category donut chart");
    println!("  year [YYYY]                   Yearly summary with monthly totals");
    println!("  categories                    List categories");
    println!("  category add <name>           Create a category");
    println!("    --color <name|#rrggbb>      Palette name or hex (default: Orange)");
    println!("    --icon <name>               Icon name (default: star)");
    println!("  category delete <name>        Delete a category (its expenses are kept)");
    println!("  budget [amount]               Show or set the monthly budget (0 clears it)");
    println!("  export [path]                 Export expenses to CSV");
    println!("    --month <YYYY-MM>           Month to export (default: current)");
    println!("  whoami                        Show the signed-in user");
    println!("  login <user>                  Sign in as <user>");
    println!("  logout                        Sign out (next run signs in anonymously)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

/// Restore the session and subscribe to its own data.
fn open<'db>(db: &'db Database, config: &Config) -> Result<Subscription<'db>> {
    let session = session::current(db, &config.app_id)?;
    let user = session.user_id().to_string();
    Ok(sync::subscribe(db, session, &user))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_month_arg(arg: Option<&str>) -> Result<Period> {
    match arg {
        Some(raw) => Period::parse_month(raw)
            .with_context(|| format!("Invalid month '{raw}', expected YYYY-MM")),
        None => Ok(Period::month_of(today())),
    }
}

fn known_category(categories: &[Category], name: &str) -> Result<()> {
    if Category::find_by_name(categories, name.trim()).is_none() {
        anyhow::bail!("Unknown category '{name}'. Run `gastos categories` to see them");
    }
    Ok(())
}

// ── Expenses ─────────────────────────────────────────────────

fn cli_add(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let pos = positionals(args);
    let (amount, description) = match pos.split_first() {
        Some((amount, words)) if !words.is_empty() => (amount.to_string(), words.join(" ")),
        _ => anyhow::bail!("Usage: gastos add <amount> <description> [--category <name>] [--date <dd-mm-yyyy>]"),
    };
    let category = flag(args, "--category");
    if let Some(name) = category {
        known_category(&sub.snapshot().categories, name)?;
    }

    let mut form = ExpenseForm::blank(today());
    form.amount = amount;
    form.description = description;
    form.category = category.map(str::to_string);
    if let Some(date) = flag(args, "--date") {
        form.date = date.to_string();
    }
    let record = form.validate(&sub.snapshot().categories, today(), &Local)?;
    let id = sub.add_expense(&record)?;
    println!(
        "Added {} \"{}\" to {} ({id})",
        format_amount(record.amount()),
        record.description(),
        record.category()
    );
    Ok(())
}

fn cli_edit(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let id = positionals(args)
        .first()
        .copied()
        .context("Usage: gastos edit <id> [--amount ..] [--description ..] [--category ..] [--date ..]")?;
    let existing = sub
        .snapshot()
        .expenses
        .iter()
        .find(|e| e.id == id)
        .with_context(|| format!("Expense '{id}' not found"))?;

    let mut form = ExpenseForm::from_expense(existing, &Local);
    if let Some(amount) = flag(args, "--amount") {
        form.amount = amount.to_string();
    }
    if let Some(description) = flag(args, "--description") {
        form.description = description.to_string();
    }
    if let Some(category) = flag(args, "--category") {
        known_category(&sub.snapshot().categories, category)?;
        form.category = Some(category.to_string());
    }
    if let Some(date) = flag(args, "--date") {
        form.date = date.to_string();
    }

    let record = form.validate(&sub.snapshot().categories, today(), &Local)?;
    sub.update_expense(id, &record)?;
    println!("Updated {id}");
    Ok(())
}

fn cli_delete(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let id = args.first().context("Usage: gastos delete <id>")?;
    if !sub.delete_expense(id)? {
        anyhow::bail!("Expense '{id}' not found");
    }
    println!("Deleted {id}");
    Ok(())
}

fn cli_list(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let snap = sub.snapshot();
    let shown: Vec<_> = match positionals(args).first().copied() {
        Some(raw) => period_expenses(&snap.expenses, parse_month_arg(Some(raw))?, &Local),
        None => snap.expenses.iter().collect(),
    };
    let mut out = io::stdout().lock();
    let ansi = out.is_terminal();
    report::expenses(&mut out, &shown, &snap.categories, &Local, ansi)?;
    Ok(())
}

// ── Summaries ────────────────────────────────────────────────

fn cli_week(sub: &Subscription<'_>) -> Result<()> {
    let snap = sub.snapshot();
    let series = aggregate::weekly_series(&snap.expenses, today(), &Local);
    let mut out = io::stdout().lock();
    writeln!(out, "Hola, {}", sub.session().display_name())?;
    writeln!(out)?;
    report::week(&mut out, &series)?;
    writeln!(out)?;
    writeln!(
        out,
        "All time: {}",
        format_amount(aggregate::total(&snap.expenses))
    )?;
    Ok(())
}

fn cli_month(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let snap = sub.snapshot();
    let period = parse_month_arg(positionals(args).first().copied())?;
    let summary = summarize(&snap.expenses, &snap.categories, period, &Local);

    let mut out = io::stdout().lock();
    let ansi = out.is_terminal();
    report::summary(&mut out, &summary, Some(snap.monthly_budget), ansi)?;

    if let Some(path) = flag(args, "--svg") {
        let path = shellexpand(path);
        let svg = donut_svg(summary.total, &summary.breakdown, DONUT_SIZE);
        std::fs::write(&path, svg).with_context(|| format!("Failed to write {path}"))?;
        writeln!(out)?;
        writeln!(out, "Chart written to {path}")?;
    }
    Ok(())
}

fn cli_year(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let snap = sub.snapshot();
    let period = match positionals(args).first() {
        Some(raw) => Period::parse_year(raw)
            .with_context(|| format!("Invalid year '{raw}', expected YYYY"))?,
        None => Period::year_of(today()),
    };
    let summary = summarize(&snap.expenses, &snap.categories, period, &Local);

    let mut out = io::stdout().lock();
    let ansi = out.is_terminal();
    report::summary(&mut out, &summary, None, ansi)?;

    let Period::Year(year) = period else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "By month:")?;
    let january = Period::Month { year, month: 1 };
    for offset in 0..12 {
        let month = january.shift(offset);
        let spent = aggregate::total(period_expenses(&snap.expenses, month, &Local));
        writeln!(
            out,
            "  {:<16}{:>16}",
            month.label(),
            format_amount(spent)
        )?;
    }
    Ok(())
}

// ── Categories and budget ────────────────────────────────────

fn cli_categories(sub: &Subscription<'_>) -> Result<()> {
    let snap = sub.snapshot();
    let mut out = io::stdout().lock();
    report::categories(&mut out, &snap.categories, &snap.expenses)?;
    Ok(())
}

fn cli_category(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let pos = positionals(args);
    match pos.split_first() {
        Some((&"add", words)) if !words.is_empty() => {
            let form = CategoryForm {
                name: words.join(" "),
                color: flag(args, "--color").map(str::to_string),
                icon: flag(args, "--icon").map(str::to_string),
            };
            let cat = sub.add_category(&form)?;
            println!("Added category {cat} ({}, {})", cat.color, cat.icon);
            Ok(())
        }
        Some((&"delete", words)) if !words.is_empty() => {
            let name = words.join(" ");
            let in_use = sub
                .snapshot()
                .expenses
                .iter()
                .filter(|e| e.category == name)
                .count();
            if sub.delete_category(&name)? == 0 {
                anyhow::bail!("Category '{name}' not found");
            }
            println!("Deleted category {name}");
            if in_use > 0 {
                println!("{in_use} expense(s) keep the name '{name}' and show with default styling");
            }
            Ok(())
        }
        _ => anyhow::bail!(
            "Usage: gastos category add <name> [--color <name|#rrggbb>] [--icon <name>]\n       gastos category delete <name>"
        ),
    }
}

fn cli_budget(args: &[String], sub: &mut Subscription<'_>) -> Result<()> {
    if let Some(raw) = args.first() {
        let amount = parse_budget(raw)?;
        sub.set_budget(amount)?;
        sub.poll();
    }
    let snap = sub.snapshot();
    if snap.monthly_budget.is_zero() {
        println!("No monthly budget set");
        return Ok(());
    }
    let month = summarize(&snap.expenses, &snap.categories, Period::month_of(today()), &Local);
    println!(
        "Monthly budget: {}",
        format_amount(snap.monthly_budget)
    );
    println!(
        "Balance:        {}",
        format_amount(aggregate::budget_balance(snap.monthly_budget, month.total))
    );
    Ok(())
}

// ── Export and session ───────────────────────────────────────

fn cli_export(args: &[String], sub: &Subscription<'_>) -> Result<()> {
    let period = parse_month_arg(flag(args, "--month"))?;
    let month = period.key();
    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/gastos-export-{month}.csv")
        });

    let snap = sub.snapshot();
    let rows = period_expenses(&snap.expenses, period, &Local);
    if rows.is_empty() {
        println!("No expenses for {month}");
        return Ok(());
    }
    let count = export::export_to_path(Path::new(&output_path), &rows, &Local)?;
    println!("Exported {count} expenses to {output_path}");
    Ok(())
}

fn cli_whoami(session: &Session) -> Result<()> {
    let kind = if session.is_anonymous() {
        "anonymous"
    } else {
        "signed in"
    };
    println!("{} ({kind})", session.display_name());
    println!("user id:    {}", session.user_id());
    println!("app id:     {}", session.app_id());
    println!("expenses:   {}", session.collection(Collection::Expenses));
    println!("categories: {}", session.collection(Collection::Categories));
    println!("settings:   {}", session.settings_doc());
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
