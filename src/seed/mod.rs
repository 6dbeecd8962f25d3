mod console;
mod orders;
mod reset;
mod summary;

use anyhow::Result;
use serde::Serialize;
use std::io::{BufRead, Write};

use crate::dataset::Dataset;
use crate::logger::{error, info, warn};
use crate::store::{to_rows, DataStore, RowId, Table};

pub use console::Console;
pub use summary::Summary;

use summary::RULE_WIDTH;

#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Skip the destructive-action confirmation.
    pub assume_yes: bool,
    /// Operator identifier given up front; `None` means ask for it.
    pub operator: Option<String>,
}

#[derive(Debug)]
pub enum Outcome {
    /// The operator declined the confirmation. Nothing was touched.
    Cancelled,
    Completed(Summary),
}

pub struct Seeder<'a, S: DataStore + ?Sized> {
    store: &'a S,
    dataset: &'a Dataset,
}

impl<'a, S: DataStore + ?Sized> Seeder<'a, S> {
    pub fn new(store: &'a S, dataset: &'a Dataset) -> Self {
        Self { store, dataset }
    }

    pub fn run<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        options: &Options,
    ) -> Result<Outcome> {
        self.write_notice(console.out())?;

        writeln!(console.out(), "\n⚠️  WARNING: This will DELETE all existing data!")?;
        let confirmed = options.assume_yes || console.confirm("Type 'yes' to continue: ")?;
        if !confirmed {
            info("seeding cancelled by operator");
            writeln!(console.out(), "\n❌ Seeding cancelled.")?;
            return Ok(Outcome::Cancelled);
        }

        let not_cleared = reset::clear_all(self.store, console.out())?;
        if !not_cleared.is_empty() {
            warn(&format!("{} tables were not cleared", not_cleared.len()));
        }

        writeln!(console.out(), "\n📦 Seeding Products...")?;
        let product_ids = self.seed_table(console.out(), Table::Products, &self.dataset.products)?;

        writeln!(console.out(), "\n👥 Seeding Customers...")?;
        let customer_ids =
            self.seed_table(console.out(), Table::Customers, &self.dataset.customers)?;

        let operator = match &options.operator {
            Some(given) => normalize_operator(given),
            None => prompt_operator(console)?,
        };

        match operator {
            Some(operator) if !product_ids.is_empty() && !customer_ids.is_empty() => {
                orders::seed_orders(
                    self.store,
                    self.dataset,
                    &customer_ids,
                    &product_ids,
                    &operator,
                    console.out(),
                )?;
            }
            Some(_) => {
                info("skipping orders: products or customers were not seeded");
                writeln!(
                    console.out(),
                    "\n  ⚠️  Skipping orders - no customers or products available"
                )?;
            }
            None => info("skipping orders: no operator id"),
        }

        let summary = Summary::collect(self.store);
        summary.write(console.out())?;
        write_next_steps(console.out())?;
        Ok(Outcome::Completed(summary))
    }

    /// One bulk insert of `records`. An empty id list means the table
    /// was not seeded.
    fn seed_table<T: Serialize, W: Write>(
        &self,
        out: &mut W,
        table: Table,
        records: &[T],
    ) -> Result<Vec<RowId>> {
        match to_rows(records).and_then(|rows| self.store.insert(table, &rows)) {
            Ok(ids) => {
                info(&format!("inserted {} rows into {}", records.len(), table));
                writeln!(out, "  ✅ Inserted {} {}", records.len(), table)?;
                Ok(ids)
            }
            Err(e) => {
                error(&format!("insert {} failed: {:#}", table, e));
                writeln!(out, "  ❌ Error seeding {}: {:#}", table, e)?;
                Ok(Vec::new())
            }
        }
    }

    fn write_notice<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "\n📋 WHAT THIS TOOL DOES:")?;
        writeln!(out, "   ✅ Seeds {} products (grocery + bar items)", self.dataset.products.len())?;
        writeln!(out, "   ✅ Seeds {} customers (POS customers)", self.dataset.customers.len())?;
        writeln!(
            out,
            "   ✅ Seeds {} sample orders ({} line items)",
            self.dataset.orders.len(),
            self.dataset.item_count()
        )?;
        writeln!(out, "\n📋 WHAT THIS TOOL DOES NOT DO:")?;
        writeln!(out, "   ❌ Does NOT create login users (staff/cashiers)")?;
        writeln!(out, "   ❌ Does NOT set up authentication")?;
        Ok(())
    }
}

/// Banner shown before anything else.
pub fn write_banner<W: Write>(out: &mut W, endpoint: &str) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{}", rule)?;
    writeln!(out, "🌊 AuraFlow POS - Database Seeding")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "📍 Supabase URL: {}", endpoint)?;
    writeln!(out, "{}", rule)?;
    Ok(())
}

fn normalize_operator(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn prompt_operator<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Option<String>> {
    writeln!(console.out(), "\n👤 Getting admin user ID...")?;
    writeln!(
        console.out(),
        "  ℹ️  Sample orders need an existing user (Authentication → Users → Add User)."
    )?;
    let answer = console.ask("  Enter your admin user UUID (or press Enter to skip orders): ")?;
    let operator = normalize_operator(&answer);
    if operator.is_none() {
        writeln!(
            console.out(),
            "  ⚠️  No user ID provided - will skip creating sample orders"
        )?;
    }
    Ok(operator)
}

fn write_next_steps<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\n✨ Database seeding complete!")?;
    writeln!(out, "\n💡 Next steps:")?;
    writeln!(out, "   1. Check your Supabase dashboard to verify the data")?;
    writeln!(out, "   2. Create login users (staff/admin) via Authentication → Users")?;
    writeln!(out, "   3. Point the POS app at the same Supabase project")?;
    writeln!(out, "\n⚠️  REMEMBER: You still need to create login users manually!")?;
    Ok(())
}
