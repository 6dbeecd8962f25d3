mod cli;
mod config;
mod dataset;
mod logger;
mod seed;
mod store;

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};

use crate::{
    cli::Cli,
    config::Config,
    dataset::Dataset,
    logger::{error, info},
    seed::{Console, Options, Outcome, Seeder},
    store::{DataStore, MemoryStore, RestStore},
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize file logging under the app config directory
    if let Ok(dir) = config::get_app_config_path() {
        let _ = logger::init(dir.join(logger::LOG_FILE_NAME));
    }

    dotenv::dotenv().ok();
    let mut console = Console::new(io::stdin().lock(), io::stdout());
    let result = run(&cli, Config::from_env(), &mut console, RestStore::new);
    if let Err(err) = &result {
        error(&format!("fatal error: {:#}", err));
    }
    result.map(|_| ())
}

/// A missing configuration ends the run before the dataset is read or
/// `open_store` is called.
fn run<S, R, W>(
    cli: &Cli,
    config: Result<Config>,
    console: &mut Console<R, W>,
    open_store: impl FnOnce(&Config) -> Result<S>,
) -> Result<Outcome>
where
    S: DataStore,
    R: BufRead,
    W: Write,
{
    let config = config?;
    info(&format!("target {}", config.url));

    let dataset = match &cli.dataset {
        Some(path) => Dataset::from_path(path)?,
        None => Dataset::embedded()?,
    };
    info(&format!(
        "dataset: {} products, {} customers, {} orders",
        dataset.products.len(),
        dataset.customers.len(),
        dataset.orders.len()
    ));

    let options = Options {
        assume_yes: cli.yes,
        operator: cli.operator.clone(),
    };
    seed::write_banner(console.out(), &config.url)?;

    let outcome = if cli.dry_run {
        let store = MemoryStore::new();
        let outcome = Seeder::new(&store, &dataset).run(console, &options)?;
        writeln!(
            console.out(),
            "\n🧪 Dry run: {} requests simulated, nothing was sent to {}",
            store.calls().len(),
            config.url
        )?;
        outcome
    } else {
        let store = open_store(&config)?;
        Seeder::new(&store, &dataset).run(console, &options)?
    };

    match &outcome {
        Outcome::Cancelled => info("run cancelled"),
        Outcome::Completed(summary) => info(&format!("seeding finished: {}", summary.brief())),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Table;
    use std::cell::Cell;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn valid_config() -> Result<Config> {
        Config::from_lookup(|name| match name {
            config::URL_ENV => Some("https://demo.supabase.co".into()),
            config::KEY_ENV => Some("service-key".into()),
            _ => None,
        })
    }

    #[test]
    fn missing_config_stops_before_the_store_is_opened() {
        let cli = Cli::parse_from(["auraflow-seed", "--yes", "--operator", "op"]);
        let opened = Cell::new(false);
        let mut console = console("");

        let err = run(&cli, Config::from_lookup(|_| None), &mut console, |_| {
            opened.set(true);
            Ok(MemoryStore::new())
        })
        .unwrap_err();

        assert!(err.to_string().contains(config::URL_ENV), "{err}");
        assert!(!opened.get());
        assert!(console.into_output().is_empty());
    }

    #[test]
    fn missing_config_fails_dry_runs_too() {
        let cli = Cli::parse_from(["auraflow-seed", "--dry-run", "--yes"]);
        let mut console = console("");
        let result = run(&cli, Config::from_lookup(|_| None), &mut console, |_| {
            Ok(MemoryStore::new())
        });
        assert!(result.is_err());
        assert!(console.into_output().is_empty());
    }

    #[test]
    fn seeds_through_the_opened_store() {
        let cli = Cli::parse_from(["auraflow-seed", "--yes", "--operator", "op"]);
        let opened = Cell::new(false);
        let mut console = console("");

        let outcome = run(&cli, valid_config(), &mut console, |config| {
            assert_eq!(config.url, "https://demo.supabase.co");
            opened.set(true);
            Ok(MemoryStore::new())
        })
        .unwrap();

        match outcome {
            Outcome::Completed(summary) => assert_eq!(summary.count(Table::Orders), Some(3)),
            Outcome::Cancelled => panic!("run was cancelled"),
        }
        assert!(opened.get());
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.contains("📍 Supabase URL: https://demo.supabase.co"));
    }

    #[test]
    fn dry_run_never_opens_the_store() {
        let cli = Cli::parse_from(["auraflow-seed", "--dry-run", "--yes", "--operator", "op"]);
        let opened = Cell::new(false);
        let mut console = console("");

        run(&cli, valid_config(), &mut console, |_| {
            opened.set(true);
            Ok(MemoryStore::new())
        })
        .unwrap();

        assert!(!opened.get());
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.contains("Dry run: 17 requests simulated"), "{text}");
    }
}
