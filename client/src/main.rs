//! `nmp`: native host for the Nutrient Management Plan document
//!
//! Usage:
//!   nmp import <file>     replace the saved plan with an NMP file
//!   nmp export <file>     write the saved plan to an NMP file
//!   nmp reset             start a new, empty plan
//!   nmp summary [year]    per-field nutrient balance for a plan year
//!   nmp catalog           fetch and count the catalog lookup tables

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nmp_client::{ApiCache, Config, FileStorage};
use nmp_shared::calculations::balance::{
    field_nutrient_balance, find_balance_message, format_balance_message,
};
use nmp_shared::catalog::{default_nutrient_messages, BalanceType};
use nmp_shared::store::{Action, Store};
use nmp_shared::NmpFileYear;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nmp=debug,nmp_client=debug,nmp_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!(environment = %config.environment, "Configuration loaded");

    let storage = FileStorage::new(&config.storage.directory)
        .with_context(|| format!("Cannot open storage directory {}", config.storage.directory))?;
    let mut store = Store::load_with_key(storage, &config.storage.state_key);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("import") => {
            let path = args.get(1).context("import needs a file path")?;
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path))?;
            let outcome = store.import_nmp(&json)?;
            report_persistence(outcome.persisted);
            tracing::info!(file = %path, "Plan imported");
        }
        Some("export") => {
            let path = args.get(1).context("export needs a file path")?;
            std::fs::write(path, store.export_nmp()?)
                .with_context(|| format!("Cannot write {}", path))?;
            tracing::info!(file = %path, "Plan exported");
        }
        Some("reset") => {
            let outcome = store.dispatch(Action::ResetNmpFile)?;
            report_persistence(outcome.persisted);
            tracing::info!("Plan reset");
        }
        Some("summary") => {
            let file = &store.state().nmp_file;
            let year = match args.get(1) {
                Some(year) => file.year(year),
                None => file.years.last(),
            };
            match year {
                Some(year) => print_summary(year),
                None => bail!("Plan has no matching year"),
            }
        }
        Some("catalog") => {
            let cache = ApiCache::new(&config.api)?;
            let tables = cache.catalog_tables().await?;
            println!("animal subtypes:        {}", tables.animal_subtypes.len());
            println!("breeds:                 {}", tables.breeds.len());
            println!("soil test methods:      {}", tables.soil_test_methods.len());
            println!("fertilizer units:       {}", tables.fertilizer_units.len());
            println!("density units:          {}", tables.density_units.len());
            println!(
                "prev. year manure apps: {}",
                tables.previous_year_manure_applications.len()
            );
        }
        _ => bail!("usage: nmp <import FILE | export FILE | reset | summary [YEAR] | catalog>"),
    }

    Ok(())
}

fn report_persistence(persisted: bool) {
    if !persisted {
        tracing::warn!("Plan changed in memory but was not saved");
    }
}

fn print_summary(year: &NmpFileYear) {
    let messages = default_nutrient_messages();
    println!("Plan year {}", year.year);

    for field in &year.fields {
        let balance = field_nutrient_balance(field, None);
        let available = balance.available_nutrients;
        let removal = balance.total_removal;
        println!(
            "\n{} ({} ac): agronomic N {} P2O5 {} K2O {}, removal P2O5 {}",
            field.field_name,
            field.area,
            available.n,
            available.p2o5,
            available.k2o,
            available.p2o5 - removal.p2o5
        );

        let columns = [
            (BalanceType::ReqN, available.n),
            (BalanceType::ReqP2o5, available.p2o5),
            (BalanceType::ReqK2o, available.k2o),
            (BalanceType::RemP2o5, available.p2o5 - removal.p2o5),
        ];
        for (balance_type, value) in columns {
            if let Some(message) = find_balance_message(balance_type, value, &messages) {
                println!("  {}", format_balance_message(message, value));
            }
        }
    }
}
