//! fintrack CLI - exchange rates and balances from the local database.
//!
//! ```bash
//! fintrack rate USD EUR
//! fintrack convert 100 USD RUB
//! fintrack refresh
//! fintrack balance --currency EUR
//! fintrack currency set USD
//! ```

mod config;
mod main_lib;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use config::Config;
use fintrack_core::balance::{AggregateResult, BalanceServiceTrait, TransactionRepositoryTrait};
use fintrack_core::fx::{Currency, RateResolverTrait, ResolvedRate};
use fintrack_core::settings::SettingsServiceTrait;
use main_lib::{build_state, init_tracing, AppState};

/// fintrack: multi-currency exchange rates and balances
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-currency exchange rates and balances", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the rate for a currency pair
    Rate {
        #[arg(value_name = "FROM")]
        from: String,
        #[arg(value_name = "TO")]
        to: String,
    },

    /// Convert an amount between currencies
    Convert {
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: Decimal,
        #[arg(value_name = "FROM")]
        from: Currency,
        #[arg(value_name = "TO")]
        to: Currency,
    },

    /// Fetch fresh rates for every supported currency
    Refresh,

    /// List cached rates
    Rates,

    /// Sum all transactions
    Balance {
        /// Currency to report in (default: the main currency setting)
        #[arg(short, long)]
        currency: Option<Currency>,
    },

    /// Show or change the main currency
    Currency {
        #[command(subcommand)]
        action: CurrencyAction,
    },
}

#[derive(Subcommand)]
enum CurrencyAction {
    /// Show the main currency
    Show,
    /// Set the main currency
    Set {
        #[arg(value_name = "CODE")]
        code: Currency,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn warn_if_stale(rate: &ResolvedRate) {
    if rate.is_stale() {
        eprintln!(
            "warning: {}/{} is stale (last updated {}), the rate source is unavailable",
            rate.from,
            rate.to,
            rate.as_of.to_rfc3339()
        );
    }
}

fn print_balance(result: &AggregateResult) {
    println!("Income:  {} {}", result.income, result.currency);
    println!("Expense: {} {}", result.expense, result.currency);
    println!("Total:   {} {}", result.total, result.currency);
    for skipped in &result.skipped {
        eprintln!(
            "warning: transaction #{} ({}) left out: {}",
            skipped.transaction_id, skipped.currency, skipped.reason
        );
    }
    if result.degraded {
        eprintln!("warning: some rates were stale, the total may be out of date");
    }
}

async fn run(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Rate { from, to } => {
            let rate = state.rate_resolver.get_rate_by_code(&from, &to).await?;
            warn_if_stale(&rate);
            if cli.json {
                print_json(&rate)?;
            } else {
                println!("1 {} = {} {}", rate.from, rate.rate, rate.to);
            }
        }
        Commands::Convert { amount, from, to } => {
            let converted = state.rate_resolver.convert_amount(amount, from, to).await?;
            warn_if_stale(&converted.rate);
            if cli.json {
                print_json(&converted)?;
            } else {
                println!(
                    "{} {} = {} {} (rate {})",
                    amount, from, converted.amount, to, converted.rate.rate
                );
            }
        }
        Commands::Refresh => {
            let summary = state.rate_resolver.clone().spawn_refresh().await??;
            if cli.json {
                print_json(&summary)?;
            } else {
                let updated: Vec<&str> = summary.updated.iter().map(|c| c.code()).collect();
                println!(
                    "Refreshed {} record(s) from {}: {}",
                    summary.records_written,
                    summary.provider,
                    updated.join(", ")
                );
            }
        }
        Commands::Rates => {
            let records = state.rate_repository.list_rates()?;
            if cli.json {
                print_json(&records)?;
            } else if records.is_empty() {
                println!("No cached rates");
            } else {
                for record in records {
                    println!(
                        "{}/{}  {}  {}",
                        record.from,
                        record.to,
                        record.rate,
                        record.updated_at.to_rfc3339()
                    );
                }
            }
        }
        Commands::Balance { currency } => {
            let result = match currency {
                Some(target) => {
                    let transactions = state.transaction_repository.list_transactions()?;
                    state.balance_service.aggregate(&transactions, target).await?
                }
                None => state.balance_service.calculate_balance().await?,
            };
            if cli.json {
                print_json(&result)?;
            } else {
                print_balance(&result);
            }
        }
        Commands::Currency { action } => match action {
            CurrencyAction::Show => {
                let main = state.settings_service.get_main_currency()?;
                if cli.json {
                    print_json(&main)?;
                } else {
                    println!("{}", main);
                }
            }
            CurrencyAction::Set { code } => {
                state.settings_service.set_main_currency(code).await?;
                tracing::info!("Main currency set to {}", code);
                if !cli.json {
                    println!("Main currency is now {}", code);
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let state = build_state(&config).await?;
    run(cli, &state).await
}
