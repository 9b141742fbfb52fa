pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::currency::{self, Currency};
use crate::core::repository::spawn_periodic_refresh;
use crate::core::{Converter, RateRepository};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
        swap: bool,
    },
    Calc {
        keys: Vec<String>,
        from: Option<String>,
        to: Option<String>,
    },
    Widget {
        json: bool,
    },
    Watch {
        cycles: Option<usize>,
    },
}

/// Wires both rate sources from the configured base URLs.
pub fn build_repository(config: &AppConfig) -> RateRepository {
    let central_bank =
        providers::CentralBankProvider::new(config.providers.central_bank_url());
    let market = providers::MarketProvider::new(config.providers.market_url());
    RateRepository::new(Box::new(central_bank), Box::new(market))
}

fn resolve_pair(
    config: &AppConfig,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Currency, Currency)> {
    let from = match from {
        Some(code) => currency::find(code).with_context(|| format!("Unknown currency: {code}"))?,
        None => config.from_currency()?,
    };
    let to = match to {
        Some(code) => currency::find(code).with_context(|| format!("Unknown currency: {code}"))?,
        None => config.to_currency()?,
    };
    Ok((from, to))
}

async fn refreshed_converter(
    repository: &RateRepository,
    from: Currency,
    to: Currency,
) -> Converter {
    let pb = cli::ui::new_spinner("Fetching rates...");
    let mut converter = Converter::new(from, to, repository.snapshot().await);
    converter.refresh(repository).await;
    pb.finish_and_clear();
    converter
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxcalc starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let repository = build_repository(&config);

    match command {
        AppCommand::Rates => {
            let (from, to) = resolve_pair(&config, None, None)?;
            let converter = refreshed_converter(&repository, from, to).await;
            println!("{}", cli::rates::render_rates(&converter));
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            swap,
        } => {
            let (from, to) = resolve_pair(&config, from.as_deref(), to.as_deref())?;
            let mut converter = refreshed_converter(&repository, from, to).await;
            if swap {
                converter.swap();
            }
            converter.set_amount(&amount);
            println!("{}", cli::convert::render_conversion(&converter));
        }
        AppCommand::Calc { keys, from, to } => {
            let (from, to) = resolve_pair(&config, from.as_deref(), to.as_deref())?;
            let mut converter = refreshed_converter(&repository, from, to).await;
            let keys = cli::convert::split_keys(&keys);
            cli::convert::replay_keys(&mut converter, &keys)?;
            println!("{}", cli::convert::render_conversion(&converter));
        }
        AppCommand::Widget { json } => {
            let book = repository.refresh_all().await;
            let snapshot = repository.widget_snapshot(&config.widget_currencies).await;
            if json {
                println!("{}", cli::widget::render_widget_json(&snapshot)?);
            } else {
                println!("{}", cli::widget::render_widget(&snapshot, book.central_bank_live));
            }
        }
        AppCommand::Watch { cycles } => {
            let repository = Arc::new(repository);
            let interval = Duration::from_secs(config.refresh_minutes * 60);
            let (mut rx, handle) = spawn_periodic_refresh(Arc::clone(&repository), interval);

            let mut seen = 0;
            while cycles.is_none_or(|limit| seen < limit) {
                rx.changed()
                    .await
                    .context("Periodic refresh stopped unexpectedly")?;
                let live = rx.borrow_and_update().central_bank_live;
                let snapshot = repository.widget_snapshot(&config.widget_currencies).await;
                println!("{}\n", cli::widget::render_widget(&snapshot, live));
                seen += 1;
            }
            handle.abort();
        }
    }

    Ok(())
}
