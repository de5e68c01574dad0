mod config;
mod excel;
mod models;
mod parsing;
mod returns;
mod steam;

use std::{path::Path, process::ExitCode, time::Duration};

use thiserror::Error;

use config::{load_config, Config, ConfigError};
use excel::{write_report, StorageError};
use models::ItemQuote;
use steam::MarketClient;

#[derive(Debug, Error)]
enum RunError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());

    match run(Path::new(&config_path)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &Path) -> Result<(), RunError> {
    let config = load_config(config_path)?;
    let market = MarketClient::new();

    let quotes = collect_quotes(&market, &config).await;
    write_report(&config.output_file, &quotes)?;

    println!("Data saved and charts updated: {}", config.output_file.display());
    Ok(())
}

/// Samples every configured item in order, pausing `sleep_seconds` between
/// requests (not after the last one). A failed lookup becomes a quote with
/// empty price fields; it never stops the run.
async fn collect_quotes(market: &MarketClient, config: &Config) -> Vec<ItemQuote> {
    let delay = Duration::from_secs_f64(config.sleep_seconds);
    let mut quotes = Vec::with_capacity(config.items.len());

    for (i, item) in config.items.iter().enumerate() {
        let sell_price = market
            .lowest_price(config.appid, &item.name, config.currency)
            .await;
        match sell_price {
            Some(price) => println!("{}: lowest price {:.2}", item.name, price),
            None => println!("No price data for {}", item.name),
        }

        let (net_sell_price, percent_return) = returns::evaluate(sell_price, item.buy_price);
        quotes.push(ItemQuote {
            item_link: item.link.clone(),
            item_name: item.name.clone(),
            buy_price: item.buy_price,
            current_sell_price: sell_price,
            net_sell_price,
            percent_return,
        });

        if i + 1 < config.items.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::TrackedItem;

    fn test_config(items: Vec<TrackedItem>) -> Config {
        Config {
            appid: 730,
            currency: 6,
            output_file: "out.xlsx".into(),
            sleep_seconds: 0.0, // no throttle in tests
            items,
        }
    }

    #[tokio::test]
    async fn unreachable_market_yields_unavailable_quotes_for_every_item() {
        // nothing listens here, so every lookup degrades to None
        let market = MarketClient::with_base_url("http://127.0.0.1:1/priceoverview/");
        let config = test_config(vec![
            TrackedItem {
                link: "https://steamcommunity.com/market/listings/730/Fracture%20Case".to_string(),
                name: "Fracture Case".to_string(),
                buy_price: 2.2,
            },
            TrackedItem {
                link: "https://steamcommunity.com/market/listings/730/Kilowatt%20Case".to_string(),
                name: "Kilowatt Case".to_string(),
                buy_price: 0.8,
            },
        ]);

        let quotes = collect_quotes(&market, &config).await;

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].item_name, "Fracture Case");
        assert_eq!(quotes[1].item_name, "Kilowatt Case");
        for quote in &quotes {
            assert!(quote.current_sell_price.is_none());
            assert!(quote.net_sell_price.is_none());
            assert!(quote.percent_return.is_none());
        }
    }
}
