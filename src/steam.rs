use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::parsing::parse_price;

const PRICE_OVERVIEW_URL: &str = "https://steamcommunity.com/market/priceoverview/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the community market's lowest-price lookup. Stateless: one GET
/// per `lowest_price` call, no retries. The caller owns the pacing between
/// calls.
pub struct MarketClient {
    http: Client,
    base_url: String,
}

impl MarketClient {
    pub fn new() -> Self {
        Self::with_base_url(PRICE_OVERVIEW_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        MarketClient {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the cheapest active sell listing for an item. Every failure
    /// mode (transport error, non-2xx, junk body, missing price) comes
    /// back as `None`; the market being down is expected, not exceptional.
    pub async fn lowest_price(
        &self,
        appid: u32,
        market_hash_name: &str,
        currency: u32,
    ) -> Option<f64> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("currency", currency.to_string()),
                ("appid", appid.to_string()),
                ("market_hash_name", market_hash_name.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: Value = response.json().await.ok()?;
        extract_lowest_price(&body)
    }
}

/// Interprets a priceoverview body. Steam answers
/// `{"success": true, "lowest_price": "1,23 zł", ...}` on a hit and
/// `{"success": false}` (or an empty object, or null) otherwise.
pub fn extract_lowest_price(body: &Value) -> Option<f64> {
    if !body.get("success")?.as_bool()? {
        return None;
    }
    let raw = body.get("lowest_price")?.as_str()?;
    parse_price(raw)
}
