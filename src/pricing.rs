//! Price oracle - USD unit prices for wallet currencies.
//!
//! The oracle is deliberately fail-open: an unknown currency, a transport
//! failure, or a malformed response all degrade to "price unavailable", which
//! downstream USD math treats as a price of zero. A ledger write is never
//! blocked by a price-feed outage.

use async_trait::async_trait;
use std::collections::HashMap;

/// Maps a currency identifier to a USD unit price.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current USD price for one currency, or `None` if unavailable.
    async fn price_usd(&self, currency: &str) -> Option<f64>;

    /// Current USD prices for a set of currencies. Missing entries mean the
    /// price is unavailable; this never errors.
    async fn prices_usd(&self, currencies: &[String]) -> HashMap<String, f64>;
}

/// USD value of an amount in the given currency; unavailable price ⇒ 0.
pub async fn usd_value(oracle: &dyn PriceOracle, amount: f64, currency: &str) -> f64 {
    let price = oracle.price_usd(currency).await.unwrap_or(0.0);
    amount * price
}

/// Price oracle backed by the CoinGecko simple-price endpoint.
#[derive(Clone)]
pub struct CoinGecko {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGecko {
    /// Creates a client against the given base URL
    /// (e.g. `https://api.coingecko.com`).
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_prices(&self, ids: &[String]) -> Option<HashMap<String, f64>> {
        if ids.is_empty() {
            return Some(HashMap::new());
        }

        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            ids.join(",")
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("price fetch failed, treating prices as unavailable: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "price feed returned non-success, treating prices as unavailable"
            );
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("price response decode failed: {e}");
                return None;
            }
        };

        let mut prices = HashMap::new();
        for id in ids {
            if let Some(price) = body.get(id).and_then(|entry| entry["usd"].as_f64()) {
                prices.insert(id.clone(), price);
            }
        }

        Some(prices)
    }
}

#[async_trait]
impl PriceOracle for CoinGecko {
    async fn price_usd(&self, currency: &str) -> Option<f64> {
        let prices = self.fetch_prices(&[currency.to_string()]).await?;
        prices.get(currency).copied()
    }

    async fn prices_usd(&self, currencies: &[String]) -> HashMap<String, f64> {
        // Dedupe before building the query string
        let mut unique: Vec<String> = currencies.to_vec();
        unique.sort();
        unique.dedup();

        self.fetch_prices(&unique).await.unwrap_or_default()
    }
}
