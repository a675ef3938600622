//! Price Book
//!
//! Latest quote per symbol, shared between the price simulator, the prices
//! API and the valuation pipeline.

use crate::services::valuation::PriceSource;
use crate::types::PriceQuote;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Concurrent symbol -> latest price map.
///
/// Written by the price simulator and by external feeds, read by the
/// valuation pipeline. Symbols are stored upper-cased.
pub struct PriceBook {
    prices: DashMap<String, f64>,
    /// Broadcast channel for accepted quotes.
    tx: broadcast::Sender<PriceQuote>,
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl PriceBook {
    /// Create an empty price book.
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(1024);
        Arc::new(Self {
            prices: DashMap::new(),
            tx,
        })
    }

    /// Create a price book pre-loaded with quotes.
    pub fn with_prices<I, S>(quotes: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let book = Self::new();
        for (symbol, price) in quotes {
            book.update_price(symbol.as_ref(), price);
        }
        book
    }

    /// Subscribe to accepted quotes.
    pub fn subscribe(&self) -> broadcast::Receiver<PriceQuote> {
        self.tx.subscribe()
    }

    /// Record a quote. Non-finite or non-positive prices are rejected.
    pub fn update_price(&self, symbol: &str, price: f64) -> bool {
        if !price.is_finite() || price <= 0.0 {
            debug!("Rejected quote for {}: {}", symbol, price);
            return false;
        }

        let symbol = normalize(symbol);
        self.prices.insert(symbol.clone(), price);

        // Ignore errors if no receivers
        let _ = self.tx.send(PriceQuote { symbol, price });
        true
    }

    /// Get the latest price for a symbol.
    pub fn get_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(&normalize(symbol)).map(|p| *p)
    }

    /// Get all current prices, sorted by symbol.
    pub fn get_all_prices(&self) -> Vec<PriceQuote> {
        let mut quotes: Vec<PriceQuote> = self
            .prices
            .iter()
            .map(|entry| PriceQuote {
                symbol: entry.key().clone(),
                price: *entry.value(),
            })
            .collect();
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        quotes
    }

    /// Point-in-time copy of all prices.
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.prices
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.prices.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for PriceBook {
    fn price(&self, symbol: &str) -> Option<f64> {
        self.get_price(symbol)
    }
}
