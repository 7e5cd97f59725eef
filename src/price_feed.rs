// Price table
//
// Latest price per asset symbol, written by the oracle. An update replaces
// the previous value outright: no history, no staleness window, no bound on
// the size of a move. Who may write is checked by the engine.

use crate::types::{AssetSymbol, Price};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceFeed {
    prices: HashMap<AssetSymbol, Price>,
}

impl PriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `price` for `symbol`, returning the value it replaced.
    pub fn update(&mut self, symbol: AssetSymbol, price: Price) -> Option<Price> {
        self.prices.insert(symbol, price)
    }

    pub fn get(&self, symbol: &AssetSymbol) -> Option<Price> {
        self.prices.get(symbol).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &AssetSymbol> {
        self.prices.keys()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
