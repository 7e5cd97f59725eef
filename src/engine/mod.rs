// 8.0: ledger engine. contract registry, oracle prices, margined positions
// and liquidations over an external custody token.
// deterministic, no I/O. every operation takes an explicit execution context.

mod admin;
mod core;
mod host;
mod liquidations;
mod positions;
mod pricing;
mod queries;
mod results;
#[cfg(test)]
mod testkit;

pub use core::Ledger;
pub use host::{Host, HostState};
pub use results::{CloseResult, ErrorCode, LedgerError, LiquidationResult};
