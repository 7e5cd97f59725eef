// futures-ledger: on-chain style futures contract ledger.
// fixed 2x leverage, oracle priced, collateral held by an external token.
// all computation is deterministic integer math with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Principal, ContractId, Side, Price, BlockHeight
//   2.x  access.rs: owner and oracle roles
//   3.x  margin.rs: collateral requirement, pnl, liquidation threshold
//   4.x  position.rs: position record and per-position math
//   5.x  registry.rs: futures contracts, ids, expiry
//   7.x  config.rs: margin params, custody account, event retention
//   8.x  engine/: the ledger: admin, pricing, positions, liquidations, queries
//   9.x  price_feed.rs: oracle price table
//   9.2  custody.rs: custody gateway trait + in-memory token
//   11.x events.rs: state transition events for audit

// core ledger modules
pub mod engine;
pub mod events;
pub mod margin;
pub mod position;
pub mod registry;
pub mod types;

// roles
pub mod access;

// integration modules
pub mod config;
pub mod custody;
pub mod price_feed;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use margin::*;
pub use position::*;
pub use registry::*;
pub use types::*;
pub use access::{AccessControl, AccessError, Role};
pub use config::{LedgerConfig, DEFAULT_CUSTODY_ACCOUNT};
pub use custody::{CustodyError, CustodyGateway, TokenLedger};
pub use price_feed::PriceFeed;
