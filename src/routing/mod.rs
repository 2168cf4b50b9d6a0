//! Route discovery, trade construction and slippage-protected quotes

pub mod finder;
pub mod quote;
pub mod trade;

pub use finder::{Route, RouteFinder, RoutingConfig};
pub use quote::{build_quoter, Quoter, SwapQuote};
pub use trade::{build_trade, build_trade_with, TradeInfo};
