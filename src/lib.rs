//! Client-side swap routing and pricing for constant-product DEX routers.
//!
//! A [`routing::Quoter`] finds a path between two tokens across a primary
//! factory router and a secondary quote-only router, prices it with the
//! pair contract's own math and applies slippage protection.

pub mod amm;
pub mod config;
pub mod dex;
pub mod display;
pub mod error;
pub mod routing;
pub mod token;

pub use config::RouterConfig;
pub use error::{Result, RouteError};
pub use routing::{build_quoter, Quoter, Route, RouteFinder, SwapQuote, TradeInfo};
pub use token::{TokenInfo, NATIVE_SENTINEL};
