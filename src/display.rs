use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;

use crate::dex::PairInfo;
use crate::error::{Result, RouteError};
use crate::routing::SwapQuote;
use crate::token::TokenInfo;

/// Fractional digits shown for human amounts
const DISPLAY_DECIMALS: usize = 6;

/// Raw token amount in whole-token units, trimmed for display
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let formatted = match format_units(amount, decimals) {
        Ok(s) => s,
        Err(_) => return amount.to_string(),
    };

    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = &frac[..frac.len().min(DISPLAY_DECIMALS)];
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => formatted,
    }
}

/// Human amount (e.g. "1.5") to raw units. Negative amounts are rejected
/// rather than folded into their absolute value.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    match parse_units(amount.trim(), decimals) {
        Ok(ParseUnits::U256(raw)) => Ok(raw),
        Ok(ParseUnits::I256(_)) => Err(RouteError::InvalidAmount(format!("{} is negative", amount))),
        Err(e) => Err(RouteError::InvalidAmount(format!("{}: {}", amount, e))),
    }
}

fn impact_color(impact: Decimal) -> &'static str {
    if impact < Decimal::ONE {
        "\x1b[1;32m"
    } else if impact < Decimal::from(5) {
        "\x1b[1;33m"
    } else {
        "\x1b[1;31m"
    }
}

pub fn print_quote(quote: &SwapQuote, router: Address) {
    let trade = &quote.trade;
    let (token_in, token_out) = match (trade.token_in(), trade.token_out()) {
        (Some(a), Some(b)) => (a, b),
        _ => return,
    };
    let route = trade
        .tokens
        .iter()
        .map(|t| t.symbol.as_str())
        .collect::<Vec<_>>()
        .join(" → ");
    let router_kind = if trade.is_secondary_router { "secondary" } else { "primary" };

    println!();
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(64));
    println!("\x1b[1;36m  SWAP QUOTE | {} → {}\x1b[0m", token_in.symbol, token_out.symbol);
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(64));
    println!();
    println!("  {:<16} {}", "Route:", route);
    println!("  {:<16} {} ({})", "Router:", router, router_kind);
    println!("  {:<16} {} {}", "Input:", format_amount(trade.input_amount, token_in.decimals), token_in.symbol);
    println!("  {:<16} {} {}", "Output:", format_amount(trade.output_amount, token_out.decimals), token_out.symbol);
    println!(
        "  {:<16} 1 {} = {} {}",
        "Price:",
        token_in.symbol,
        trade.execution_price.round_dp(8).normalize(),
        token_out.symbol
    );
    println!(
        "  {:<16} {}{:.4}%\x1b[0m",
        "Price impact:",
        impact_color(trade.price_impact),
        trade.price_impact
    );
    println!("  {:<16} {}%", "Slippage:", quote.slippage_percent);
    println!(
        "  {:<16} {} {}",
        "Minimum out:",
        format_amount(quote.minimum_amount_out, token_out.decimals),
        token_out.symbol
    );
    println!();
}

pub fn print_pair(pair: &PairInfo, token_a: &TokenInfo, token_b: &TokenInfo) {
    let describe = |address: Address| {
        if address == token_a.address {
            (token_a.symbol.as_str(), token_a.decimals)
        } else if address == token_b.address {
            (token_b.symbol.as_str(), token_b.decimals)
        } else {
            ("?", 18)
        }
    };
    let (symbol0, decimals0) = describe(pair.token0);
    let (symbol1, decimals1) = describe(pair.token1);

    println!();
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(64));
    println!("\x1b[1;36m  PAIR {} / {}\x1b[0m", symbol0, symbol1);
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(64));
    println!();
    println!("  {:<10} {}", "Address:", pair.address);
    println!("  {:<10} {} ({})", "token0:", pair.token0, symbol0);
    println!("  {:<10} {} ({})", "token1:", pair.token1, symbol1);
    println!("  {:<10} {} {}", "reserve0:", format_amount(pair.reserve0, decimals0), symbol0);
    println!("  {:<10} {} {}", "reserve1:", format_amount(pair.reserve1, decimals1), symbol1);
    if !pair.has_liquidity() {
        println!("\x1b[1;31m  Pair has no liquidity\x1b[0m");
    }
    println!();
}
