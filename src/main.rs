use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use swap_router::config::RouterConfig;
use swap_router::dex::{FactoryRouter, RpcReader};
use swap_router::display::{parse_amount, print_pair, print_quote};
use swap_router::routing::build_quoter;
use swap_router::TokenInfo;

#[derive(Parser)]
#[command(name = "swap-router")]
#[command(about = "Swap routing and pricing for constant-product DEX routers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a route and quote a swap
    Quote {
        /// Token to sell: address, or "native" for the chain's coin
        #[arg(long)]
        from: String,

        /// Token to buy: address, or "native"
        #[arg(long)]
        to: String,

        /// Amount to sell in whole tokens (e.g. 1.5)
        #[arg(long)]
        amount: String,

        /// Slippage tolerance in percent (defaults to DEFAULT_SLIPPAGE_PERCENT)
        #[arg(long)]
        slippage: Option<Decimal>,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a pair from the primary factory
    Pair {
        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,
    },
}

/// "native" (or the native symbol) maps to the sentinel token; configured
/// tokens skip the metadata calls
async fn resolve_token<P: Provider + Clone>(
    input: &str,
    config: &RouterConfig,
    reader: &RpcReader<P>,
) -> Result<TokenInfo> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("native") || trimmed.eq_ignore_ascii_case(&config.native_symbol) {
        return Ok(config.native_token());
    }

    let address: Address = trimmed
        .parse()
        .wrap_err_with(|| format!("not a token address: {}", trimmed))?;
    if let Some(token) = config.known_token(address) {
        return Ok(token.clone());
    }

    reader
        .token_info(address)
        .await
        .wrap_err_with(|| format!("failed to read token metadata for {}", address))
}

async fn run_quote(
    config: RouterConfig,
    from: &str,
    to: &str,
    amount: &str,
    slippage: Option<Decimal>,
    json: bool,
) -> Result<()> {
    let url: reqwest::Url = config.rpc_url.parse()?;
    let provider = ProviderBuilder::new().connect_http(url);
    let reader = Arc::new(RpcReader::new(provider));

    let (token_in, token_out) = tokio::try_join!(
        resolve_token(from, &config, reader.as_ref()),
        resolve_token(to, &config, reader.as_ref()),
    )?;

    let amount_in = parse_amount(amount, token_in.decimals)?;
    let slippage = slippage.unwrap_or(config.default_slippage_percent);

    info!("Quoting {} {} -> {}", amount, token_in.symbol, token_out.symbol);

    let quoter = build_quoter(reader, &config);
    let quote = quoter.quote(&token_in, &token_out, amount_in, slippage).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        print_quote(&quote, config.router_address(quote.trade.is_secondary_router));
    }

    Ok(())
}

async fn run_pair(config: RouterConfig, a: &str, b: &str) -> Result<()> {
    let url: reqwest::Url = config.rpc_url.parse()?;
    let provider = ProviderBuilder::new().connect_http(url);
    let reader = Arc::new(RpcReader::new(provider));

    let (token_a, token_b) = tokio::try_join!(
        resolve_token(a, &config, reader.as_ref()),
        resolve_token(b, &config, reader.as_ref()),
    )?;
    let wrapped = config.wrapped_native.address;

    let factory = FactoryRouter::new(config.primary.label.clone(), config.primary.factory, reader);
    let pair = factory
        .fetch_pair_data(token_a.lookup_address(wrapped), token_b.lookup_address(wrapped))
        .await?;

    print_pair(&pair, &lookup_view(token_a, wrapped), &lookup_view(token_b, wrapped));
    Ok(())
}

/// Native tokens show up in pairs under the wrapped address
fn lookup_view(token: TokenInfo, wrapped_native: Address) -> TokenInfo {
    TokenInfo {
        address: token.lookup_address(wrapped_native),
        ..token
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = RouterConfig::from_env()?;

    match cli.command {
        Commands::Quote {
            from,
            to,
            amount,
            slippage,
            json,
        } => run_quote(config, &from, &to, &amount, slippage, json).await,
        Commands::Pair { a, b } => run_pair(config, &a, &b).await,
    }
}
