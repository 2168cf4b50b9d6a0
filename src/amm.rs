//! Constant-Product AMM Math
//!
//! Client-side re-derivation of the pair contract's pricing:
//! - 0.3% fee applied as 997/1000 with truncating division
//! - amount out / amount in for single and multi-hop trades
//! - price impact estimation (with a thin-pool fallback)
//! - slippage-protected minimum output
//!
//! Amounts are `U256`. Products are taken in `U512` so no intermediate can
//! wrap; only final percentages and prices become `Decimal`.

use alloy::primitives::{U256, U512};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{Result, RouteError};

pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

/// Added to the summed leg impact for every hop beyond the first
pub const MULTI_HOP_PREMIUM_PERCENT: Decimal = dec!(0.3);

/// Below this reserve/trade ratio the precise impact ratio is not trusted
pub const THIN_POOL_RATIO: u64 = 100;

/// Fractional digits carried by percentage results
const PERCENT_SCALE: u32 = 18;

/// Slippage percent is applied as an integer in millionths of a percent
const SLIPPAGE_SCALE: u64 = 1_000_000;

const HUNDRED: Decimal = dec!(100);

pub(crate) fn wide(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(value.as_limbs());
    U512::from_limbs(limbs)
}

pub(crate) fn narrow(value: U512) -> Result<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return Err(RouteError::Overflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

fn mul(a: U512, b: U512) -> Result<U512> {
    a.checked_mul(b).ok_or(RouteError::Overflow)
}

pub(crate) fn pow10(exp: u32) -> U512 {
    U512::from(10u64).pow(U512::from(exp))
}

/// Builds a `Decimal` from an integer already scaled by `10^scale`.
fn scaled_to_decimal(value: U512, scale: u32) -> Result<Decimal> {
    let limbs = value.as_limbs();
    if limbs[2..].iter().any(|limb| *limb != 0) {
        return Err(RouteError::Overflow);
    }
    let raw = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let raw = i128::try_from(raw).map_err(|_| RouteError::Overflow)?;
    Decimal::try_from_i128_with_scale(raw, scale)
        .map(|d| d.normalize())
        .map_err(|_| RouteError::Overflow)
}

/// Converts `num / den` to a `Decimal`, keeping as many fractional digits
/// (up to 18) as the 96-bit mantissa allows.
pub fn ratio_to_decimal(num: U512, den: U512) -> Result<Decimal> {
    if den.is_zero() {
        return Err(RouteError::InsufficientLiquidity);
    }
    for scale in (0..=PERCENT_SCALE).rev() {
        let scaled = match num.checked_mul(pow10(scale)) {
            Some(v) => v / den,
            None => continue,
        };
        if let Ok(value) = scaled_to_decimal(scaled, scale) {
            return Ok(value);
        }
    }
    Err(RouteError::Overflow)
}

/// Output of a single swap through a constant-product pair.
///
/// Truncates exactly like the pair contract, so a quote never overstates
/// what the swap will return.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_in.is_zero() {
        return Err(RouteError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouteError::InsufficientLiquidity);
    }

    let amount_in_with_fee = mul(wide(amount_in), U512::from(FEE_NUMERATOR))?;
    let numerator = mul(amount_in_with_fee, wide(reserve_out))?;
    let denominator = mul(wide(reserve_in), U512::from(FEE_DENOMINATOR))?
        .checked_add(amount_in_with_fee)
        .ok_or(RouteError::Overflow)?;

    narrow(numerator / denominator)
}

/// Input required to receive exactly `amount_out` (rounded up by one unit).
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_out.is_zero() {
        return Err(RouteError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(RouteError::InsufficientLiquidity);
    }

    let numerator = mul(
        mul(wide(reserve_in), wide(amount_out))?,
        U512::from(FEE_DENOMINATOR),
    )?;
    let denominator = mul(wide(reserve_out - amount_out), U512::from(FEE_NUMERATOR))?;

    narrow(numerator / denominator + U512::from(1u64))
}

/// Chains `get_amount_out` across hops given as `(reserve_in, reserve_out)`.
pub fn get_amount_out_multi_hop(amount_in: U256, reserves: &[(U256, U256)]) -> Result<U256> {
    if reserves.is_empty() {
        return Err(RouteError::InvalidPath("no hops to price".to_string()));
    }
    reserves
        .iter()
        .try_fold(amount_in, |amount, &(reserve_in, reserve_out)| {
            get_amount_out(amount, reserve_in, reserve_out)
        })
}

/// A pool is thin when either reserve is under 100x the trade on its side.
pub fn is_thin_pool(amount_in: U256, amount_out: U256, reserve_in: U256, reserve_out: U256) -> bool {
    let ratio = U512::from(THIN_POOL_RATIO);
    wide(reserve_in) < wide(amount_in) * ratio || wide(reserve_out) < wide(amount_out) * ratio
}

/// Price impact in percent (`0..=100`).
///
/// `impact = max(0, (1 - execution / theoretical) * 100)` where
/// `theoretical = reserve_out / reserve_in * 0.997` and
/// `execution = amount_out / amount_in`.
///
/// Thin-pool policy: when [`is_thin_pool`] holds the ratio above is dominated
/// by rounding and curve effects, so the result is the conservative
/// `amount_in / reserve_in * 100`, capped at 100.
pub fn calculate_price_impact(
    amount_in: U256,
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Result<Decimal> {
    if amount_in.is_zero() {
        return Err(RouteError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouteError::InsufficientLiquidity);
    }

    let hundred_scaled = U512::from(100u64) * pow10(PERCENT_SCALE);

    if is_thin_pool(amount_in, amount_out, reserve_in, reserve_out) {
        let impact = mul(wide(amount_in), hundred_scaled)? / wide(reserve_in);
        return scaled_to_decimal(impact.min(hundred_scaled), PERCENT_SCALE);
    }

    // execution / theoretical = (amount_out * reserve_in * 1000) / (amount_in * reserve_out * 997)
    let numerator = mul(
        mul(wide(amount_out), wide(reserve_in))?,
        U512::from(FEE_DENOMINATOR),
    )?;
    let denominator = mul(
        mul(wide(amount_in), wide(reserve_out))?,
        U512::from(FEE_NUMERATOR),
    )?;

    let kept = mul(numerator, hundred_scaled)? / denominator;
    scaled_to_decimal(hundred_scaled.saturating_sub(kept), PERCENT_SCALE)
}

/// Lowest output accepted on-chain for a given slippage tolerance (percent).
///
/// The tolerance is rounded up to the nearest millionth of a percent so the
/// minimum only ever errs downward.
pub fn minimum_amount_out(amount_out: U256, slippage_percent: Decimal) -> Result<U256> {
    validate_slippage(slippage_percent)?;

    let slippage_scaled = (slippage_percent * Decimal::from(SLIPPAGE_SCALE))
        .ceil()
        .to_u64()
        .ok_or(RouteError::InvalidSlippage(slippage_percent))?;
    let full = 100 * SLIPPAGE_SCALE;
    let kept = full - slippage_scaled.min(full);

    narrow(mul(wide(amount_out), U512::from(kept))? / U512::from(full))
}

pub fn validate_slippage(slippage_percent: Decimal) -> Result<()> {
    if slippage_percent < Decimal::ZERO || slippage_percent > HUNDRED {
        return Err(RouteError::InvalidSlippage(slippage_percent));
    }
    Ok(())
}
