//! Synthetic Reserve Reconstruction
//!
//! Fallback for routers that only expose `getAmountsOut`. Two quotes at
//! different input sizes pin down the constant-product curve they came from:
//!
//! ```text
//!   out(x) = f·x·R_out / (R_in + f·x),      f = 997/1000
//!   p(x)   = out(x) / x = f·R_out / (R_in + f·x)
//!   q      = p(s) / p(L) = (R_in + f·L) / (R_in + f·s)
//!   R_in   = f·(L − q·s) / (q − 1)
//!   R_out  = p(s)·(R_in + f·s) / f
//! ```
//!
//! The result is an estimate. It is only used to derive price impact for
//! display; the router's quote stays the authoritative output amount.

use alloy::primitives::{U256, U512};

use crate::amm::{narrow, wide, FEE_DENOMINATOR, FEE_NUMERATOR};

/// Fixed-point scale for the price ratio `q`
const Q_SCALE: u64 = 1_000_000_000_000_000_000;

/// When the samples show no measurable curvature the pool is deeper than
/// the samples can resolve; reserve_in is then set this many times the
/// large sample.
pub const DEEP_LIQUIDITY_MULTIPLIER: u64 = 1_000_000;

/// Reconstruct `(reserve_in, reserve_out)` from two quotes.
///
/// Returns `None` for samples no constant-product pool could have produced
/// (zero amounts, `large_in <= small_in`, or output that does not grow).
pub fn synthesize_reserves(
    small_in: U256,
    small_out: U256,
    large_in: U256,
    large_out: U256,
) -> Option<(U256, U256)> {
    if small_in.is_zero() || small_out.is_zero() || large_in <= small_in || large_out <= small_out {
        return None;
    }

    let fee_num = U512::from(FEE_NUMERATOR);
    let fee_den = U512::from(FEE_DENOMINATOR);
    let scale = U512::from(Q_SCALE);
    let (s, s_out, l, l_out) = (wide(small_in), wide(small_out), wide(large_in), wide(large_out));

    // q = (s_out / s) / (l_out / l), scaled
    let q = s_out.checked_mul(l)?.checked_mul(scale)? / s.checked_mul(l_out)?;

    let reserve_in = if q <= scale {
        l.checked_mul(U512::from(DEEP_LIQUIDITY_MULTIPLIER))?
    } else {
        let l_scaled = l.checked_mul(scale)?;
        let qs = q.checked_mul(s)?;
        if l_scaled <= qs {
            return None;
        }
        fee_num.checked_mul(l_scaled - qs)? / (q - scale).checked_mul(fee_den)?
    };
    if reserve_in.is_zero() {
        return None;
    }

    // R_out = s_out · (1000·R_in + 997·s) / (997·s)
    let reserve_out = s_out
        .checked_mul(reserve_in.checked_mul(fee_den)?.checked_add(fee_num.checked_mul(s)?)?)?
        / fee_num.checked_mul(s)?;

    Some((narrow(reserve_in).ok()?, narrow(reserve_out).ok()?))
}
