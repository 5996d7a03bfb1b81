//! Brent's bracketing root finder used by the time-iteration operator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{GrowthError, Result};

/// Tolerances and iteration cap for [`brent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrentOptions {
    /// Absolute tolerance on the root location.
    pub x_abs_tol: f64,
    /// Relative tolerance on the root location.
    pub x_rel_tol: f64,
    /// Maximum number of residual evaluations after the initial bracket.
    pub max_iterations: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            x_abs_tol: 1e-10,
            x_rel_tol: 1e-10,
            max_iterations: 100,
        }
    }
}

impl BrentOptions {
    /// Checks that the tolerances are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.x_abs_tol.is_finite() && self.x_abs_tol > 0.0) {
            return Err(GrowthError::configuration(
                "x_abs_tol",
                self.x_abs_tol,
                "finite and strictly positive",
            ));
        }
        if !(self.x_rel_tol.is_finite() && self.x_rel_tol >= 4.0 * f64::EPSILON) {
            return Err(GrowthError::configuration(
                "x_rel_tol",
                self.x_rel_tol,
                "finite and at least 4 * f64::EPSILON",
            ));
        }
        if self.max_iterations == 0 {
            return Err(GrowthError::configuration(
                "max_iterations",
                0.0,
                "at least one iteration",
            ));
        }
        Ok(())
    }
}

/// Root location and the work spent finding it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootSummary {
    /// Approximate root.
    pub root: f64,
    /// Iterations performed after the initial bracket check.
    pub iterations: usize,
}

/// Failure modes of [`brent`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BrentError {
    /// Residuals at the endpoints share a sign.
    #[error("no sign change on [{lower}, {upper}]")]
    NoSignChange {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
    /// The residual returned NaN or an infinity.
    #[error("non-finite residual {value} at {x}")]
    NonFinite { x: f64, value: f64 },
    /// The iteration cap was reached before the bracket met the tolerance.
    #[error("no convergence after {iterations} iterations")]
    MaxIterations { iterations: usize, width: f64 },
}

impl BrentError {
    /// Attaches the grid index at which the solve failed.
    pub fn at_index(self, index: usize) -> GrowthError {
        match self {
            Self::NoSignChange {
                lower,
                upper,
                f_lower,
                f_upper,
            } => GrowthError::RootBracket {
                index,
                lower,
                upper,
                f_lower,
                f_upper,
            },
            Self::NonFinite { x, .. } => GrowthError::domain("Euler residual", index, x),
            Self::MaxIterations { iterations, width } => {
                GrowthError::RootDidNotConverge { iterations, width }
            }
        }
    }
}

fn checked<F>(residual: &mut F, x: f64) -> std::result::Result<f64, BrentError>
where
    F: FnMut(f64) -> f64,
{
    let value = residual(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BrentError::NonFinite { x, value })
    }
}

// Compares sign bits; a product of two tiny residuals could underflow to zero.
#[inline]
fn opposite(a: f64, b: f64) -> bool {
    a.is_sign_negative() != b.is_sign_negative()
}

/// Finds a root of `residual` on `[lower, upper]` with Brent's method.
///
/// Combines bisection with secant and inverse quadratic steps; every step keeps
/// the root bracketed, so the iteration cap is the only way to fail once a sign
/// change has been established.
pub fn brent<F>(
    mut residual: F,
    lower: f64,
    upper: f64,
    options: &BrentOptions,
) -> std::result::Result<RootSummary, BrentError>
where
    F: FnMut(f64) -> f64,
{
    let mut x_pre = lower;
    let mut x_cur = upper;
    let mut f_pre = checked(&mut residual, x_pre)?;
    let mut f_cur = checked(&mut residual, x_cur)?;

    if f_pre != 0.0 && f_cur != 0.0 && !opposite(f_pre, f_cur) {
        return Err(BrentError::NoSignChange {
            lower,
            upper,
            f_lower: f_pre,
            f_upper: f_cur,
        });
    }
    if f_pre == 0.0 {
        return Ok(RootSummary {
            root: x_pre,
            iterations: 0,
        });
    }
    if f_cur == 0.0 {
        return Ok(RootSummary {
            root: x_cur,
            iterations: 0,
        });
    }

    // `x_blk` is the contrapoint: the residual changes sign between it and `x_cur`.
    let mut x_blk = 0.0;
    let mut f_blk = 0.0;
    let mut s_pre = 0.0;
    let mut s_cur = 0.0;

    for iteration in 0..options.max_iterations {
        if f_pre != 0.0 && f_cur != 0.0 && opposite(f_pre, f_cur) {
            x_blk = x_pre;
            f_blk = f_pre;
            s_pre = x_cur - x_pre;
            s_cur = s_pre;
        }
        if f_blk.abs() < f_cur.abs() {
            x_pre = x_cur;
            x_cur = x_blk;
            x_blk = x_pre;

            f_pre = f_cur;
            f_cur = f_blk;
            f_blk = f_pre;
        }

        let delta = 0.5 * (options.x_abs_tol + options.x_rel_tol * x_cur.abs());
        let s_bis = 0.5 * (x_blk - x_cur);
        if f_cur == 0.0 || s_bis.abs() < delta {
            return Ok(RootSummary {
                root: x_cur,
                iterations: iteration,
            });
        }

        if s_pre.abs() > delta && f_cur.abs() < f_pre.abs() {
            let s_try = if x_pre == x_blk {
                // secant
                -f_cur * (x_cur - x_pre) / (f_cur - f_pre)
            } else {
                // inverse quadratic
                let d_pre = (f_pre - f_cur) / (x_pre - x_cur);
                let d_blk = (f_blk - f_cur) / (x_blk - x_cur);
                -f_cur * (f_blk * d_blk - f_pre * d_pre) / (d_blk * d_pre * (f_blk - f_pre))
            };
            if 2.0 * s_try.abs() < s_pre.abs().min(3.0 * s_bis.abs() - delta) {
                s_pre = s_cur;
                s_cur = s_try;
            } else {
                s_pre = s_bis;
                s_cur = s_bis;
            }
        } else {
            s_pre = s_bis;
            s_cur = s_bis;
        }

        x_pre = x_cur;
        f_pre = f_cur;
        if s_cur.abs() > delta {
            x_cur += s_cur;
        } else {
            x_cur += if s_bis > 0.0 { delta } else { -delta };
        }
        f_cur = checked(&mut residual, x_cur)?;
    }

    Err(BrentError::MaxIterations {
        iterations: options.max_iterations,
        width: (x_blk - x_cur).abs(),
    })
}
