//! Consumption policies: closed-form callables and piecewise-linear interpolants.

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::grid::CapitalGrid;
use crate::model::ScalarFn;

/// Behavior of an interpolant outside its node range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Hold the endpoint value constant.
    Flat,
    /// Extend the nearest edge segment.
    Linear,
}

/// Piecewise-linear interpolant over strictly increasing nodes.
#[derive(Clone, Debug)]
pub struct LinearInterpolant {
    x: DVector<f64>,
    y: DVector<f64>,
    extrapolation: Extrapolation,
}

impl LinearInterpolant {
    /// Validates the nodes and builds the interpolant.
    pub fn new(x: DVector<f64>, y: DVector<f64>, extrapolation: Extrapolation) -> Result<Self> {
        if x.len() != y.len() {
            return Err(GrowthError::dimension_mismatch(
                "interpolation ordinates",
                x.len(),
                y.len(),
            ));
        }
        if x.len() < 2 {
            return Err(GrowthError::InvalidNodes {
                reason: "at least two nodes are required",
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(GrowthError::InvalidNodes {
                reason: "nodes must be finite",
            });
        }
        if x.as_slice().windows(2).any(|w| w[1] <= w[0]) {
            return Err(GrowthError::InvalidNodes {
                reason: "abscissas must be strictly increasing",
            });
        }
        Ok(Self {
            x,
            y,
            extrapolation,
        })
    }

    /// Interpolation abscissas.
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// Interpolation ordinates.
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Extrapolation mode in use.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Evaluates the interpolant at `xq`.
    pub fn value(&self, xq: f64) -> f64 {
        if xq.is_nan() {
            return f64::NAN;
        }
        let x = self.x.as_slice();
        let y = self.y.as_slice();
        let last = x.len() - 1;

        if xq <= x[0] {
            return match self.extrapolation {
                Extrapolation::Flat => y[0],
                Extrapolation::Linear => segment(x, y, 0, xq),
            };
        }
        if xq >= x[last] {
            return match self.extrapolation {
                Extrapolation::Flat => y[last],
                Extrapolation::Linear => segment(x, y, last - 1, xq),
            };
        }

        // x[0] < xq < x[last], so the partition point lies in 1..=last.
        let idx = x.partition_point(|v| *v <= xq);
        segment(x, y, idx - 1, xq)
    }
}

#[inline]
fn segment(x: &[f64], y: &[f64], i: usize, xq: f64) -> f64 {
    let slope = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
    y[i] + slope * (xq - x[i])
}

/// A consumption policy `σ(y)` mapping income to consumption.
#[derive(Clone)]
pub enum Policy {
    /// An analytic policy such as an initial guess or a known solution.
    ClosedForm(ScalarFn),
    /// A policy represented by `(income, consumption)` samples.
    Interpolated(LinearInterpolant),
}

impl Policy {
    /// Wraps an analytic policy.
    pub fn closed_form<F>(policy: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::ClosedForm(Arc::new(policy))
    }

    /// Builds an interpolated policy from income/consumption samples.
    pub fn interpolated(
        income: DVector<f64>,
        consumption: DVector<f64>,
        extrapolation: Extrapolation,
    ) -> Result<Self> {
        LinearInterpolant::new(income, consumption, extrapolation).map(Self::Interpolated)
    }

    /// Builds a policy from consumption values aligned to a grid, held flat outside it.
    pub fn on_grid(grid: &CapitalGrid, consumption: DVector<f64>) -> Result<Self> {
        Self::interpolated(grid.points().clone(), consumption, Extrapolation::Flat)
    }

    /// Consumption at a single income level.
    pub fn evaluate_at(&self, income: f64) -> f64 {
        match self {
            Self::ClosedForm(policy) => policy(income),
            Self::Interpolated(interpolant) => interpolant.value(income),
        }
    }

    /// Consumption at each of the supplied income levels.
    pub fn evaluate(&self, points: &[f64]) -> DVector<f64> {
        DVector::from_iterator(points.len(), points.iter().map(|y| self.evaluate_at(*y)))
    }

    /// Supremum distance between two policies over `points`.
    pub fn max_distance(&self, other: &Policy, points: &[f64]) -> f64 {
        points
            .iter()
            .map(|y| (self.evaluate_at(*y) - other.evaluate_at(*y)).abs())
            .fold(0.0, |max, d| {
                // f64::max would drop NaN and let a broken policy look converged.
                if max.is_nan() || d.is_nan() {
                    f64::NAN
                } else {
                    max.max(d)
                }
            })
    }

    /// Sample nodes `(income, consumption)` for interpolated policies.
    pub fn nodes(&self) -> Option<(&DVector<f64>, &DVector<f64>)> {
        match self {
            Self::ClosedForm(_) => None,
            Self::Interpolated(interpolant) => Some((interpolant.x(), interpolant.y())),
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedForm(_) => f.write_str("Policy::ClosedForm(..)"),
            Self::Interpolated(interpolant) => f
                .debug_tuple("Policy::Interpolated")
                .field(interpolant)
                .finish(),
        }
    }
}
