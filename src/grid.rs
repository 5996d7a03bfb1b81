//! Exogenous capital grid and the fixed sample of multiplicative productivity shocks.

use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{GrowthError, Result};

/// Strictly increasing grid of capital (savings) values on `[min, max]`.
#[derive(Clone, Debug)]
pub struct CapitalGrid {
    points: DVector<f64>,
}

impl CapitalGrid {
    /// Builds an evenly spaced grid with `size` points from `min` to `max` inclusive.
    pub fn linspace(min: f64, max: f64, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(GrowthError::configuration(
                "grid_size",
                size as f64,
                "grid_size >= 2",
            ));
        }
        if !(min.is_finite() && min > 0.0) {
            return Err(GrowthError::configuration(
                "grid_min",
                min,
                "finite and strictly positive",
            ));
        }
        if !(max.is_finite() && max > min) {
            return Err(GrowthError::configuration(
                "grid_max",
                max,
                "finite and greater than grid_min",
            ));
        }

        let step = (max - min) / (size - 1) as f64;
        let mut points = DVector::from_fn(size, |i, _| min + step * i as f64);
        // Pin the upper bound exactly; accumulated rounding would otherwise drift.
        points[size - 1] = max;
        Ok(Self { points })
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a grid holds at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the grid values.
    pub fn points(&self) -> &DVector<f64> {
        &self.points
    }

    /// Returns the grid values as a slice.
    pub fn as_slice(&self) -> &[f64] {
        self.points.as_slice()
    }
}

/// Fixed sample of positive multiplicative shocks, drawn once per model.
///
/// Every operator application averages over exactly these draws, which keeps
/// the operators deterministic in their policy argument.
#[derive(Clone, Debug)]
pub struct ShockSample {
    values: DVector<f64>,
}

impl ShockSample {
    /// Wraps an explicit set of shock realizations.
    pub fn new(values: DVector<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(GrowthError::configuration(
                "shock_size",
                0.0,
                "shock_size >= 1",
            ));
        }
        for value in values.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(GrowthError::configuration(
                    "shock",
                    *value,
                    "finite and strictly positive",
                ));
            }
        }
        Ok(Self { values })
    }

    /// Draws `size` lognormal shocks `exp(mu + s * Z)` with `Z ~ N(0, 1)`.
    pub fn lognormal(mu: f64, s: f64, size: usize, seed: u64) -> Result<Self> {
        if size < 1 {
            return Err(GrowthError::configuration(
                "shock_size",
                size as f64,
                "shock_size >= 1",
            ));
        }
        if !mu.is_finite() {
            return Err(GrowthError::configuration("mu", mu, "finite"));
        }
        if !(s.is_finite() && s >= 0.0) {
            return Err(GrowthError::configuration("s", s, "finite and non-negative"));
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let values = DVector::from_iterator(
            size,
            (0..size).map(|_| {
                let z: f64 = StandardNormal.sample(&mut rng);
                (mu + s * z).exp()
            }),
        );
        Self::new(values)
    }

    /// Number of shock draws.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; a sample holds at least one draw.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the shock realizations.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// Sample average of `g(z)` over the fixed draws.
    pub fn mean_of<F>(&self, mut g: F) -> f64
    where
        F: FnMut(f64) -> f64,
    {
        let total: f64 = self.values.iter().map(|z| g(*z)).sum();
        total / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_hits_both_endpoints() {
        let grid = CapitalGrid::linspace(1e-5, 4.0, 200).unwrap();
        assert_eq!(grid.len(), 200);
        assert_relative_eq!(grid.points()[0], 1e-5);
        assert_eq!(grid.points()[199], 4.0);
        assert!(grid.as_slice().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_rejects_degenerate_grids() {
        assert!(CapitalGrid::linspace(1e-5, 4.0, 1).is_err());
        assert!(CapitalGrid::linspace(0.0, 4.0, 10).is_err());
        assert!(CapitalGrid::linspace(2.0, 1.0, 10).is_err());
    }

    #[test]
    fn lognormal_draws_are_reproducible_and_positive() {
        let first = ShockSample::lognormal(0.0, 0.1, 250, 1234).unwrap();
        let second = ShockSample::lognormal(0.0, 0.1, 250, 1234).unwrap();
        assert_eq!(first.len(), 250);
        assert_eq!(first.values(), second.values());
        assert!(first.values().iter().all(|z| *z > 0.0));
    }

    #[test]
    fn zero_volatility_collapses_to_the_mean() {
        let shocks = ShockSample::lognormal(0.5, 0.0, 3, 7).unwrap();
        for z in shocks.values().iter() {
            assert_relative_eq!(*z, 0.5_f64.exp());
        }
        assert_relative_eq!(shocks.mean_of(|z| z), 0.5_f64.exp());
    }

    #[test]
    fn lognormal_rejects_negative_scale_and_empty_samples() {
        assert!(ShockSample::lognormal(0.0, -0.1, 10, 1).is_err());
        assert!(ShockSample::lognormal(0.0, 0.1, 0, 1).is_err());
    }
}
