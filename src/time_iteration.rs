//! Exogenous-grid time iteration: the Coleman-Reffett operator solved pointwise
//! with a bracketing root finder.
//!
//! Kept as the reference against which the endogenous grid operator is checked
//! and benchmarked.

use log::trace;
use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{GrowthError, Result};
use crate::model::GrowthModel;
use crate::operator::PolicyOperator;
use crate::options::TimeIterationOptions;
use crate::policy::Policy;
use crate::roots::brent;

/// Time-iteration operator borrowing an immutable model.
#[derive(Clone, Debug)]
pub struct TimeIterationOperator<'a> {
    model: &'a GrowthModel,
    options: TimeIterationOptions,
}

impl<'a> TimeIterationOperator<'a> {
    /// Creates an operator with default options.
    pub fn new(model: &'a GrowthModel) -> Self {
        Self {
            model,
            options: TimeIterationOptions::default(),
        }
    }

    /// Creates an operator after validating the supplied options.
    pub fn with_options(model: &'a GrowthModel, options: TimeIterationOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { model, options })
    }

    /// Options in use.
    pub fn options(&self) -> &TimeIterationOptions {
        &self.options
    }

    /// Euler residual `u'(c) - β E[u'(σ(f(y - c) z)) f'(y - c) z]`.
    fn euler_residual(&self, policy: &Policy, y: f64, c: f64) -> f64 {
        let model = self.model;
        let k = y - c;
        let output = model.f(k);
        let marginal_product = model.f_prime(k);
        let expectation = model.shocks().mean_of(|z| {
            model.u_prime(policy.evaluate_at(output * z)) * marginal_product * z
        });
        model.u_prime(c) - model.beta() * expectation
    }

    /// Consumption solving the Euler equation at income `y`.
    fn solve_at(&self, index: usize, y: f64, policy: &Policy) -> Result<f64> {
        let lower = self.options.bracket_offset;
        let upper = y - self.options.bracket_offset;
        if upper <= lower {
            return Err(GrowthError::RootBracket {
                index,
                lower,
                upper,
                f_lower: f64::NAN,
                f_upper: f64::NAN,
            });
        }

        brent(
            |c| self.euler_residual(policy, y, c),
            lower,
            upper,
            &self.options.brent,
        )
        .map(|summary| summary.root)
        .map_err(|err| err.at_index(index))
    }

    /// Updates consumption values aligned to the grid.
    ///
    /// Between grid points the current policy is interpolated linearly and held
    /// flat beyond the grid ends.
    pub fn apply_values(&self, consumption: &[f64]) -> Result<DVector<f64>> {
        let grid = self.model.grid();
        if consumption.len() != grid.len() {
            return Err(GrowthError::dimension_mismatch(
                "policy values",
                grid.len(),
                consumption.len(),
            ));
        }
        let policy = Policy::on_grid(grid, DVector::from_column_slice(consumption))?;

        let points = grid.as_slice();
        let updated: Vec<f64> = if self.options.parallel {
            points
                .par_iter()
                .enumerate()
                .map(|(index, y)| self.solve_at(index, *y, &policy))
                .collect::<Result<Vec<_>>>()?
        } else {
            points
                .iter()
                .enumerate()
                .map(|(index, y)| self.solve_at(index, *y, &policy))
                .collect::<Result<Vec<_>>>()?
        };

        trace!("time iteration update: {} points", updated.len());
        Ok(DVector::from_vec(updated))
    }
}

impl PolicyOperator for TimeIterationOperator<'_> {
    fn model(&self) -> &GrowthModel {
        self.model
    }

    fn apply(&self, policy: &Policy) -> Result<Policy> {
        let grid = self.model.grid();
        let current = policy.evaluate(grid.as_slice());
        let updated = self.apply_values(current.as_slice())?;
        Policy::on_grid(grid, updated)
    }
}
