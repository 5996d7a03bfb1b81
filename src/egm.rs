//! The endogenous grid method (EGM) form of the Coleman-Reffett operator.
//!
//! For each savings level `k` on the exogenous grid the Euler equation
//!
//! ```text
//! u'(c) = β E[ u'(σ(f(k) z)) f'(k) z ]
//! ```
//!
//! is solved for `c` by inverting marginal utility, so no root finding is
//! needed. The income that supports that choice, `y = k + c`, forms the
//! endogenous grid over which the updated policy is interpolated.

use log::{trace, warn};
use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{GrowthError, Result};
use crate::model::GrowthModel;
use crate::operator::PolicyOperator;
use crate::options::EgmOptions;
use crate::policy::{Extrapolation, Policy};

/// Endogenous grid operator borrowing an immutable model.
#[derive(Clone, Debug)]
pub struct EgmOperator<'a> {
    model: &'a GrowthModel,
    options: EgmOptions,
}

impl<'a> EgmOperator<'a> {
    /// Creates a serial operator.
    pub fn new(model: &'a GrowthModel) -> Self {
        Self::with_options(model, EgmOptions::default())
    }

    /// Creates an operator with explicit options.
    pub fn with_options(model: &'a GrowthModel, options: EgmOptions) -> Self {
        Self { model, options }
    }

    /// Options in use.
    pub fn options(&self) -> &EgmOptions {
        &self.options
    }

    /// Updated `(income, consumption)` pair for the grid point `k`.
    fn update_at(&self, index: usize, k: f64, policy: &Policy) -> Result<(f64, f64)> {
        let model = self.model;

        let output = model.f(k);
        if !output.is_finite() {
            return Err(GrowthError::domain("production function", index, k));
        }
        let marginal_product = model.f_prime(k);
        if !marginal_product.is_finite() {
            return Err(GrowthError::domain("marginal product", index, k));
        }

        let expectation = model.shocks().mean_of(|z| {
            model.u_prime(policy.evaluate_at(output * z)) * marginal_product * z
        });
        let marginal_utility = model.beta() * expectation;
        if !(marginal_utility.is_finite() && marginal_utility > 0.0) {
            return Err(GrowthError::domain(
                "inverse marginal utility argument",
                index,
                marginal_utility,
            ));
        }

        let consumption = model.u_prime_inv(marginal_utility);
        if !(consumption.is_finite() && consumption > 0.0) {
            return Err(GrowthError::domain(
                "inverse marginal utility",
                index,
                consumption,
            ));
        }

        Ok((k + consumption, consumption))
    }

    /// Endogenous income grid and the consumption chosen at each of its points,
    /// sorted by income.
    pub fn endogenous_grid(&self, policy: &Policy) -> Result<(DVector<f64>, DVector<f64>)> {
        let grid = self.model.grid().as_slice();

        let mut pairs: Vec<(f64, f64)> = if self.options.parallel {
            grid.par_iter()
                .enumerate()
                .map(|(index, k)| self.update_at(index, *k, policy))
                .collect::<Result<Vec<_>>>()?
        } else {
            grid.iter()
                .enumerate()
                .map(|(index, k)| self.update_at(index, *k, policy))
                .collect::<Result<Vec<_>>>()?
        };

        if pairs.windows(2).any(|w| w[1].0 <= w[0].0) {
            warn!("endogenous grid is not increasing in capital; sorting by income");
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let income = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.0));
        let consumption = DVector::from_iterator(pairs.len(), pairs.iter().map(|p| p.1));
        Ok((income, consumption))
    }
}

impl PolicyOperator for EgmOperator<'_> {
    fn model(&self) -> &GrowthModel {
        self.model
    }

    fn apply(&self, policy: &Policy) -> Result<Policy> {
        let (income, consumption) = self.endogenous_grid(policy)?;
        trace!(
            "egm update: {} points, endogenous income in [{:.6e}, {:.6e}]",
            income.len(),
            income[0],
            income[income.len() - 1]
        );
        // Incomes outside the endogenous range are common early on, so extend linearly.
        Policy::interpolated(income, consumption, Extrapolation::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use crate::primitives::LogCobbDouglas;
    use approx::assert_relative_eq;

    fn small_model() -> GrowthModel {
        LogCobbDouglas::default()
            .model(ModelConfig::default().with_grid(1e-5, 4.0, 50).with_shocks(40, 7))
            .unwrap()
    }

    #[test]
    fn optimal_policy_maps_capital_to_known_income() {
        let model = small_model();
        let preset = LogCobbDouglas::default();
        let ab = preset.alpha * model.beta();
        let operator = EgmOperator::new(&model);

        let (income, consumption) = operator
            .endogenous_grid(&preset.optimal_policy(model.beta()))
            .unwrap();
        for (i, k) in model.grid().points().iter().enumerate() {
            assert_relative_eq!(income[i], k / ab, max_relative = 1e-12);
            assert_relative_eq!(consumption[i], (1.0 - ab) * k / ab, max_relative = 1e-12);
        }
    }

    #[test]
    fn parallel_and_serial_updates_agree() {
        let model = small_model();
        let initial = Policy::closed_form(|y| y);
        let serial = EgmOperator::new(&model).apply(&initial).unwrap();
        let parallel = EgmOperator::with_options(&model, EgmOptions::default().with_parallel(true))
            .apply(&initial)
            .unwrap();
        assert_eq!(serial.nodes(), parallel.nodes());
    }

    #[test]
    fn negative_inverse_marginal_utility_is_a_domain_error() {
        let model = GrowthModel::builder(ModelConfig::default().with_grid(1e-5, 4.0, 20))
            .production(|k: f64| k.powf(0.4), |k: f64| 0.4 * k.powf(-0.6))
            .utility(f64::ln, |c: f64| 1.0 / c, |x: f64| -1.0 / x)
            .build()
            .unwrap();
        let err = EgmOperator::new(&model)
            .apply(&Policy::closed_form(|y| y))
            .unwrap_err();
        assert!(matches!(
            err,
            GrowthError::Domain {
                context: "inverse marginal utility",
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_production_is_a_domain_error() {
        let model = GrowthModel::builder(ModelConfig::default().with_grid(1e-5, 4.0, 20))
            .production(
                |k: f64| if k < 1e-3 { f64::NAN } else { k.powf(0.4) },
                |k: f64| 0.4 * k.powf(-0.6),
            )
            .utility(f64::ln, |c: f64| 1.0 / c, |x: f64| 1.0 / x)
            .build()
            .unwrap();
        let err = EgmOperator::new(&model)
            .apply(&Policy::closed_form(|y| y))
            .unwrap_err();
        assert!(matches!(
            err,
            GrowthError::Domain {
                context: "production function",
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_marginal_product_is_a_domain_error() {
        let model = GrowthModel::builder(ModelConfig::default().with_grid(1e-5, 4.0, 20))
            .production(|k: f64| k.powf(0.4), |_k: f64| f64::INFINITY)
            .utility(f64::ln, |c: f64| 1.0 / c, |x: f64| 1.0 / x)
            .build()
            .unwrap();
        let err = EgmOperator::new(&model)
            .apply(&Policy::closed_form(|y| y))
            .unwrap_err();
        assert!(matches!(
            err,
            GrowthError::Domain {
                context: "marginal product",
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn negative_marginal_utility_argument_is_a_domain_error() {
        let model = GrowthModel::builder(ModelConfig::default().with_grid(1e-5, 4.0, 20))
            .production(|k: f64| k.powf(0.4), |k: f64| 0.4 * k.powf(-0.6))
            .utility(f64::ln, |c: f64| -1.0 / c, |x: f64| 1.0 / x)
            .build()
            .unwrap();
        let err = EgmOperator::new(&model)
            .apply(&Policy::closed_form(|y| y))
            .unwrap_err();
        assert!(matches!(
            err,
            GrowthError::Domain {
                context: "inverse marginal utility argument",
                ..
            }
        ));
    }
}
