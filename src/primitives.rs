//! Ready-made Cobb-Douglas production with log or CRRA utility.
//!
//! The operators treat primitives as opaque callables; these presets only
//! assemble a [`GrowthModelBuilder`] and, for log utility, expose the known
//! closed-form solution used to check the operators.

use crate::error::{GrowthError, Result};
use crate::model::{GrowthModel, GrowthModelBuilder, ModelConfig};
use crate::policy::Policy;

fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(GrowthError::configuration("alpha", alpha, "0 < alpha < 1"))
    }
}

fn cobb_douglas(builder: GrowthModelBuilder, alpha: f64) -> GrowthModelBuilder {
    builder.production(
        move |k: f64| k.powf(alpha),
        move |k: f64| alpha * k.powf(alpha - 1.0),
    )
}

/// `f(k) = k^alpha` with `u(c) = ln(c)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogCobbDouglas {
    pub alpha: f64,
}

impl Default for LogCobbDouglas {
    fn default() -> Self {
        Self { alpha: 0.4 }
    }
}

impl LogCobbDouglas {
    /// Preset with output elasticity `alpha`.
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Builder preloaded with the production and utility callables.
    pub fn builder(&self, config: ModelConfig) -> Result<GrowthModelBuilder> {
        check_alpha(self.alpha)?;
        Ok(cobb_douglas(GrowthModel::builder(config), self.alpha).utility(
            f64::ln,
            |c: f64| 1.0 / c,
            |x: f64| 1.0 / x,
        ))
    }

    /// Builds the model directly.
    pub fn model(&self, config: ModelConfig) -> Result<GrowthModel> {
        self.builder(config)?.build()
    }

    /// Slope of the optimal policy, `1 - alpha * beta`.
    pub fn consumption_share(&self, beta: f64) -> f64 {
        1.0 - self.alpha * beta
    }

    /// Closed-form optimal policy `σ*(y) = (1 - alpha * beta) y`.
    pub fn optimal_policy(&self, beta: f64) -> Policy {
        let share = self.consumption_share(beta);
        Policy::closed_form(move |y| share * y)
    }

    /// Closed-form value function at income `y`.
    pub fn value(&self, beta: f64, mu: f64, y: f64) -> f64 {
        let ab = self.alpha * beta;
        let c1 = (1.0 - ab).ln() / (1.0 - beta);
        let c2 = (mu + self.alpha * ab.ln()) / (1.0 - self.alpha);
        let c3 = 1.0 / (1.0 - beta);
        let c4 = 1.0 / (1.0 - ab);
        c1 + c2 * (c3 - c4) + c4 * y.ln()
    }
}

/// `f(k) = k^alpha` with CRRA utility `u(c) = (c^(1 - gamma) - 1) / (1 - gamma)`.
///
/// `gamma == 1` falls back to log utility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrraCobbDouglas {
    pub alpha: f64,
    pub gamma: f64,
}

impl Default for CrraCobbDouglas {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            gamma: 1.5,
        }
    }
}

impl CrraCobbDouglas {
    /// Preset with output elasticity `alpha` and relative risk aversion `gamma`.
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Builder preloaded with the production and utility callables.
    pub fn builder(&self, config: ModelConfig) -> Result<GrowthModelBuilder> {
        check_alpha(self.alpha)?;
        let gamma = self.gamma;
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(GrowthError::configuration(
                "gamma",
                gamma,
                "finite and strictly positive",
            ));
        }

        let builder = cobb_douglas(GrowthModel::builder(config), self.alpha);
        Ok(builder.utility(
            move |c: f64| {
                if gamma == 1.0 {
                    c.ln()
                } else {
                    (c.powf(1.0 - gamma) - 1.0) / (1.0 - gamma)
                }
            },
            move |c: f64| c.powf(-gamma),
            move |x: f64| x.powf(-1.0 / gamma),
        ))
    }

    /// Builds the model directly.
    pub fn model(&self, config: ModelConfig) -> Result<GrowthModel> {
        self.builder(config)?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crra_marginal_utility_round_trips() {
        let model = CrraCobbDouglas::default()
            .model(ModelConfig::default().with_grid(1e-5, 4.0, 10))
            .unwrap();
        for c in [0.1, 0.7, 2.5] {
            assert_relative_eq!(model.u_prime_inv(model.u_prime(c)), c, epsilon = 1e-12);
        }
        assert_relative_eq!(model.u(1.0), 0.0);
    }

    #[test]
    fn crra_with_unit_gamma_is_log_utility() {
        let model = CrraCobbDouglas::new(0.3, 1.0)
            .model(ModelConfig::default().with_grid(1e-5, 4.0, 10))
            .unwrap();
        assert_relative_eq!(model.u(2.0), 2.0_f64.ln());
    }

    #[test]
    fn value_function_has_expected_slope() {
        let preset = LogCobbDouglas::default();
        let (beta, mu) = (0.96, 0.0);
        let slope = preset.value(beta, mu, std::f64::consts::E) - preset.value(beta, mu, 1.0);
        assert_relative_eq!(slope, 1.0 / (1.0 - 0.4 * 0.96), epsilon = 1e-12);
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        assert!(LogCobbDouglas::new(1.2).model(ModelConfig::default()).is_err());
        assert!(CrraCobbDouglas::new(0.4, -1.0).model(ModelConfig::default()).is_err());
    }
}
