//! Model primitives: numeric settings, pluggable production and utility callables,
//! and the builder that validates them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::grid::{CapitalGrid, ShockSample};

/// A pure scalar function shared read-only between operators and worker threads.
pub type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Numeric settings of the stochastic optimal growth model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Discount factor, must lie in `(0, 1)`.
    pub beta: f64,
    /// Mean of the log shock.
    pub mu: f64,
    /// Standard deviation of the log shock.
    pub s: f64,
    /// Smallest capital grid point; kept away from zero where `f'` blows up.
    pub grid_min: f64,
    /// Largest capital grid point.
    pub grid_max: f64,
    /// Number of capital grid points.
    pub grid_size: usize,
    /// Number of shock draws used to approximate expectations.
    pub shock_size: usize,
    /// Seed for the one-off shock draw.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            beta: 0.96,
            mu: 0.0,
            s: 0.1,
            grid_min: 1e-5,
            grid_max: 4.0,
            grid_size: 200,
            shock_size: 250,
            seed: 1234,
        }
    }
}

impl ModelConfig {
    /// Overrides the discount factor.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Overrides the log-normal shock parameters.
    pub fn with_shock_distribution(mut self, mu: f64, s: f64) -> Self {
        self.mu = mu;
        self.s = s;
        self
    }

    /// Overrides the capital grid specification.
    pub fn with_grid(mut self, grid_min: f64, grid_max: f64, grid_size: usize) -> Self {
        self.grid_min = grid_min;
        self.grid_max = grid_max;
        self.grid_size = grid_size;
        self
    }

    /// Overrides the number of shock draws and the seed used to draw them.
    pub fn with_shocks(mut self, shock_size: usize, seed: u64) -> Self {
        self.shock_size = shock_size;
        self.seed = seed;
        self
    }

    /// Checks the scalar constraints that do not depend on the callables.
    pub fn validate(&self) -> Result<()> {
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(GrowthError::configuration(
                "beta",
                self.beta,
                "0 < beta < 1",
            ));
        }
        if self.grid_size < 2 {
            return Err(GrowthError::configuration(
                "grid_size",
                self.grid_size as f64,
                "grid_size >= 2",
            ));
        }
        if self.shock_size < 1 {
            return Err(GrowthError::configuration(
                "shock_size",
                self.shock_size as f64,
                "shock_size >= 1",
            ));
        }
        Ok(())
    }
}

/// Immutable bundle of primitives, grid, and shock sample shared by both operators.
#[derive(Clone)]
pub struct GrowthModel {
    config: ModelConfig,
    f: ScalarFn,
    f_prime: ScalarFn,
    u: ScalarFn,
    u_prime: ScalarFn,
    u_prime_inv: ScalarFn,
    grid: CapitalGrid,
    shocks: ShockSample,
}

impl GrowthModel {
    /// Starts building a model from numeric settings.
    pub fn builder(config: ModelConfig) -> GrowthModelBuilder {
        GrowthModelBuilder::new(config)
    }

    /// Numeric settings the model was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Discount factor.
    pub fn beta(&self) -> f64 {
        self.config.beta
    }

    /// Production function `f(k)`.
    pub fn f(&self, k: f64) -> f64 {
        (self.f)(k)
    }

    /// Marginal product `f'(k)`.
    pub fn f_prime(&self, k: f64) -> f64 {
        (self.f_prime)(k)
    }

    /// Utility `u(c)`.
    pub fn u(&self, c: f64) -> f64 {
        (self.u)(c)
    }

    /// Marginal utility `u'(c)`.
    pub fn u_prime(&self, c: f64) -> f64 {
        (self.u_prime)(c)
    }

    /// Inverse marginal utility `(u')^{-1}(x)`.
    pub fn u_prime_inv(&self, x: f64) -> f64 {
        (self.u_prime_inv)(x)
    }

    /// Exogenous capital grid.
    pub fn grid(&self) -> &CapitalGrid {
        &self.grid
    }

    /// Fixed shock sample.
    pub fn shocks(&self) -> &ShockSample {
        &self.shocks
    }
}

impl fmt::Debug for GrowthModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowthModel")
            .field("config", &self.config)
            .field("grid_len", &self.grid.len())
            .field("shock_len", &self.shocks.len())
            .finish_non_exhaustive()
    }
}

/// Builder that validates settings and callables before constructing a [`GrowthModel`].
pub struct GrowthModelBuilder {
    config: ModelConfig,
    production: Option<(ScalarFn, ScalarFn)>,
    utility: Option<(ScalarFn, ScalarFn, ScalarFn)>,
    shocks: Option<ShockSample>,
}

impl GrowthModelBuilder {
    /// Start building from numeric settings.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            production: None,
            utility: None,
            shocks: None,
        }
    }

    /// Sets the production function and its derivative.
    pub fn production<F, G>(mut self, f: F, f_prime: G) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        G: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.production = Some((Arc::new(f), Arc::new(f_prime)));
        self
    }

    /// Sets the utility function, marginal utility, and inverse marginal utility.
    pub fn utility<U, D, I>(mut self, u: U, u_prime: D, u_prime_inv: I) -> Self
    where
        U: Fn(f64) -> f64 + Send + Sync + 'static,
        D: Fn(f64) -> f64 + Send + Sync + 'static,
        I: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.utility = Some((Arc::new(u), Arc::new(u_prime), Arc::new(u_prime_inv)));
        self
    }

    /// Supplies an explicit shock sample instead of drawing one from the config.
    ///
    /// The config's `shock_size` is updated to the sample length.
    pub fn shocks(mut self, shocks: ShockSample) -> Self {
        self.config.shock_size = shocks.len();
        self.shocks = Some(shocks);
        self
    }

    /// Numeric settings held by the builder.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Finalizes construction after validating settings, grid, and shocks.
    pub fn build(self) -> Result<GrowthModel> {
        self.config.validate()?;

        let (f, f_prime) = self
            .production
            .ok_or_else(|| GrowthError::missing_component("production function"))?;
        let (u, u_prime, u_prime_inv) = self
            .utility
            .ok_or_else(|| GrowthError::missing_component("utility function"))?;

        let grid = CapitalGrid::linspace(
            self.config.grid_min,
            self.config.grid_max,
            self.config.grid_size,
        )?;
        let shocks = match self.shocks {
            Some(shocks) => shocks,
            None => ShockSample::lognormal(
                self.config.mu,
                self.config.s,
                self.config.shock_size,
                self.config.seed,
            )?,
        };

        Ok(GrowthModel {
            config: self.config,
            f,
            f_prime,
            u,
            u_prime,
            u_prime_inv,
            grid,
            shocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_utility(builder: GrowthModelBuilder) -> GrowthModelBuilder {
        builder
            .production(|k: f64| k.powf(0.4), |k: f64| 0.4 * k.powf(-0.6))
            .utility(f64::ln, |c: f64| 1.0 / c, |x: f64| 1.0 / x)
    }

    #[test]
    fn builder_constructs_grid_and_shocks_from_config() {
        let model = log_utility(GrowthModel::builder(ModelConfig::default()))
            .build()
            .expect("valid model");
        assert_eq!(model.grid().len(), 200);
        assert_eq!(model.shocks().len(), 250);
        assert_eq!(model.beta(), 0.96);
    }

    #[test]
    fn builder_rejects_discount_factor_outside_unit_interval() {
        for beta in [1.5, 1.0, 0.0, -0.2, f64::NAN] {
            let config = ModelConfig::default().with_beta(beta);
            let err = log_utility(GrowthModel::builder(config)).build().unwrap_err();
            assert!(matches!(
                err,
                GrowthError::Configuration {
                    parameter: "beta",
                    ..
                }
            ));
        }
    }

    #[test]
    fn builder_rejects_small_grid_and_empty_shock_sample() {
        let config = ModelConfig::default().with_grid(1e-5, 4.0, 1);
        assert!(log_utility(GrowthModel::builder(config))
            .build()
            .unwrap_err()
            .is_configuration());

        let config = ModelConfig::default().with_shocks(0, 1);
        assert!(log_utility(GrowthModel::builder(config))
            .build()
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn builder_requires_callables() {
        let result = GrowthModel::builder(ModelConfig::default())
            .utility(f64::ln, |c: f64| 1.0 / c, |x: f64| 1.0 / x)
            .build();
        assert!(matches!(result, Err(GrowthError::MissingComponent { .. })));
    }

    #[test]
    fn explicit_shock_sample_updates_shock_size() {
        let shocks = ShockSample::new(nalgebra::DVector::from_vec(vec![0.9, 1.1])).unwrap();
        let model = log_utility(GrowthModel::builder(ModelConfig::default()))
            .shocks(shocks)
            .build()
            .unwrap();
        assert_eq!(model.shocks().len(), 2);
        assert_eq!(model.config().shock_size, 2);
    }

    #[test]
    fn config_loads_from_partial_json() {
        let config: ModelConfig =
            serde_json::from_str(r#"{ "beta": 0.9, "grid_size": 50 }"#).unwrap();
        assert_eq!(config.beta, 0.9);
        assert_eq!(config.grid_size, 50);
        assert_eq!(config.shock_size, ModelConfig::default().shock_size);
    }
}
