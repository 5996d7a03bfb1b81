//! Policy iteration driver, configuration, and diagnostics.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::operator::PolicyOperator;
use crate::policy::Policy;

/// Configuration for repeated operator application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationOptions {
    /// Number of applications to perform unless the tolerance is met first.
    pub max_iterations: usize,
    /// Supremum-norm tolerance on successive policies over the grid. `None`
    /// runs exactly `max_iterations` applications.
    pub tolerance: Option<f64>,
}

impl Default for IterationOptions {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            tolerance: None,
        }
    }
}

impl IterationOptions {
    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Stop early once successive policies are within `tolerance`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Checks that at least one iteration is requested and the tolerance is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(GrowthError::configuration(
                "max_iterations",
                0.0,
                "at least one iteration",
            ));
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(GrowthError::configuration(
                    "tolerance",
                    tolerance,
                    "finite and strictly positive",
                ));
            }
        }
        Ok(())
    }
}

/// Diagnostics returned alongside the final policy.
#[derive(Clone, Debug)]
pub struct IterationSummary {
    /// Number of operator applications performed.
    pub iterations: usize,
    /// Supremum distance between the last two policies on the grid.
    pub max_gap: f64,
    /// Whether the tolerance was met. Always `false` without a tolerance.
    pub converged: bool,
    /// Supremum distance recorded after every application.
    pub gaps: Vec<f64>,
}

/// Lazily applies an operator, yielding each successive policy.
///
/// Iteration ends after the first error, which is yielded once.
pub struct Iterates<'o, O: ?Sized> {
    operator: &'o O,
    current: Option<Policy>,
}

impl<O: PolicyOperator + ?Sized> Iterator for Iterates<'_, O> {
    type Item = Result<Policy>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        match self.operator.apply(&current) {
            Ok(next) => {
                self.current = Some(next.clone());
                Some(Ok(next))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Sequence `T σ, T² σ, ...` for an initial policy `σ`.
pub fn iterates<O: PolicyOperator + ?Sized>(operator: &O, initial: Policy) -> Iterates<'_, O> {
    Iterates {
        operator,
        current: Some(initial),
    }
}

/// Applies `operator` repeatedly, starting from `initial`.
///
/// Stops after `max_iterations` applications or, if a tolerance is set, once
/// successive policies differ by less than it on the model grid. Not meeting
/// the tolerance is reported through the summary, not as an error.
pub fn iterate<O: PolicyOperator + ?Sized>(
    operator: &O,
    initial: Policy,
    options: &IterationOptions,
) -> Result<(Policy, IterationSummary)> {
    options.validate()?;
    let points = operator.model().grid().as_slice();

    let mut policy = initial;
    let mut gaps = Vec::with_capacity(options.max_iterations);
    let mut max_gap = f64::INFINITY;
    let mut converged = false;

    while gaps.len() < options.max_iterations {
        let next = operator.apply(&policy)?;
        max_gap = next.max_distance(&policy, points);
        gaps.push(max_gap);
        policy = next;
        debug!("iteration {}: max gap {:.3e}", gaps.len(), max_gap);

        if options.tolerance.is_some_and(|tolerance| max_gap < tolerance) {
            converged = true;
            break;
        }
    }

    info!(
        "policy iteration stopped after {} iterations (max gap {:.3e}, converged: {})",
        gaps.len(),
        max_gap,
        converged
    );

    Ok((
        policy,
        IterationSummary {
            iterations: gaps.len(),
            max_gap,
            converged,
            gaps,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egm::EgmOperator;
    use crate::model::ModelConfig;
    use crate::primitives::LogCobbDouglas;

    fn model() -> crate::model::GrowthModel {
        LogCobbDouglas::default()
            .model(ModelConfig::default().with_grid(1e-5, 4.0, 60).with_shocks(50, 3))
            .unwrap()
    }

    #[test]
    fn runs_fixed_number_of_iterations_without_tolerance() {
        let model = model();
        let operator = EgmOperator::new(&model);
        let options = IterationOptions::default().with_max_iterations(5);

        let (_, summary) = iterate(&operator, Policy::closed_form(|y| y), &options).unwrap();
        assert_eq!(summary.iterations, 5);
        assert_eq!(summary.gaps.len(), 5);
        assert!(!summary.converged);
    }

    #[test]
    fn stops_once_tolerance_is_met() {
        let model = model();
        let operator = EgmOperator::new(&model);
        let options = IterationOptions::default()
            .with_max_iterations(200)
            .with_tolerance(1e-8);

        let (_, summary) = iterate(&operator, Policy::closed_form(|y| y), &options).unwrap();
        assert!(summary.converged);
        assert!(summary.iterations < 200);
        assert!(summary.max_gap < 1e-8);
    }

    #[test]
    fn iterates_matches_driver() {
        let model = model();
        let operator = EgmOperator::new(&model);
        let lazy: Vec<Policy> = iterates(&operator, Policy::closed_form(|y| y))
            .take(3)
            .collect::<Result<_>>()
            .unwrap();
        let (last, _) = iterate(
            &operator,
            Policy::closed_form(|y| y),
            &IterationOptions::default().with_max_iterations(3),
        )
        .unwrap();
        assert_eq!(lazy[2].nodes(), last.nodes());
    }

    #[test]
    fn rejects_zero_iterations() {
        let model = model();
        let operator = EgmOperator::new(&model);
        let options = IterationOptions::default().with_max_iterations(0);
        assert!(iterate(&operator, Policy::closed_form(|y| y), &options).is_err());
    }
}
