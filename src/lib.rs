//! Endogenous grid and time iteration operators for the stochastic optimal growth model.
//!
//! An agent with income `y` splits it into consumption `c` and savings
//! `k = y - c`; next period's income is `f(k) z` for an i.i.d. lognormal shock
//! `z`. The optimal consumption policy is the fixed point of the
//! Coleman-Reffett operator, which this crate implements two ways:
//!
//! - [`EgmOperator`] (`egm` module) inverts marginal utility on an endogenous
//!   income grid, so each update is closed form,
//! - [`TimeIterationOperator`] (`time_iteration` module) solves the Euler
//!   equation at every exogenous grid point with Brent's method.
//!
//! Both read an immutable [`GrowthModel`] holding user-supplied primitives, a
//! capital grid, and a shock sample drawn once from a seed, and both produce
//! [`Policy`] values that the [`iterate`](solving::iterate) driver can chain.
//!
//! # Quick start
//!
//! ```no_run
//! use egmrs::primitives::LogCobbDouglas;
//! use egmrs::{iterate, EgmOperator, IterationOptions, ModelConfig, Policy};
//!
//! let preset = LogCobbDouglas::new(0.4);
//! let model = preset.model(ModelConfig::default()).expect("valid model");
//!
//! let operator = EgmOperator::new(&model);
//! let options = IterationOptions::default().with_max_iterations(50).with_tolerance(1e-8);
//! let (policy, summary) =
//!     iterate(&operator, Policy::closed_form(|y| y), &options).expect("operator applies");
//!
//! let exact = preset.optimal_policy(model.beta());
//! println!(
//!     "{} iterations, distance to closed form {:.2e}",
//!     summary.iterations,
//!     policy.max_distance(&exact, model.grid().as_slice())
//! );
//! ```

pub mod egm;
pub mod error;
pub mod grid;
pub mod model;
pub mod operator;
pub mod options;
pub mod policy;
pub mod primitives;
pub mod roots;
pub mod solving;
pub mod time_iteration;

pub use egm::EgmOperator;
pub use error::{GrowthError, Result};
pub use model::{GrowthModel, GrowthModelBuilder, ModelConfig};
pub use operator::PolicyOperator;
pub use options::{EgmOptions, TimeIterationOptions};
pub use policy::{Extrapolation, Policy};
pub use solving::{iterate, iterates, IterationOptions, IterationSummary};
pub use time_iteration::TimeIterationOperator;
