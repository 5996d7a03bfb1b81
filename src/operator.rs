//! The seam shared by both policy operators.

use crate::error::Result;
use crate::model::GrowthModel;
use crate::policy::Policy;

/// A Coleman-Reffett style operator mapping a consumption policy to an updated one.
///
/// Implementations are pure: applying the same operator to the same policy
/// yields the same result, since all randomness lives in the model's fixed
/// shock sample.
pub trait PolicyOperator {
    /// Model whose primitives, grid, and shocks the operator reads.
    fn model(&self) -> &GrowthModel;

    /// One application of the operator.
    fn apply(&self, policy: &Policy) -> Result<Policy>;
}
