use thiserror::Error;

/// Unified error type for `egmrs` operations.
#[derive(Debug, Error)]
pub enum GrowthError {
    /// Raised when a model or option value falls outside its admissible range.
    #[error("invalid configuration: `{parameter}` = {value} must satisfy {constraint}")]
    Configuration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The value that was supplied.
        value: f64,
        /// Human-readable statement of the admissible range.
        constraint: &'static str,
    },

    /// Raised when a required callable has not been provided to the model builder.
    #[error("{component} must be provided before building the model")]
    MissingComponent { component: &'static str },

    /// Raised when a model primitive receives or returns an out-of-domain value
    /// while an operator is being applied.
    #[error("domain error in {context} at grid index {index}: argument {argument}")]
    Domain {
        /// The primitive or step that failed.
        context: &'static str,
        /// Grid index being processed.
        index: usize,
        /// The offending argument or result.
        argument: f64,
    },

    /// Raised when the Euler residual does not change sign over the search interval.
    #[error(
        "no sign change at grid index {index} on [{lower}, {upper}] (residuals {f_lower}, {f_upper})"
    )]
    RootBracket {
        index: usize,
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    /// Raised when the root finder exhausts its iteration budget.
    #[error("root finder did not converge after {iterations} iterations; bracket width {width}")]
    RootDidNotConverge { iterations: usize, width: f64 },

    /// Raised when interpolation nodes are unusable.
    #[error("invalid interpolation nodes: {reason}")]
    InvalidNodes { reason: &'static str },

    /// Raised when provided vectors have incompatible lengths.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
}

impl GrowthError {
    /// Helper to format a [`Configuration`](GrowthError::Configuration) error.
    pub fn configuration(parameter: &'static str, value: f64, constraint: &'static str) -> Self {
        Self::Configuration {
            parameter,
            value,
            constraint,
        }
    }

    /// Helper to format a [`Domain`](GrowthError::Domain) error.
    pub fn domain(context: &'static str, index: usize, argument: f64) -> Self {
        Self::Domain {
            context,
            index,
            argument,
        }
    }

    /// Helper to format a [`DimensionMismatch`](GrowthError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for bubbling up missing component errors from builders.
    pub fn missing_component(component: &'static str) -> Self {
        Self::MissingComponent { component }
    }

    /// Returns `true` for errors raised while validating inputs at construction time.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::MissingComponent { .. }
        )
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, GrowthError>;
