//! Errors raised while building parameter grids.

use thiserror::Error;

/// A parameter's own schema cannot produce a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error(
        "parameter grid can only be created with one validator, \
         {count} are present on '{param}'"
    )]
    ValidatorCount { param: String, count: usize },

    #[error("parameter '{param}' is not declared")]
    UnknownParameter { param: String },

    #[error("validator '{kind}' on '{param}' has no grid strategy")]
    UnsupportedValidator { param: String, kind: String },

    #[error("validator '{kind}' on '{param}' is misconfigured: {reason}")]
    InvalidConfig {
        param: String,
        kind: String,
        reason: String,
    },

    #[error("bound '{reference}' of '{param}' does not name a parameter with a usable default")]
    UnresolvedReference { param: String, reference: String },

    #[error("validator '{kind}' on '{param}' produced an empty grid")]
    EmptyGrid { param: String, kind: String },

    #[error("grid for '{param}' would hold {len} values, above the limit of {limit}")]
    TooLarge {
        param: String,
        len: usize,
        limit: usize,
    },

    #[error("sweep size overflows while combining the grid of '{param}'")]
    SweepOverflow { param: String },
}

impl GridError {
    /// Validator-count failures mark a parameter as excluded from a sweep
    /// rather than aborting it.
    pub fn is_validator_count(&self) -> bool {
        matches!(self, Self::ValidatorCount { .. })
    }

    /// Name of the parameter the error concerns.
    pub fn param(&self) -> &str {
        match self {
            Self::ValidatorCount { param, .. }
            | Self::UnknownParameter { param }
            | Self::UnsupportedValidator { param, .. }
            | Self::InvalidConfig { param, .. }
            | Self::UnresolvedReference { param, .. }
            | Self::EmptyGrid { param, .. }
            | Self::TooLarge { param, .. }
            | Self::SweepOverflow { param } => param,
        }
    }
}

/// Convenience result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_count_display_names_count() {
        let err = GridError::ValidatorCount {
            param: "year".into(),
            count: 2,
        };
        assert!(err.to_string().contains("2 are present"));
        assert!(err.is_validator_count());
        assert_eq!(err.param(), "year");
    }

    #[test]
    fn test_other_errors_are_not_exclusions() {
        let err = GridError::EmptyGrid {
            param: "year".into(),
            kind: "choice".into(),
        };
        assert!(!err.is_validator_count());
    }
}
