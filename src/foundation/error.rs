/// Result alias used throughout the crate.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Error type shared by the timeline, easing, layering and scene modules.
#[derive(thiserror::Error, Debug)]
pub enum ChoreoError {
    /// Invalid input data (configuration, descriptors, out-of-range values).
    #[error("validation error: {0}")]
    Validation(String),

    /// Structural timeline misuse (duplicate keyframes, locked layers, missing tracks).
    #[error("timeline error: {0}")]
    Timeline(String),

    /// A rate function name that does not resolve.
    #[error("unknown rate function '{0}'")]
    UnknownRateFunction(String),

    /// Invalid rate function construction (bad weights, empty chains).
    #[error("easing error: {0}")]
    Easing(String),

    /// Failure while evaluating a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Failure while encoding or decoding JSON.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChoreoError {
    /// Build a [`ChoreoError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChoreoError::Timeline`].
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`ChoreoError::UnknownRateFunction`].
    pub fn unknown_rate_function(name: impl Into<String>) -> Self {
        Self::UnknownRateFunction(name.into())
    }

    /// Build a [`ChoreoError::Easing`].
    pub fn easing(msg: impl Into<String>) -> Self {
        Self::Easing(msg.into())
    }

    /// Build a [`ChoreoError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ChoreoError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
