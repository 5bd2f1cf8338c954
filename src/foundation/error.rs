/// Convenience result type used across slidereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by the rendering pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Rejected job settings: no images, non-positive durations or sizes, unknown effects.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A source image could not be interpreted as pixel data.
    #[error("decode failure for '{source_name}': {reason}")]
    DecodeFailure {
        /// Path or label of the offending input.
        source_name: String,
        /// Decoder message.
        reason: String,
    },

    /// The encoder rejected a frame or failed to finalize the output.
    #[error("encode failure: {0}")]
    EncodeFailure(String),

    /// Internal rendering failure (out-of-range lookups, worker pool errors).
    #[error("render error: {0}")]
    Render(String),

    /// The job was cancelled between frames.
    #[error("render cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`ReelError::DecodeFailure`] value.
    pub fn decode(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DecodeFailure {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::EncodeFailure`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailure(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for errors raised while validating a job, before any rendering.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
