/// Convenience result type used across the crate.
pub type ShowResult<T> = Result<T, ShowError>;

/// Error type for project validation, codec decoding, and export I/O.
///
/// Rendering never produces these: the compositor skips data it cannot evaluate.
#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    /// Structurally invalid input rejected at a creation or encode boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bytes that are not a supported sequence container.
    #[error("format error: {0}")]
    Format(String),

    /// Project (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure (I/O, image decoding, XML writing), with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowError {
    /// Build a [`ShowError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShowError::Format`].
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`ShowError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
