/// Convenience result type used across the crate.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Top-level error taxonomy used by editor, layout and render APIs.
///
/// No variant is fatal to an editing session: every failure means "change not applied,
/// previous state preserved".
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// Invalid user-provided or overlay data, rejected before anything is mutated.
    #[error("validation error: {0}")]
    Validation(String),

    /// A mutation targeted a locked overlay.
    #[error("overlay is locked: {0}")]
    Locked(String),

    /// The persistence collaborator failed; the optimistic change was rolled back.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The requested font face is not registered yet; layout is suppressed until it is.
    #[error("font not ready: {0}")]
    FontNotReady(String),

    /// An overlay key or id did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build an [`OverlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OverlayError::Locked`] value.
    pub fn locked(msg: impl Into<String>) -> Self {
        Self::Locked(msg.into())
    }

    /// Build an [`OverlayError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build an [`OverlayError::FontNotReady`] value.
    pub fn font_not_ready(msg: impl Into<String>) -> Self {
        Self::FontNotReady(msg.into())
    }

    /// Build an [`OverlayError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build an [`OverlayError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the operator should be told about this failure.
    ///
    /// Font readiness is an internal scheduling concern and stays silent.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::FontNotReady(_))
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
