/// Convenience result type used across lettermark.
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Top-level error taxonomy.
///
/// None of these reach the caller of [`crate::AvatarDispatcher`]; they surface from the
/// collaborator seams, from configuration loading and from renderer construction.
#[derive(thiserror::Error, Debug)]
pub enum AvatarError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The user-lookup collaborator has no record for this id.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// The user-lookup collaborator failed for a reason other than not-found.
    #[error("user lookup error: {0}")]
    Lookup(String),

    /// Glyph layout or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Image encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvatarError {
    /// Build a [`AvatarError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`AvatarError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`AvatarError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`AvatarError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for the expected "no such user" outcome of a lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
