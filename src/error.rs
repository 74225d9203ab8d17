//! Error types

/// Failure talking to the key-value store
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached (e.g. storage disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation (e.g. quota exceeded)
    #[error("Storage rejected write: {0}")]
    Rejected(String),
}

/// Errors that can stop the game from starting
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// No drawing surface to render onto
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

/// Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = GameError::SurfaceUnavailable("no element #gameCanvas".to_string());
        assert_eq!(e.to_string(), "Drawing surface unavailable: no element #gameCanvas");
        let e = StoreError::Rejected("quota".to_string());
        assert_eq!(e.to_string(), "Storage rejected write: quota");
    }
}
