//! Error types for the reordering engine

use thiserror::Error;

/// Result type for reordering operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Errors that can occur while planning or persisting a reorder
#[derive(Debug, Error)]
pub enum ReorderError {
    /// Board not found (by id or cache key)
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// List not found
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// Card not found
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Link not found on a card
    #[error("link not found: {id}")]
    LinkNotFound { id: String },

    /// Item referenced in a batch does not live in the batch's container
    #[error("{item} does not belong to {container}")]
    NotInContainer { item: String, container: String },

    /// Source and destination containers belong to different boards
    #[error("cannot move between different boards ({from} -> {to})")]
    CrossBoardMove { from: String, to: String },

    /// The dragged item cannot be dropped on this kind of target
    #[error("cannot drop a {dragged} on a {target}")]
    IncompatibleDrop { dragged: String, target: String },

    /// A link order that is not a permutation of the card's links
    #[error("link order for card {card_id} must name each of its links exactly once")]
    InvalidLinkOrder { card_id: String },

    /// Requested 1-based position is outside the valid range
    #[error("position {position} is out of range, must be between 1 and {max}")]
    InvalidPosition { position: usize, max: usize },

    /// The persistence layer rejected or failed the call
    #[error("{message}")]
    Persistence { message: String },

    /// Settings could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How serious an error is for the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Rejected before anything changed; the user can simply try again
    Warning,
    /// An operation failed and its effects were rolled back
    Error,
    /// The engine cannot be set up correctly
    Critical,
}

/// Severity classification for errors
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl ReorderError {
    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-in-container error
    pub fn not_in_container(item: impl Into<String>, container: impl Into<String>) -> Self {
        Self::NotInContainer {
            item: item.into(),
            container: container.into(),
        }
    }

    /// Create a cross-board move error
    pub fn cross_board(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::CrossBoardMove {
            from: from.into(),
            to: to.into(),
        }
    }

    /// True for errors detected before anything was written to the cache
    /// or sent to persistence.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound { .. }
                | Self::ListNotFound { .. }
                | Self::CardNotFound { .. }
                | Self::LinkNotFound { .. }
                | Self::NotInContainer { .. }
                | Self::CrossBoardMove { .. }
                | Self::IncompatibleDrop { .. }
                | Self::InvalidLinkOrder { .. }
                | Self::InvalidPosition { .. }
        )
    }
}

impl Severity for ReorderError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Critical,
            Self::Persistence { .. } | Self::Json(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }
}

impl From<figment::Error> for ReorderError {
    fn from(error: figment::Error) -> Self {
        Self::config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReorderError::CardNotFound { id: "abc123".into() };
        assert_eq!(err.to_string(), "card not found: abc123");

        let err = ReorderError::cross_board("b1", "b2");
        assert_eq!(
            err.to_string(),
            "cannot move between different boards (b1 -> b2)"
        );
    }

    #[test]
    fn test_persistence_message_is_verbatim() {
        let err = ReorderError::persistence("network unreachable");
        assert_eq!(err.to_string(), "network unreachable");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_severity() {
        assert_eq!(
            ReorderError::ListNotFound { id: "x".into() }.severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            ReorderError::persistence("boom").severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            ReorderError::config("bad").severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(ReorderError::InvalidPosition { position: 9, max: 3 }.is_validation());
        assert!(ReorderError::not_in_container("card c1", "list l1").is_validation());
        assert!(!ReorderError::config("bad").is_validation());
    }
}
