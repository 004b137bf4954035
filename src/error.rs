use thiserror::Error;

/// Main error type for the Q-Table pipeline.
/// Aggregates errors from dependencies and internal modules.
#[derive(Error, Debug)]
pub enum QTableError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Table module errors
    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    // Color module errors
    #[error("{0}")]
    BucketError(#[from] crate::color::bucket::BucketError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, QTableError>;

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| QTableError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableError;

    #[test]
    fn prefix_is_prepended_to_message() {
        let result: Result<()> = Err(TableError::EmptyTable.into());
        let error = result.with_prefix("minibar").unwrap_err();
        assert_eq!(error.to_string(), "minibar: Table contains no rows");
    }
}
