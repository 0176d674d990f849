use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body could not be parsed as the expected structured data.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// One or more contact fields failed validation.
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    /// The collection may be read through the admin API but not changed.
    #[error("Read-only collection: {0}")]
    ReadOnlyCollection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached or rejected the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A contact message passed validation but could not be written.
    #[error("Persist failed: {0}")]
    PersistFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_errors() {
        let err = AppError::Validation(vec![
            "name: cannot be empty".to_string(),
            "email: invalid email format".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: name: cannot be empty; email: invalid email format"
        );
    }

    #[test]
    fn test_read_only_display_names_collection() {
        let err = AppError::ReadOnlyCollection("contact_messages".into());
        assert_eq!(err.to_string(), "Read-only collection: contact_messages");
    }
}
