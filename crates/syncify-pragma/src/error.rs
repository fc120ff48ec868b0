//! Error types for syncify-pragma

/// Result type for syncify-pragma operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The transformed document does not parse as JSON once comments and
    /// trailing commas are removed.
    #[error("Transformed content is not valid JSON at line {line}, column {column}: {message}")]
    MalformedOutput {
        line: usize,
        column: usize,
        message: String,
    },
}
