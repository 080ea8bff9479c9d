//! Error types for content-migrate.
//!
//! The compiler core (normalize, parse, clean, compile, review) is total and
//! never fails. Errors only come from the page driver, which folds them into a
//! `not_converted` migration result.

/// Error type for page migration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Front matter was present but could not be parsed.
    #[error("Invalid front matter: {0}")]
    FrontMatter(String),

    /// Source file extension is not a page format we convert.
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Page layout has no counterpart in the new page schema.
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// The page body produced no content blocks.
    #[error("No convertible content found")]
    NoContent,
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_cause() {
        assert_eq!(
            Error::UnsupportedLayout("redirect".into()).to_string(),
            "Unsupported layout: redirect"
        );
        assert_eq!(Error::NoContent.to_string(), "No convertible content found");
    }
}
