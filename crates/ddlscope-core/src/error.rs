//! Error types

use thiserror::Error;

/// Errors surfaced by the extraction core.
///
/// Malformed or partial DDL is never an error: unmatched fragments are
/// dropped during parsing. Only an explicit request for a dialect without a
/// registered parser fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum Error {
    /// A dialect tag was requested that has no structural parser
    #[error("Unsupported SQL dialect: {tag}")]
    #[diagnostic(
        code(ddlscope::unsupported_dialect),
        help("Supported dialects: mysql, postgresql.")
    )]
    UnsupportedDialect { tag: String },
}

impl Error {
    pub fn unsupported_dialect(tag: impl Into<String>) -> Self {
        Error::UnsupportedDialect { tag: tag.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_dialect_message_carries_tag() {
        let err = Error::unsupported_dialect("aeaea");
        assert_eq!(err.to_string(), "Unsupported SQL dialect: aeaea");
    }
}
