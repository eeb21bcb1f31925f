// ABOUTME: Error types for the Iris extractor including ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The link does not match any known post-link shape.
    NotRecognized,
    /// A short identifier contains a character outside the codec alphabet.
    MalformedReference,
    /// A JSON document or shape table could not be parsed.
    ParseFailure,
    /// No known payload shape yielded a root media node.
    NotFound,
    /// A media node existed but no candidate produced a usable URL.
    NoResolvableMedia,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotRecognized => "not recognized",
            ErrorCode::MalformedReference => "malformed reference",
            ErrorCode::ParseFailure => "parse failure",
            ErrorCode::NotFound => "no post found",
            ErrorCode::NoResolvableMedia => "no resolvable media",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    /// The offending input: a link, a short id, or a short payload label.
    pub input: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iris: {}", self.op)?;
        if !self.input.is_empty() {
            write!(f, " {}", self.input)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            input: input.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a NotRecognized error.
    pub fn not_recognized(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NotRecognized, input, op, source)
    }

    /// Create a MalformedReference error.
    pub fn malformed_reference(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::MalformedReference, input, op, source)
    }

    /// Create a ParseFailure error.
    pub fn parse_failure(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ParseFailure, input, op, source)
    }

    /// Create a NotFound error.
    pub fn not_found(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NotFound, input, op, source)
    }

    /// Create a NoResolvableMedia error.
    pub fn no_resolvable_media(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NoResolvableMedia, input, op, source)
    }

    /// Returns true if this is a NotRecognized error.
    pub fn is_not_recognized(&self) -> bool {
        self.code == ErrorCode::NotRecognized
    }

    /// Returns true if this is a MalformedReference error.
    pub fn is_malformed_reference(&self) -> bool {
        self.code == ErrorCode::MalformedReference
    }

    /// Returns true if this is a ParseFailure error.
    pub fn is_parse_failure(&self) -> bool {
        self.code == ErrorCode::ParseFailure
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if this is a NoResolvableMedia error.
    pub fn is_no_resolvable_media(&self) -> bool {
        self.code == ErrorCode::NoResolvableMedia
    }
}
