use core::fmt::Display;
use std::error::Error as StdError;

use thiserror::Error as ThisError;

/// **De**/**ser**ialization error
pub trait Error: StdError + Sized {
    /// Returns a custom error from given message
    fn custom<T>(msg: T) -> Self
    where
        T: Display;

    /// Wraps current error in given context
    fn context<C>(self, context: C) -> Self
    where
        C: Display;

    /// Writer has no room left for `requested` bits
    #[inline]
    fn overflow(requested: usize, left: usize) -> Self {
        Self::custom(format!(
            "not enough room: {requested} bits requested, {left} left"
        ))
    }

    /// Reader has fewer than `requested` bits left
    #[inline]
    fn underflow(requested: usize, left: usize) -> Self {
        Self::custom(format!(
            "not enough bits: {requested} requested, {left} left"
        ))
    }
}

/// Adapter for providing context on [`Result`]
pub trait ResultExt: Sized {
    /// Wrap [`Err`] in context by calling given function
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Self
    where
        C: Display;

    /// Wrap [`Err`] in given context
    #[inline]
    fn context<C>(self, context: C) -> Self
    where
        C: Display,
    {
        self.with_context(move || context)
    }
}

impl<T, E> ResultExt for Result<T, E>
where
    E: Error,
{
    #[inline]
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Result<T, E>
    where
        C: Display,
    {
        self.map_err(move |err| err.context(context()))
    }
}

/// Error produced by every reader and writer in this workspace.
///
/// Wrapping with [`.context()`](Error::context) keeps the original variant
/// reachable through [`.kind()`](CodecError::kind).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CodecError {
    /// Bit capacity exceeded while writing
    #[error("not enough room: {requested} bits requested, {left} left")]
    Overflow { requested: usize, left: usize },
    /// Reference capacity exceeded while building a cell
    #[error("too many references")]
    TooManyRefs,
    /// Reader ran out of bits
    #[error("not enough bits: {requested} requested, {left} left")]
    Underflow { requested: usize, left: usize },
    /// Reader ran out of references
    #[error("not enough references")]
    MissingRef,
    /// Malformed dictionary trie
    #[error("malformed dictionary: {0}")]
    Dictionary(String),
    #[error("{0}")]
    Custom(String),
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Returns the innermost error, skipping all context layers
    #[inline]
    pub fn kind(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.kind(),
            err => err,
        }
    }

    /// Whether bit or reference bounds of a cell were exceeded while building
    #[inline]
    pub fn is_structural(&self) -> bool {
        matches!(self.kind(), Self::Overflow { .. } | Self::TooManyRefs)
    }

    /// Returns [`CodecError::Dictionary`] from given message
    #[inline]
    pub fn dictionary(msg: impl Display) -> Self {
        Self::Dictionary(msg.to_string())
    }
}

impl Error for CodecError {
    #[inline]
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
    }

    #[inline]
    fn context<C>(self, context: C) -> Self
    where
        C: Display,
    {
        Self::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    #[inline]
    fn overflow(requested: usize, left: usize) -> Self {
        Self::Overflow { requested, left }
    }

    #[inline]
    fn underflow(requested: usize, left: usize) -> Self {
        Self::Underflow { requested, left }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = CodecError::MissingRef.context("^").context("body");
        assert_eq!(err.to_string(), "body: ^: not enough references");
        assert_eq!(err.kind(), &CodecError::MissingRef);
        assert!(!err.is_structural());
    }

    #[test]
    fn overflow_is_structural() {
        let err: Result<(), _> = Err(CodecError::overflow(8, 3));
        let err = err.context("value").unwrap_err();
        assert!(err.is_structural());
    }
}
