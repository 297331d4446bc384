#![deny(missing_docs)]

//! Error handling for the romfield crates.
//!
//! Structural misuse of a store (claiming it twice, indexing past a field's arity, touching a
//! byte outside the usable region) is reported through [`RomError`]. Capacity overruns during a
//! load or save are an expected data condition and are *not* errors: they are reported through
//! the walk result instead.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

pub use ext::*;

mod ext;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for romfield.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum RomError {
    /// A second session tried to claim a store that a live session already holds.
    #[error("store is already claimed by a live session\nBacktrace:\n{0}")]
    StoreClaimed(Box<Backtrace>),
    /// An element index at or past the declared arity of a fixed field.
    #[error("element index {0} out of range for field of arity {1}\nBacktrace:\n{2}")]
    IndexOutOfRange(usize, usize, Box<Backtrace>),
    /// A byte access outside the usable region of a store.
    #[error("offset {0} is outside the usable store capacity {1}\nBacktrace:\n{2}")]
    OutOfBounds(usize, usize, Box<Backtrace>),
    /// A generic error with a message.
    #[error("{0}\nBacktrace:\n{1}")]
    Generic(ErrString, Box<Backtrace>),
    /// An error wrapped with an additional message.
    #[error("{0}:\n  {1}")]
    Context(ErrString, #[source] Box<RomError>),
    /// An I/O error raised by a storage medium.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RomError {
    /// Wrap this error with an additional context message.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        RomError::Context(msg.into(), Box::new(self))
    }

    /// Whether this error, or the error it wraps, is an [`RomError::IndexOutOfRange`].
    pub fn is_index_out_of_range(&self) -> bool {
        match self {
            RomError::IndexOutOfRange(..) => true,
            RomError::Context(_, inner) => inner.is_index_out_of_range(),
            _ => false,
        }
    }

    /// Whether this error, or the error it wraps, is an [`RomError::StoreClaimed`].
    pub fn is_store_claimed(&self) -> bool {
        match self {
            RomError::StoreClaimed(..) => true,
            RomError::Context(_, inner) => inner.is_store_claimed(),
            _ => false,
        }
    }
}

impl Debug for RomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`RomError`]s as their error type.
pub type RomResult<T> = Result<T, RomError>;

/// A convenient macro for creating a [`RomError`].
#[macro_export]
macro_rules! rom_err {
    (StoreClaimed) => {{
        use std::backtrace::Backtrace;
        $crate::RomError::StoreClaimed(Box::new(Backtrace::capture()))
    }};
    (IndexOutOfRange: $idx:expr, $arity:expr) => {{
        use std::backtrace::Backtrace;
        $crate::RomError::IndexOutOfRange($idx, $arity, Box::new(Backtrace::capture()))
    }};
    (OutOfBounds: $offset:expr, $capacity:expr) => {{
        use std::backtrace::Backtrace;
        $crate::RomError::OutOfBounds($offset, $capacity, Box::new(Backtrace::capture()))
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::RomError::Context($msg.into(), Box::new($err))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::RomError::Generic(format!($fmt, $($arg),*).into(), Box::new(Backtrace::capture()))
    }};
}

/// A convenience macro for returning a [`RomError`] from a function.
#[macro_export]
macro_rules! rom_bail {
    ($($tt:tt)+) => {
        return Err($crate::rom_err!($($tt)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_mentions_arity() {
        let err = rom_err!(IndexOutOfRange: 4, 4);
        assert!(err.is_index_out_of_range());
        assert!(err.to_string().starts_with("element index 4 out of range for field of arity 4"));
    }

    #[test]
    fn context_is_transparent_to_predicates() {
        let err = rom_err!(StoreClaimed).with_context("opening settings");
        assert!(err.is_store_claimed());
        assert!(!err.is_index_out_of_range());
    }

    #[test]
    fn io_errors_convert() {
        let err: RomError = io::Error::new(io::ErrorKind::NotFound, "no device").into();
        assert!(matches!(err, RomError::Io(_)));
        assert_eq!(err.to_string(), "no device");
    }

    #[test]
    fn bail_returns_early() {
        fn check(offset: usize) -> RomResult<usize> {
            if offset >= 16 {
                rom_bail!(OutOfBounds: offset, 16);
            }
            Ok(offset)
        }

        assert_eq!(check(3).unwrap(), 3);
        assert!(matches!(check(16), Err(RomError::OutOfBounds(16, 16, _))));
    }
}
