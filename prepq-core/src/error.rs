//! Types for working with errors produced by prepq.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result::Result as StdResult;

/// A specialized `Result` type for prepq.
pub type Result<T, E = Error> = StdResult<T, E>;

// Convenience type alias for usage within prepq.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways a method can fail within prepq.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error occurred while parsing a connection string or applying connection options.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// Error returned from the database outside of statement preparation or execution.
    #[error("error returned from database: {0}")]
    Database(Box<dyn DatabaseError>),

    /// Error communicating with the database backend.
    #[error("error communicating with database: {0}")]
    Io(#[from] io::Error),

    /// The connection refused to prepare the SQL text.
    ///
    /// Raised by [`QueryFactory::prepare`][crate::factory::QueryFactory::prepare].
    #[error("could not create statement: {message}")]
    StatementPreparation {
        message: String,

        #[source]
        source: BoxDynError,
    },

    /// Binding, executing or fetching a prepared statement failed.
    ///
    /// `debug` always holds the statement's dump of its bound parameters.
    #[error("{message}\nDebug info:\n{debug}")]
    QueryExecution {
        message: String,
        debug: String,

        #[source]
        source: BoxDynError,
    },

    /// The parameter dump of a failed statement could not be captured.
    #[error("could not capture statement debug info")]
    DiagnosticCapture(#[source] fmt::Error),
}

impl Error {
    pub fn into_database_error(self) -> Option<Box<dyn DatabaseError + 'static>> {
        match self {
            Error::Database(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_database_error(&self) -> Option<&(dyn DatabaseError + 'static)> {
        match self {
            Error::Database(err) => Some(&**err),
            _ => None,
        }
    }

    #[inline]
    pub fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }
}

/// The general category of a [`DatabaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unique/primary key constraint violation.
    UniqueViolation,
    /// Foreign key constraint violation.
    ForeignKeyViolation,
    /// Not-null constraint violation.
    NotNullViolation,
    /// Check constraint violation.
    CheckViolation,
    /// An unmapped error.
    Other,
}

/// An error that was returned from the database.
pub trait DatabaseError: 'static + Send + Sync + StdError {
    /// The primary, human-readable error message.
    fn message(&self) -> &str;

    /// The driver-specific error code.
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }

    fn is_unique_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::UniqueViolation)
    }
}

impl<E> From<E> for Error
where
    E: DatabaseError,
{
    #[inline]
    fn from(error: E) -> Self {
        Error::Database(Box::new(error))
    }
}

/// Error state of a statement: `[sqlstate, driver code, message]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Five-character SQLSTATE class and subclass.
    pub sqlstate: Cow<'static, str>,

    pub code: Option<String>,

    pub message: Option<String>,
}

impl ErrorInfo {
    pub fn new(sqlstate: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sqlstate: sqlstate.into(),
            code: None,
            message: None,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
