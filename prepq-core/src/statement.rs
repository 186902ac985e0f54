use std::fmt;

use crate::arguments::BindValue;
use crate::error::{DatabaseError, ErrorInfo};
use crate::value::RawRow;

/// A prepared statement, bound to one SQL text and executable any number of times.
pub trait Statement {
    type Error: DatabaseError;

    /// The SQL text this statement was prepared from.
    fn sql(&self) -> &str;

    /// Forget every value bound since the last execution.
    fn clear_bindings(&mut self) -> Result<(), Self::Error>;

    /// Bind `value` to the placeholder called `name`.
    fn bind_value(&mut self, name: &str, value: BindValue<'_>) -> Result<(), Self::Error>;

    /// Execute the statement with the current bindings.
    fn execute(&mut self) -> Result<(), Self::Error>;

    /// Fetch every row produced by the last [`execute()`][Self::execute].
    fn fetch_all(&mut self) -> Result<Vec<RawRow>, Self::Error>;

    /// The error left by the last failed operation, if any.
    fn error_info(&self) -> Option<ErrorInfo>;

    /// Write a human-readable dump of the SQL text and the bound parameters.
    fn debug_dump_params(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}
