use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

use crate::error::{DatabaseError, Error};
use crate::statement::Statement;

/// A unique connection (session) with a specific database.
///
/// The only capability the query adapter needs from a connection is turning SQL text into a
/// prepared [`Statement`]. Everything else (opening, pragmas, transactions) is driver-specific.
pub trait Connection {
    type Statement: Statement;

    type Error: DatabaseError;

    /// Prepare a statement for the given SQL text.
    ///
    /// The text may contain named placeholders (`:name`).
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, Self::Error>;

    /// How statements prepared on this connection log their executions.
    fn log_settings(&self) -> &LogSettings;
}

/// Options which can be used to configure how a SQL connection is opened.
pub trait ConnectOptions: 'static + Default + Debug + Clone + FromStr<Err = Error> {
    type Connection: Connection;

    /// Establish a new database connection with the options specified by `self`.
    fn connect(&self) -> Result<Self::Connection, Error>;

    /// Log executed statements with the specified `level`.
    fn log_statements(self, level: LevelFilter) -> Self;

    /// Log executed statements with a duration above the specified `duration`
    /// at the specified `level`.
    fn log_slow_statements(self, level: LevelFilter, duration: Duration) -> Self;

    /// Entirely disables statement logging (both slow and regular).
    fn disable_statement_logging(self) -> Self {
        self.log_statements(LevelFilter::Off)
            .log_slow_statements(LevelFilter::Off, Duration::default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct LogSettings {
    pub statements_level: LevelFilter,
    pub slow_statements_level: LevelFilter,
    pub slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            statements_level: LevelFilter::Debug,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }

    pub fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }
}
