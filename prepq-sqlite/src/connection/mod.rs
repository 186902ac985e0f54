use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::str::FromStr;

use prepq_core::connection::{ConnectOptions, Connection, LogSettings};

use crate::connection::establish::EstablishParams;
use crate::error::Error;
use crate::{SqliteConnectOptions, SqliteError, SqliteStatement};

mod establish;
pub(crate) mod handle;

use handle::ConnectionHandle;

/// A connection to an open [Sqlite] database.
///
/// Because SQLite is an in-process database accessed by blocking API calls, every operation is
/// synchronous. The connection and the statements prepared on it are bound to the thread that
/// opened it.
///
/// [Sqlite]: https://www.sqlite.org/index.html
pub struct SqliteConnection {
    pub(crate) handle: Rc<ConnectionHandle>,
    pub(crate) log_settings: LogSettings,
}

impl SqliteConnection {
    /// Open a connection from a URL such as `sqlite::memory:` or `sqlite://data.db?mode=rwc`.
    pub fn connect(url: &str) -> Result<Self, Error> {
        SqliteConnectOptions::from_str(url)?.connect()
    }

    pub fn connect_with(options: &SqliteConnectOptions) -> Result<Self, Error> {
        options.connect()
    }

    pub(crate) fn establish(options: &SqliteConnectOptions) -> Result<Self, Error> {
        EstablishParams::from_options(options)?.establish()
    }

    /// Execute one or more `;`-separated statements that return no rows.
    ///
    /// Meant for schema setup; values cannot be bound.
    pub fn execute_batch(&self, sql: &str) -> Result<(), Error> {
        self.handle.exec(sql)
    }

    /// The rowid of the most recent successful `INSERT` on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.handle.last_insert_rowid()
    }
}

impl Connection for SqliteConnection {
    type Statement = SqliteStatement;

    type Error = SqliteError;

    fn prepare(&mut self, sql: &str) -> Result<SqliteStatement, SqliteError> {
        SqliteStatement::prepare(&self.handle, sql)
    }

    fn log_settings(&self) -> &LogSettings {
        &self.log_settings
    }
}

impl Debug for SqliteConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("log_settings", &self.log_settings)
            .finish_non_exhaustive()
    }
}
