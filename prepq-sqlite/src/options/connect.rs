use std::fmt::Write;
use std::time::Duration;

use log::LevelFilter;
use prepq_core::connection::ConnectOptions;

use crate::error::Error;
use crate::{SqliteConnectOptions, SqliteConnection};

impl ConnectOptions for SqliteConnectOptions {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<Self::Connection, Error> {
        let conn = SqliteConnection::establish(self)?;

        // Execute PRAGMAs
        let pragmas = self.pragma_string();
        if !pragmas.is_empty() {
            conn.execute_batch(&pragmas)?;
        }

        Ok(conn)
    }

    fn log_statements(mut self, level: LevelFilter) -> Self {
        self.log_settings.log_statements(level);
        self
    }

    fn log_slow_statements(mut self, level: LevelFilter, duration: Duration) -> Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }
}

impl SqliteConnectOptions {
    /// Collect all `PRAGMA` commands into a single string
    pub(crate) fn pragma_string(&self) -> String {
        let mut string = String::new();

        for (key, opt_value) in &self.pragmas {
            if let Some(value) = opt_value {
                write!(string, "PRAGMA {key} = {value}; ").ok();
            }
        }

        string
    }
}
