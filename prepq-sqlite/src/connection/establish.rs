use std::ffi::CString;
use std::io;
use std::os::raw::c_int;
use std::rc::Rc;
use std::time::Duration;

use libsqlite3_sys::{
    sqlite3_busy_timeout, SQLITE_OPEN_CREATE, SQLITE_OPEN_MEMORY, SQLITE_OPEN_NOMUTEX,
    SQLITE_OPEN_PRIVATECACHE, SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_SHAREDCACHE, SQLITE_OPEN_URI,
};
use percent_encoding::NON_ALPHANUMERIC;
use prepq_core::connection::LogSettings;

use crate::connection::handle::ConnectionHandle;
use crate::error::Error;
use crate::{SqliteConnectOptions, SqliteConnection};

pub(crate) struct EstablishParams {
    filename: CString,
    open_flags: c_int,
    busy_timeout: Duration,
    log_settings: LogSettings,
}

impl EstablishParams {
    pub(crate) fn from_options(options: &SqliteConnectOptions) -> Result<Self, Error> {
        let mut filename = options
            .filename
            .to_str()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "filename passed to SQLite must be valid UTF-8",
                )
            })?
            .to_owned();

        // Set common flags we expect to have in sqlite
        let mut flags = SQLITE_OPEN_URI;

        // A connection and its statements never leave the thread that opened them,
        // so SQLite does not need to lock the handle.
        flags |= SQLITE_OPEN_NOMUTEX;

        flags |= if options.read_only {
            SQLITE_OPEN_READONLY
        } else if options.create_if_missing {
            SQLITE_OPEN_CREATE | SQLITE_OPEN_READWRITE
        } else {
            SQLITE_OPEN_READWRITE
        };

        if options.in_memory {
            flags |= SQLITE_OPEN_MEMORY;
        }

        flags |= if options.shared_cache {
            SQLITE_OPEN_SHAREDCACHE
        } else {
            SQLITE_OPEN_PRIVATECACHE
        };

        if options.immutable {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("immutable", "true")
                .finish();

            filename = format!(
                "file:{}?{query}",
                percent_encoding::percent_encode(filename.as_bytes(), NON_ALPHANUMERIC),
            );
        }

        let filename = CString::new(filename).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "filename passed to SQLite must not contain nul bytes",
            )
        })?;

        Ok(Self {
            filename,
            open_flags: flags,
            busy_timeout: options.busy_timeout,
            log_settings: options.log_settings.clone(),
        })
    }

    pub(crate) fn establish(&self) -> Result<SqliteConnection, Error> {
        log::debug!("opening SQLite database {:?}", self.filename);

        let handle = ConnectionHandle::open(&self.filename, self.open_flags)?;

        // Configure a busy timeout
        // This causes SQLite to automatically sleep in increasing intervals until the time
        // when there is something locked during [sqlite3_step].
        let ms = i32::try_from(self.busy_timeout.as_millis()).map_err(|_| {
            Error::Configuration(
                format!("busy timeout of {:?} is too big", self.busy_timeout).into(),
            )
        })?;

        handle.call_with_result(|db| unsafe { sqlite3_busy_timeout(db, ms) })?;

        Ok(SqliteConnection {
            handle: Rc::new(handle),
            log_settings: self.log_settings.clone(),
        })
    }
}
