//! **SQLite** database driver.
//!
//! ### Note: linkage is semver-exempt.
//! This driver uses the `libsqlite3-sys` crate which links the native library for SQLite 3.
//! With the "bundled" feature (on by default), SQLite is built from source and linked statically.
//!
//! Due to Cargo's requirement that only one version of a crate that links a given native library
//! exists in the dependency graph at a time, using prepq alongside another crate linking
//! `libsqlite3-sys` like `rusqlite` is a semver hazard. Pin both and upgrade them in lockstep.
//!
//! ### Dynamic linking
//! To dynamically link to a system SQLite library, disable default features and enable
//! "unbundled" instead. Version `3.20.0` or newer is required for `sqlite3_prepare_v3`.

// SQLite is a C library. All interactions require FFI which is unsafe.
// All unsafe blocks should have comments pointing to SQLite docs and ensuring that we maintain
// invariants.
#![allow(unsafe_code)]

pub use connection::SqliteConnection;
pub use error::SqliteError;
pub use options::{SqliteConnectOptions, SqliteJournalMode};
pub use statement::SqliteStatement;

use prepq_core::factory::QueryFactory;
use prepq_core::query::Query;
use prepq_core::row::RowFactory;

mod connection;
mod error;
mod options;
mod statement;
mod value;

/// A query prepared on a SQLite connection.
pub type SqliteQuery<M = RowFactory> = Query<SqliteStatement, M>;

/// A [`QueryFactory`] over a SQLite connection.
pub type SqliteQueryFactory<M = RowFactory> = QueryFactory<SqliteConnection, M>;
