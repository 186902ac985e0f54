#![cfg_attr(docsrs, feature(doc_cfg))]
//! Prepared queries that are immutable, reusable, and return lazily mapped result sets.
//!
//! ```rust,no_run
//! use prepq::sqlite::{SqliteConnection, SqliteQueryFactory};
//! use prepq::RowFactory;
//!
//! # fn main() -> Result<(), prepq::Error> {
//! let conn = SqliteConnection::connect("sqlite://people.db")?;
//! let mut factory = SqliteQueryFactory::new(conn, RowFactory);
//!
//! let query = factory.prepare("SELECT * FROM persons WHERE dob < :maxDob AND is_dev = :isDev")?;
//! let devs = query.with_params(prepq::params! { "maxDob" => "2003-01-16", "isDev" => true });
//!
//! for row in devs.get_results()?.iter() {
//!     println!("{}", row["name"]);
//! }
//! # Ok(())
//! # }
//! ```

pub use prepq_core::arguments::{self, Arguments, BindType, BindValue, Param};
pub use prepq_core::connection::{ConnectOptions, Connection, LogSettings};
pub use prepq_core::error::{self, DatabaseError, Error, ErrorInfo, ErrorKind, Result};
pub use prepq_core::factory::QueryFactory;
pub use prepq_core::query::Query;
pub use prepq_core::result_set::{self, ResultSet};
pub use prepq_core::row::{MapFactory, Row, RowFactory};
pub use prepq_core::statement::Statement;
pub use prepq_core::value::{RawRow, Value};
pub use prepq_core::{params, IndexMap};

#[cfg(feature = "json")]
#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
pub use prepq_core::row::JsonMapFactory;

#[cfg(any(feature = "sqlite", feature = "sqlite-unbundled"))]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
#[doc(inline)]
pub use prepq_sqlite::{self as sqlite, SqliteConnectOptions, SqliteConnection};
