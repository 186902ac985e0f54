//! Core of prepq, the prepared-query adapter.
//!
//! This crate defines the capability traits a database driver implements ([`Connection`],
//! [`Statement`]) and the adapter built on top of them: [`QueryFactory`], the copy-on-write
//! [`Query`], and the lazily mapped [`ResultSet`].
//!
//! Unless you are implementing a driver, use the `prepq` crate instead.
#![warn(future_incompatible, rust_2018_idioms)]

pub mod arguments;
pub mod connection;
pub mod error;
pub mod factory;
pub mod logger;
pub mod query;
pub mod result_set;
pub mod row;
pub mod statement;
pub mod value;

pub use arguments::{Arguments, BindType, BindValue, Param};
pub use connection::{ConnectOptions, Connection, LogSettings};
pub use error::{BoxDynError, DatabaseError, Error, ErrorInfo, ErrorKind, Result};
pub use factory::QueryFactory;
pub use query::Query;
pub use result_set::ResultSet;
pub use row::{MapFactory, Row, RowFactory};
pub use statement::Statement;
pub use value::{RawRow, Value};

#[cfg(feature = "json")]
pub use row::JsonMapFactory;

pub use indexmap::IndexMap;
