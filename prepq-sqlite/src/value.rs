use libsqlite3_sys::{SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT};

use prepq_core::value::{RawRow, Value};

use crate::statement::handle::StatementHandle;

// https://www.sqlite.org/datatype3.html#storage_classes_and_datatypes
fn column_value(handle: &StatementHandle, index: usize) -> Value {
    match handle.column_type(index) {
        SQLITE_INTEGER => Value::Integer(handle.column_int64(index)),
        SQLITE_FLOAT => Value::Real(handle.column_double(index)),
        SQLITE_TEXT => Value::Text(handle.column_text(index)),
        SQLITE_BLOB => Value::Blob(handle.column_blob(index).to_vec()),
        SQLITE_NULL => Value::Null,
        other => unreachable!("sqlite3_column_type() returned unknown storage class: {other}"),
    }
}

/// Read the row the statement currently points at.
///
/// When several columns share a name, the last one wins.
pub(crate) fn read_row(handle: &StatementHandle, columns: &[String]) -> RawRow {
    let mut row = RawRow::with_capacity(columns.len());

    for (index, name) in columns.iter().enumerate() {
        row.insert(name.clone(), column_value(handle, index));
    }

    row
}
