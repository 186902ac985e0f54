use std::fmt;
use std::os::raw::c_int;
use std::rc::Rc;

use libsqlite3_sys::{SQLITE_ERROR, SQLITE_MISUSE, SQLITE_OK, SQLITE_RANGE};
use prepq_core::arguments::BindValue;
use prepq_core::error::ErrorInfo;
use prepq_core::statement::Statement;
use prepq_core::value::RawRow;

use crate::connection::handle::ConnectionHandle;
use crate::value::read_row;
use crate::SqliteError;

pub(crate) mod handle;

use handle::StatementHandle;

// https://www.sqlite.org/lang_expr.html#parameters
const PARAMETER_PREFIXES: [char; 3] = [':', '@', '$'];

/// A statement prepared on a [`SqliteConnection`][crate::SqliteConnection].
///
/// The statement keeps its connection open for as long as it lives.
pub struct SqliteStatement {
    handle: StatementHandle,
    bindings: Vec<Binding>,
    state: State,
    last_error: Option<SqliteError>,
    // dropped after `handle` so the statement is finalized before the connection is closed
    _connection: Rc<ConnectionHandle>,
}

#[derive(Debug)]
struct Binding {
    name: String,
    index: usize,
    value: BindValue<'static>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not executed since the last reset.
    Ready,
    /// Executed, a row is pending.
    Row,
    /// Executed without a row; the next fetch returns nothing.
    Done,
}

impl SqliteStatement {
    pub(crate) fn prepare(
        connection: &Rc<ConnectionHandle>,
        sql: &str,
    ) -> Result<Self, SqliteError> {
        let (handle, tail) = StatementHandle::prepare(connection.as_ptr(), sql)?;

        let handle = handle
            .ok_or_else(|| SqliteError::with_code(SQLITE_ERROR, "query contains no statement"))?;

        if !tail.trim().is_empty() {
            log::warn!(
                "only the first statement of a query is prepared; ignoring {:?}",
                tail.trim()
            );
        }

        Ok(Self {
            handle,
            bindings: Vec::new(),
            state: State::Ready,
            last_error: None,
            _connection: Rc::clone(connection),
        })
    }

    /// Names of the placeholders in the statement, prefix included, in positional order.
    ///
    /// Anonymous (`?`) placeholders are skipped.
    pub fn parameter_names(&self) -> Vec<&str> {
        (1..=self.handle.bind_parameter_count())
            .filter_map(|index| self.handle.bind_parameter_name(index))
            .collect()
    }

    /// Number of columns the statement returns; zero for statements without results.
    pub fn column_count(&self) -> usize {
        self.handle.column_count()
    }

    // `name` may be given with or without its prefix; without one, it names every
    // placeholder spelled with any prefix (`:x` and `$x` alike)
    fn parameter_indexes(&self, name: &str) -> Vec<(usize, String)> {
        if name.starts_with(PARAMETER_PREFIXES) {
            return self
                .handle
                .bind_parameter_index(name)
                .map(|index| (index, name.to_owned()))
                .into_iter()
                .collect();
        }

        PARAMETER_PREFIXES
            .iter()
            .filter_map(|prefix| {
                let prefixed = format!("{prefix}{name}");

                self.handle
                    .bind_parameter_index(&prefixed)
                    .map(|index| (index, prefixed))
            })
            .collect()
    }

    fn check(&mut self, status: c_int) -> Result<(), SqliteError> {
        if status == SQLITE_OK {
            Ok(())
        } else {
            Err(self.fail(self.handle.last_error()))
        }
    }

    fn fail(&mut self, error: SqliteError) -> SqliteError {
        self.last_error = Some(error.clone());
        error
    }

    // a failed step leaves the statement mid-execution; the error is reported again by reset
    fn abort(&mut self, error: SqliteError) -> SqliteError {
        let _ = self.handle.reset();
        self.state = State::Ready;
        self.fail(error)
    }

    fn columns(&self) -> Vec<String> {
        (0..self.handle.column_count())
            .map(|index| self.handle.column_name(index))
            .collect()
    }
}

impl Statement for SqliteStatement {
    type Error = SqliteError;

    fn sql(&self) -> &str {
        self.handle.sql()
    }

    fn clear_bindings(&mut self) -> Result<(), SqliteError> {
        if self.state != State::Ready {
            // values cannot be bound while the statement is executing
            self.handle.reset().map_err(|error| self.fail(error))?;
            self.state = State::Ready;
        }

        self.handle.clear_bindings();
        self.bindings.clear();
        self.last_error = None;

        Ok(())
    }

    fn bind_value(&mut self, name: &str, value: BindValue<'_>) -> Result<(), SqliteError> {
        let placeholders = self.parameter_indexes(name);

        if placeholders.is_empty() {
            return Err(self.fail(SqliteError::with_code(
                SQLITE_RANGE,
                format!("parameter `{name}` is not defined in the statement"),
            )));
        }

        let value = value.into_owned();

        for (index, name) in placeholders {
            let status = match &value {
                BindValue::Null => self.handle.bind_null(index),
                BindValue::Bool(v) => self.handle.bind_int64(index, i64::from(*v)),
                BindValue::Int(v) => self.handle.bind_int64(index, *v),
                BindValue::Str(v) => self.handle.bind_text(index, v),
            };

            self.check(status)?;

            match self.bindings.iter_mut().find(|binding| binding.index == index) {
                Some(binding) => binding.value = value.clone(),
                None => self.bindings.push(Binding {
                    name,
                    index,
                    value: value.clone(),
                }),
            }
        }

        Ok(())
    }

    fn execute(&mut self) -> Result<(), SqliteError> {
        self.handle.reset().map_err(|error| self.fail(error))?;

        match self.handle.step() {
            Ok(true) => self.state = State::Row,
            Ok(false) => self.state = State::Done,
            Err(error) => return Err(self.abort(error)),
        }

        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<RawRow>, SqliteError> {
        match self.state {
            State::Ready => {
                return Err(self.fail(SqliteError::with_code(
                    SQLITE_MISUSE,
                    "rows fetched from a statement that has not been executed",
                )))
            }
            State::Done => {
                self.handle.reset().map_err(|error| self.fail(error))?;
                self.state = State::Ready;
                return Ok(Vec::new());
            }
            State::Row => {}
        }

        let columns = self.columns();
        let mut rows = Vec::new();

        loop {
            rows.push(read_row(&self.handle, &columns));

            match self.handle.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => return Err(self.abort(error)),
            }
        }

        self.handle.reset().map_err(|error| self.fail(error))?;
        self.state = State::Ready;

        Ok(rows)
    }

    fn error_info(&self) -> Option<ErrorInfo> {
        self.last_error.as_ref().map(SqliteError::error_info)
    }

    fn debug_dump_params(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let sql = self.handle.sql();

        writeln!(out, "SQL: [{}] {sql}", sql.len())?;
        writeln!(out, "Params:  {}", self.bindings.len())?;

        for binding in &self.bindings {
            writeln!(out, "Key: Name: [{}] {}", binding.name.len(), binding.name)?;
            writeln!(out, "paramno={}", binding.index)?;
            writeln!(out, "name=[{}] {:?}", binding.name.len(), binding.name)?;
            writeln!(out, "param_type={}", binding.value.bind_type())?;
            writeln!(out, "value={}", binding.value)?;
        }

        Ok(())
    }
}

impl fmt::Debug for SqliteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("sql", &self.handle.sql())
            .field("bindings", &self.bindings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
