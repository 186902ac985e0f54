use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::sync::Arc;

use crate::arguments::{Arguments, Param};
use crate::connection::LogSettings;
use crate::error::{DatabaseError, Error, Result};
use crate::logger::QueryLogger;
use crate::result_set::ResultSet;
use crate::row::MapFactory;
use crate::statement::Statement;

/// A prepared statement together with the parameters to execute it with.
///
/// A `Query` is never modified in place. [`with_param()`][Self::with_param] and friends return a
/// new query that owns its own copy of the parameters but shares the prepared statement, so one
/// statement is prepared once and executed with as many parameter sets as needed:
///
/// ```rust,ignore
/// let by_name = factory.prepare("SELECT * FROM persons WHERE name = :name")?;
///
/// let anton = by_name.with_param("name", "Anton").get_results()?;
/// let wendy = by_name.with_param("name", "Wendy").get_results()?;
/// ```
///
/// Queries sharing a statement are `!Send`; they must be executed one after another.
pub struct Query<S, M> {
    statement: Rc<RefCell<S>>,
    params: Arguments,
    map_factory: Arc<M>,
    log_settings: LogSettings,
}

impl<S, M> Query<S, M>
where
    S: Statement,
    M: MapFactory,
{
    pub fn new(statement: S, map_factory: Arc<M>, log_settings: LogSettings) -> Self {
        Self {
            statement: Rc::new(RefCell::new(statement)),
            params: Arguments::new(),
            map_factory,
            log_settings,
        }
    }

    /// The parameters this query will be executed with.
    pub fn params(&self) -> &Arguments {
        &self.params
    }

    /// The SQL text of the underlying statement.
    pub fn sql(&self) -> String {
        self.statement.borrow().sql().to_owned()
    }

    /// A copy of this query with `name` set to `value`, replacing any previous value.
    #[must_use]
    pub fn with_param(&self, name: impl Into<String>, value: impl Into<Param>) -> Self {
        let mut query = self.clone();
        query.params.insert(name, value);
        query
    }

    /// A copy of this query whose parameters are exactly `params`.
    ///
    /// The previous parameters are discarded, not merged.
    #[must_use]
    pub fn with_params(&self, params: impl Into<Arguments>) -> Self {
        let mut query = self.clone();
        query.params = params.into();
        query
    }

    /// A copy of this query without the given parameters.
    ///
    /// Names that are not set are ignored.
    #[must_use]
    pub fn without_params<I>(&self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut query = self.clone();

        for name in names {
            query.params.remove(name.as_ref());
        }

        query
    }

    /// Bind the parameters, execute the statement and fetch every row.
    ///
    /// Each call executes the statement again.
    pub fn get_results(&self) -> Result<ResultSet<M>> {
        let mut statement = self.statement.borrow_mut();
        let sql = statement.sql().to_owned();

        let mut logger = QueryLogger::new(&sql, self.params.len(), &self.log_settings);

        let rows = match run(&mut *statement, &self.params) {
            Ok(rows) => rows,
            Err(error) => {
                logger.set_failed();
                return Err(execution_error(&*statement, error));
            }
        };

        logger.set_rows_returned(rows.len());

        Ok(ResultSet::new(rows, Arc::clone(&self.map_factory)))
    }
}

fn run<S: Statement>(
    statement: &mut S,
    params: &Arguments,
) -> Result<Vec<crate::value::RawRow>, S::Error> {
    statement.clear_bindings()?;
    bind_params(statement, params)?;
    statement.execute()?;
    statement.fetch_all()
}

fn bind_params<S: Statement>(statement: &mut S, params: &Arguments) -> Result<(), S::Error> {
    for (name, value) in params.iter() {
        statement.bind_value(name, value.to_bind_value())?;
    }

    Ok(())
}

fn execution_error<S: Statement>(statement: &S, error: S::Error) -> Error {
    let message = statement
        .error_info()
        .and_then(|info| info.message)
        .unwrap_or_else(|| error.message().to_owned());

    match debug_info(statement) {
        Ok(debug) => Error::QueryExecution {
            message,
            debug,
            source: Box::new(error),
        },
        Err(error) => error,
    }
}

fn debug_info<S: Statement>(statement: &S) -> Result<String> {
    let mut info = String::new();

    statement
        .debug_dump_params(&mut info)
        .map_err(Error::DiagnosticCapture)?;

    Ok(info)
}

impl<S, M> Clone for Query<S, M> {
    fn clone(&self) -> Self {
        Self {
            statement: Rc::clone(&self.statement),
            params: self.params.clone(),
            map_factory: Arc::clone(&self.map_factory),
            log_settings: self.log_settings.clone(),
        }
    }
}

impl<S, M> Debug for Query<S, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
