use std::sync::Arc;

use crate::connection::Connection;
use crate::error::{DatabaseError, Error, Result};
use crate::query::Query;
use crate::row::MapFactory;

/// Prepares [`Query`] values on a connection.
///
/// Every call to [`prepare()`][Self::prepare] prepares a new statement, which its query and every
/// copy derived from it then reuse.
#[derive(Debug)]
pub struct QueryFactory<C, M> {
    connection: C,
    map_factory: Arc<M>,
}

impl<C, M> QueryFactory<C, M>
where
    C: Connection,
    M: MapFactory,
{
    /// `map_factory` builds the row maps of every result set produced by this factory's queries.
    pub fn new(connection: C, map_factory: M) -> Self {
        Self {
            connection,
            map_factory: Arc::new(map_factory),
        }
    }

    /// Prepare `sql` and wrap it in a query without parameters.
    pub fn prepare(&mut self, sql: &str) -> Result<Query<C::Statement, M>> {
        let statement = self
            .connection
            .prepare(sql)
            .map_err(|error| Error::StatementPreparation {
                message: error.message().to_owned(),
                source: Box::new(error),
            })?;

        Ok(Query::new(
            statement,
            Arc::clone(&self.map_factory),
            self.connection.log_settings().clone(),
        ))
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }
}
