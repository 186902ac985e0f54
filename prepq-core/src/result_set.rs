use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::row::MapFactory;
use crate::value::RawRow;

/// The rows returned by one execution of a [`Query`][crate::query::Query].
///
/// All rows are fetched before the result set is created, so it no longer touches the connection.
/// Each access builds a new map through the [`MapFactory`]; nothing is cached.
///
/// Besides [`iter()`][Self::iter], a result set carries its own cursor:
///
/// ```rust,ignore
/// results.rewind();
/// while results.valid() {
///     let row = results.current();
///     results.advance();
/// }
/// ```
///
/// The cursor is unset until the first [`rewind()`][Self::rewind].
pub struct ResultSet<M> {
    rows: Vec<RawRow>,
    map_factory: Arc<M>,
    position: Option<usize>,
}

impl<M: MapFactory> ResultSet<M> {
    pub fn new(rows: Vec<RawRow>, map_factory: Arc<M>) -> Self {
        Self {
            rows,
            map_factory,
            position: None,
        }
    }

    /// The number of rows, regardless of the cursor.
    #[inline]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Move the cursor to the first row.
    pub fn rewind(&mut self) {
        self.position = Some(0);
    }

    /// Whether the cursor points at a row.
    pub fn valid(&self) -> bool {
        self.position.is_some_and(|index| index < self.rows.len())
    }

    /// The cursor position, or `None` before the first [`rewind()`][Self::rewind].
    pub fn key(&self) -> Option<usize> {
        self.position
    }

    /// Move the cursor to the next row. Does nothing while the cursor is unset.
    pub fn advance(&mut self) {
        if let Some(index) = &mut self.position {
            *index += 1;
        }
    }

    /// Build the map for the row under the cursor.
    ///
    /// # Panics
    /// If the cursor is not [`valid()`][Self::valid].
    #[track_caller]
    pub fn current(&self) -> M::Map {
        let row = self
            .position
            .and_then(|index| self.rows.get(index))
            .unwrap_or_else(|| {
                panic!(
                    "result set cursor out of bounds: the len is {}, but the position is {:?}",
                    self.rows.len(),
                    self.position
                )
            });

        self.map_factory.create_from_fields(row)
    }

    /// Build the map for the row at `index`.
    pub fn get(&self, index: usize) -> Option<M::Map> {
        self.rows
            .get(index)
            .map(|row| self.map_factory.create_from_fields(row))
    }

    /// Iterate over freshly built maps, independent of the cursor.
    pub fn iter(&self) -> Iter<'_, M> {
        Iter {
            rows: self.rows.iter(),
            map_factory: &self.map_factory,
        }
    }

    /// The fetched rows, before mapping.
    pub fn raw_rows(&self) -> &[RawRow] {
        &self.rows
    }
}

impl<M> Debug for ResultSet<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("rows", &self.rows)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<'a, M: MapFactory> IntoIterator for &'a ResultSet<M> {
    type Item = M::Map;
    type IntoIter = Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the rows of a [`ResultSet`].
pub struct Iter<'a, M> {
    rows: std::slice::Iter<'a, RawRow>,
    map_factory: &'a M,
}

impl<M: MapFactory> Iterator for Iter<'_, M> {
    type Item = M::Map;

    fn next(&mut self) -> Option<M::Map> {
        self.rows
            .next()
            .map(|row| self.map_factory.create_from_fields(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<M: MapFactory> DoubleEndedIterator for Iter<'_, M> {
    fn next_back(&mut self) -> Option<M::Map> {
        self.rows
            .next_back()
            .map(|row| self.map_factory.create_from_fields(row))
    }
}

impl<M: MapFactory> ExactSizeIterator for Iter<'_, M> {}

impl<M: MapFactory> FusedIterator for Iter<'_, M> {}
