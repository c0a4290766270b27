//! A scrollable cursor over a query result.
//!
//! `tokio-postgres` has no server-side updatable result sets, so the cursor
//! materializes: rows are decoded into [`Value`]s up front through the type
//! taxonomy, and the column set (names plus declared types) is taken from
//! the prepared statement's row description — known even for a zero-row
//! result. Mutations (insert/update/delete of rows) are performed by the
//! engine, which keeps the cursor's local state in step with what it
//! executed.
//!
//! The cursor starts positioned before the first row, JDBC-style: call
//! [`Cursor::next`] to reach the first row.

use crate::error::{DynError, DynResult};
use crate::ident::Ident;
use crate::types::SqlType;
use crate::value::Value;
use tokio_postgres::{Row, Statement};

/// One column of the cursor's result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorColumn {
    pub name: String,
    pub sql_type: SqlType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pos {
    Before,
    At(usize),
    After,
}

/// A materialized, scrollable view over the rows matched by a SELECT.
#[derive(Debug)]
pub struct Cursor {
    table: Ident,
    columns: Vec<CursorColumn>,
    rows: Vec<Vec<Value>>,
    pos: Pos,
}

impl Cursor {
    /// Build a cursor from a prepared statement's row description and the
    /// rows it returned.
    ///
    /// A result column whose declared type falls outside the taxonomy fails
    /// construction with [`DynError::UnsupportedType`].
    pub(crate) fn new(table: Ident, stmt: &Statement, rows: Vec<Row>) -> DynResult<Self> {
        let mut columns = Vec::with_capacity(stmt.columns().len());
        for (i, col) in stmt.columns().iter().enumerate() {
            let sql_type = SqlType::from_pg(col.type_()).ok_or_else(|| {
                tracing::warn!(
                    column = col.name(),
                    ty = %col.type_(),
                    "result column type outside the dispatch taxonomy"
                );
                DynError::UnsupportedType {
                    slot: i + 1,
                    type_name: col.type_().to_string(),
                }
            })?;
            columns.push(CursorColumn {
                name: col.name().to_string(),
                sql_type,
            });
        }

        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(columns.len());
            for (i, col) in columns.iter().enumerate() {
                values.push(Value::from_row(row, i, col.sql_type, &col.name)?);
            }
            decoded.push(values);
        }

        Ok(Self {
            table,
            columns,
            rows: decoded,
            pos: Pos::Before,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        table: Ident,
        columns: Vec<CursorColumn>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self {
            table,
            columns,
            rows,
            pos: Pos::Before,
        }
    }

    /// The table this cursor was selected from.
    pub(crate) fn table(&self) -> &Ident {
        &self.table
    }

    /// The result columns, in SELECT order.
    pub fn columns(&self) -> &[CursorColumn] {
        &self.columns
    }

    /// Number of rows currently in the cursor.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the cursor holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Advance to the next row. Returns `false` once past the last row.
    pub fn next(&mut self) -> bool {
        self.pos = match self.pos {
            Pos::Before if self.rows.is_empty() => Pos::After,
            Pos::Before => Pos::At(0),
            Pos::At(i) if i + 1 < self.rows.len() => Pos::At(i + 1),
            Pos::At(_) | Pos::After => Pos::After,
        };
        matches!(self.pos, Pos::At(_))
    }

    /// Move back to the previous row. Returns `false` once before the first.
    pub fn previous(&mut self) -> bool {
        self.pos = match self.pos {
            Pos::After if self.rows.is_empty() => Pos::Before,
            Pos::After => Pos::At(self.rows.len() - 1),
            Pos::At(i) if i > 0 => Pos::At(i - 1),
            Pos::At(_) | Pos::Before => Pos::Before,
        };
        matches!(self.pos, Pos::At(_))
    }

    /// Jump to the first row, if any.
    pub fn first(&mut self) -> bool {
        if self.rows.is_empty() {
            false
        } else {
            self.pos = Pos::At(0);
            true
        }
    }

    /// Jump to the last row, if any.
    pub fn last(&mut self) -> bool {
        if self.rows.is_empty() {
            false
        } else {
            self.pos = Pos::At(self.rows.len() - 1);
            true
        }
    }

    /// The values of the current row, in column order.
    pub fn current(&self) -> Option<&[Value]> {
        match self.pos {
            Pos::At(i) => self.rows.get(i).map(Vec::as_slice),
            _ => None,
        }
    }

    pub(crate) fn current_index(&self) -> DynResult<usize> {
        match self.pos {
            Pos::At(i) if i < self.rows.len() => Ok(i),
            _ => Err(DynError::NoCurrentRow),
        }
    }

    pub(crate) fn append_row(&mut self, values: Vec<Value>) {
        self.rows.push(values);
    }

    pub(crate) fn replace_current(&mut self, values: Vec<Value>) -> DynResult<()> {
        let i = self.current_index()?;
        self.rows[i] = values;
        Ok(())
    }

    /// Remove the current row, leaving the cursor positioned before the row
    /// that followed it.
    pub(crate) fn remove_current(&mut self) -> DynResult<Vec<Value>> {
        let i = self.current_index()?;
        let removed = self.rows.remove(i);
        self.pos = if i == 0 { Pos::Before } else { Pos::At(i - 1) };
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(rows: usize) -> Cursor {
        let columns = vec![CursorColumn {
            name: "n".to_string(),
            sql_type: SqlType::Integer,
        }];
        let rows = (0..rows).map(|i| vec![Value::Integer(i as i32)]).collect();
        Cursor::from_parts(Ident::parse("t").unwrap(), columns, rows)
    }

    #[test]
    fn starts_before_first_row() {
        let mut c = cursor(2);
        assert!(c.current().is_none());
        assert!(c.next());
        assert_eq!(c.current(), Some(&[Value::Integer(0)][..]));
    }

    #[test]
    fn next_walks_off_the_end() {
        let mut c = cursor(2);
        assert!(c.next());
        assert!(c.next());
        assert!(!c.next());
        assert!(c.current().is_none());
        // stays after the last row
        assert!(!c.next());
    }

    #[test]
    fn previous_scrolls_back() {
        let mut c = cursor(3);
        assert!(c.last());
        assert_eq!(c.current(), Some(&[Value::Integer(2)][..]));
        assert!(c.previous());
        assert_eq!(c.current(), Some(&[Value::Integer(1)][..]));
    }

    #[test]
    fn first_and_last_on_empty_cursor() {
        let mut c = cursor(0);
        assert!(!c.first());
        assert!(!c.last());
        assert!(!c.next());
        assert!(c.current().is_none());
    }

    #[test]
    fn remove_positions_before_the_following_row() {
        let mut c = cursor(3);
        assert!(c.next()); // row 0
        c.remove_current().unwrap();
        assert!(c.current().is_none());
        assert!(c.next());
        assert_eq!(c.current(), Some(&[Value::Integer(1)][..]));
        assert_eq!(c.row_count(), 2);
    }

    #[test]
    fn mutation_without_position_is_an_error() {
        let mut c = cursor(1);
        assert!(matches!(c.remove_current(), Err(DynError::NoCurrentRow)));
        assert!(matches!(
            c.replace_current(vec![Value::Null]),
            Err(DynError::NoCurrentRow)
        ));
    }
}
