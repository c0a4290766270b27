//! The dynamic query engine.
//!
//! [`DynamicQuery`] ties the catalog, the text builders, and the binder
//! together. It borrows a [`GenericClient`] for its lifetime and never
//! closes it; pass a [`tokio_postgres::Transaction`] to run a group of
//! operations atomically.
//!
//! Every operation returns a `Result`. Execution failures carry the
//! offending statement and table name; nothing is swallowed into a zero or
//! empty result.

use crate::bind;
use crate::catalog;
use crate::client::GenericClient;
use crate::cursor::Cursor;
use crate::error::{DynError, DynResult};
use crate::ident::Ident;
use crate::sql;
use crate::types::SqlType;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// The schema-introspecting query engine, borrowing a client per instance.
pub struct DynamicQuery<'a, C: GenericClient> {
    client: &'a C,
}

fn exec_err(table: &Ident, sql: &str, err: DynError) -> DynError {
    match err {
        DynError::Db(source) => DynError::execution(table.to_sql(), sql, source),
        other => other,
    }
}

impl<'a, C: GenericClient> DynamicQuery<'a, C> {
    /// Borrow a client. The engine holds no other state.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Execute `SELECT * FROM <table> WHERE <column> = $1`-shaped queries and
    /// return a scrollable [`Cursor`] over the matching rows.
    ///
    /// `column` must exist on the table (checked against the catalog before
    /// any text is built). Values are bound by the statement's declared
    /// parameter types; a count mismatch short-circuits before execution.
    pub async fn select(&self, table: &str, column: &str, values: &[Value]) -> DynResult<Cursor> {
        let table_ident = Ident::parse(table)?;
        let known = catalog::table_columns(self.client, table).await?;
        if !known.iter().any(|c| c.name == column) {
            return Err(DynError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        let column_ident = Ident::column(column)?;
        let stmt_sql = sql::select_sql(&table_ident, &column_ident);
        tracing::debug!(sql = %stmt_sql, "select");

        let stmt = self.client.prepare_statement(&stmt_sql).await?;
        bind::check_count(stmt.params().len(), values.len())?;
        let declared = bind::resolve_types(stmt.params())?;
        let bound = bind::bind_all(&declared, values)?;

        let rows = self
            .client
            .query_prepared(&stmt, &bound.as_refs())
            .await
            .map_err(|e| exec_err(&table_ident, &stmt_sql, e))?;

        Cursor::new(table_ident, &stmt, rows)
    }

    /// Insert one row into `table`, values aligned positionally with the
    /// table's eligible columns.
    ///
    /// Binding is generic (by the value itself, no per-type dispatch);
    /// Postgres checks the encoding against each column's declared type.
    /// Returns the affected-row count (0 or 1).
    pub async fn insert_one(&self, table: &str, values: &[Value]) -> DynResult<u64> {
        let table_ident = Ident::parse(table)?;
        let columns = catalog::eligible_columns(self.client, table).await?;
        let stmt_sql = sql::insert_sql(&table_ident, &columns)?;
        bind::check_count(columns.len(), values.len())?;
        tracing::debug!(sql = %stmt_sql, "insert_one");

        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        self.client
            .execute(&stmt_sql, &params)
            .await
            .map_err(|e| exec_err(&table_ident, &stmt_sql, e))
    }

    /// Insert multiple rows through one prepared statement, one execution
    /// per value list, returning the per-row affected counts in order.
    ///
    /// Every value list is count-checked up front; the first execution
    /// failure aborts the batch. For all-or-nothing semantics, run the
    /// engine over a transaction.
    pub async fn insert_many(&self, table: &str, rows: &[Vec<Value>]) -> DynResult<Vec<u64>> {
        let table_ident = Ident::parse(table)?;
        let columns = catalog::eligible_columns(self.client, table).await?;
        let stmt_sql = sql::insert_sql(&table_ident, &columns)?;
        for row in rows {
            bind::check_count(columns.len(), row.len())?;
        }
        tracing::debug!(sql = %stmt_sql, batch = rows.len(), "insert_many");

        let stmt = self
            .client
            .prepare_statement(&stmt_sql)
            .await
            .map_err(|e| exec_err(&table_ident, &stmt_sql, e))?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let params: Vec<&(dyn ToSql + Sync)> =
                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            let affected = self
                .client
                .execute_prepared(&stmt, &params)
                .await
                .map_err(|e| exec_err(&table_ident, &stmt_sql, e))?;
            counts.push(affected);
        }
        Ok(counts)
    }

    /// Insert a new row shaped like the cursor's column set, typed-binding
    /// one value per column, and append it to the cursor.
    ///
    /// The value list must cover every cursor column; there is no
    /// partial-row insert.
    pub async fn insert_from_cursor(
        &self,
        cursor: &mut Cursor,
        values: &[Value],
    ) -> DynResult<()> {
        let (names, types) = cursor_shape(cursor);
        let bound = bind::bind_all(&types, values)?;
        let stmt_sql = sql::insert_row_sql(cursor.table(), &names)?;
        tracing::debug!(sql = %stmt_sql, "insert_from_cursor");

        self.client
            .execute(&stmt_sql, &bound.as_refs())
            .await
            .map_err(|e| exec_err(cursor.table(), &stmt_sql, e))?;

        cursor.append_row(values.to_vec());
        Ok(())
    }

    /// Update the cursor's current row in place, typed-binding one value per
    /// cursor column.
    ///
    /// The row is located by its old values (null-safe) and pinned by ctid,
    /// so exactly one physical row changes even among duplicates.
    pub async fn update_row(&self, cursor: &mut Cursor, values: &[Value]) -> DynResult<()> {
        let old = cursor
            .current()
            .ok_or(DynError::NoCurrentRow)?
            .to_vec();
        let (names, types) = cursor_shape(cursor);
        let mut bound = bind::bind_all(&types, values)?;
        // Identity predicate params: the old values, re-bound after the SET
        // params. Decoded values always match their own column types.
        bound.append(bind::bind_all(&types, &old)?);

        let stmt_sql = sql::update_row_sql(cursor.table(), &names)?;
        tracing::debug!(sql = %stmt_sql, "update_row");

        self.client
            .execute(&stmt_sql, &bound.as_refs())
            .await
            .map_err(|e| exec_err(cursor.table(), &stmt_sql, e))?;

        cursor.replace_current(values.to_vec())
    }

    /// Delete the cursor's current row, leaving the cursor positioned before
    /// the row that followed it.
    pub async fn delete_row(&self, cursor: &mut Cursor) -> DynResult<()> {
        let old = cursor
            .current()
            .ok_or(DynError::NoCurrentRow)?
            .to_vec();
        let (names, types) = cursor_shape(cursor);
        let bound = bind::bind_all(&types, &old)?;

        let stmt_sql = sql::delete_row_sql(cursor.table(), &names)?;
        tracing::debug!(sql = %stmt_sql, "delete_row");

        self.client
            .execute(&stmt_sql, &bound.as_refs())
            .await
            .map_err(|e| exec_err(cursor.table(), &stmt_sql, e))?;

        cursor.remove_current()?;
        Ok(())
    }

    /// Execute `DELETE FROM <table>` and return the affected-row count.
    pub async fn delete_all(&self, table: &str) -> DynResult<u64> {
        let table_ident = Ident::parse(table)?;
        let stmt_sql = sql::delete_all_sql(&table_ident);
        tracing::debug!(sql = %stmt_sql, "delete_all");

        self.client
            .execute(&stmt_sql, &[])
            .await
            .map_err(|e| exec_err(&table_ident, &stmt_sql, e))
    }
}

fn cursor_shape(cursor: &Cursor) -> (Vec<String>, Vec<SqlType>) {
    let names = cursor.columns().iter().map(|c| c.name.clone()).collect();
    let types = cursor.columns().iter().map(|c| c.sql_type).collect();
    (names, types)
}
