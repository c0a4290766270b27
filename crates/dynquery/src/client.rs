//! Generic client trait for unified database access.
//!
//! The engine never owns a connection; it borrows anything implementing
//! [`GenericClient`] for the duration of one operation. The trait is
//! implemented for [`tokio_postgres::Client`] and
//! [`tokio_postgres::Transaction`], so operations compose with
//! caller-managed transactions, and for `&C` so borrowed clients can be
//! passed through wrappers.

use crate::error::{DynError, DynResult};
use tokio_postgres::{Row, Statement};
use tokio_postgres::types::ToSql;

/// The connection capability the engine requires: plain query/execute plus
/// prepared statements (which expose the declared parameter and column types
/// that drive typed binding).
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DynResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DynResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DynResult<u64>> + Send;

    /// Prepare a statement on this connection.
    ///
    /// Prepared statements are per-connection and must not be used across
    /// connections.
    fn prepare_statement(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = DynResult<Statement>> + Send;

    /// Execute a prepared statement and return all rows.
    fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DynResult<Vec<Row>>> + Send;

    /// Execute a prepared statement and return the affected row count.
    fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DynResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(DynError::from)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(DynError::from)
    }

    async fn prepare_statement(&self, sql: &str) -> DynResult<Statement> {
        tokio_postgres::Client::prepare(self, sql)
            .await
            .map_err(DynError::from)
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<Vec<Row>> {
        tokio_postgres::Client::query(self, stmt, params)
            .await
            .map_err(DynError::from)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<u64> {
        tokio_postgres::Client::execute(self, stmt, params)
            .await
            .map_err(DynError::from)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(DynError::from)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(DynError::from)
    }

    async fn prepare_statement(&self, sql: &str) -> DynResult<Statement> {
        tokio_postgres::Transaction::prepare(self, sql)
            .await
            .map_err(DynError::from)
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, stmt, params)
            .await
            .map_err(DynError::from)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<u64> {
        tokio_postgres::Transaction::execute(self, stmt, params)
            .await
            .map_err(DynError::from)
    }
}

impl<C: GenericClient> GenericClient for &C {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<Vec<Row>> {
        (*self).query(sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<Option<Row>> {
        (*self).query_opt(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DynResult<u64> {
        (*self).execute(sql, params).await
    }

    async fn prepare_statement(&self, sql: &str) -> DynResult<Statement> {
        (*self).prepare_statement(sql).await
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<Vec<Row>> {
        (*self).query_prepared(stmt, params).await
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DynResult<u64> {
        (*self).execute_prepared(stmt, params).await
    }
}
