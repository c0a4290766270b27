//! Error types for dynquery

use crate::types::SqlType;
use thiserror::Error;

/// Result type alias for dynquery operations
pub type DynResult<T> = Result<T, DynError>;

/// Error types for dynamic query operations
#[derive(Debug, Error)]
pub enum DynError {
    /// Column metadata lookup failed (distinct from a table with no columns)
    #[error("Schema lookup failed for table '{table}': {source}")]
    SchemaLookup {
        table: String,
        source: tokio_postgres::Error,
    },

    /// Table is absent from the catalog
    #[error("Unknown table: '{0}'")]
    UnknownTable(String),

    /// Every column of the table is database-generated; no INSERT can be built
    #[error("Table '{0}' has no insertable columns")]
    NoInsertableColumns(String),

    /// Supplied value count does not match the statement's declared slot count
    #[error("Parameter count mismatch: statement declares {expected} slot(s), {supplied} value(s) supplied")]
    ParameterCount { expected: usize, supplied: usize },

    /// A value's runtime variant does not match the declared SQL type of its slot
    #[error("Type mismatch at slot {slot}: declared {expected}, got {found} value")]
    TypeMismatch {
        /// 1-based slot number, matching `$n` placeholder numbering
        slot: usize,
        expected: SqlType,
        found: &'static str,
    },

    /// Declared type has no entry in the dispatch taxonomy
    #[error("Unsupported declared type '{type_name}' at slot {slot}")]
    UnsupportedType { slot: usize, type_name: String },

    /// Statement execution failed
    #[error("Execution failed on table '{table}' ({sql}): {source}")]
    Execution {
        table: String,
        sql: String,
        source: tokio_postgres::Error,
    },

    /// Identifier validation failure
    #[error("Invalid identifier: {0}")]
    Ident(String),

    /// Predicate column is not part of the table
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Result column failed to decode into a value
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Cursor mutation attempted without a positioned row
    #[error("Cursor has no current row")]
    NoCurrentRow,

    /// Other database errors
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),
}

impl DynError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an identifier validation error
    pub fn ident(message: impl Into<String>) -> Self {
        Self::Ident(message.into())
    }

    /// Create an execution error carrying the offending statement
    pub fn execution(
        table: impl Into<String>,
        sql: impl Into<String>,
        source: tokio_postgres::Error,
    ) -> Self {
        Self::Execution {
            table: table.into(),
            sql: sql.into(),
            source,
        }
    }

    /// Check if this is a parameter count mismatch
    pub fn is_parameter_count(&self) -> bool {
        matches!(self, Self::ParameterCount { .. })
    }

    /// Check if this is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if this is a schema lookup failure
    pub fn is_schema_lookup(&self) -> bool {
        matches!(self, Self::SchemaLookup { .. })
    }
}
