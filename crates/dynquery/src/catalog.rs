//! Column introspection.
//!
//! The catalog answers one question per call: which columns does this table
//! have, in definition order, and which of them may appear in a generically
//! generated INSERT. Descriptors are built fresh from `pg_catalog` on every
//! call and never cached; the column order (`pg_attribute.attnum`) is
//! load-bearing, since it determines positional alignment for every
//! downstream insert.

use crate::client::GenericClient;
use crate::error::{DynError, DynResult};
use crate::types::SqlType;
use serde::{Deserialize, Serialize};

/// One column of a table, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Taxonomy type, if the declared type is inside it.
    pub sql_type: Option<SqlType>,
    /// Declared type name as rendered by `format_type` (e.g. `character varying(50)`).
    pub type_name: String,
    /// Identity column, or a `nextval(...)` (serial) default.
    pub is_auto_increment: bool,
    /// `GENERATED ALWAYS AS (...)` column.
    pub is_generated: bool,
    pub default_expr: Option<String>,
    /// 1-based attribute number.
    pub ordinal: i32,
}

impl ColumnDescriptor {
    /// Whether the column may appear in a generic INSERT.
    ///
    /// Checks, in order: declared type name `serial` (case-insensitive),
    /// the auto-increment flag, a default of exactly `CURRENT_TIMESTAMP`
    /// (case-insensitive). Matching any rule excludes the column entirely.
    pub fn is_eligible(&self) -> bool {
        if self.type_name.eq_ignore_ascii_case("serial") {
            return false;
        }
        if self.is_auto_increment {
            return false;
        }
        if let Some(default) = &self.default_expr
            && default.eq_ignore_ascii_case("CURRENT_TIMESTAMP")
        {
            return false;
        }
        true
    }
}

const EXISTS_SQL: &str = "SELECT to_regclass($1) IS NOT NULL AS present";

const COLUMNS_SQL: &str = r#"
SELECT
  a.attname AS column_name,
  a.attnum AS ordinal,
  a.atttypid AS type_oid,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS type_name,
  a.attidentity IN ('a', 'd') AS is_identity,
  a.attgenerated <> '' AS is_generated,
  pg_get_expr(ad.adbin, ad.adrelid) AS default_expr
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
WHERE c.oid = to_regclass($1)
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum
"#;

fn schema_lookup(table: &str, err: DynError) -> DynError {
    match err {
        DynError::Db(source) => DynError::SchemaLookup {
            table: table.to_string(),
            source,
        },
        other => other,
    }
}

/// Fetch all live columns of `table` in definition order.
///
/// The table name is resolved through `to_regclass`, honoring the
/// connection's `search_path` and accepting schema-qualified names. A failed
/// metadata query is [`DynError::SchemaLookup`]; a name that resolves to
/// nothing is [`DynError::UnknownTable`] — never an empty list.
pub async fn table_columns<C: GenericClient>(
    client: &C,
    table: &str,
) -> DynResult<Vec<ColumnDescriptor>> {
    let present = client
        .query_opt(EXISTS_SQL, &[&table])
        .await
        .map_err(|e| schema_lookup(table, e))?
        .and_then(|row| row.try_get::<_, bool>("present").ok())
        .unwrap_or(false);
    if !present {
        return Err(DynError::UnknownTable(table.to_string()));
    }

    let rows = client
        .query(COLUMNS_SQL, &[&table])
        .await
        .map_err(|e| schema_lookup(table, e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row
            .try_get("column_name")
            .map_err(|e| DynError::decode("column_name", e.to_string()))?;
        let ordinal: i32 = row
            .try_get("ordinal")
            .map_err(|e| DynError::decode("ordinal", e.to_string()))?;
        let type_oid: u32 = row
            .try_get("type_oid")
            .map_err(|e| DynError::decode("type_oid", e.to_string()))?;
        let type_name: String = row
            .try_get("type_name")
            .map_err(|e| DynError::decode("type_name", e.to_string()))?;
        let is_identity: bool = row
            .try_get("is_identity")
            .map_err(|e| DynError::decode("is_identity", e.to_string()))?;
        let is_generated: bool = row
            .try_get("is_generated")
            .map_err(|e| DynError::decode("is_generated", e.to_string()))?;
        let default_expr: Option<String> = row
            .try_get("default_expr")
            .map_err(|e| DynError::decode("default_expr", e.to_string()))?;

        // serial columns carry no identity flag; they show up as a
        // nextval(...) default on a plain integer column.
        let has_nextval_default = default_expr
            .as_deref()
            .is_some_and(|d| d.trim_start().to_ascii_lowercase().starts_with("nextval("));

        columns.push(ColumnDescriptor {
            name,
            sql_type: SqlType::from_oid(type_oid),
            type_name,
            is_auto_increment: is_identity || has_nextval_default,
            is_generated,
            default_expr,
            ordinal,
        });
    }

    Ok(columns)
}

/// Filter a column list down to the insert-eligible ones, preserving order.
pub fn eligible(columns: Vec<ColumnDescriptor>) -> Vec<ColumnDescriptor> {
    columns.into_iter().filter(ColumnDescriptor::is_eligible).collect()
}

/// Fetch the insert-eligible columns of `table` in definition order.
///
/// An empty result means the table exists but every column is
/// database-generated; lookup failures and unknown tables error instead.
pub async fn eligible_columns<C: GenericClient>(
    client: &C,
    table: &str,
) -> DynResult<Vec<ColumnDescriptor>> {
    Ok(eligible(table_columns(client, table).await?))
}
