//! Statement text builders.
//!
//! Text is assembled from validated identifiers only; values always travel
//! as `$n` parameters (1-based, the Postgres placeholder convention), never
//! as interpolated literals. The three shapes produced are:
//!
//! - `INSERT INTO <table> (<c1>, <c2>, ...) VALUES ($1, $2, ...)`
//! - `SELECT * FROM <table> WHERE <col> = $1`
//! - `DELETE FROM <table>`

use crate::catalog::ColumnDescriptor;
use crate::error::{DynError, DynResult};
use crate::ident::Ident;

/// Build the INSERT statement for a table and its eligible column list.
///
/// One placeholder per column, in catalog order. An empty column list is an
/// error; a malformed `INSERT INTO t () VALUES ()` is never produced.
pub fn insert_sql(table: &Ident, columns: &[ColumnDescriptor]) -> DynResult<String> {
    insert_named(table, columns.iter().map(|c| c.name.as_str()))
}

/// Build a single-predicate SELECT over all columns.
pub fn select_sql(table: &Ident, column: &Ident) -> String {
    format!("SELECT * FROM {table} WHERE {column} = $1")
}

/// Build the unconditional DELETE.
pub fn delete_all_sql(table: &Ident) -> String {
    format!("DELETE FROM {table}")
}

/// Build an INSERT over a cursor's full column set (names only; the caller
/// already knows the types from the row description).
pub fn insert_row_sql(table: &Ident, columns: &[String]) -> DynResult<String> {
    insert_named(table, columns.iter().map(String::as_str))
}

fn insert_named<'a>(
    table: &Ident,
    columns: impl ExactSizeIterator<Item = &'a str>,
) -> DynResult<String> {
    let count = columns.len();
    if count == 0 {
        return Err(DynError::NoInsertableColumns(table.to_sql()));
    }

    let mut sql = String::from("INSERT INTO ");
    table.write_sql(&mut sql);
    sql.push_str(" (");
    for (i, name) in columns.enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        Ident::column(name)?.write_sql(&mut sql);
    }
    sql.push_str(") VALUES (");
    for i in 1..=count {
        if i > 1 {
            sql.push_str(", ");
        }
        sql.push('$');
        sql.push_str(&i.to_string());
    }
    sql.push(')');
    Ok(sql)
}

/// Render the null-safe row-identity predicate used by cursor mutations:
/// one `IS NOT DISTINCT FROM` term per column, placeholders starting at
/// `$offset`.
pub fn row_identity_predicate(columns: &[String], offset: usize) -> DynResult<String> {
    let mut sql = String::new();
    for (i, name) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        Ident::column(name)?.write_sql(&mut sql);
        sql.push_str(&format!(" IS NOT DISTINCT FROM ${}", offset + i));
    }
    Ok(sql)
}

/// UPDATE of the single row identified by the old values of every column.
///
/// SET placeholders take `$1..$n`, the identity predicate `$n+1..$2n`; the
/// row is pinned by ctid so duplicates update exactly one physical row.
pub fn update_row_sql(table: &Ident, columns: &[String]) -> DynResult<String> {
    if columns.is_empty() {
        return Err(DynError::NoInsertableColumns(table.to_sql()));
    }

    let mut sql = String::from("UPDATE ");
    table.write_sql(&mut sql);
    sql.push_str(" SET ");
    for (i, name) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        Ident::column(name)?.write_sql(&mut sql);
        sql.push_str(&format!(" = ${}", i + 1));
    }
    sql.push_str(" WHERE ctid IN (SELECT ctid FROM ");
    table.write_sql(&mut sql);
    sql.push_str(" WHERE ");
    sql.push_str(&row_identity_predicate(columns, columns.len() + 1)?);
    sql.push_str(" LIMIT 1)");
    Ok(sql)
}

/// DELETE of the single row identified by the old values of every column.
pub fn delete_row_sql(table: &Ident, columns: &[String]) -> DynResult<String> {
    if columns.is_empty() {
        return Err(DynError::NoInsertableColumns(table.to_sql()));
    }

    let mut sql = String::from("DELETE FROM ");
    table.write_sql(&mut sql);
    sql.push_str(" WHERE ctid IN (SELECT ctid FROM ");
    table.write_sql(&mut sql);
    sql.push_str(" WHERE ");
    sql.push_str(&row_identity_predicate(columns, 1)?);
    sql.push_str(" LIMIT 1)");
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn table(name: &str) -> Ident {
        Ident::parse(name).unwrap()
    }

    fn col(name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            sql_type: Some(SqlType::Text),
            type_name: "text".to_string(),
            is_auto_increment: false,
            is_generated: false,
            default_expr: None,
            ordinal: 0,
        }
    }

    #[test]
    fn insert_shape_matches_column_order() {
        let cols = [col("username"), col("full_name"), col("email")];
        let sql = insert_sql(&table("users"), &cols).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO users (username, full_name, email) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn insert_single_column() {
        let sql = insert_sql(&table("users"), &[col("username")]).unwrap();
        assert_eq!(sql, "INSERT INTO users (username) VALUES ($1)");
    }

    #[test]
    fn insert_placeholder_count_equals_column_count() {
        let cols: Vec<_> = (1..=5).map(|i| col(&format!("c{i}"))).collect();
        let sql = insert_sql(&table("t"), &cols).unwrap();
        assert_eq!(sql.matches('$').count(), 5);
        for name in cols.iter().map(|c| &c.name) {
            assert!(sql.contains(name.as_str()));
        }
    }

    #[test]
    fn insert_with_no_columns_is_an_error_not_malformed_sql() {
        let err = insert_sql(&table("users"), &[]).unwrap_err();
        assert!(matches!(err, DynError::NoInsertableColumns(t) if t == "users"));
    }

    #[test]
    fn insert_quotes_non_plain_column_names() {
        let sql = insert_sql(&table("t"), &[col("full name")]).unwrap();
        assert_eq!(sql, r#"INSERT INTO t ("full name") VALUES ($1)"#);
    }

    #[test]
    fn select_shape() {
        let sql = select_sql(&table("users"), &table("username"));
        assert_eq!(sql, "SELECT * FROM users WHERE username = $1");
    }

    #[test]
    fn delete_all_shape() {
        assert_eq!(delete_all_sql(&table("users")), "DELETE FROM users");
    }

    #[test]
    fn update_row_pins_one_physical_row() {
        let cols = vec!["a".to_string(), "b".to_string()];
        let sql = update_row_sql(&table("t"), &cols).unwrap();
        assert_eq!(
            sql,
            "UPDATE t SET a = $1, b = $2 WHERE ctid IN (SELECT ctid FROM t \
             WHERE a IS NOT DISTINCT FROM $3 AND b IS NOT DISTINCT FROM $4 LIMIT 1)"
        );
    }

    #[test]
    fn delete_row_uses_null_safe_identity() {
        let cols = vec!["a".to_string(), "b".to_string()];
        let sql = delete_row_sql(&table("t"), &cols).unwrap();
        assert_eq!(
            sql,
            "DELETE FROM t WHERE ctid IN (SELECT ctid FROM t \
             WHERE a IS NOT DISTINCT FROM $1 AND b IS NOT DISTINCT FROM $2 LIMIT 1)"
        );
    }

    #[test]
    fn schema_qualified_table_renders_dotted() {
        let sql = delete_all_sql(&table("public.users"));
        assert_eq!(sql, "DELETE FROM public.users");
    }
}
