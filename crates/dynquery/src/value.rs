//! The dynamic value model.
//!
//! [`Value`] is the "ordinary value" callers hand to the engine: a closed
//! enum mirroring the [`SqlType`] taxonomy, with a `Null` variant usable in
//! any slot. It implements [`ToSql`] by delegating to the wrapped native
//! type, which is the generic (identity-based) binding path used by the
//! insert operations. The typed path — checking a value against a declared
//! type before binding — lives in the binder module.
//!
//! Decoding is the dual direction: [`Value::from_row`] pulls one result
//! column out of a [`Row`] according to its declared type.

use crate::error::{DynError, DynResult};
use crate::types::SqlType;
use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::error::Error as StdError;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

/// An untyped value positionally aligned with a statement slot or a result
/// column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Name of the runtime variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::TinyInt(_) => "tinyint",
            Self::SmallInt(_) => "smallint",
            Self::Integer(_) => "integer",
            Self::BigInt(_) => "bigint",
            Self::Real(_) => "real",
            Self::Double(_) => "double precision",
            Self::Decimal(_) => "numeric",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Whether this value may occupy a slot of the given declared type.
    ///
    /// Exact variant match; `Null` matches every type.
    pub fn matches(&self, declared: SqlType) -> bool {
        matches!(
            (self, declared),
            (Self::Null, _)
                | (Self::Text(_), SqlType::Text)
                | (Self::Boolean(_), SqlType::Boolean)
                | (Self::TinyInt(_), SqlType::TinyInt)
                | (Self::SmallInt(_), SqlType::SmallInt)
                | (Self::Integer(_), SqlType::Integer)
                | (Self::BigInt(_), SqlType::BigInt)
                | (Self::Real(_), SqlType::Real)
                | (Self::Double(_), SqlType::Double)
                | (Self::Decimal(_), SqlType::Decimal)
                | (Self::Date(_), SqlType::Date)
                | (Self::Time(_), SqlType::Time)
                | (Self::Timestamp(_), SqlType::Timestamp)
        )
    }

    /// Decode one result column into a value according to its declared type.
    ///
    /// `idx` is the 0-based column offset within the row; `column` is the
    /// column name, used only for error context.
    pub fn from_row(row: &Row, idx: usize, declared: SqlType, column: &str) -> DynResult<Self> {
        fn get<'a, T>(row: &'a Row, idx: usize, column: &str) -> DynResult<Option<T>>
        where
            T: tokio_postgres::types::FromSql<'a>,
        {
            row.try_get::<_, Option<T>>(idx)
                .map_err(|e| DynError::decode(column, e.to_string()))
        }

        let value = match declared {
            SqlType::Text => get::<String>(row, idx, column)?.map(Self::Text),
            SqlType::Boolean => get::<bool>(row, idx, column)?.map(Self::Boolean),
            SqlType::TinyInt => get::<i8>(row, idx, column)?.map(Self::TinyInt),
            SqlType::SmallInt => get::<i16>(row, idx, column)?.map(Self::SmallInt),
            SqlType::Integer => get::<i32>(row, idx, column)?.map(Self::Integer),
            SqlType::BigInt => get::<i64>(row, idx, column)?.map(Self::BigInt),
            SqlType::Real => get::<f32>(row, idx, column)?.map(Self::Real),
            SqlType::Double => get::<f64>(row, idx, column)?.map(Self::Double),
            SqlType::Decimal => get::<Decimal>(row, idx, column)?.map(Self::Decimal),
            SqlType::Date => get::<NaiveDate>(row, idx, column)?.map(Self::Date),
            SqlType::Time => get::<NaiveTime>(row, idx, column)?.map(Self::Time),
            SqlType::Timestamp => get::<NaiveDateTime>(row, idx, column)?.map(Self::Timestamp),
        };
        Ok(value.unwrap_or(Self::Null))
    }
}

fn delegate<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(Box::new(WrongType::new::<T>(ty.clone())));
    }
    value.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Text(v) => delegate(v, ty, out),
            Self::Boolean(v) => delegate(v, ty, out),
            Self::TinyInt(v) => delegate(v, ty, out),
            Self::SmallInt(v) => delegate(v, ty, out),
            Self::Integer(v) => delegate(v, ty, out),
            Self::BigInt(v) => delegate(v, ty, out),
            Self::Real(v) => delegate(v, ty, out),
            Self::Double(v) => delegate(v, ty, out),
            Self::Decimal(v) => delegate(v, ty, out),
            Self::Date(v) => delegate(v, ty, out),
            Self::Time(v) => delegate(v, ty, out),
            Self::Timestamp(v) => delegate(v, ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Which concrete encoding applies depends on the variant, so the
        // static check is deferred to to_sql.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::TinyInt(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_exact_per_variant() {
        assert!(Value::Text("a".into()).matches(SqlType::Text));
        assert!(Value::Integer(1).matches(SqlType::Integer));
        assert!(!Value::Text("not-a-number".into()).matches(SqlType::Integer));
        assert!(!Value::Integer(1).matches(SqlType::BigInt));
        assert!(!Value::Real(1.0).matches(SqlType::Double));
    }

    #[test]
    fn null_matches_every_declared_type() {
        for ty in [
            SqlType::Text,
            SqlType::Boolean,
            SqlType::TinyInt,
            SqlType::SmallInt,
            SqlType::Integer,
            SqlType::BigInt,
            SqlType::Real,
            SqlType::Double,
            SqlType::Decimal,
            SqlType::Date,
            SqlType::Time,
            SqlType::Timestamp,
        ] {
            assert!(Value::Null.matches(ty), "null should match {ty}");
        }
    }

    #[test]
    fn generic_bind_encodes_matching_type() {
        let mut buf = BytesMut::new();
        let value = Value::Integer(42);
        let result = value.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(result, IsNull::No));
        assert_eq!(&buf[..], &42i32.to_be_bytes()[..]);
    }

    #[test]
    fn generic_bind_rejects_wrong_declared_type() {
        let mut buf = BytesMut::new();
        let value = Value::Text("not-a-number".into());
        assert!(value.to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn null_binds_anywhere() {
        let mut buf = BytesMut::new();
        let result = Value::Null.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(result, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(7i32), Value::Integer(7));
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::BigInt(7));
    }
}
