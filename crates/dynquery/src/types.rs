//! The closed SQL type taxonomy driving parameter dispatch.
//!
//! [`SqlType`] mirrors the standard SQL type families (character, boolean,
//! the four integer widths, the two float widths, exact decimal, and the
//! three temporal types) and is derived from the declared
//! [`tokio_postgres::types::Type`] of a statement parameter slot or a result
//! column. Dispatch over it is an exhaustive `match`, so a new variant cannot
//! be added without every binding site handling it.

use serde::{Deserialize, Serialize};
use tokio_postgres::types::Type;

/// A declared SQL type, as reported by statement or result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// Character family: `char(n)`, `varchar`, `text`
    Text,
    /// `boolean`
    Boolean,
    /// One-byte integer. Postgres has no `tinyint`; this is the internal
    /// one-byte `"char"` type, which the driver pairs with `i8`.
    TinyInt,
    /// `smallint`
    SmallInt,
    /// `integer`
    Integer,
    /// `bigint`
    BigInt,
    /// `real` (32-bit)
    Real,
    /// `double precision` (64-bit)
    Double,
    /// `numeric` / `decimal`
    Decimal,
    /// `date`
    Date,
    /// `time` (without time zone)
    Time,
    /// `timestamp` (without time zone)
    Timestamp,
}

impl SqlType {
    /// Map a declared Postgres type to the taxonomy.
    ///
    /// Returns `None` for types outside the taxonomy (e.g. `uuid`, `bytea`,
    /// `timestamptz`, array types); callers surface those as
    /// [`DynError::UnsupportedType`](crate::DynError::UnsupportedType) rather
    /// than skipping the slot.
    pub fn from_pg(ty: &Type) -> Option<Self> {
        match *ty {
            Type::BPCHAR | Type::VARCHAR | Type::TEXT | Type::NAME => Some(Self::Text),
            Type::BOOL => Some(Self::Boolean),
            Type::CHAR => Some(Self::TinyInt),
            Type::INT2 => Some(Self::SmallInt),
            Type::INT4 => Some(Self::Integer),
            Type::INT8 => Some(Self::BigInt),
            Type::FLOAT4 => Some(Self::Real),
            Type::FLOAT8 => Some(Self::Double),
            Type::NUMERIC => Some(Self::Decimal),
            Type::DATE => Some(Self::Date),
            Type::TIME => Some(Self::Time),
            Type::TIMESTAMP => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Map a type by OID, for metadata sources that report OIDs directly.
    pub fn from_oid(oid: u32) -> Option<Self> {
        Type::from_oid(oid).as_ref().and_then(Self::from_pg)
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::Double => "double precision",
            Self::Decimal => "numeric",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_character_family_to_text() {
        assert_eq!(SqlType::from_pg(&Type::BPCHAR), Some(SqlType::Text));
        assert_eq!(SqlType::from_pg(&Type::VARCHAR), Some(SqlType::Text));
        assert_eq!(SqlType::from_pg(&Type::TEXT), Some(SqlType::Text));
    }

    #[test]
    fn maps_integer_widths() {
        assert_eq!(SqlType::from_pg(&Type::INT2), Some(SqlType::SmallInt));
        assert_eq!(SqlType::from_pg(&Type::INT4), Some(SqlType::Integer));
        assert_eq!(SqlType::from_pg(&Type::INT8), Some(SqlType::BigInt));
    }

    #[test]
    fn maps_float_widths() {
        assert_eq!(SqlType::from_pg(&Type::FLOAT4), Some(SqlType::Real));
        assert_eq!(SqlType::from_pg(&Type::FLOAT8), Some(SqlType::Double));
    }

    #[test]
    fn maps_temporal_types() {
        assert_eq!(SqlType::from_pg(&Type::DATE), Some(SqlType::Date));
        assert_eq!(SqlType::from_pg(&Type::TIME), Some(SqlType::Time));
        assert_eq!(SqlType::from_pg(&Type::TIMESTAMP), Some(SqlType::Timestamp));
    }

    #[test]
    fn unknown_types_have_no_mapping() {
        assert_eq!(SqlType::from_pg(&Type::UUID), None);
        assert_eq!(SqlType::from_pg(&Type::BYTEA), None);
        assert_eq!(SqlType::from_pg(&Type::TIMESTAMPTZ), None);
        assert_eq!(SqlType::from_pg(&Type::TEXT_ARRAY), None);
    }

    #[test]
    fn from_oid_matches_from_pg() {
        assert_eq!(SqlType::from_oid(Type::INT4.oid()), Some(SqlType::Integer));
        assert_eq!(SqlType::from_oid(Type::UUID.oid()), None);
        // OID 0 is not a known type
        assert_eq!(SqlType::from_oid(0), None);
    }
}
