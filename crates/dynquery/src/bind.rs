//! The typed parameter binder.
//!
//! Given the declared types of a statement's parameter slots (or a cursor's
//! columns) and a positional list of [`Value`]s, the binder checks the count
//! precondition, dispatches every value to the matching native binding, and
//! only then hands the whole set to the driver. Binding is all-or-nothing: a
//! mismatch at any slot fails the operation before anything executes.
//!
//! Slot numbers are 1-based throughout, matching `$n` placeholder numbering
//! and the Postgres protocol.

use crate::error::{DynError, DynResult};
use crate::types::SqlType;
use crate::value::Value;
use tokio_postgres::types::{ToSql, Type};

/// A fully typed, positionally bound parameter set.
///
/// Values are boxed as `dyn ToSql` trait objects so a single collection can
/// carry the whole heterogeneous row.
#[derive(Debug, Default)]
pub struct BoundParams {
    params: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl BoundParams {
    /// Number of bound slots.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no slots are bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Append another bound set after this one (placeholder numbering of the
    /// combined statement is the caller's concern).
    pub fn append(&mut self, other: BoundParams) {
        self.params.extend(other.params);
    }

    /// Borrow the parameters in the form the driver expects.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| &**p as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Check the positional-alignment precondition.
///
/// A mismatch short-circuits the enclosing operation; nothing is bound and
/// nothing executes.
pub fn check_count(expected: usize, supplied: usize) -> DynResult<()> {
    if expected != supplied {
        return Err(DynError::ParameterCount { expected, supplied });
    }
    Ok(())
}

/// Resolve declared driver types into the taxonomy.
///
/// A type outside the taxonomy is surfaced as
/// [`DynError::UnsupportedType`] (with a warning), never skipped.
pub fn resolve_types(declared: &[Type]) -> DynResult<Vec<SqlType>> {
    declared
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            SqlType::from_pg(ty).ok_or_else(|| {
                tracing::warn!(slot = i + 1, ty = %ty, "declared type outside the dispatch taxonomy");
                DynError::UnsupportedType {
                    slot: i + 1,
                    type_name: ty.to_string(),
                }
            })
        })
        .collect()
}

/// Bind one value to one slot according to its declared type.
///
/// `slot` is 1-based. `Null` binds into any slot; otherwise the value's
/// variant must match the declared type exactly.
pub fn bind_slot(
    slot: usize,
    declared: SqlType,
    value: &Value,
) -> DynResult<Box<dyn ToSql + Sync + Send>> {
    let bound: Box<dyn ToSql + Sync + Send> = match (declared, value) {
        (_, Value::Null) => Box::new(Value::Null),
        (SqlType::Text, Value::Text(v)) => Box::new(v.clone()),
        (SqlType::Boolean, Value::Boolean(v)) => Box::new(*v),
        (SqlType::TinyInt, Value::TinyInt(v)) => Box::new(*v),
        (SqlType::SmallInt, Value::SmallInt(v)) => Box::new(*v),
        (SqlType::Integer, Value::Integer(v)) => Box::new(*v),
        (SqlType::BigInt, Value::BigInt(v)) => Box::new(*v),
        (SqlType::Real, Value::Real(v)) => Box::new(*v),
        (SqlType::Double, Value::Double(v)) => Box::new(*v),
        (SqlType::Decimal, Value::Decimal(v)) => Box::new(*v),
        (SqlType::Date, Value::Date(v)) => Box::new(*v),
        (SqlType::Time, Value::Time(v)) => Box::new(*v),
        (SqlType::Timestamp, Value::Timestamp(v)) => Box::new(*v),
        (expected, value) => {
            return Err(DynError::TypeMismatch {
                slot,
                expected,
                found: value.kind(),
            });
        }
    };
    Ok(bound)
}

/// Bind a full value list against the declared slot types.
///
/// Checks the count precondition first, then dispatches slot by slot; the
/// first mismatch aborts with nothing bound downstream.
pub fn bind_all(declared: &[SqlType], values: &[Value]) -> DynResult<BoundParams> {
    check_count(declared.len(), values.len())?;

    let mut params = Vec::with_capacity(values.len());
    for (i, (ty, value)) in declared.iter().zip(values).enumerate() {
        params.push(bind_slot(i + 1, *ty, value)?);
    }
    Ok(BoundParams { params })
}
