//! # dynquery
//!
//! A schema-introspecting dynamic query layer for PostgreSQL.
//!
//! Given only a table name and a list of [`Value`]s, dynquery discovers the
//! table's columns from `pg_catalog`, decides which of them are eligible for
//! generic insertion (database-generated columns are excluded), builds
//! parameterized statement text at runtime, and binds each positional value
//! according to the declared SQL type.
//!
//! ## Design
//!
//! - **Borrowed connection**: every engine instance borrows anything
//!   implementing [`GenericClient`] (`tokio_postgres::Client`,
//!   `tokio_postgres::Transaction`, or `&C`); the engine never owns, pools,
//!   or closes it.
//! - **Typed outcomes**: operations return [`DynResult`]; schema lookup
//!   failures, parameter count mismatches, type mismatches, unsupported
//!   declared types, and execution failures are all distinct error variants.
//! - **Validated identifiers**: table and predicate-column names pass
//!   through [`Ident`] before interpolation, and predicate columns must
//!   exist in the introspected catalog.
//!
//! ## Example
//!
//! ```ignore
//! use dynquery::{DynamicQuery, Value};
//!
//! let dq = DynamicQuery::new(&client);
//!
//! let inserted = dq
//!     .insert_one(
//!         "users",
//!         &[
//!             Value::from("rac"),
//!             Value::from("Rafael Alcocer"),
//!             Value::from("ra@test.com"),
//!             Value::from("515.123.4567"),
//!             Value::from(true),
//!         ],
//!     )
//!     .await?;
//! assert_eq!(inserted, 1);
//!
//! let mut cursor = dq.select("users", "username", &[Value::from("rac")]).await?;
//! while cursor.next() {
//!     println!("{:?}", cursor.current());
//! }
//! ```

pub mod bind;
pub mod catalog;
pub mod client;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod ident;
pub mod sql;
pub mod types;
pub mod value;

pub use bind::BoundParams;
pub use catalog::ColumnDescriptor;
pub use client::GenericClient;
pub use cursor::{Cursor, CursorColumn};
pub use engine::DynamicQuery;
pub use error::{DynError, DynResult};
pub use ident::Ident;
pub use types::SqlType;
pub use value::Value;
