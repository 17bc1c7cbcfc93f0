//! Model to entity mappers
//!
//! `From<Model> for Entity` converts database rows to domain objects. Text
//! columns that hold enums are guarded by CHECK constraints; a value the
//! domain does not know falls back to the type's default.

mod comment;
mod post;
mod stats;
mod user;

use std::str::FromStr;

/// Parse an enum column, logging and defaulting on an unknown value
fn parse_column<T>(table: &'static str, column: &'static str, raw: &str) -> T
where
    T: FromStr + Default,
{
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(table, column, value = raw, "Unknown enum value in column");
        T::default()
    })
}
