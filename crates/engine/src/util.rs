//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB. A bad stored value is a store
/// problem, not a caller one.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::CorruptRow(format!("invalid stored currency {value:?}")))
}

/// `true` when the store rejected a write because of a unique/primary key.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
