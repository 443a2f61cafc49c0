//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so every handler rejects malformed input the
//! same way, before touching the store.

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::Validation(format!("invalid stored currency: {value}")))
}

/// Parse a decimal stored as text (exchange rates, percentages).
pub(crate) fn parse_decimal(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|_| EngineError::Validation(format!("invalid {label}: {value}")))
}

pub(crate) fn require_positive(amount: Money, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::Validation(format!("{label} must be > 0")));
    }
    Ok(())
}

pub(crate) fn require_positive_rate(rate: Decimal) -> ResultEngine<()> {
    if rate <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "exchange_rate must be > 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
