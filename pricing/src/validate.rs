//! Argument guards shared by every engine operation

use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};

/// Coerce `value`, failing when it is not a number
pub(crate) fn numeric<T: Numeric>(field: &'static str, value: T) -> Result<Decimal> {
    value
        .to_decimal()
        .ok_or(PricingError::NotNumeric { field })
}

/// Coerce `value` and require it to be strictly positive
pub(crate) fn positive<T: Numeric>(field: &'static str, value: T) -> Result<Decimal> {
    let value = numeric(field, value)?;
    if !value.is_positive() {
        return Err(PricingError::NonPositive { field, value });
    }
    Ok(value)
}

/// Coerce `value` and require it to be zero or positive
pub(crate) fn non_negative<T: Numeric>(field: &'static str, value: T) -> Result<Decimal> {
    let value = numeric(field, value)?;
    if value.is_negative() {
        return Err(PricingError::Negative { field, value });
    }
    Ok(value)
}

/// Require an already computed intermediate to be strictly positive
pub(crate) fn ensure_positive(field: &'static str, value: Decimal) -> Result<Decimal> {
    if !value.is_positive() {
        return Err(PricingError::NonPositive { field, value });
    }
    Ok(value)
}

/// Divide, reporting a zero divisor against `operation`
pub(crate) fn divide(operation: &'static str, numerator: &Decimal, denominator: &Decimal) -> Result<Decimal> {
    numerator
        .checked_div(denominator)
        .ok_or(PricingError::DivisionByZero(operation))
}
