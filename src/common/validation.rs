// src/common/validation.rs

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::common::error::AppError;

/// Validador customizado: campo obrigatório mesmo depois do trim.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("required")));
    }
    Ok(())
}

/// Monta um AppError::ValidationError com um único campo.
/// `code` também é a chave da mensagem no I18nStore.
pub fn field_error(field: &'static str, code: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(Cow::Borrowed(code)));
    AppError::ValidationError(errors)
}

pub fn ensure_not_blank(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(field_error(field, "required"));
    }
    Ok(())
}

pub fn ensure_non_negative(field: &'static str, value: Option<Decimal>) -> Result<(), AppError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(field_error(field, "non_negative")),
        _ => Ok(()),
    }
}

pub fn ensure_positive(field: &'static str, value: Decimal) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(field_error(field, "positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank(" Bob ").is_ok());
    }

    #[test]
    fn negative_amounts_are_rejected_but_zero_is_fine() {
        assert!(ensure_non_negative("hourlyRate", Some(Decimal::new(-1, 2))).is_err());
        assert!(ensure_non_negative("hourlyRate", Some(Decimal::ZERO)).is_ok());
        assert!(ensure_non_negative("hourlyRate", None).is_ok());
    }

    #[test]
    fn positive_requires_strictly_greater_than_zero() {
        assert!(ensure_positive("quantity", Decimal::ZERO).is_err());
        assert!(ensure_positive("quantity", Decimal::ONE).is_ok());
    }
}
