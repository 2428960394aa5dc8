// src/database/types.rs
use std::str::FromStr;

use crate::errors::FreightDeskError;

/// Parse a TEXT column holding one of a closed set of values
pub(crate) fn decode_text<T: FromStr>(column: &str, value: &str) -> Result<T, FreightDeskError> {
    value
        .parse()
        .map_err(|_| FreightDeskError::DecodeError(format!("{} '{}'", column, value)))
}

/// `%term%` for ILIKE, with wildcards in the term escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Map a unique-key violation to `AlreadyExists`
pub(crate) fn unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> FreightDeskError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            FreightDeskError::AlreadyExists(message())
        }
        _ => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateType, VesselClass};

    #[test]
    fn decodes_known_values() {
        let class: VesselClass = decode_text("vessel_type", "LR2").unwrap();
        assert_eq!(class, VesselClass::Lr2);
        let err = decode_text::<RateType>("rate_type", "lumpsum").unwrap_err();
        assert!(matches!(err, FreightDeskError::DecodeError(_)));
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(contains_pattern(" td3 "), "%td3%");
        assert_eq!(contains_pattern("50%_a"), "%50\\%\\_a%");
    }
}
