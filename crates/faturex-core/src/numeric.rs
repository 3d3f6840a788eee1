//! pt-BR numeric normalization.

use rust_decimal::Decimal;

use crate::error::ExtractError;
use crate::models::record::FieldKey;

/// Parse a pt-BR formatted number (e.g. "1.234,56") into a [`Decimal`].
///
/// Dots are thousands separators and are dropped; the comma is the decimal
/// mark. Trailing zeros survive, so "120,000" keeps its three decimal
/// places. Anything that does not parse after the rewrite is reported as a
/// malformed number together with the original text.
pub fn parse_decimal_br(field: FieldKey, value: &str) -> Result<Decimal, ExtractError> {
    let cleaned = value.trim().replace('.', "").replace(',', ".");

    cleaned
        .parse::<Decimal>()
        .map_err(|_| ExtractError::MalformedNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Result<Decimal, ExtractError> {
        parse_decimal_br(FieldKey::TotalAmount, value)
    }

    #[test]
    fn test_thousands_and_decimal_separators() {
        assert_eq!(parse("1.234,56").unwrap(), "1234.56".parse().unwrap());
        assert_eq!(parse("1.234.567,89").unwrap(), "1234567.89".parse().unwrap());
        assert_eq!(parse("270,00").unwrap(), "270.00".parse().unwrap());
    }

    #[test]
    fn test_trailing_zeros_keep_scale() {
        let volume = parse("120,000").unwrap();
        assert_eq!(volume, "120.000".parse().unwrap());
        assert_eq!(volume.scale(), 3);
        assert_eq!(volume.to_string(), "120.000");
    }

    #[test]
    fn test_plain_integer_passes_through() {
        assert_eq!(parse("1234").unwrap(), "1234".parse().unwrap());
        assert_eq!(parse(" 42 ").unwrap(), "42".parse().unwrap());
    }

    #[test]
    fn test_dot_only_value_is_a_thousands_separator() {
        assert_eq!(parse("1.234").unwrap(), "1234".parse().unwrap());
    }

    #[test]
    fn test_multiple_commas_are_malformed() {
        let err = parse("12,34,56").unwrap_err();
        match err {
            ExtractError::MalformedNumber { field, value } => {
                assert_eq!(field, FieldKey::TotalAmount);
                assert_eq!(value, "12,34,56");
            }
            other => panic!("expected MalformedNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_text_values_are_malformed() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("abc").is_err());
        assert!(parse("R$ 10,00").is_err());
    }
}
