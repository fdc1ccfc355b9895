//! Locale-aware number normalization.
//!
//! Amounts on Italian documents use `.` for thousands and `,` for decimals,
//! but documents from other systems mix in the English convention. The rules:
//!
//! - currency markers (`€`, `$`, `EUR`), percent signs and whitespace are
//!   stripped; anything else left besides digits and separators makes the
//!   value unparseable;
//! - a sign is either leading (`-12,50`) or trailing (`12,50-`);
//! - with both separators present, whichever comes last is the decimal point;
//! - with only commas, the last comma is the decimal point;
//! - with only periods, the value is read as-is, unless it has the strict
//!   thousands shape `1.234` / `1.234.567` (no leading zero), which is read
//!   as an integer.
//!
//! Unparseable input normalizes to zero.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::THOUSANDS_GROUPED;

/// Parse a locale-ambiguous number, `None` when it is not a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '%'))
        .collect::<String>()
        .to_ascii_uppercase()
        .replace("EUR", "");

    let (negative, body) = if let Some(rest) = stripped.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = stripped.strip_suffix('-') {
        (true, rest)
    } else {
        (false, stripped.strip_prefix('+').unwrap_or(stripped.as_str()))
    };

    if !body.chars().any(|c| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let normalized = match (body.rfind(','), body.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => body.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => body.replace(',', ""),
        (Some(comma), None) => {
            let (integer, fraction) = body.split_at(comma);
            format!("{}.{}", integer.replace(',', ""), &fraction[1..])
        }
        (None, Some(_)) if THOUSANDS_GROUPED.is_match(body) => body.replace('.', ""),
        _ => body.to_string(),
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a number, falling back to zero.
pub fn normalize_number(s: &str) -> Decimal {
    parse_amount(s).unwrap_or(Decimal::ZERO)
}

/// Parse a count (packages, pieces), falling back to zero.
pub fn normalize_count(s: &str) -> u32 {
    use rust_decimal::prelude::ToPrimitive;

    normalize_number(s)
        .trunc()
        .to_u32()
        .unwrap_or(0)
}

/// Format an amount Italian style (1.234,56).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_later_separator_is_decimal() {
        assert_eq!(normalize_number("1.234,56"), dec("1234.56"));
        assert_eq!(normalize_number("1,234.56"), dec("1234.56"));
        assert_eq!(normalize_number("12.345.678,90"), dec("12345678.90"));
    }

    #[test]
    fn test_comma_only_is_decimal() {
        assert_eq!(normalize_number("1234,56"), dec("1234.56"));
        assert_eq!(normalize_number("1,9000"), dec("1.9"));
    }

    #[test]
    fn test_period_only() {
        assert_eq!(normalize_number("1.234"), dec("1234"));
        assert_eq!(normalize_number("1.234.567"), dec("1234567"));
        assert_eq!(normalize_number("1234.56"), dec("1234.56"));
        assert_eq!(normalize_number("12.5"), dec("12.5"));
    }

    #[test]
    fn test_symbols_stripped() {
        assert_eq!(normalize_number("€ 325,37"), dec("325.37"));
        assert_eq!(normalize_number("15,00%"), dec("15"));
        assert_eq!(normalize_number("$1,234.50"), dec("1234.50"));
        assert_eq!(normalize_number("-12,50"), dec("-12.50"));
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(normalize_number(""), Decimal::ZERO);
        assert_eq!(normalize_number("abc"), Decimal::ZERO);
        assert_eq!(normalize_number("€"), Decimal::ZERO);
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn test_text_residue_is_not_a_number() {
        assert_eq!(normalize_number("12abc"), Decimal::ZERO);
        assert_eq!(normalize_number("3/06/25"), Decimal::ZERO);
        assert_eq!(normalize_number("2 x 500"), Decimal::ZERO);
        assert_eq!(parse_amount("10-20"), None);
        assert_eq!(normalize_number("EUR 1.250,00"), dec("1250.00"));
        assert_eq!(normalize_number("1 250,00 €"), dec("1250.00"));
    }

    #[test]
    fn test_leading_zero_is_not_grouping() {
        assert_eq!(normalize_number("0.500"), dec("0.5"));
        assert_eq!(normalize_number("000.250"), dec("0.25"));
        assert_eq!(normalize_number("10.500"), dec("10500"));
    }

    #[test]
    fn test_trailing_minus() {
        assert_eq!(normalize_number("12,50-"), dec("-12.50"));
        assert_eq!(normalize_number("€ 1.000,00-"), dec("-1000.00"));
        assert_eq!(normalize_number("+3,5"), dec("3.5"));
    }

    #[test]
    fn test_normalize_count() {
        assert_eq!(normalize_count("12"), 12);
        assert_eq!(normalize_count("3,0"), 3);
        assert_eq!(normalize_count("-"), 0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1.234,56");
        assert_eq!(format_amount(dec("325.37")), "325,37");
        assert_eq!(format_amount(dec("12345678.9")), "12.345.678,90");
        assert_eq!(format_amount(dec("-1500")), "-1.500,00");
    }
}
