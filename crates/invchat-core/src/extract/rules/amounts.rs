//! Amount parsing for model replies.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::CURRENCY_CODE;

/// Parse a money amount as the model tends to write it.
///
/// Accepts `3100.00`, `3,100.00`, `3.100,00`, `1 234,56`, `$77.03`,
/// `USD 77.03`, `-12.50` and `(12.50)`. Returns `None` when the text holds no
/// digits or the digits do not form a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let first_digit = s.find(|c: char| c.is_ascii_digit())?;
    let last_digit = s.rfind(|c: char| c.is_ascii_digit())?;

    let prefix = &s[..first_digit];
    let negative = prefix.contains('-') || (prefix.contains('(') && s[last_digit..].contains(')'));

    let body = &s[first_digit..=last_digit];
    if body
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, ',' | '.' | ' ' | '\'' | '\u{00a0}' | '\u{202f}')))
    {
        return None;
    }

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both separators: whichever comes last is the decimal point.
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            // A lone comma before one or two digits is a decimal comma.
            let single = cleaned.matches(',').count() == 1;
            if single && (1..=2).contains(&(cleaned.len() - c - 1)) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Currency symbol or ISO code written next to an amount.
pub fn detect_currency(s: &str) -> Option<String> {
    if let Some(caps) = CURRENCY_CODE.captures(s) {
        return Some(caps[1].to_string());
    }

    let code = if s.contains('$') {
        "USD"
    } else if s.contains('€') {
        "EUR"
    } else if s.contains('£') {
        "GBP"
    } else if s.contains("zł") {
        "PLN"
    } else {
        return None;
    };
    Some(code.to_string())
}
