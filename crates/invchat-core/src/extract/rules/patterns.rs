//! Common regex patterns for reading model replies.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Markdown code fence markers (```json, ```)
    pub static ref CODE_FENCE: Regex = Regex::new(
        r"```[A-Za-z0-9_-]*"
    ).unwrap();

    // "Label: value" / "- **Label**: value" / "Label - value" / "\"label\": \"value\","
    pub static ref LABELED_LINE: Regex = Regex::new(
        r#"(?m)^[ \t]*(?:[-*•][ \t]+)?[*"'_]*([A-Za-z][A-Za-z0-9 _./#-]*?)[*"'_]*[ \t]*(?::|[ \t]-[ \t])[ \t]*(.*?)[ \t]*$"#
    ).unwrap();

    // 2019-02-26, 2019/02/26, 2019.02.26
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // 26.02.2019, 02/26/2019, 26-02-19
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})([./\-])(\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    // February 26, 2019 / Feb. 26th 2019
    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4}|\d{2})\b"
    ).unwrap();

    // 26 February 2019 / 26th Feb, 2019 / 26-Feb-2019
    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[\s\-]+([a-z]{3,9})\.?,?[\s\-]+(\d{4}|\d{2})\b"
    ).unwrap();

    // ISO currency codes next to an amount
    pub static ref CURRENCY_CODE: Regex = Regex::new(
        r"\b(USD|EUR|GBP|PLN|CHF|CAD|AUD|JPY|INR|SEK|NOK|DKK|CZK)\b"
    ).unwrap();
}
