//! Tolerant parsing of extraction replies into invoice records.
//!
//! The model is asked for a JSON object but does not always comply. Rules,
//! in order:
//! 1. Markdown code fences are removed.
//! 2. The span from the first `{` to the last `}` is parsed as JSON. If it is
//!    an object with at least one known key, its values are used. A single
//!    wrapping object (`{"invoice": {...}}`) is unwrapped.
//! 3. Otherwise every `Label: value` line is read.
//!
//! Keys and labels are matched through [`Field::from_label`]. Placeholders
//! such as `null`, `N/A` or `unknown` leave a field empty. A total or date
//! that is present but unparseable leaves the field empty and adds a
//! warning to the record. Nothing here fails: the worst case is an empty
//! record.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::invoice::InvoiceRecord;

use super::rules::patterns::{CODE_FENCE, LABELED_LINE};
use super::rules::{Field, clean_value, detect_currency, is_absent, parse_amount, parse_date};

/// Parse a model reply for the image `source`.
pub fn parse_response(source: &str, text: &str) -> InvoiceRecord {
    let cleaned = CODE_FENCE.replace_all(text, "");

    let pairs = match json_pairs(&cleaned) {
        Some(pairs) => pairs,
        None => {
            debug!("No JSON object in reply for {}, reading labeled lines", source);
            labeled_pairs(&cleaned)
        }
    };

    let mut builder = RecordBuilder::new(source);
    for (field, value) in &pairs {
        builder.apply(*field, value);
    }

    let mut record = builder.finish();
    if record.is_empty() && !text.trim().is_empty() {
        record
            .warnings
            .push("no invoice fields found in model reply".to_string());
    }
    record
}

/// Field/value pairs from the JSON object embedded in `text`.
fn json_pairs(text: &str) -> Option<Vec<(Field, String)>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }

    let Value::Object(mut map) = serde_json::from_str::<Value>(&text[start..=end]).ok()? else {
        return None;
    };

    // {"invoice": {...}} -> {...}
    if map.len() == 1 {
        if let Some(Value::Object(inner)) = map.values().next() {
            map = inner.clone();
        }
    }

    let pairs = object_pairs(&map);
    if pairs.is_empty() { None } else { Some(pairs) }
}

fn object_pairs(map: &Map<String, Value>) -> Vec<(Field, String)> {
    map.iter()
        .filter_map(|(key, value)| {
            let field = Field::from_label(key)?;
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
                Value::Object(inner) => inner.get("name")?.as_str()?.to_string(),
                Value::Bool(_) | Value::Array(_) => return None,
            };
            Some((field, text))
        })
        .collect()
}

/// Field/value pairs from `Label: value` lines, in text order.
fn labeled_pairs(text: &str) -> Vec<(Field, String)> {
    LABELED_LINE
        .captures_iter(text)
        .filter_map(|caps| {
            let field = Field::from_label(&caps[1])?;
            Some((field, caps[2].to_string()))
        })
        .collect()
}

struct RecordBuilder {
    record: InvoiceRecord,
    explicit_currency: bool,
}

impl RecordBuilder {
    fn new(source: &str) -> Self {
        Self {
            record: InvoiceRecord::new(source),
            explicit_currency: false,
        }
    }

    fn apply(&mut self, field: Field, raw: &str) {
        let value = clean_value(raw);
        if is_absent(value) {
            return;
        }

        let record = &mut self.record;
        match field {
            Field::Vendor => {
                record.vendor.get_or_insert_with(|| value.to_string());
            }
            Field::InvoiceNumber => {
                record.invoice_number.get_or_insert_with(|| value.to_string());
            }
            Field::InvoiceDate | Field::DueDate => {
                let slot = if field == Field::InvoiceDate {
                    &mut record.invoice_date
                } else {
                    &mut record.due_date
                };
                if slot.is_some() {
                    return;
                }
                match parse_date(value) {
                    Some(date) => *slot = Some(date),
                    None => record
                        .warnings
                        .push(format!("{}: could not parse date {:?}", field.key(), value)),
                }
            }
            Field::Total => {
                if record.total.is_some() {
                    return;
                }
                match parse_amount(value) {
                    Some(amount) => {
                        record.total = Some(amount);
                        if record.currency.is_none() {
                            record.currency = detect_currency(value);
                        }
                    }
                    None => record
                        .warnings
                        .push(format!("total: could not parse amount {:?}", value)),
                }
            }
            Field::Currency => {
                if !self.explicit_currency {
                    record.currency = Some(value.to_string());
                    self.explicit_currency = true;
                }
            }
        }
    }

    fn finish(self) -> InvoiceRecord {
        self.record
    }
}
