//! Locally computed aggregates over an invoice collection.
//!
//! Counting and summing are done here, deterministically, and the results
//! are handed to the model as exact figures. Amounts are only ever added
//! within one currency; a record without a currency forms its own group.

use std::fmt::Write as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::invoice::InvoiceCollection;

/// Exact figures derived from a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    /// Number of records, including failed ones.
    pub invoice_count: usize,
    /// Records that failed to process.
    pub failed_count: usize,
    /// Records with a known total.
    pub with_total_count: usize,
    /// Known totals per currency, in first-seen order.
    pub by_currency: Vec<CurrencySummary>,
    /// Known totals per vendor, in first-seen order.
    pub by_vendor: Vec<VendorTotal>,
    /// Records whose due date is before `as_of`.
    pub overdue_count: usize,
    /// Known totals of overdue records, per currency.
    pub overdue_totals: Vec<CurrencyTotal>,
    /// Date overdue status is evaluated against.
    pub as_of: NaiveDate,
}

/// A pointer to one record's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountRef {
    pub source: String,
    pub vendor: String,
    pub amount: Decimal,
}

/// Count and sum of totals sharing one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyTotal {
    /// `None` groups records that state no currency.
    pub currency: Option<String>,
    pub count: usize,
    /// `None` once the sum no longer fits in a `Decimal`.
    pub sum: Option<Decimal>,
}

/// Totals and extremes for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencySummary {
    #[serde(flatten)]
    pub total: CurrencyTotal,
    /// Largest total in this currency (first one on ties).
    pub largest: AmountRef,
    /// Smallest total in this currency (first one on ties).
    pub smallest: AmountRef,
}

/// Invoice count and per-currency totals for one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub count: usize,
    pub totals: Vec<CurrencyTotal>,
}

impl CurrencyTotal {
    fn new(currency: Option<&str>) -> Self {
        Self {
            currency: currency.map(str::to_string),
            count: 0,
            sum: Some(Decimal::ZERO),
        }
    }

    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.sum = self.sum.and_then(|sum| sum.checked_add(amount));
    }

    fn matches(&self, currency: Option<&str>) -> bool {
        match (self.currency.as_deref(), currency) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Add `amount` to the group for `currency`, creating it if needed.
fn add_to(groups: &mut Vec<CurrencyTotal>, currency: Option<&str>, amount: Decimal) {
    match groups.iter_mut().find(|g| g.matches(currency)) {
        Some(group) => group.add(amount),
        None => {
            let mut group = CurrencyTotal::new(currency);
            group.add(amount);
            groups.push(group);
        }
    }
}

impl CollectionSummary {
    pub fn compute(collection: &InvoiceCollection, as_of: NaiveDate) -> Self {
        let mut summary = Self {
            invoice_count: collection.len(),
            failed_count: collection.failed_count(),
            with_total_count: 0,
            by_currency: Vec::new(),
            by_vendor: Vec::new(),
            overdue_count: 0,
            overdue_totals: Vec::new(),
            as_of,
        };

        for record in collection {
            let vendor = record.vendor_or_unknown();
            let currency = record.currency.as_deref();

            let entry = match summary
                .by_vendor
                .iter()
                .position(|v| v.vendor.eq_ignore_ascii_case(vendor))
            {
                Some(idx) => &mut summary.by_vendor[idx],
                None => {
                    summary.by_vendor.push(VendorTotal {
                        vendor: vendor.to_string(),
                        count: 0,
                        totals: Vec::new(),
                    });
                    let last = summary.by_vendor.len() - 1;
                    &mut summary.by_vendor[last]
                }
            };
            entry.count += 1;

            let overdue = record.due_date.is_some_and(|due| due < as_of);
            if overdue {
                summary.overdue_count += 1;
            }

            let Some(total) = record.total else {
                continue;
            };
            add_to(&mut entry.totals, currency, total);
            summary.with_total_count += 1;
            if overdue {
                add_to(&mut summary.overdue_totals, currency, total);
            }

            let amount_ref = || AmountRef {
                source: record.source.clone(),
                vendor: vendor.to_string(),
                amount: total,
            };
            match summary
                .by_currency
                .iter_mut()
                .find(|c| c.total.matches(currency))
            {
                Some(group) => {
                    group.total.add(total);
                    if total > group.largest.amount {
                        group.largest = amount_ref();
                    }
                    if total < group.smallest.amount {
                        group.smallest = amount_ref();
                    }
                }
                None => {
                    let mut group = CurrencyTotal::new(currency);
                    group.add(total);
                    summary.by_currency.push(CurrencySummary {
                        total: group,
                        largest: amount_ref(),
                        smallest: amount_ref(),
                    });
                }
            }
        }

        summary
    }

    /// Whether known totals come in more than one currency.
    pub fn is_mixed_currency(&self) -> bool {
        self.by_currency.len() > 1
    }

    /// Render as plain-text lines for a prompt.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let mixed = self.is_mixed_currency();

        let _ = writeln!(out, "- Number of invoices: {}", self.invoice_count);
        if self.failed_count > 0 {
            let _ = writeln!(
                out,
                "- Invoices that could not be read: {}",
                self.failed_count
            );
        }

        if self.by_currency.is_empty() {
            let _ = writeln!(
                out,
                "- Sum of all known totals: 0 (no invoice has a known total)"
            );
        }
        for group in &self.by_currency {
            let label = currency_label(group.total.currency.as_deref(), mixed);
            let _ = writeln!(
                out,
                "- Sum of all known totals{}: {} (across {} invoice(s) with a known total)",
                label,
                format_sum(group.total.sum),
                group.total.count
            );
            let _ = writeln!(
                out,
                "- Largest invoice{}: {} from {} ({})",
                label, group.largest.amount, group.largest.vendor, group.largest.source
            );
            let _ = writeln!(
                out,
                "- Smallest invoice{}: {} from {} ({})",
                label, group.smallest.amount, group.smallest.vendor, group.smallest.source
            );
        }
        if mixed {
            let _ = writeln!(
                out,
                "- Totals are in different currencies and must not be added together."
            );
        }

        for vendor in &self.by_vendor {
            let _ = writeln!(
                out,
                "- {}: {} invoice(s), total {}",
                vendor.vendor,
                vendor.count,
                format_totals(&vendor.totals)
            );
        }
        let _ = writeln!(
            out,
            "- Overdue as of {}: {} invoice(s), total {}",
            self.as_of,
            self.overdue_count,
            format_totals(&self.overdue_totals)
        );

        out
    }
}

fn currency_label(currency: Option<&str>, mixed: bool) -> String {
    match currency {
        Some(code) => format!(" in {}", code),
        None if mixed => " with no stated currency".to_string(),
        None => String::new(),
    }
}

fn format_sum(sum: Option<Decimal>) -> String {
    match sum {
        Some(sum) => sum.round_dp(2).to_string(),
        None => "too large to compute".to_string(),
    }
}

/// `154.06`, `100 USD + 100 JPY`, or `0` when nothing is known.
fn format_totals(totals: &[CurrencyTotal]) -> String {
    if totals.is_empty() {
        return "0".to_string();
    }
    totals
        .iter()
        .map(|group| match &group.currency {
            Some(code) => format!("{} {}", format_sum(group.sum), code),
            None => format_sum(group.sum),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceRecord;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(source: &str, vendor: &str, total: &str, due: NaiveDate) -> InvoiceRecord {
        InvoiceRecord {
            vendor: Some(vendor.to_string()),
            total: Some(dec(total)),
            due_date: Some(due),
            ..InvoiceRecord::new(source)
        }
    }

    fn sample() -> InvoiceCollection {
        InvoiceCollection::new(vec![
            record("1.png", "East Repair Inc.", "77.03", date(2019, 2, 26)),
            record("2.png", "Microsoft", "3100.00", date(2030, 1, 1)),
            record("3.png", "East Repair Inc.", "77.03", date(2019, 2, 26)),
        ])
    }

    #[test]
    fn test_totals() {
        let summary = sample().summary(date(2024, 6, 1));

        assert_eq!(summary.invoice_count, 3);
        assert_eq!(summary.with_total_count, 3);
        assert_eq!(summary.by_currency.len(), 1);

        let group = &summary.by_currency[0];
        assert_eq!(group.total.sum, Some(dec("3254.06")));
        assert_eq!(group.largest.vendor, "Microsoft");
        assert_eq!(group.smallest.source, "1.png");
    }

    #[test]
    fn test_by_vendor_in_first_seen_order() {
        let summary = sample().summary(date(2024, 6, 1));

        assert_eq!(
            summary.by_vendor,
            vec![
                VendorTotal {
                    vendor: "East Repair Inc.".into(),
                    count: 2,
                    totals: vec![CurrencyTotal { currency: None, count: 2, sum: Some(dec("154.06")) }],
                },
                VendorTotal {
                    vendor: "Microsoft".into(),
                    count: 1,
                    totals: vec![CurrencyTotal { currency: None, count: 1, sum: Some(dec("3100.00")) }],
                },
            ]
        );
    }

    #[test]
    fn test_overdue() {
        let summary = sample().summary(date(2024, 6, 1));

        assert_eq!(summary.overdue_count, 2);
        assert_eq!(
            summary.overdue_totals,
            vec![CurrencyTotal { currency: None, count: 2, sum: Some(dec("154.06")) }]
        );
    }

    #[test]
    fn test_missing_totals_and_failures() {
        let collection = InvoiceCollection::new(vec![
            InvoiceRecord::failed("bad.png", "timeout"),
            InvoiceRecord {
                vendor: Some("ACME".into()),
                ..InvoiceRecord::new("nototal.png")
            },
        ]);
        let summary = collection.summary(date(2024, 6, 1));

        assert_eq!(summary.invoice_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.with_total_count, 0);
        assert!(summary.by_currency.is_empty());
        assert_eq!(summary.by_vendor[0].vendor, "unknown");
    }

    #[test]
    fn test_empty_collection() {
        let summary = InvoiceCollection::empty().summary(date(2024, 6, 1));
        let text = summary.describe();

        assert!(text.contains("- Number of invoices: 0"));
        assert!(text.contains("- Sum of all known totals: 0"));
    }

    #[test]
    fn test_describe_contains_exact_sum() {
        let text = sample().summary(date(2024, 6, 1)).describe();

        assert!(text.contains("- Number of invoices: 3"));
        assert!(text.contains("- Sum of all known totals: 3254.06"));
        assert!(text.contains("- East Repair Inc.: 2 invoice(s), total 154.06"));
        assert!(!text.contains("different currencies"));
    }

    fn priced(source: &str, vendor: &str, total: &str, currency: Option<&str>) -> InvoiceRecord {
        InvoiceRecord {
            vendor: Some(vendor.to_string()),
            total: Some(dec(total)),
            currency: currency.map(str::to_string),
            ..InvoiceRecord::new(source)
        }
    }

    #[test]
    fn test_mixed_currencies_are_summed_separately() {
        let collection = InvoiceCollection::new(vec![
            priced("a.png", "ACME", "100", Some("USD")),
            priced("b.png", "ACME", "100", Some("JPY")),
            priced("c.png", "Globex", "25.50", Some("usd")),
            priced("d.png", "Initech", "7", None),
        ]);
        let summary = collection.summary(date(2024, 6, 1));

        assert!(summary.is_mixed_currency());
        assert_eq!(
            summary
                .by_currency
                .iter()
                .map(|g| g.total.clone())
                .collect::<Vec<_>>(),
            vec![
                CurrencyTotal { currency: Some("USD".into()), count: 2, sum: Some(dec("125.50")) },
                CurrencyTotal { currency: Some("JPY".into()), count: 1, sum: Some(dec("100")) },
                CurrencyTotal { currency: None, count: 1, sum: Some(dec("7")) },
            ]
        );

        let text = summary.describe();
        assert!(text.contains("- Sum of all known totals in USD: 125.50 (across 2 invoice(s)"));
        assert!(text.contains("- Sum of all known totals in JPY: 100 (across 1 invoice(s)"));
        assert!(text.contains("- Sum of all known totals with no stated currency: 7"));
        assert!(text.contains("- ACME: 2 invoice(s), total 100 USD + 100 JPY"));
        assert!(text.contains("must not be added together"));
        assert!(!text.contains("200"));
    }

    #[test]
    fn test_overflowing_sum_is_marked_not_panicking() {
        let max = "79228162514264337593543950335";
        let collection = InvoiceCollection::new(vec![
            priced("a.png", "Big", max, None),
            priced("b.png", "Big", max, None),
        ]);
        let summary = collection.summary(date(2024, 6, 1));

        assert_eq!(summary.with_total_count, 2);
        assert_eq!(summary.by_currency[0].total.sum, None);
        assert_eq!(summary.by_vendor[0].totals[0].sum, None);

        let text = summary.describe();
        assert!(text.contains("- Sum of all known totals: too large to compute (across 2"));
        assert!(text.contains("- Big: 2 invoice(s), total too large to compute"));
    }
}
