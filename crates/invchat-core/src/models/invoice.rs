//! Extracted invoice records and the collection built from one run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::summary::CollectionSummary;

/// Structured fields read from one invoice image.
///
/// Every field is optional: the model may not find it, or may return
/// something that does not parse. A record with no fields at all is still a
/// valid record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// File name of the source image.
    pub source: String,

    /// Name of the company that sent the invoice.
    pub vendor: Option<String>,

    /// Invoice identifier as printed.
    pub invoice_number: Option<String>,

    /// Date the invoice was issued.
    pub invoice_date: Option<NaiveDate>,

    /// Payment due date.
    pub due_date: Option<NaiveDate>,

    /// Total amount due.
    pub total: Option<Decimal>,

    /// Currency code or symbol, when the model reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Set when the image could not be processed at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Fields that were present in the reply but could not be parsed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl InvoiceRecord {
    /// An empty record for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// A record for an image that failed to process.
    pub fn failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// True if no invoice field was extracted.
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none()
            && self.invoice_number.is_none()
            && self.invoice_date.is_none()
            && self.due_date.is_none()
            && self.total.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Vendor name, or `"unknown"`.
    pub fn vendor_or_unknown(&self) -> &str {
        self.vendor.as_deref().unwrap_or("unknown")
    }
}

/// Insertion-ordered records from one extraction run.
///
/// Built once by the extractor; there is no way to add or change records
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InvoiceCollection {
    records: Vec<InvoiceRecord>,
}

impl InvoiceCollection {
    pub fn new(records: Vec<InvoiceRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InvoiceRecord> {
        self.records.iter()
    }

    /// Number of records carrying an error marker.
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }

    /// Aggregate figures computed locally.
    pub fn summary(&self, today: NaiveDate) -> CollectionSummary {
        CollectionSummary::compute(self, today)
    }
}

impl FromIterator<InvoiceRecord> for InvoiceCollection {
    fn from_iter<I: IntoIterator<Item = InvoiceRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a InvoiceCollection {
    type Item = &'a InvoiceRecord;
    type IntoIter = std::slice::Iter<'a, InvoiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
