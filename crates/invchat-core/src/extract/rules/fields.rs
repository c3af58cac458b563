//! Field names and the labels the model may use for them.

/// An invoice field the extractor asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Vendor,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    Total,
    Currency,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Vendor,
        Field::InvoiceNumber,
        Field::InvoiceDate,
        Field::DueDate,
        Field::Total,
        Field::Currency,
    ];

    /// Canonical JSON key.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Vendor => "vendor",
            Field::InvoiceNumber => "invoice_number",
            Field::InvoiceDate => "invoice_date",
            Field::DueDate => "due_date",
            Field::Total => "total",
            Field::Currency => "currency",
        }
    }

    /// Accepted labels, already normalised (see [`normalize_label`]).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Vendor => &["vendor", "vendor_name", "seller", "seller_name", "company", "from"],
            Field::InvoiceNumber => &[
                "invoice_number",
                "invoice_no",
                "invoice_id",
                "invoice_#",
                "invoice",
                "number",
            ],
            Field::InvoiceDate => &["invoice_date", "date", "issue_date", "date_issued"],
            Field::DueDate => &["due_date", "payment_due", "payment_due_date", "due"],
            Field::Total => &[
                "total",
                "total_amount",
                "total_due",
                "amount_due",
                "balance_due",
                "amount",
            ],
            Field::Currency => &["currency", "currency_code"],
        }
    }

    /// Map a label from a reply to a field.
    pub fn from_label(label: &str) -> Option<Field> {
        let normalized = normalize_label(label);
        Field::ALL
            .into_iter()
            .find(|field| field.aliases().contains(&normalized.as_str()))
    }
}

/// Lowercase, trim, and join words with underscores.
///
/// `"Invoice Number"`, `"invoice-number"` and `"INVOICE_NUMBER"` all become
/// `"invoice_number"`; `"Invoice No."` becomes `"invoice_no"`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches('.')
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Strip quoting and trailing punctuation left over from JSON-ish lines.
pub fn clean_value(value: &str) -> &str {
    value
        .trim()
        .trim_end_matches(',')
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '*')
        .trim()
}

/// Whether a value means "not present".
pub fn is_absent(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "" | "-" | "null" | "none" | "n/a" | "na" | "unknown" | "not found" | "not available"
    )
}
