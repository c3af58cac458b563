//! Prompt construction for questions about a collection.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::invoice::InvoiceCollection;

/// Build the question prompt.
///
/// The prompt carries the records as JSON plus the locally computed
/// figures, and tells the model to rely on those figures instead of doing
/// its own arithmetic.
pub fn build_answer_prompt(
    collection: &InvoiceCollection,
    question: &str,
    today: NaiveDate,
) -> Result<String> {
    let records = serde_json::to_string_pretty(collection)?;
    let figures = collection.summary(today).describe();

    Ok(format!(
        "\
You are a helpful invoice assistant. Answer the user's question based only on the invoice data below.

Today's date is: {today}

Here is the invoice data in JSON format ({count} invoice(s); a null field means it could not be read, and an \"error\" field means the image could not be processed):
{records}

Exact figures computed from this data:
{figures}
When the question involves counting invoices, summing or comparing totals, or overdue amounts, use the exact figures above rather than recalculating them. Never add totals in different currencies together.
An invoice is overdue if its due_date is before today's date.

User's question: \"{question}\"

Please provide a clear and concise answer.",
        today = today.format("%Y-%m-%d"),
        count = collection.len(),
        records = records,
        figures = figures,
        question = question.trim(),
    ))
}
