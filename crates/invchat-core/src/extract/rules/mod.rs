//! Rule-based parsing of the values a model writes for invoice fields.

pub mod amounts;
pub mod dates;
pub mod fields;
pub mod patterns;

pub use amounts::{detect_currency, parse_amount};
pub use dates::parse_date;
pub use fields::{Field, clean_value, is_absent, normalize_label};
