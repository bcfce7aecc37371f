//! Tabular import for spreadsheet exports.
//!
//! Files arrive as CSV/TSV exported from Excel in whatever code page the
//! workstation used. [`parse_table`] sniffs the encoding and delimiter, splits
//! quote-aware, and coerces numeric cells (Turkish and US number formats).
//! [`ChartData`] turns a table into chart series; [`Table::records`] gives
//! header-keyed access for user imports.

pub mod cell;
pub mod chart;
pub mod decode;
pub mod delimiter;
pub mod error;
pub mod table;

pub use cell::{coerce_cell, Cell};
pub use chart::{ChartData, Series};
pub use decode::{decode_text, Decoded};
pub use delimiter::{detect_delimiter, split_line, DELIMITERS};
pub use error::ImportError;
pub use table::{fold_header, parse_table, RowRef, Table};
