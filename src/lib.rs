//! # Q-Table Data Pipeline
//!
//! Turns the raw string grid of a Q-Table item and its display options into a
//! render-ready table: typed and formatted cells, an optional color column
//! with legend, optional in-cell minibars and numbered footnotes.
//!
//! ## Features
//!
//! - **Column type inference**: numeric columns are detected from their data rows,
//!   placeholders (`""`, `-`, `–`) never decide a column type
//! - **Locale formatting**: decimal comma, thin-space thousands grouping from 10 000 on,
//!   en-dash minus, percentage and arrow presets, country flag glyphs
//! - **Bucketing**: natural breaks (ckmeans), quantiles, equal widths or custom borders
//! - **Color scales**: sequential and diverging scales, category colors, user overrides
//! - **Legends**: numerical legends with average/median marker, categorical legends
//! - **Minibars**: positive, negative and mixed in-cell bars
//! - **Footnotes**: deduplicated, numbered in reading order, attached to cells
//!
//! ## Usage
//!
//! [`build_context`] takes a [`TableInput`] and returns a [`TableContext`];
//! [`build_context_from_json`] does the same for the JSON form of a request.
//! Every stage is also available on its own in the public modules.

pub mod color;
pub mod context;
pub mod error;
pub mod footnote;
pub mod minibar;
pub mod options;
pub mod table;

mod helpers;

pub use context::{build_context, build_context_from_json, TableContext, TableInput};
pub use error::{QTableError, Result};
pub use helpers::number::{format_number, formatted_value, rounded_value};
pub use options::TableOptions;
pub use table::{process_table, ProcessedTableData};
