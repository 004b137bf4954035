//! # Template Context
//!
//! Entry point of the pipeline. Validates the input, formats the table and
//! computes the optional features. Minibar, color column and footnotes are
//! computed independently; a failing color column is logged and left out
//! instead of failing the whole table.
use crate::color::{color_column, ColorColumn};
use crate::error::{ResultMessage, Result as PipelineResult};
use crate::footnote::{annotate, structured_footnotes, FootnoteAnnotation, StructuredFootnote};
use crate::minibar::{minibar, Minibar};
use crate::options::{ColumnSorting, PageSize, TableOptions};
use crate::table::{process_table, ProcessedTableData, RawTable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Below this width in pixels, `cardLayoutIfSmall` switches to card layout.
pub const CARD_LAYOUT_BREAKPOINT: f64 = 400.0;

/// Tables with up to this many data rows are shown on one page by default.
pub const SINGLE_PAGE_ROWS: usize = 15;

/// Rows per page of longer tables when the page size is automatic.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Everything a render request provides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInput {
    pub data: RawTable,
    /// Footnote annotations in raw table coordinates
    #[serde(default)]
    pub metadata: Vec<FootnoteAnnotation>,
    #[serde(default)]
    pub options: TableOptions,
    /// Render width in pixels, unknown when absent
    #[serde(default)]
    pub width: Option<f64>,
}

impl TableInput {
    /// Parses a render request from its JSON form.
    pub fn from_json(json: &str) -> PipelineResult<TableInput> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Render-ready result of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContext {
    pub table: ProcessedTableData,
    pub footnotes: Vec<StructuredFootnote>,
    pub minibar: Minibar,
    pub color_column: Option<ColorColumn>,
    pub hide_table_header: bool,
    pub uses_card_layout: bool,
    pub page_size: usize,
    pub number_of_hidden_rows: usize,
    pub show_search: bool,
    pub initial_sorting: Option<ColumnSorting>,
    pub frozen_row: Option<usize>,
}

/// Builds the template context of a render request.
pub fn build_context(input: &TableInput) -> Result<TableContext> {
    let options = &input.options;
    let processed = process_table(&input.data, options).context("Failed to process table data")?;

    let minibar = minibar(&processed, options.minibar.as_ref());

    let color_column = match &options.color_column {
        Some(color_options) => match color_column(&input.data, color_options, input.width).with_prefix("colorColumn") {
            Ok(color_column) => color_column,
            Err(error) => {
                warn!(%error, "color column left out");
                None
            }
        },
        None => None,
    };

    let footnotes = structured_footnotes(&input.metadata, options.hide_table_header);
    let table = if footnotes.is_empty() {
        processed
    } else {
        annotate(&processed, &footnotes, options)
    };

    let rows = table.row_count();
    let page_size = page_size(options.page_size, rows);
    let context = TableContext {
        footnotes,
        minibar,
        color_column,
        hide_table_header: options.hide_table_header,
        uses_card_layout: uses_card_layout(options, input.width),
        page_size,
        number_of_hidden_rows: rows.saturating_sub(page_size),
        show_search: options.show_table_search && rows > page_size,
        initial_sorting: options.sorting.first().cloned(),
        frozen_row: options.frozen_row_key,
        table,
    };
    debug!(
        rows,
        page_size,
        card_layout = context.uses_card_layout,
        minibar = context.minibar.is_active(),
        color_column = context.color_column.is_some(),
        sorting = ?options.sorting.first().map(|sorting| sorting.sorting_direction.as_str()),
        "built table context"
    );
    Ok(context)
}

/// Builds the template context from a JSON render request.
/// A `width` argument takes precedence over the width in the request.
pub fn build_context_from_json(json: &str, width: Option<f64>) -> Result<TableContext> {
    let mut input = TableInput::from_json(json).context("Failed to parse table input")?;
    if width.is_some() {
        input.width = width;
    }
    build_context(&input)
}

/// Cards replace rows when forced, or on small screens when allowed.
pub fn uses_card_layout(options: &TableOptions, width: Option<f64>) -> bool {
    options.card_layout
        || (options.card_layout_if_small && width.map(|width| width < CARD_LAYOUT_BREAKPOINT).unwrap_or(false))
}

/// Rows shown per page.
pub fn page_size(page_size: PageSize, rows: usize) -> usize {
    match page_size {
        PageSize::Rows(size) => size,
        PageSize::Auto if rows <= SINGLE_PAGE_ROWS => rows,
        PageSize::Auto => DEFAULT_PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minibar::MinibarType;
    use crate::options::SortingDirection;
    use crate::table::ColumnType;
    use serde_json::json;

    fn countries(options: serde_json::Value) -> String {
        json!({
            "data": [
                ["Land", "Punkte"],
                ["Schweiz", "10000000"],
                ["Deutschland", "20000000"],
                ["Frankreich", "355547.5"],
                ["Österreich", "-3500000"]
            ],
            "metadata": [
                { "rowIndex": 1, "colIndex": 1, "footnote": "Schätzung" },
                { "rowIndex": 3, "colIndex": 1, "footnote": "Schätzung" }
            ],
            "options": options
        })
        .to_string()
    }

    #[test]
    fn countries_end_to_end() {
        let context = build_context_from_json(&countries(json!({})), None).unwrap();
        assert_eq!(context.table.column_types, vec![ColumnType::Text, ColumnType::Numeric]);
        assert_eq!(context.table.rows[0][1].label, "10\u{2005}000\u{2005}000");
        assert_eq!(context.table.rows[3][1].label, "\u{2013}3\u{2005}500\u{2005}000");
        assert_eq!(context.footnotes.len(), 1);
        assert_eq!(context.table.rows[0][1].footnote, "1");
        assert_eq!(context.table.rows[2][1].footnote, "1");
        assert!(context.table.rows[0][1]
            .classes
            .contains(&"q-table-footnote-last-column--single".to_owned()));
        assert!(!context.minibar.is_active());
        assert!(context.color_column.is_none());
        assert_eq!(context.page_size, 4);
        assert_eq!(context.number_of_hidden_rows, 0);
        assert!(!context.uses_card_layout);
    }

    #[test]
    fn features_are_computed_together() {
        let options = json!({
            "minibar": { "selectedColumn": 1 },
            "colorColumn": {
                "selectedColumn": 1,
                "numericalOptions": { "bucketType": "quantile", "numberBuckets": 2 }
            },
            "sorting": [{ "column": 1, "sortingDirection": "desc" }]
        });
        let context = build_context_from_json(&countries(options), Some(800.0)).unwrap();
        assert_eq!(context.minibar.kind, MinibarType::Mixed);
        assert_eq!(context.minibar.values[1], 100.0);
        let color_column = context.color_column.unwrap();
        assert_eq!(color_column.colors.len(), 4);
        assert!(color_column.method_box.is_some());
        assert_eq!(context.initial_sorting.unwrap().sorting_direction, SortingDirection::Desc);
        assert!(context.table.rows[0][1]
            .classes
            .contains(&"q-table-footnote-minibar--single".to_owned()));
    }

    #[test]
    fn failing_color_column_is_left_out() {
        let options = json!({
            "minibar": { "selectedColumn": 1 },
            "colorColumn": {
                "selectedColumn": 1,
                "numericalOptions": { "bucketType": "custom", "customBuckets": "0, viel" }
            }
        });
        let context = build_context_from_json(&countries(options), None).unwrap();
        assert!(context.color_column.is_none());
        assert!(context.minibar.is_active());
        assert_eq!(context.table.row_count(), 4);
    }

    #[test]
    fn malformed_options_keep_the_table() {
        let options = json!({
            "minibar": { "selectedColumn": 1 },
            "colorColumn": {
                "selectedColumn": 1,
                "numericalOptions": { "scale": "diagonal-2" }
            },
            "formatting": [{ "column": 1, "formattingType": "0.0000" }]
        });
        let context = build_context_from_json(&countries(options), None).unwrap();
        assert!(context.color_column.is_none());
        assert!(context.minibar.is_active());
        assert_eq!(context.table.row_count(), 4);
        assert_eq!(context.table.rows[0][1].label, "10\u{2005}000\u{2005}000");
    }

    #[test]
    fn structural_errors_fail() {
        let input = json!({ "data": [["a", "b"], ["1"]] }).to_string();
        let error = build_context_from_json(&input, None).unwrap_err();
        assert_eq!(error.to_string(), "Failed to process table data");
        assert!(format!("{error:#}").contains("Row 1 has 1 cells, expected 2"));

        let input = countries(json!({ "colorColumn": { "selectedColumn": 7 } }));
        assert!(build_context_from_json(&input, None).is_err());

        assert!(build_context_from_json("{\"data\": 5}", None).is_err());
    }

    #[test]
    fn card_layout_below_breakpoint() {
        let options: TableOptions = serde_json::from_value(json!({ "cardLayoutIfSmall": true })).unwrap();
        assert!(uses_card_layout(&options, Some(399.0)));
        assert!(!uses_card_layout(&options, Some(400.0)));
        assert!(!uses_card_layout(&options, None));
        let options: TableOptions = serde_json::from_value(json!({ "cardLayout": true })).unwrap();
        assert!(uses_card_layout(&options, Some(1200.0)));
    }

    #[test]
    fn automatic_page_size() {
        assert_eq!(page_size(PageSize::Auto, 15), 15);
        assert_eq!(page_size(PageSize::Auto, 16), 10);
        assert_eq!(page_size(PageSize::Rows(25), 16), 25);
    }

    #[test]
    fn long_table_with_search() {
        let mut data = vec![json!(["Nr"])];
        data.extend((1..=20).map(|row| json!([row.to_string()])));
        let input = json!({ "data": data, "options": { "showTableSearch": true, "frozenRowKey": 0 } });
        let context = build_context_from_json(&input.to_string(), None).unwrap();
        assert_eq!(context.page_size, 10);
        assert_eq!(context.number_of_hidden_rows, 10);
        assert!(context.show_search);
        assert_eq!(context.frozen_row, Some(0));
    }

    #[test]
    fn hidden_header_drops_header_footnotes() {
        let input = json!({
            "data": [["Land"], ["Schweiz"]],
            "metadata": [
                { "rowIndex": 0, "colIndex": 0, "footnote": "Kopf" },
                { "rowIndex": 1, "colIndex": 0, "footnote": "Zeile" }
            ],
            "options": { "hideTableHeader": true }
        });
        let context = build_context_from_json(&input.to_string(), None).unwrap();
        assert_eq!(context.footnotes.len(), 1);
        assert_eq!(context.footnotes[0].value, "Zeile");
        assert!(!context.table.header[0].has_footnote());
        assert_eq!(context.table.rows[0][0].footnote, "1");
    }

    #[test]
    fn serializes_context() {
        let context = build_context_from_json(&countries(json!({})), None).unwrap();
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["table"]["header"][0]["label"], "Land");
        assert_eq!(value["table"]["rows"][0][1]["type"], "numeric");
        assert_eq!(value["footnotes"][0]["coords"][1]["rowIndex"], 3);
        assert_eq!(value["minibar"]["columnIndex"], serde_json::Value::Null);
        assert_eq!(value["pageSize"], 4);
    }
}
