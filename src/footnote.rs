//! # Footnotes
//!
//! Footnote annotations arrive per raw cell (header row included). Identical
//! texts share one number; numbers are handed out in row-then-column order.
//! The numbered footnotes are then attached to a copy of the formatted table,
//! together with spacing classes for columns that need room for the marker.
use crate::options::TableOptions;
use crate::table::{Cell, ProcessedTableData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// From this number of footnotes on, markers have two digits.
const DOUBLE_DIGIT_FOOTNOTES: usize = 10;

/// Footnote text of one raw cell.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootnoteAnnotation {
    pub row_index: usize,
    pub col_index: usize,
    pub footnote: String,
}

/// Position of an annotated cell in raw table coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coord {
    pub row_index: usize,
    pub col_index: usize,
}

/// A footnote text with its number and every cell referencing it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructuredFootnote {
    pub value: String,
    /// 1-based
    pub index: usize,
    pub coords: Vec<Coord>,
}

/// Numbers the footnotes. Empty texts are dropped, as are header
/// annotations when the header is hidden.
pub fn structured_footnotes(annotations: &[FootnoteAnnotation], hide_table_header: bool) -> Vec<StructuredFootnote> {
    let mut annotations: Vec<&FootnoteAnnotation> = annotations
        .iter()
        .filter(|annotation| !annotation.footnote.is_empty())
        .filter(|annotation| !(hide_table_header && annotation.row_index == 0))
        .collect();
    annotations.sort_by_key(|annotation| (annotation.row_index, annotation.col_index));

    let mut footnotes: Vec<StructuredFootnote> = Vec::new();
    let mut by_text: HashMap<&str, usize> = HashMap::new();
    for annotation in annotations {
        let coord = Coord {
            row_index: annotation.row_index,
            col_index: annotation.col_index,
        };
        match by_text.get(annotation.footnote.as_str()) {
            Some(&position) => footnotes[position].coords.push(coord),
            None => {
                by_text.insert(&annotation.footnote, footnotes.len());
                footnotes.push(StructuredFootnote {
                    value: annotation.footnote.to_owned(),
                    index: footnotes.len() + 1,
                    coords: vec![coord],
                });
            }
        }
    }
    debug!(footnotes = footnotes.len(), "structured footnotes");
    footnotes
}

/// Key of a cell in the footnote lookup: data row (header is `-1`) and column.
pub fn footnote_key(row_index: usize, col_index: usize) -> String {
    format!("{}-{}", row_index as i64 - 1, col_index)
}

/// Maps every annotated cell to its footnote number.
pub fn footnote_lookup(footnotes: &[StructuredFootnote]) -> HashMap<String, usize> {
    footnotes
        .iter()
        .flat_map(|footnote| {
            footnote
                .coords
                .iter()
                .map(move |coord| (footnote_key(coord.row_index, coord.col_index), footnote.index))
        })
        .collect()
}

/// Spacing class suffix, by number of footnotes.
fn spacing(count: usize) -> &'static str {
    if count >= DOUBLE_DIGIT_FOOTNOTES {
        "double"
    } else {
        "single"
    }
}

/// Spacing classes a footnoted column needs: before or on the minibar, on
/// the color column and on the last column.
pub fn spacing_classes(col_index: usize, column_count: usize, footnote_count: usize, options: &TableOptions) -> Vec<String> {
    let spacing = spacing(footnote_count);
    let mut classes = Vec::new();
    if let Some(minibar) = options.minibar_column() {
        if col_index == minibar || col_index + 1 == minibar {
            classes.push(format!("q-table-footnote-minibar--{spacing}"));
        }
    }
    if options.color_column_index() == Some(col_index) {
        classes.push(format!("q-table-footnote-color-column--{spacing}"));
    }
    if col_index + 1 == column_count {
        classes.push(format!("q-table-footnote-last-column--{spacing}"));
    }
    classes
}

/// Returns a copy of the table with footnote markers and spacing classes.
/// Annotations outside the table are skipped.
pub fn annotate(processed: &ProcessedTableData, footnotes: &[StructuredFootnote], options: &TableOptions) -> ProcessedTableData {
    let lookup = footnote_lookup(footnotes);
    let footnoted_columns: BTreeSet<usize> = footnotes
        .iter()
        .flat_map(|footnote| footnote.coords.iter().map(|coord| coord.col_index))
        .filter(|col| *col < processed.column_count())
        .collect();
    for footnote in footnotes {
        for coord in &footnote.coords {
            if coord.col_index >= processed.column_count() || coord.row_index > processed.row_count() {
                warn!(row = coord.row_index, col = coord.col_index, "footnote outside of table");
            }
        }
    }

    let column_classes: HashMap<usize, Vec<String>> = footnoted_columns
        .iter()
        .map(|col| (*col, spacing_classes(*col, processed.column_count(), footnotes.len(), options)))
        .collect();
    let decorate = |cell: &Cell, row_index: usize, col_index: usize| {
        let mut cell = match lookup.get(&footnote_key(row_index, col_index)) {
            Some(index) => cell.with_footnote(*index),
            None => cell.clone(),
        };
        for class in column_classes.get(&col_index).into_iter().flatten() {
            cell.push_class(class);
        }
        cell
    };

    let header = processed
        .header
        .iter()
        .enumerate()
        .map(|(col, cell)| decorate(cell, 0, col))
        .collect();
    let rows = processed
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| decorate(cell, row + 1, col))
                .collect()
        })
        .collect();
    ProcessedTableData::from_rows(header, rows, processed.column_types.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::process_table;
    use crate::table::tests::raw;
    use serde_json::json;

    fn annotation(row_index: usize, col_index: usize, footnote: &str) -> FootnoteAnnotation {
        FootnoteAnnotation {
            row_index,
            col_index,
            footnote: footnote.to_owned(),
        }
    }

    fn table() -> ProcessedTableData {
        let data = raw(&[
            &[Some("Land"), Some("Punkte"), Some("Rang")],
            &[Some("Schweiz"), Some("10"), Some("1")],
            &[Some("Deutschland"), Some("20"), Some("2")],
        ]);
        process_table(&data, &TableOptions::default()).unwrap()
    }

    #[test]
    fn identical_texts_share_one_index() {
        let footnotes = structured_footnotes(&[annotation(1, 0, "Quelle: BFS"), annotation(2, 1, "Quelle: BFS")], false);
        assert_eq!(footnotes.len(), 1);
        assert_eq!(footnotes[0].index, 1);
        assert_eq!(
            footnotes[0].coords,
            vec![Coord { row_index: 1, col_index: 0 }, Coord { row_index: 2, col_index: 1 }]
        );
    }

    #[test]
    fn merging_is_idempotent() {
        let annotations = [
            annotation(1, 1, "Schätzung"),
            annotation(2, 1, "Schätzung"),
            annotation(1, 1, ""),
        ];
        let footnotes = structured_footnotes(&annotations, false);
        assert_eq!(footnotes.len(), 1);
        assert_eq!(footnotes[0].coords.len(), 2);
        assert_eq!(structured_footnotes(&annotations, false), footnotes);
    }

    #[test]
    fn numbered_in_row_then_column_order() {
        let annotations = [annotation(2, 0, "c"), annotation(1, 2, "b"), annotation(1, 0, "a"), annotation(0, 1, "h")];
        let footnotes = structured_footnotes(&annotations, false);
        let values: Vec<(&str, usize)> = footnotes.iter().map(|f| (f.value.as_str(), f.index)).collect();
        assert_eq!(values, vec![("h", 1), ("a", 2), ("b", 3), ("c", 4)]);

        let footnotes = structured_footnotes(&annotations, true);
        let values: Vec<&str> = footnotes.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(footnotes[0].index, 1);
    }

    #[test]
    fn lookup_shifts_rows() {
        let footnotes = structured_footnotes(&[annotation(0, 1, "h"), annotation(2, 0, "x")], false);
        let lookup = footnote_lookup(&footnotes);
        assert_eq!(lookup.get("-1-1"), Some(&1));
        assert_eq!(lookup.get("1-0"), Some(&2));
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn annotate_returns_marked_copy() {
        let processed = table();
        let footnotes = structured_footnotes(&[annotation(0, 1, "h"), annotation(2, 0, "x")], false);
        let annotated = annotate(&processed, &footnotes, &TableOptions::default());
        assert_eq!(annotated.header[1].footnote, "1");
        assert_eq!(annotated.rows[1][0].footnote, "2");
        assert_eq!(annotated.columns[0][1].footnote, "2");
        assert!(!annotated.rows[0][0].has_footnote());
        assert!(processed.rows.iter().flatten().all(|cell| !cell.has_footnote()));
    }

    #[test]
    fn spacing_classes_per_trigger() {
        let options: TableOptions = serde_json::from_value(json!({
            "minibar": { "selectedColumn": 1 },
            "colorColumn": { "selectedColumn": 1 }
        }))
        .unwrap();
        assert_eq!(
            spacing_classes(0, 3, 2, &options),
            vec!["q-table-footnote-minibar--single"]
        );
        assert_eq!(
            spacing_classes(1, 3, 2, &options),
            vec!["q-table-footnote-minibar--single", "q-table-footnote-color-column--single"]
        );
        assert_eq!(
            spacing_classes(2, 3, 12, &options),
            vec!["q-table-footnote-last-column--double"]
        );
        assert!(spacing_classes(0, 3, 2, &TableOptions::default()).is_empty());
    }

    #[test]
    fn double_spacing_from_ten_footnotes() {
        let options = TableOptions::default();
        assert_eq!(spacing_classes(2, 3, 9, &options), vec!["q-table-footnote-last-column--single"]);
        assert_eq!(spacing_classes(2, 3, 10, &options), vec!["q-table-footnote-last-column--double"]);
    }

    #[test]
    fn spacing_classes_apply_to_whole_column() {
        let processed = table();
        let footnotes = structured_footnotes(&[annotation(1, 2, "x")], false);
        let annotated = annotate(&processed, &footnotes, &TableOptions::default());
        let class = "q-table-footnote-last-column--single".to_owned();
        assert!(annotated.header[2].classes.contains(&class));
        assert!(annotated.rows.iter().all(|row| row[2].classes.contains(&class)));
        assert!(annotated.rows.iter().all(|row| !row[1].classes.contains(&class)));
    }

    #[test]
    fn deserializes_metadata() {
        let annotations: Vec<FootnoteAnnotation> =
            serde_json::from_value(json!([{ "rowIndex": 1, "colIndex": 2, "footnote": "x" }])).unwrap();
        assert_eq!(annotations, vec![annotation(1, 2, "x")]);
    }
}
