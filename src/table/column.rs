use crate::helpers::number::digits_after_comma;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Signed decimal number: optional sign, digits, optional fraction.
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("Hardcode regex pattern"));

/// Cell values that stand for "no value" and never decide a column type.
const PLACEHOLDERS: [&str; 3] = ["", "-", "\u{2013}"];

/// Data type of a table column, derived from its data rows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every non-placeholder cell is a number
    Numeric,
    /// Anything else, including columns without any value
    #[default]
    Text,
}

impl ColumnType {
    /// Returns the string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
        }
    }

    /// Classifies a column from its data cells.
    /// A column made only of placeholders is text, so empty columns never pass as numeric.
    pub fn classify<'a, I>(column: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut has_value = false;
        for cell in column {
            if is_placeholder(cell) {
                continue;
            }
            if !is_numeric(cell) {
                return ColumnType::Text;
            }
            has_value = true;
        }
        if has_value {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }

    /// Detects the type of every column of a raw table, skipping the header row.
    pub fn detect(data: &[Vec<Option<String>>]) -> Vec<ColumnType> {
        let columns = data.first().map(Vec::len).unwrap_or(0);
        (0..columns)
            .map(|col| ColumnType::classify(data_column(data, col)))
            .collect()
    }

    /// Returns true if this column holds numbers.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
}

/// Returns true for empty cells and the placeholder strings `""`, `-` and `–`.
#[inline]
pub fn is_placeholder(cell: Option<&str>) -> bool {
    match cell {
        None => true,
        Some(value) => PLACEHOLDERS.contains(&value),
    }
}

/// Returns true if the cell holds a signed decimal number.
pub fn is_numeric(cell: Option<&str>) -> bool {
    parse_numeric(cell).is_some()
}

/// Parses a cell holding a signed decimal number.
pub fn parse_numeric(cell: Option<&str>) -> Option<f64> {
    let value = cell?;
    if !NUMBER_PATTERN.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| !number.is_nan())
}

/// Maximal number of digits after the comma over all cells of a column.
pub fn max_digits_after_comma<'a, I>(column: I) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    column
        .into_iter()
        .flatten()
        .map(digits_after_comma)
        .max()
        .unwrap_or(0)
}

/// Iterates the data cells (header excluded) of one column.
pub(crate) fn data_column(data: &[Vec<Option<String>>], col: usize) -> impl Iterator<Item = Option<&str>> + '_ {
    data.iter()
        .skip(1)
        .map(move |row| row.get(col).and_then(|cell| cell.as_deref()))
}

/// Parsed numbers of the data cells of one column; placeholders and text become `None`.
pub(crate) fn numeric_column(data: &[Vec<Option<String>>], col: usize) -> Vec<Option<f64>> {
    data_column(data, col).map(parse_numeric).collect()
}
