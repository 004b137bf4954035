//! Conversion of raw cell strings into formatted display cells.

use crate::helpers::emoji::country_flag;
use crate::helpers::number::format_number;
use crate::table::cell::{Cell, CellType, CellValue};
use crate::table::column::{is_placeholder, parse_numeric, ColumnType};
use serde::Deserialize;

/// Class applied to every cell of a numeric column.
pub const TABULAR_NUMBERS_CLASS: &str = "s-font-note--tabularnums";

/// Explicit per-column formatting chosen in the editor.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub enum FormattingType {
    #[serde(rename = "country_flags")]
    CountryFlags,
    #[serde(rename = "0")]
    Integer,
    #[serde(rename = "0.00")]
    Decimal2,
    #[serde(rename = "0.000")]
    Decimal3,
    #[serde(rename = "0%")]
    Percent,
    #[serde(rename = "0.0%")]
    Percent1,
    #[serde(rename = "0.00%")]
    Percent2,
    #[serde(rename = "0.000%")]
    Percent3,
    #[serde(rename = "arrow_sign_relative_int")]
    ArrowSignRelativeInt,
}

impl FormattingType {
    /// Returns the wire name of the formatting.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CountryFlags => "country_flags",
            Self::Integer => "0",
            Self::Decimal2 => "0.00",
            Self::Decimal3 => "0.000",
            Self::Percent => "0%",
            Self::Percent1 => "0.0%",
            Self::Percent2 => "0.00%",
            Self::Percent3 => "0.000%",
            Self::ArrowSignRelativeInt => "arrow_sign_relative_int",
        }
    }

    /// Fixed digits after the comma of the numeric presets.
    pub const fn decimals(&self) -> Option<usize> {
        match self {
            Self::Integer | Self::Percent | Self::ArrowSignRelativeInt => Some(0),
            Self::Percent1 => Some(1),
            Self::Decimal2 | Self::Percent2 => Some(2),
            Self::Decimal3 | Self::Percent3 => Some(3),
            Self::CountryFlags => None,
        }
    }

    /// Returns true for presets rendered with a `%` suffix.
    pub const fn is_percentage(&self) -> bool {
        matches!(self, Self::Percent | Self::Percent1 | Self::Percent2 | Self::Percent3 | Self::ArrowSignRelativeInt)
    }

    /// Returns true if the formatting produces numeric cells.
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::CountryFlags)
    }
}

/// Formats a header cell. Headers keep their raw text; numeric columns only
/// get the numeric type and tabular figures for alignment.
pub fn format_header_cell(raw: Option<&str>, column_type: ColumnType, formatting: Option<FormattingType>) -> Cell {
    let mut cell = Cell::text(raw);
    let is_numeric = formatting.map(|formatting| formatting.is_numeric()).unwrap_or(column_type.is_numeric());
    if is_numeric {
        cell.kind = CellType::Numeric;
        cell.push_class(TABULAR_NUMBERS_CLASS);
    }
    cell
}

/// Formats a data cell, dispatching on the explicit formatting first and the
/// inferred column type otherwise. Values a numeric formatting cannot parse
/// fall back to text cells.
pub fn format_cell(raw: Option<&str>, column_type: ColumnType, formatting: Option<FormattingType>) -> Cell {
    match (formatting, column_type) {
        (Some(FormattingType::CountryFlags), _) => format_country_flag(raw),
        (Some(formatting), _) => format_preset(raw, formatting),
        (None, ColumnType::Numeric) => format_default_numeric(raw),
        (None, ColumnType::Text) => Cell::text(raw),
    }
}

/// Looks up the flag glyph of a country code; unknown codes get an empty label.
fn format_country_flag(raw: Option<&str>) -> Cell {
    Cell {
        kind: CellType::CountryFlagEmoji,
        value: raw.map(|raw| CellValue::Text(raw.to_owned())).unwrap_or_default(),
        label: raw.and_then(country_flag).unwrap_or_default(),
        ..Default::default()
    }
}

/// Numbers without explicit formatting keep their precision.
fn format_default_numeric(raw: Option<&str>) -> Cell {
    if is_placeholder(raw) {
        return placeholder_cell(raw);
    }
    match parse_numeric(raw) {
        Some(value) => numeric_cell(value, format_number(value, None)),
        None => Cell::text(raw),
    }
}

/// Fixed-decimal, percentage and arrow presets.
fn format_preset(raw: Option<&str>, formatting: FormattingType) -> Cell {
    if is_placeholder(raw) {
        return placeholder_cell(raw);
    }
    let Some(value) = parse_numeric(raw) else {
        return Cell::text(raw);
    };
    let number = format_number(value, formatting.decimals());
    let label = match formatting {
        FormattingType::ArrowSignRelativeInt => {
            let arrow = if value > 0.0 {
                "\u{279A} +"
            } else if value < 0.0 {
                "\u{2798} "
            } else {
                "\u{2799} "
            };
            format!("{arrow}{number}%")
        }
        _ if formatting.is_percentage() => format!("{number}%"),
        _ => number,
    };
    numeric_cell(value, label)
}

/// Placeholders pass through unformatted.
fn placeholder_cell(raw: Option<&str>) -> Cell {
    let mut cell = Cell::numeric(None, raw.unwrap_or_default().to_owned());
    cell.push_class(TABULAR_NUMBERS_CLASS);
    cell
}

fn numeric_cell(value: f64, label: String) -> Cell {
    let mut cell = Cell::numeric(Some(value), label);
    cell.push_class(TABULAR_NUMBERS_CLASS);
    cell
}
