use serde::Serialize;
use std::fmt::Display;

/// Types of display cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellType {
    /// Numbers, rendered with tabular figures
    Numeric,
    /// Anything rendered as-is
    #[default]
    Text,
    /// Country codes rendered as flag glyphs
    CountryFlagEmoji,
}

/// Underlying value of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Parsed number of a numeric cell
    Number(f64),
    /// Raw string of a text cell
    Text(String),
    /// Null in the raw table
    #[default]
    Empty,
}

/// A formatted table cell ready for rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cell {
    /// Cell type
    #[serde(rename = "type")]
    pub kind: CellType,
    /// Parsed or raw value
    pub value: CellValue,
    /// Human-facing formatted text
    pub label: String,
    /// CSS classes, without duplicates, in insertion order
    pub classes: Vec<String>,
    /// Footnote marker, empty when the cell has no footnote
    pub footnote: String,
}

impl Cell {
    /// Creates a text cell; null becomes an empty label.
    pub fn text(raw: Option<&str>) -> Self {
        Cell {
            kind: CellType::Text,
            value: raw.map(|raw| CellValue::Text(raw.to_owned())).unwrap_or_default(),
            label: raw.unwrap_or_default().to_owned(),
            ..Default::default()
        }
    }

    /// Creates a numeric cell from a parsed value and its formatted label.
    pub fn numeric(value: Option<f64>, label: String) -> Self {
        Cell {
            kind: CellType::Numeric,
            value: value.map(CellValue::Number).unwrap_or_default(),
            label,
            ..Default::default()
        }
    }

    /// Returns the number held by the cell.
    pub fn number(&self) -> Option<f64> {
        match self.value {
            CellValue::Number(number) => Some(number),
            _ => None,
        }
    }

    /// Returns true if the cell carries a footnote marker.
    pub fn has_footnote(&self) -> bool {
        !self.footnote.is_empty()
    }

    /// Adds a class unless it is already present.
    pub(crate) fn push_class(&mut self, class: &str) {
        if !self.classes.iter().any(|existing| existing == class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Returns a copy of the cell carrying a footnote marker.
    pub fn with_footnote(&self, index: usize) -> Self {
        Cell {
            footnote: index.to_string(),
            ..self.clone()
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_cell_from_null() {
        let cell = Cell::text(None);
        assert_eq!(cell.kind, CellType::Text);
        assert_eq!(cell.value, CellValue::Empty);
        assert_eq!(cell.label, "");
    }

    #[test]
    fn classes_stay_unique() {
        let mut cell = Cell::numeric(Some(1.0), "1".to_owned());
        for class in ["a", "b", "a"] {
            cell.push_class(class);
        }
        assert_eq!(cell.classes, vec!["a", "b"]);
        assert_eq!(cell.number(), Some(1.0));
    }

    #[test]
    fn footnote_copy_leaves_original() {
        let cell = Cell::text(Some("Schweiz"));
        let annotated = cell.with_footnote(2);
        assert!(!cell.has_footnote());
        assert_eq!(annotated.footnote, "2");
        assert_eq!(annotated.to_string(), "Schweiz");
    }

    #[test]
    fn serializes_with_wire_names() {
        let cell = Cell::numeric(Some(-2.5), "\u{2013}2,5".to_owned());
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["type"], "numeric");
        assert_eq!(json["value"], -2.5);
        let json = serde_json::to_value(&Cell::text(None)).unwrap();
        assert!(json["value"].is_null());
    }
}
