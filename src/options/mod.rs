//! # Table Options
//!
//! Typed view of the JSON configuration object a Q-Table item carries.
//! Every field is optional on the wire; absent fields take the defaults the
//! editor would have written. Type strings (`"ckmeans"`, `"border-3"`,
//! `"0.00%"`) are parsed into enums here so the pipeline never compares strings.
use crate::color::bucket::BucketType;
use crate::color::scale::Scale;
use crate::table::formatting::FormattingType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors related to option parsing.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Invalid page size '{0}'")]
    InvalidPageSize(String),
}

/// Top-level display options of a table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Hide the first row; it is still used as header for card layout and legends
    pub hide_table_header: bool,
    /// Always render rows as cards
    pub card_layout: bool,
    /// Render rows as cards below the small-width breakpoint
    pub card_layout_if_small: bool,
    /// Rows per page
    pub page_size: PageSize,
    /// Data row kept on top while sorting
    pub frozen_row_key: Option<usize>,
    /// Offer a search field
    pub show_table_search: bool,
    /// Per-column formatting overrides
    #[serde(deserialize_with = "lenient_entries")]
    pub formatting: Vec<ColumnFormatting>,
    /// Initial sorting
    #[serde(deserialize_with = "lenient_entries")]
    pub sorting: Vec<ColumnSorting>,
    /// In-cell bar chart
    #[serde(deserialize_with = "lenient_feature")]
    pub minibar: Option<MinibarOptions>,
    /// Choropleth-style coloring of one column
    #[serde(deserialize_with = "lenient_feature")]
    pub color_column: Option<ColorColumnOptions>,
}

impl TableOptions {
    /// Returns the formatting override configured for a column.
    pub fn formatting_for(&self, column: usize) -> Option<FormattingType> {
        self.formatting
            .iter()
            .find(|formatting| formatting.column == column)
            .map(|formatting| formatting.formatting_type)
    }

    /// Selected minibar column, if any.
    pub fn minibar_column(&self) -> Option<usize> {
        self.minibar.as_ref().and_then(|minibar| minibar.selected_column)
    }

    /// Selected color column, if any.
    pub fn color_column_index(&self) -> Option<usize> {
        self.color_column.as_ref().and_then(|color| color.selected_column)
    }
}

/// Parses an optional feature on its own; a malformed feature is logged and
/// left out so the table still renders.
fn lenient_feature<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match serde_json::from_value::<T>(value) {
        Ok(feature) => Some(feature),
        Err(error) => {
            warn!(%error, option = std::any::type_name::<T>(), "malformed option left out");
            None
        }
    }))
}

/// Parses a list entry by entry, dropping malformed entries.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => Vec::new(),
        other => {
            warn!(value = %other, option = std::any::type_name::<T>(), "expected a list of options");
            Vec::new()
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value::<T>(entry)
                .map_err(|error| warn!(%error, option = std::any::type_name::<T>(), "malformed entry left out"))
                .ok()
        })
        .collect())
}

/// Rows per page: a fixed number or chosen from the row count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum PageSize {
    #[default]
    Auto,
    Rows(usize),
}

impl TryFrom<Value> for PageSize {
    type Error = OptionsError;

    /// Accepts `"auto"`, a positive number or a numeric string.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match &value {
            Value::Null => Ok(PageSize::Auto),
            Value::String(text) if text.eq_ignore_ascii_case("auto") => Ok(PageSize::Auto),
            Value::String(text) => text
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|rows| *rows > 0)
                .map(PageSize::Rows)
                .ok_or_else(|| OptionsError::InvalidPageSize(text.to_owned())),
            Value::Number(number) => number
                .as_u64()
                .filter(|rows| *rows > 0)
                .map(|rows| PageSize::Rows(rows as usize))
                .ok_or_else(|| OptionsError::InvalidPageSize(number.to_string())),
            _ => Err(OptionsError::InvalidPageSize(value.to_string())),
        }
    }
}

/// Formatting override for one column.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFormatting {
    pub column: usize,
    pub formatting_type: FormattingType,
}

/// Sorting direction of a column.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingDirection {
    Asc,
    Desc,
}

impl SortingDirection {
    /// Returns the wire name of the direction.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortingDirection::Asc => "asc",
            SortingDirection::Desc => "desc",
        }
    }
}

/// Initial sorting of one column.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSorting {
    pub column: usize,
    pub sorting_direction: SortingDirection,
}

/// Minibar configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinibarOptions {
    pub selected_column: Option<usize>,
    pub invert_colors: bool,
    pub bar_color: BarColor,
}

/// Bar colors for both poles of a minibar.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BarColor {
    pub positive: BarColorPole,
    pub negative: BarColorPole,
}

/// Color of one pole, either a color class or a raw color code.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarColorPole {
    pub class_name: String,
    pub color_code: String,
}

/// Whether a color column is colored by value ranges or by category.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorColumnType {
    Numerical,
    Categorical,
}

/// Color column configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorColumnOptions {
    pub selected_column: Option<usize>,
    /// Derived from the column type when absent
    pub color_column_type: Option<ColorColumnType>,
    pub numerical_options: NumericalOptions,
    pub categorical_options: CategoricalOptions,
}

/// Which statistic the label legend marks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelLegendType {
    #[default]
    Average,
    Median,
    NoLabel,
}

/// Options of a numerical color column.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericalOptions {
    pub label_legend: LabelLegendType,
    pub bucket_type: BucketType,
    pub number_buckets: usize,
    pub scale: Scale,
    pub color_scheme: String,
    /// Comma separated borders, only used by custom buckets
    pub custom_buckets: String,
    pub color_overwrites: Vec<ColorOverwrite>,
}

impl Default for NumericalOptions {
    fn default() -> Self {
        NumericalOptions {
            label_legend: LabelLegendType::Average,
            bucket_type: BucketType::Ckmeans,
            number_buckets: 5,
            scale: Scale::Sequential,
            color_scheme: "one".to_owned(),
            custom_buckets: String::new(),
            color_overwrites: Vec::new(),
        }
    }
}

/// Options of a categorical color column.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoricalOptions {
    pub color_overwrites: Vec<ColorOverwrite>,
    pub custom_categories_order: Vec<CategoryOrder>,
}

/// User override of one bucket or category color. `position` is 1-based.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOverwrite {
    pub position: usize,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// One entry of a custom category order.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryOrder {
    pub category: String,
}
