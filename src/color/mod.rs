//! # Color Column Module
//!
//! Colors the cells of one selected column. Numerical columns are split into
//! buckets and each row takes the color of the bucket its value falls into;
//! categorical columns give every distinct value its own color.
//!
//! The legend, the per-row colors and the method box explaining the bucketing
//! are returned together as a [`ColorColumn`].
use crate::color::bucket::{bucket_index, BucketType};
use crate::color::legend::{categorical_legend, numerical_legend, Legend};
use crate::color::scale::BucketColor;
use crate::error::Result;
use crate::options::{ColorColumnOptions, ColorColumnType};
use crate::table::column::{data_column, max_digits_after_comma, numeric_column, ColumnType};
use serde::Serialize;
use tracing::debug;

pub mod bucket;
pub mod ckmeans;
pub mod legend;
pub mod scale;

/// Title of the article linked from the method box.
const METHOD_ARTICLE_TITLE: &str = "So funktioniert die Einfärbung der Tabelle";

/// Colored column ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorColumn {
    pub selected_column: usize,
    pub color_column_type: ColorColumnType,
    pub legend: Legend,
    /// One color per data row
    pub colors: Vec<BucketColor>,
    /// Explanation of the bucketing, numerical columns only
    pub method_box: Option<MethodBox>,
    pub max_digits_after_comma: usize,
}

/// Explanation of how the buckets were computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBox {
    pub text: String,
    pub article_title: String,
}

impl MethodBox {
    pub fn new(bucket_type: BucketType) -> Self {
        let text = match bucket_type {
            BucketType::Ckmeans => {
                "Die Gruppen wurden so gewählt, dass die Werte innerhalb einer Gruppe möglichst ähnlich \
                 und die Unterschiede zwischen den Gruppen möglichst gross sind (Jenks Natural Breaks)."
            }
            BucketType::Quantile => {
                "Die Gruppen wurden so gewählt, dass jede Gruppe möglichst gleich viele Werte enthält (Quantile)."
            }
            BucketType::Equal => "Die Gruppen wurden so gewählt, dass sie gleich grosse Wertebereiche abdecken.",
            BucketType::Custom => "Die Grenzen der Gruppen wurden manuell festgelegt.",
        };
        MethodBox {
            text: text.to_owned(),
            article_title: METHOD_ARTICLE_TITLE.to_owned(),
        }
    }
}

/// Computes legend and row colors of the selected column.
/// Returns `None` when no column is selected.
pub fn color_column(data: &[Vec<Option<String>>], options: &ColorColumnOptions, width: Option<f64>) -> Result<Option<ColorColumn>> {
    let Some(selected_column) = options.selected_column else {
        return Ok(None);
    };
    let color_column_type = options.color_column_type.unwrap_or_else(|| {
        match ColumnType::classify(data_column(data, selected_column)) {
            ColumnType::Numeric => ColorColumnType::Numerical,
            ColumnType::Text => ColorColumnType::Categorical,
        }
    });
    let max_digits_after_comma = max_digits_after_comma(data_column(data, selected_column));

    let (legend, colors, method_box) = match color_column_type {
        ColorColumnType::Numerical => {
            let numerical = &options.numerical_options;
            let values = numeric_column(data, selected_column);
            let legend = numerical_legend(&values, numerical, max_digits_after_comma, width)?;
            let colors = values
                .iter()
                .map(|value| {
                    value
                        .and_then(|value| bucket_index(&legend.buckets, value))
                        .map(|index| legend.buckets[index].color.clone())
                        .unwrap_or_else(BucketColor::empty)
                })
                .collect();
            (Legend::Numerical(legend), colors, Some(MethodBox::new(numerical.bucket_type)))
        }
        ColorColumnType::Categorical => {
            let legend = categorical_legend(data_column(data, selected_column), &options.categorical_options);
            let colors = data_column(data, selected_column)
                .map(|cell| {
                    legend
                        .categories
                        .iter()
                        .find(|category| Some(category.label.as_str()) == cell)
                        .map(|category| category.color.clone())
                        .unwrap_or_else(BucketColor::empty)
                })
                .collect();
            (Legend::Categorical(legend), colors, None)
        }
    };

    debug!(column = selected_column, kind = ?color_column_type, "computed color column");
    Ok(Some(ColorColumn {
        selected_column,
        color_column_type,
        legend,
        colors,
        method_box,
        max_digits_after_comma,
    }))
}
