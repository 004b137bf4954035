//! Legends of a color column.
//!
//! A numerical legend carries the buckets together with the summary
//! statistics of the column and an optional marker for the average or
//! median. A categorical legend lists the distinct values with their colors.
use crate::color::bucket::{buckets, max_of, min_of, quantile_sorted, Bucket, BucketError, BucketType};
use crate::color::scale::{category_color, BucketColor, BucketColorMap, CategoryColorMap};
use crate::helpers::number::{rounded_value, value_length};
use crate::options::{CategoricalOptions, LabelLegendType, NumericalOptions};
use serde::Serialize;
use std::collections::HashMap;

/// Legend width in pixels up to which the legend spans the whole render width.
const FIXED_LEGEND_MAX_WIDTH: f64 = 640.0;

/// Estimated pixel width of one character of the label legend text.
const LABEL_CHAR_WIDTH: f64 = 8.0;

/// Legend of a color column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Legend {
    Numerical(NumericalLegend),
    Categorical(CategoricalLegend),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericalLegend {
    pub buckets: Vec<Bucket>,
    /// The first bucket spans a single value
    pub has_single_value_bucket: bool,
    pub has_null_values: bool,
    pub has_zero_values: bool,
    pub min_value: f64,
    pub max_value: f64,
    pub average_value: f64,
    pub median_value: f64,
    pub label_legend: Option<LabelLegend>,
}

/// Marker for the average or median on the legend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLegend {
    pub id: LabelLegendType,
    pub label: String,
    pub value: f64,
    /// Percent along the legend from minimum to maximum
    pub position: f64,
    /// Inline style placing the marker text
    pub description_alignment: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalLegend {
    pub has_null_values: bool,
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    pub label: String,
    pub color: BucketColor,
}

/// Builds the numerical legend over the parsed values of a column.
pub fn numerical_legend(
    column: &[Option<f64>],
    options: &NumericalOptions,
    max_digits_after_comma: usize,
    width: Option<f64>,
) -> Result<NumericalLegend, BucketError> {
    let values: Vec<f64> = column.iter().flatten().copied().collect();
    if values.is_empty() {
        return Err(BucketError::EmptyData);
    }
    let mut min_value = min_of(&values);
    let mut max_value = max_of(&values);
    let average = values.iter().sum::<f64>() / values.len() as f64;
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = quantile_sorted(&sorted, 0.5).ok_or(BucketError::EmptyData)?;

    let color_map = BucketColorMap::new(&options.color_overwrites);
    let buckets = buckets(&values, min_value, max_value, max_digits_after_comma, options, &color_map)?;

    // Custom borders outside the data still have to show on the legend
    if options.bucket_type == BucketType::Custom {
        if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
            min_value = min_value.min(first.from);
            max_value = max_value.max(last.to);
        }
    }

    let average_value = rounded_value(average, max_digits_after_comma);
    let median_value = rounded_value(median, max_digits_after_comma);
    let label_legend = label_legend(
        options.label_legend,
        average_value,
        median_value,
        min_value,
        max_value,
        max_digits_after_comma,
        width,
    );

    Ok(NumericalLegend {
        has_single_value_bucket: buckets.first().map(|bucket| bucket.from == bucket.to).unwrap_or(false),
        has_null_values: column.iter().any(Option::is_none),
        has_zero_values: values.iter().any(|value| *value == 0.0),
        buckets,
        min_value,
        max_value,
        average_value,
        median_value,
        label_legend,
    })
}

/// Places the average or median marker. A legend without range has no marker.
pub fn label_legend(
    kind: LabelLegendType,
    average_value: f64,
    median_value: f64,
    min_value: f64,
    max_value: f64,
    max_digits_after_comma: usize,
    width: Option<f64>,
) -> Option<LabelLegend> {
    let (label, value) = match kind {
        LabelLegendType::Average => ("Durchschnitt", average_value),
        LabelLegendType::Median => ("Median", median_value),
        LabelLegendType::NoLabel => return None,
    };
    let range = max_value - min_value;
    if range == 0.0 || !range.is_finite() {
        return None;
    }
    let position = (value - min_value) * 100.0 / range;
    Some(LabelLegend {
        id: kind,
        label: label.to_owned(),
        value,
        position,
        description_alignment: description_alignment(label, value, position, max_digits_after_comma, width),
    })
}

/// Chooses between a left margin at the marker and right alignment, depending
/// on whether the estimated text fits between marker and legend end.
///
/// Text and legend are both measured in render pixels, one pixel per pixel at
/// any width. The legend spans the full width up to 640 px and half the width
/// above; an unknown width is treated as 640 px.
pub fn description_alignment(label: &str, value: f64, position: f64, max_digits_after_comma: usize, width: Option<f64>) -> String {
    let legend_width = match width {
        Some(width) if width <= FIXED_LEGEND_MAX_WIDTH => width,
        Some(width) => width * 0.5,
        None => FIXED_LEGEND_MAX_WIDTH,
    };
    let characters = label.chars().count() + 2 + value_length(value, max_digits_after_comma);
    let text_width = characters as f64 * LABEL_CHAR_WIDTH;
    let space_right = legend_width * (100.0 - position) / 100.0;
    if text_width > space_right {
        "right: 0;".to_owned()
    } else {
        format!("margin-left: {position}%")
    }
}

/// Builds the categorical legend from the raw cells of a column.
/// Categories are ordered by descending frequency, ties by first appearance.
/// A custom order re-sorts them by their place in that order; categories
/// missing from it rank before all listed ones.
pub fn categorical_legend<'a, I>(column: I, options: &CategoricalOptions) -> CategoricalLegend
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut has_null_values = false;
    let mut categories: Vec<(&str, usize)> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for cell in column {
        match cell {
            None | Some("") => has_null_values = true,
            Some(value) => match seen.get(value) {
                Some(index) => categories[*index].1 += 1,
                None => {
                    seen.insert(value, categories.len());
                    categories.push((value, 1));
                }
            },
        }
    }
    categories.sort_by(|a, b| b.1.cmp(&a.1));

    if !options.custom_categories_order.is_empty() {
        let rank = |label: &str| {
            options
                .custom_categories_order
                .iter()
                .position(|order| order.category == label)
                .map(|position| position as i64)
                .unwrap_or(-1)
        };
        categories.sort_by_key(|(label, _)| rank(*label));
    }

    let color_map = CategoryColorMap::new(&options.color_overwrites);
    CategoricalLegend {
        has_null_values,
        categories: categories
            .iter()
            .enumerate()
            .map(|(index, (label, _))| Category {
                label: label.to_string(),
                color: category_color(index, &color_map),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CategoryOrder, ColorOverwrite};
    use approx::assert_relative_eq;

    fn numerical(bucket_type: BucketType, number_buckets: usize) -> NumericalOptions {
        NumericalOptions {
            bucket_type,
            number_buckets,
            ..Default::default()
        }
    }

    fn labels(legend: &CategoricalLegend) -> Vec<&str> {
        legend.categories.iter().map(|category| category.label.as_str()).collect()
    }

    #[test]
    fn ckmeans_legend_over_distinct_values() {
        let column: Vec<Option<f64>> = (1..=6).map(|value| Some(value as f64)).collect();
        let legend = numerical_legend(&column, &numerical(BucketType::Ckmeans, 5), 0, None).unwrap();
        assert_eq!(legend.buckets.len(), 5);
        assert!(!legend.has_single_value_bucket);
        assert!(!legend.has_null_values);
        assert!(!legend.has_zero_values);
        assert_eq!(legend.min_value, 1.0);
        assert_eq!(legend.max_value, 6.0);
        assert_eq!(legend.average_value, 3.5);
        assert_eq!(legend.median_value, 3.5);
    }

    #[test]
    fn statistics_skip_nulls() {
        let column = [Some(0.0), None, Some(1.0), Some(2.0)];
        let legend = numerical_legend(&column, &numerical(BucketType::Equal, 2), 0, None).unwrap();
        assert!(legend.has_null_values);
        assert!(legend.has_zero_values);
        assert_eq!(legend.average_value, 1.0);
        assert_eq!(legend.median_value, 1.0);
    }

    #[test]
    fn average_is_rounded() {
        let column = [Some(1.0), Some(1.0), Some(2.0)];
        let legend = numerical_legend(&column, &numerical(BucketType::Equal, 2), 0, None).unwrap();
        assert_eq!(legend.average_value, 1.33);
        let legend = numerical_legend(&column, &numerical(BucketType::Equal, 2), 4, None).unwrap();
        assert_eq!(legend.average_value, 1.3333);
    }

    #[test]
    fn custom_borders_widen_the_range() {
        let mut options = numerical(BucketType::Custom, 0);
        options.custom_buckets = "0, 10, 20, 100".to_owned();
        let column = [Some(5.0), Some(15.0), Some(50.0)];
        let legend = numerical_legend(&column, &options, 0, None).unwrap();
        assert_eq!(legend.min_value, 0.0);
        assert_eq!(legend.max_value, 100.0);
        assert_eq!(legend.buckets.len(), 3);
    }

    #[test]
    fn malformed_custom_borders_fail() {
        let mut options = numerical(BucketType::Custom, 0);
        options.custom_buckets = "0, ten".to_owned();
        let result = numerical_legend(&[Some(1.0)], &options, 0, None);
        assert!(matches!(result, Err(BucketError::InvalidCustomBuckets(_))));
    }

    #[test]
    fn label_legend_position() {
        let label = label_legend(LabelLegendType::Average, 25.0, 30.0, 0.0, 100.0, 0, Some(500.0)).unwrap();
        assert_eq!(label.label, "Durchschnitt");
        assert_relative_eq!(label.position, 25.0);
        assert_eq!(label.description_alignment, "margin-left: 25%");

        let label = label_legend(LabelLegendType::Median, 25.0, 30.0, 0.0, 100.0, 0, Some(500.0)).unwrap();
        assert_eq!(label.label, "Median");
        assert_eq!(label.value, 30.0);
        assert_relative_eq!(label.position, 30.0);
    }

    #[test]
    fn label_legend_without_range_or_label() {
        assert!(label_legend(LabelLegendType::Average, 5.0, 5.0, 5.0, 5.0, 0, None).is_none());
        assert!(label_legend(LabelLegendType::NoLabel, 5.0, 5.0, 0.0, 10.0, 0, None).is_none());
    }

    #[test]
    fn alignment_flips_near_the_end() {
        // "Durchschnitt: 90" is 16 characters, 128 px
        assert_eq!(description_alignment("Durchschnitt", 90.0, 90.0, 0, Some(400.0)), "right: 0;");
        assert_eq!(description_alignment("Durchschnitt", 10.0, 10.0, 0, Some(400.0)), "margin-left: 10%");
        // wide screens use half of the width
        assert_eq!(description_alignment("Durchschnitt", 80.0, 80.0, 0, Some(1000.0)), "right: 0;");
        assert_eq!(description_alignment("Durchschnitt", 60.0, 60.0, 0, Some(1000.0)), "margin-left: 60%");
        assert_eq!(description_alignment("Durchschnitt", 60.0, 60.0, 0, None), "margin-left: 60%");
    }

    #[test]
    fn categories_by_frequency() {
        let column = [Some("b"), Some("a"), Some("a"), None, Some("c"), Some("b"), Some("a"), Some("")];
        let legend = categorical_legend(column, &CategoricalOptions::default());
        assert!(legend.has_null_values);
        assert_eq!(labels(&legend), vec!["a", "b", "c"]);
        assert_eq!(legend.categories[0].color.color_class, "s-viz-color-one-5");
        assert_eq!(legend.categories[2].color.color_class, "s-viz-color-three-5");
    }

    #[test]
    fn frequency_ties_keep_first_appearance() {
        let column = [Some("x"), Some("y"), Some("z")];
        let legend = categorical_legend(column, &CategoricalOptions::default());
        assert!(!legend.has_null_values);
        assert_eq!(labels(&legend), vec!["x", "y", "z"]);
    }

    #[test]
    fn custom_order_puts_unlisted_categories_first() {
        let options = CategoricalOptions {
            custom_categories_order: vec![
                CategoryOrder { category: "c".to_owned() },
                CategoryOrder { category: "a".to_owned() },
            ],
            ..Default::default()
        };
        let column = [Some("a"), Some("a"), Some("b"), Some("c"), Some("d")];
        let legend = categorical_legend(column, &options);
        assert_eq!(labels(&legend), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn category_overwrites() {
        let options = CategoricalOptions {
            color_overwrites: vec![ColorOverwrite {
                position: 1,
                color: "#abcdef".to_owned(),
                text_color: None,
            }],
            ..Default::default()
        };
        let legend = categorical_legend([Some("a"), Some("b")], &options);
        assert_eq!(legend.categories[0].color.custom_color, "#abcdef");
        assert_eq!(legend.categories[1].color.custom_color, "");
    }
}
