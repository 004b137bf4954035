//! Color classes for buckets and categories.
//!
//! Sequential scales count positions down from the bucket count, diverging
//! scales center a pivot (a border between two buckets or a neutral bucket)
//! on a symmetric scale sized by the bigger side.
use crate::options::ColorOverwrite;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors related to scale parsing.
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Invalid scale '{0}'")]
    InvalidScale(String),
}

/// Text color token for dark backgrounds.
pub const LIGHT_FONT: &str = "s-color-gray-1";

/// Text color token for light backgrounds.
pub const DARK_FONT: &str = "s-color-gray-9";

/// Color schemes of categories, one per category position.
pub const CATEGORY_SCHEMES: [&str; 12] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
];

const SEQUENTIAL_SCHEMES: [&str; 5] = ["one", "two", "three", "female", "male"];
const DIVERGING_SCHEMES: [&str; 3] = ["one", "two", "three"];

/// Category classes rendered on dark backgrounds.
const DARK_CATEGORY_CLASSES: [&str; 6] = [
    "s-viz-color-one-5",
    "s-viz-color-three-5",
    "s-viz-color-five-5",
    "s-viz-color-seven-5",
    "s-viz-color-nine-5",
    "s-viz-color-eleven-5",
];

/// Every color class that needs a light font, built once.
/// Sequential scales are darkest at position 1 (two darkest from five steps on),
/// diverging scales at both ends (two per end from six steps on).
static LIGHT_FONT_CLASSES: Lazy<HashSet<String>> = Lazy::new(|| {
    let mut classes: HashSet<String> = DARK_CATEGORY_CLASSES.iter().map(|class| class.to_string()).collect();
    for scheme in SEQUENTIAL_SCHEMES {
        for size in 2..=7 {
            let darkest = if size >= 5 { 2 } else { 1 };
            for position in 1..=darkest {
                classes.insert(format!("s-viz-color-sequential-{scheme}-{size}-{position}"));
            }
        }
    }
    for scheme in DIVERGING_SCHEMES {
        for size in 2..=15 {
            let darkest = if size >= 6 { 2 } else { 1 };
            for offset in 0..darkest {
                classes.insert(format!("s-viz-color-diverging-{scheme}-{size}-{}", 1 + offset));
                classes.insert(format!("s-viz-color-diverging-{scheme}-{size}-{}", size - offset));
            }
        }
    }
    classes
});

static SCALE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(border|bucket)-([0-9]+)$").expect("Hardcode regex pattern"));

/// What the diverging pivot index points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pivot {
    /// The border after `index` buckets; no neutral color
    Border,
    /// The bucket after `index` buckets is neutral
    Bucket,
}

/// Color scale of a numerical color column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Scale {
    #[default]
    Sequential,
    Diverging { pivot: Pivot, index: usize },
}

impl TryFrom<&str> for Scale {
    type Error = ScaleError;

    /// Parses `sequential`, `border-{n}` or `bucket-{n}`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value == "sequential" {
            return Ok(Scale::Sequential);
        }
        let captures = SCALE_PATTERN
            .captures(value)
            .ok_or_else(|| ScaleError::InvalidScale(value.to_owned()))?;
        let pivot = match &captures[1] {
            "border" => Pivot::Border,
            _ => Pivot::Bucket,
        };
        let index = captures[2]
            .parse::<usize>()
            .map_err(|_| ScaleError::InvalidScale(value.to_owned()))?;
        Ok(Scale::Diverging { pivot, index })
    }
}

impl TryFrom<String> for Scale {
    type Error = ScaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Scale::try_from(value.as_str())
    }
}

/// Resolved color of a bucket or category.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketColor {
    /// Scheme, size and position encoded as CSS class
    pub color_class: String,
    /// User override, empty when none
    pub custom_color: String,
    /// Light or dark font token
    pub text_color: String,
}

impl BucketColor {
    /// Color of a cell without value: no background, dark font.
    pub fn empty() -> Self {
        BucketColor {
            color_class: String::new(),
            custom_color: String::new(),
            text_color: DARK_FONT.to_owned(),
        }
    }
}

/// User override for one color.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomColor {
    pub color: String,
    pub text_color: Option<String>,
}

impl From<&ColorOverwrite> for CustomColor {
    fn from(overwrite: &ColorOverwrite) -> Self {
        CustomColor {
            color: overwrite.color.to_owned(),
            text_color: overwrite.text_color.to_owned(),
        }
    }
}

/// Bucket overrides, keyed by `position - 1` and looked up by bucket index.
#[derive(Clone, Debug, Default)]
pub struct BucketColorMap(HashMap<usize, CustomColor>);

impl BucketColorMap {
    pub fn new(overwrites: &[ColorOverwrite]) -> Self {
        BucketColorMap(
            overwrites
                .iter()
                .filter_map(|overwrite| Some((overwrite.position.checked_sub(1)?, CustomColor::from(overwrite))))
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&CustomColor> {
        self.0.get(&index)
    }
}

/// Category overrides, keyed by `position` and looked up by `index + 1`.
#[derive(Clone, Debug, Default)]
pub struct CategoryColorMap(HashMap<usize, CustomColor>);

impl CategoryColorMap {
    pub fn new(overwrites: &[ColorOverwrite]) -> Self {
        CategoryColorMap(
            overwrites
                .iter()
                .map(|overwrite| (overwrite.position, CustomColor::from(overwrite)))
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&CustomColor> {
        self.0.get(&(index + 1))
    }
}

/// Chooses the font color: a user choice wins, otherwise dark classes get a light font.
pub fn text_color(custom: Option<&CustomColor>, color_class: &str) -> &'static str {
    if let Some(text_color) = custom.and_then(|custom| custom.text_color.as_deref()) {
        return if text_color == "light" { LIGHT_FONT } else { DARK_FONT };
    }
    if LIGHT_FONT_CLASSES.contains(color_class) {
        LIGHT_FONT
    } else {
        DARK_FONT
    }
}

/// Size of a diverging scale and the 1-based position of bucket `index` on it.
pub fn diverging_position(number_buckets: usize, index: usize, pivot: Pivot, pivot_index: usize) -> (usize, usize) {
    let left = pivot_index;
    let mut right = number_buckets.saturating_sub(pivot_index);
    if pivot == Pivot::Bucket {
        right = right.saturating_sub(1);
    }
    let mut scale_size = left.max(right) * 2;
    if pivot == Pivot::Bucket {
        scale_size += 1;
    }
    let position = if left < right {
        (scale_size + index + 1).saturating_sub(number_buckets)
    } else {
        index + 1
    };
    (scale_size, position)
}

/// Color class of bucket `index` out of `number_buckets`.
pub fn bucket_color_class(index: usize, number_buckets: usize, scale: &Scale, scheme: &str) -> String {
    match scale {
        Scale::Sequential => {
            let position = number_buckets.saturating_sub(index);
            format!("s-viz-color-sequential-{scheme}-{number_buckets}-{position}")
        }
        Scale::Diverging { pivot, index: pivot_index } => {
            let (scale_size, position) = diverging_position(number_buckets, index, *pivot, *pivot_index);
            format!("s-viz-color-diverging-{scheme}-{scale_size}-{position}")
        }
    }
}

/// Resolves the color of a bucket including user overrides.
pub fn bucket_color(index: usize, number_buckets: usize, scale: &Scale, scheme: &str, color_map: &BucketColorMap) -> BucketColor {
    let color_class = bucket_color_class(index, number_buckets, scale, scheme);
    let custom = color_map.get(index);
    BucketColor {
        text_color: text_color(custom, &color_class).to_owned(),
        custom_color: custom.map(|custom| custom.color.to_owned()).unwrap_or_default(),
        color_class,
    }
}

/// Resolves the color of the category at `index`; schemes repeat after twelve categories.
pub fn category_color(index: usize, color_map: &CategoryColorMap) -> BucketColor {
    let scheme = CATEGORY_SCHEMES[index % CATEGORY_SCHEMES.len()];
    let color_class = format!("s-viz-color-{scheme}-5");
    let custom = color_map.get(index);
    BucketColor {
        text_color: text_color(custom, &color_class).to_owned(),
        custom_color: custom.map(|custom| custom.color.to_owned()).unwrap_or_default(),
        color_class,
    }
}
