use crate::color::ckmeans::ckmeans;
use crate::color::scale::{bucket_color, BucketColor, BucketColorMap};
use crate::helpers::number::rounded_value;
use crate::options::NumericalOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors related to bucket computation.
#[derive(Error, Debug)]
pub enum BucketError {
    #[error("Invalid custom bucket borders '{0}'")]
    InvalidCustomBuckets(String),

    #[error("Cannot generate {buckets} buckets from {values} values")]
    TooManyBuckets { buckets: usize, values: usize },

    #[error("At least one bucket is required")]
    NoBuckets,

    #[error("No numeric values to bucket")]
    EmptyData,
}

/// Strategy used to split a numeric column into buckets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    /// Natural breaks, minimal variance inside each bucket
    #[default]
    Ckmeans,
    /// Same number of values per bucket
    Quantile,
    /// Same width per bucket
    Equal,
    /// Borders given by the user
    Custom,
}

impl BucketType {
    /// Returns the wire name of the bucket type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BucketType::Ckmeans => "ckmeans",
            BucketType::Quantile => "quantile",
            BucketType::Equal => "equal",
            BucketType::Custom => "custom",
        }
    }
}

/// A numeric range sharing one color.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub from: f64,
    pub to: f64,
    pub color: BucketColor,
}

impl Bucket {
    /// Membership test of the bucket at `index` out of `count`:
    /// the first bucket takes everything up to `to`, the last everything above
    /// `from`, the others the half-open range `(from, to]`.
    pub fn contains(&self, index: usize, count: usize, value: f64) -> bool {
        if index == 0 {
            value <= self.to
        } else if index + 1 == count {
            self.from < value
        } else {
            self.from < value && value <= self.to
        }
    }
}

/// Returns the index of the first bucket containing `value`.
pub fn bucket_index(buckets: &[Bucket], value: f64) -> Option<usize> {
    buckets
        .iter()
        .enumerate()
        .position(|(index, bucket)| bucket.contains(index, buckets.len(), value))
}

/// Quantile of sorted values: `p` scaled to the length, a fractional index
/// takes the value above it, an integer index on an even length averages
/// both neighbours.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let n = sorted.len();
    let idx = n as f64 * p;
    let value = if p == 1.0 {
        sorted[n - 1]
    } else if p == 0.0 {
        sorted[0]
    } else if idx.fract() != 0.0 {
        sorted[idx.ceil() as usize - 1]
    } else if n % 2 == 0 {
        let idx = idx as usize;
        (sorted[idx - 1] + sorted[idx]) / 2.0
    } else {
        sorted[idx as usize]
    };
    Some(value)
}

/// Parses a comma separated list of custom borders.
pub fn custom_bucket_borders(custom_buckets: &str) -> Result<Vec<f64>, BucketError> {
    custom_buckets
        .split(',')
        .map(|border| {
            border
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|border| border.is_finite())
                .ok_or_else(|| BucketError::InvalidCustomBuckets(custom_buckets.to_owned()))
        })
        .collect()
}

/// Number of buckets of the configured strategy; custom borders define one
/// bucket less than their count. Malformed borders count as zero buckets.
pub fn number_buckets(options: &NumericalOptions) -> usize {
    match options.bucket_type {
        BucketType::Custom => custom_bucket_borders(&options.custom_buckets)
            .map(|borders| borders.len().saturating_sub(1))
            .unwrap_or(0),
        _ => options.number_buckets,
    }
}

/// Buckets from natural breaks. Each bucket after the first starts at the
/// maximum of the previous cluster so that the legend stays contiguous.
pub fn ckmeans_buckets(values: &[f64], options: &NumericalOptions, color_map: &BucketColorMap) -> Result<Vec<Bucket>, BucketError> {
    let clusters = ckmeans(values, options.number_buckets)?;
    let maxima: Vec<f64> = clusters.iter().map(|cluster| max_of(cluster)).collect();
    Ok(clusters
        .iter()
        .enumerate()
        .map(|(index, cluster)| Bucket {
            from: if index == 0 { min_of(cluster) } else { maxima[index - 1] },
            to: maxima[index],
            color: bucket_color(index, options.number_buckets, &options.scale, &options.color_scheme, color_map),
        })
        .collect())
}

/// Buckets with the same number of values, bordered by the `i / k` quantiles.
pub fn quantile_buckets(values: &[f64], min_value: f64, options: &NumericalOptions, color_map: &BucketColorMap) -> Result<Vec<Bucket>, BucketError> {
    let count = options.number_buckets;
    if count == 0 {
        return Err(BucketError::NoBuckets);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let borders = (1..=count)
        .map(|i| quantile_sorted(&sorted, i as f64 / count as f64).ok_or(BucketError::EmptyData))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(borders
        .iter()
        .enumerate()
        .map(|(index, to)| Bucket {
            from: if index == 0 { min_value } else { borders[index - 1] },
            to: *to,
            color: bucket_color(index, count, &options.scale, &options.color_scheme, color_map),
        })
        .collect())
}

/// Buckets of equal width between minimum and maximum. Borders are rounded
/// per bucket, which decides where values on a border land.
pub fn equal_buckets(
    min_value: f64,
    max_value: f64,
    max_digits_after_comma: usize,
    options: &NumericalOptions,
    color_map: &BucketColorMap,
) -> Result<Vec<Bucket>, BucketError> {
    let count = options.number_buckets;
    if count == 0 {
        return Err(BucketError::NoBuckets);
    }
    let portion = 1.0 / count as f64;
    let range = max_value - min_value;
    Ok((0..count)
        .map(|index| {
            let from = if index == 0 { min_value } else { min_value + range * portion * index as f64 };
            let to = min_value + range * portion * (index + 1) as f64;
            Bucket {
                from: rounded_value(from, max_digits_after_comma),
                to: rounded_value(to, max_digits_after_comma),
                color: bucket_color(index, count, &options.scale, &options.color_scheme, color_map),
            }
        })
        .collect())
}

/// Buckets from user borders: the first border is the floor, every further
/// border closes one bucket. Borders are used in the given order.
pub fn custom_buckets(options: &NumericalOptions, color_map: &BucketColorMap) -> Result<Vec<Bucket>, BucketError> {
    let mut borders = custom_bucket_borders(&options.custom_buckets)?;
    if borders.len() < 2 {
        return Err(BucketError::NoBuckets);
    }
    let count = borders.len() - 1;
    let floor = borders.remove(0);
    Ok(borders
        .iter()
        .enumerate()
        .map(|(index, to)| Bucket {
            from: if index == 0 { floor } else { borders[index - 1] },
            to: *to,
            color: bucket_color(index, count, &options.scale, &options.color_scheme, color_map),
        })
        .collect())
}

/// Computes the buckets of the configured strategy.
pub fn buckets(
    values: &[f64],
    min_value: f64,
    max_value: f64,
    max_digits_after_comma: usize,
    options: &NumericalOptions,
    color_map: &BucketColorMap,
) -> Result<Vec<Bucket>, BucketError> {
    let buckets = match options.bucket_type {
        BucketType::Ckmeans => ckmeans_buckets(values, options, color_map)?,
        BucketType::Quantile => quantile_buckets(values, min_value, options, color_map)?,
        BucketType::Equal => equal_buckets(min_value, max_value, max_digits_after_comma, options, color_map)?,
        BucketType::Custom => custom_buckets(options, color_map)?,
    };
    debug!(
        bucket_type = options.bucket_type.as_str(),
        borders = ?buckets.iter().map(|bucket| (bucket.from, bucket.to)).collect::<Vec<_>>(),
        "computed buckets"
    );
    Ok(buckets)
}

#[inline]
pub(crate) fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

#[inline]
pub(crate) fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
