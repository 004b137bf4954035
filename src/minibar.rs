//! In-cell bar charts for one numeric column.
use crate::options::{BarColor, BarColorPole, MinibarOptions};
use crate::table::ProcessedTableData;
use serde::Serialize;
use tracing::debug;

/// Default bar color of single-signed columns.
pub const DEFAULT_BAR_CLASS: &str = "s-viz-color-one-5";

/// Default bar color of positive values in mixed columns.
pub const MIXED_POSITIVE_BAR_CLASS: &str = "s-viz-color-diverging-2-2";

/// Default bar color of negative values in mixed columns.
pub const MIXED_NEGATIVE_BAR_CLASS: &str = "s-viz-color-diverging-2-1";

/// Sign of the values of a minibar column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MinibarType {
    Positive,
    Negative,
    Mixed,
    /// No column or no values
    #[default]
    Empty,
}

impl MinibarType {
    /// Classifies values: all non-negative is positive, all non-positive is negative.
    pub fn of<I>(values: I) -> MinibarType
    where
        I: IntoIterator<Item = f64>,
    {
        let (mut any, mut all_positive, mut all_negative) = (false, true, true);
        for value in values {
            any = true;
            all_positive &= value >= 0.0;
            all_negative &= value <= 0.0;
        }
        match (any, all_positive, all_negative) {
            (false, _, _) => MinibarType::Empty,
            (true, true, _) => MinibarType::Positive,
            (true, false, true) => MinibarType::Negative,
            (true, false, false) => MinibarType::Mixed,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            MinibarType::Positive => "positive",
            MinibarType::Negative => "negative",
            MinibarType::Mixed => "mixed",
            MinibarType::Empty => "empty",
        }
    }
}

/// Bar lengths of the minibar column, in percent of the longest bar.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Minibar {
    /// `None` when minibars are inactive
    pub column_index: Option<usize>,
    /// One length per data row, zero for cells without value
    pub values: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: MinibarType,
    pub bar_color: BarColor,
}

impl Minibar {
    pub fn is_active(&self) -> bool {
        self.column_index.is_some()
    }
}

/// Minibars need a numeric column with at least one value.
pub fn minibars_available(processed: &ProcessedTableData, column: usize) -> bool {
    processed.is_numeric_column(column)
        && processed
            .column(column)
            .map(|cells| cells.iter().any(|cell| cell.number().is_some()))
            .unwrap_or(false)
}

/// Computes the minibar of the selected column; an inactive minibar when
/// none is selected or the column cannot carry bars.
pub fn minibar(processed: &ProcessedTableData, options: Option<&MinibarOptions>) -> Minibar {
    let Some((options, column)) = options.and_then(|options| Some((options, options.selected_column?))) else {
        return Minibar::default();
    };
    if !minibars_available(processed, column) {
        debug!(column, "minibar column has no numeric values");
        return Minibar::default();
    }
    let numbers: Vec<Option<f64>> = processed
        .column(column)
        .map(|cells| cells.iter().map(|cell| cell.number()).collect())
        .unwrap_or_default();

    let kind = MinibarType::of(numbers.iter().flatten().copied());
    let min = numbers.iter().flatten().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let values = numbers
        .iter()
        .map(|number| number.map(|value| minibar_value(kind, value, min, max)).unwrap_or(0.0))
        .collect();

    let mut bar_color = BarColor {
        positive: resolve_pole(&options.bar_color.positive, kind, true),
        negative: resolve_pole(&options.bar_color.negative, kind, false),
    };
    if options.invert_colors {
        std::mem::swap(&mut bar_color.positive, &mut bar_color.negative);
    }

    debug!(column, kind = kind.as_str(), "computed minibar");
    Minibar {
        column_index: Some(column),
        values,
        kind,
        bar_color,
    }
}

/// Bar length of one value in percent. Mixed columns scale by the larger
/// absolute extreme so both directions share one scale.
pub fn minibar_value(kind: MinibarType, value: f64, min: f64, max: f64) -> f64 {
    let scale = match kind {
        MinibarType::Positive => max.abs(),
        MinibarType::Negative => min.abs(),
        MinibarType::Mixed => min.abs().max(max.abs()),
        MinibarType::Empty => 0.0,
    };
    if scale == 0.0 {
        0.0
    } else {
        value.abs() / scale * 100.0
    }
}

/// A class and a color code exclude each other; without either the default
/// class of the minibar type applies.
fn resolve_pole(pole: &BarColorPole, kind: MinibarType, positive: bool) -> BarColorPole {
    if !pole.class_name.is_empty() {
        return BarColorPole {
            class_name: pole.class_name.to_owned(),
            color_code: String::new(),
        };
    }
    if !pole.color_code.is_empty() {
        return BarColorPole {
            class_name: String::new(),
            color_code: pole.color_code.to_owned(),
        };
    }
    let class_name = match (kind, positive) {
        (MinibarType::Mixed, true) => MIXED_POSITIVE_BAR_CLASS,
        (MinibarType::Mixed, false) => MIXED_NEGATIVE_BAR_CLASS,
        _ => DEFAULT_BAR_CLASS,
    };
    BarColorPole {
        class_name: class_name.to_owned(),
        color_code: String::new(),
    }
}
