// Quantile Transform - per-column knots fitted on a reference batch
//
// Forward: clip x into the fitted range, map to a probability by
// piecewise-linear interpolation over the knots, then to the output
// distribution. Inverse walks the same path backwards.

use super::batch::{Column, RowBatch};
use super::error::{FitError, TransformError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Default number of knots per column
pub const DEFAULT_N_QUANTILES: usize = 1000;

/// Probability margin kept away from 0 and 1 so Φ⁻¹ stays finite
pub const BOUNDS_THRESHOLD: f64 = 1e-7;

/// Relative round-trip tolerance for values inside the fitted range
pub const ROUND_TRIP_RTOL: f64 = 1e-6;

/// Absolute round-trip tolerance for values near zero
pub const ROUND_TRIP_ATOL: f64 = 1e-9;

/// Target distribution of transformed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDistribution {
    /// Probabilities in [0, 1]
    Uniform,
    /// Standard normal scores, bounded by Φ⁻¹(1e-7) and Φ⁻¹(1 - 1e-7)
    #[default]
    Normal,
}

impl std::fmt::Display for OutputDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputDistribution::Uniform => write!(f, "uniform"),
            OutputDistribution::Normal => write!(f, "normal"),
        }
    }
}

/// Quantile transform parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantileConfig {
    pub n_quantiles: usize,
    pub output_distribution: OutputDistribution,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            n_quantiles: DEFAULT_N_QUANTILES,
            output_distribution: OutputDistribution::Normal,
        }
    }
}

/// Fitted knots of one column (non-decreasing)
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnKnots {
    pub name: String,
    pub quantiles: Vec<f64>,
}

/// Fitted Transform State
///
/// Immutable after [`QuantileState::fit`]. Two states fitted on the same
/// reference batch with the same config compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileState {
    output: OutputDistribution,
    references: Vec<f64>,
    columns: Vec<ColumnKnots>,
    normal: Normal,
}

impl QuantileState {
    /// Fit knots on every column of `reference`.
    ///
    /// Non-finite reference values are ignored. The knot count is
    /// `min(n_quantiles, rows)`, but never below 2, so a single-row or
    /// constant column degenerates to a flat mapping instead of failing.
    pub fn fit(reference: &RowBatch, config: &QuantileConfig) -> Result<Self, FitError> {
        if config.n_quantiles < 2 {
            return Err(FitError::InvalidConfig(format!(
                "n_quantiles must be at least 2, got {}",
                config.n_quantiles
            )));
        }
        if reference.num_columns() == 0 {
            return Err(FitError::NoColumns);
        }
        if reference.num_rows() == 0 {
            return Err(FitError::NoRows);
        }

        let n = config.n_quantiles.min(reference.num_rows()).max(2);
        let references = linspace(n);

        let columns = reference
            .columns()
            .iter()
            .map(|column| fit_column(column, &references))
            .collect::<Result<Vec<_>, _>>()?;

        let normal =
            Normal::new(0.0, 1.0).map_err(|e| FitError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            output: config.output_distribution,
            references,
            columns,
            normal,
        })
    }

    pub fn output_distribution(&self) -> OutputDistribution {
        self.output
    }

    pub fn n_quantiles(&self) -> usize {
        self.references.len()
    }

    pub fn knots(&self, column: &str) -> Option<&ColumnKnots> {
        self.columns.iter().find(|c| c.name == column)
    }

    /// Map raw values into the output distribution
    pub fn transform(&self, batch: &RowBatch) -> Result<RowBatch, TransformError> {
        self.check_layout(batch)?;
        self.map_columns(batch, |knots, x| {
            let u = value_to_probability(&knots.quantiles, &self.references, x);
            self.to_output(u)
        })
    }

    /// Map output-distribution values back to raw space
    pub fn inverse_transform(&self, batch: &RowBatch) -> Result<RowBatch, TransformError> {
        self.check_layout(batch)?;
        self.map_columns(batch, |knots, y| {
            let u = self.from_output(y);
            probability_to_value(&knots.quantiles, &self.references, u)
        })
    }

    fn to_output(&self, u: f64) -> f64 {
        match self.output {
            OutputDistribution::Uniform => u,
            OutputDistribution::Normal => self
                .normal
                .inverse_cdf(u.clamp(BOUNDS_THRESHOLD, 1.0 - BOUNDS_THRESHOLD)),
        }
    }

    fn from_output(&self, y: f64) -> f64 {
        match self.output {
            OutputDistribution::Uniform => y.clamp(0.0, 1.0),
            OutputDistribution::Normal => self
                .normal
                .cdf(y)
                .clamp(BOUNDS_THRESHOLD, 1.0 - BOUNDS_THRESHOLD),
        }
    }

    fn check_layout(&self, batch: &RowBatch) -> Result<(), TransformError> {
        if batch.num_columns() != self.columns.len() {
            return Err(TransformError::ColumnCount {
                expected: self.columns.len(),
                actual: batch.num_columns(),
            });
        }
        for (index, (column, knots)) in batch.columns().iter().zip(&self.columns).enumerate() {
            if column.name != knots.name {
                return Err(TransformError::ColumnName {
                    index,
                    expected: knots.name.clone(),
                    actual: column.name.clone(),
                });
            }
        }
        if batch.is_empty() {
            return Err(TransformError::EmptyBatch);
        }
        Ok(())
    }

    fn map_columns<F>(&self, batch: &RowBatch, f: F) -> Result<RowBatch, TransformError>
    where
        F: Fn(&ColumnKnots, f64) -> f64,
    {
        let columns = batch
            .columns()
            .iter()
            .zip(&self.columns)
            .map(|(column, knots)| {
                let values = column
                    .values
                    .iter()
                    .enumerate()
                    .map(|(row, &x)| {
                        if x.is_nan() {
                            Err(TransformError::NotANumber {
                                column: column.name.clone(),
                                row,
                            })
                        } else {
                            Ok(f(knots, x))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Column::new(column.name.clone(), values))
            })
            .collect::<Result<Vec<_>, TransformError>>()?;
        RowBatch::new(columns)
    }
}

fn fit_column(column: &Column, references: &[f64]) -> Result<ColumnKnots, FitError> {
    let mut finite: Vec<f64> = column
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() {
        return Err(FitError::NoUsableValues(column.name.clone()));
    }
    finite.sort_by(f64::total_cmp);

    let mut quantiles: Vec<f64> = references
        .iter()
        .map(|&p| percentile(&finite, p))
        .collect();

    // Interpolation rounding can dip below the previous knot
    for i in 1..quantiles.len() {
        if quantiles[i] < quantiles[i - 1] {
            quantiles[i] = quantiles[i - 1];
        }
    }

    Ok(ColumnKnots {
        name: column.name.clone(),
        quantiles,
    })
}

/// `n` evenly spaced probabilities from 0 to 1 inclusive (n >= 2)
fn linspace(n: usize) -> Vec<f64> {
    let last = (n - 1) as f64;
    (0..n).map(|k| k as f64 / last).collect()
}

/// Linear-interpolated percentile of a sorted, non-empty slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len() - 1;
    let pos = p * last as f64;
    let lo = (pos.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Knot interpolation, raw value -> probability.
///
/// A value equal to a run of tied knots maps to the midpoint of their
/// probabilities, which is what makes constant columns well defined.
fn value_to_probability(quantiles: &[f64], references: &[f64], x: f64) -> f64 {
    let last = quantiles.len() - 1;
    let x = x.clamp(quantiles[0], quantiles[last]);

    let lo = quantiles.partition_point(|&q| q < x);
    let hi = quantiles.partition_point(|&q| q <= x);
    if lo < hi {
        return 0.5 * (references[lo] + references[hi - 1]);
    }

    // quantiles[lo - 1] < x < quantiles[lo]
    let (x0, x1) = (quantiles[lo - 1], quantiles[lo]);
    let (p0, p1) = (references[lo - 1], references[lo]);
    p0 + (x - x0) / (x1 - x0) * (p1 - p0)
}

/// Knot interpolation, probability -> raw value
fn probability_to_value(quantiles: &[f64], references: &[f64], u: f64) -> f64 {
    let last = quantiles.len() - 1;
    let u = u.clamp(0.0, 1.0);

    let i = references.partition_point(|&p| p <= u);
    if i == 0 {
        return quantiles[0];
    }
    if i > last {
        return quantiles[last];
    }

    let (p0, p1) = (references[i - 1], references[i]);
    let (x0, x1) = (quantiles[i - 1], quantiles[i]);
    x0 + (u - p0) / (p1 - p0) * (x1 - x0)
}

/// True if `actual` reconstructs `expected` within the documented tolerance
pub fn within_round_trip_tolerance(expected: f64, actual: f64) -> bool {
    (expected - actual).abs() <= ROUND_TRIP_ATOL.max(ROUND_TRIP_RTOL * expected.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_0_to_10000(rows: usize) -> RowBatch {
        let step = 10_000.0 / (rows - 1) as f64;
        RowBatch::single("amount", (0..rows).map(|i| i as f64 * step).collect())
    }

    fn config(output: OutputDistribution) -> QuantileConfig {
        QuantileConfig {
            n_quantiles: DEFAULT_N_QUANTILES,
            output_distribution: output,
        }
    }

    fn assert_round_trip(input: &RowBatch, state: &QuantileState) {
        let forward = state.transform(input).unwrap();
        let back = state.inverse_transform(&forward).unwrap();
        for (orig, col) in input.columns().iter().zip(back.columns()) {
            for (row, (&x, &y)) in orig.values.iter().zip(&col.values).enumerate() {
                assert!(
                    within_round_trip_tolerance(x, y),
                    "column {} row {}: {} -> {}",
                    orig.name,
                    row,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_linspace_endpoints() {
        let r = linspace(5);
        assert_eq!(r, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(percentile(&sorted, 0.0), 0.0);
        assert_eq!(percentile(&sorted, 1.0), 30.0);
        assert!((percentile(&sorted, 0.5) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_normal() {
        let state = QuantileState::fit(
            &reference_0_to_10000(1000),
            &config(OutputDistribution::Normal),
        )
        .unwrap();
        let input = RowBatch::single(
            "amount",
            (0..200).map(|i| 3.7 + (i as f64 * 49.31) % 9_990.0).collect(),
        );
        assert_round_trip(&input, &state);
    }

    #[test]
    fn test_round_trip_uniform() {
        let state = QuantileState::fit(
            &reference_0_to_10000(1000),
            &config(OutputDistribution::Uniform),
        )
        .unwrap();
        let input = RowBatch::single("amount", vec![0.0, 1.5, 5_000.0, 9_999.9, 10_000.0]);
        assert_round_trip(&input, &state);
    }

    #[test]
    fn test_round_trip_skewed_multi_column() {
        let skewed: Vec<f64> = (0..500).map(|i| (i as f64 / 50.0).exp()).collect();
        let linear: Vec<f64> = (0..500).map(|i| -250.0 + i as f64).collect();
        let reference = RowBatch::new(vec![
            Column::new("skewed", skewed),
            Column::new("linear", linear),
        ])
        .unwrap();
        let state = QuantileState::fit(&reference, &config(OutputDistribution::Normal)).unwrap();
        assert_eq!(state.n_quantiles(), 500);

        let input = RowBatch::new(vec![
            Column::new("skewed", vec![1.5, 20.0, 1_000.0, 15_000.0]),
            Column::new("linear", vec![-100.25, 0.5, 17.0, 200.75]),
        ])
        .unwrap();
        assert_round_trip(&input, &state);
    }

    #[test]
    fn test_uniform_output_is_probability() {
        let state = QuantileState::fit(
            &reference_0_to_10000(11),
            &config(OutputDistribution::Uniform),
        )
        .unwrap();
        let out = state
            .transform(&RowBatch::single("amount", vec![0.0, 5_000.0, 10_000.0]))
            .unwrap();
        let values = &out.columns()[0].values;
        assert!(values[0].abs() < 1e-12);
        assert!((values[1] - 0.5).abs() < 1e-12);
        assert!((values[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_reference_extremes_reconstruct_inside_clamp() {
        let reference = reference_0_to_10000(1000);
        let input = RowBatch::single("amount", vec![0.0, 10_000.0]);

        // Scores are clamped to [1e-7, 1 - 1e-7] so the extremes come back shifted
        let state = QuantileState::fit(&reference, &config(OutputDistribution::Normal)).unwrap();
        let back = state
            .inverse_transform(&state.transform(&input).unwrap())
            .unwrap();
        let x = &back.columns()[0].values;
        assert!((x[0] - 1e-3).abs() < 1e-6, "min came back as {}", x[0]);
        assert!((x[1] - (10_000.0 - 1e-3)).abs() < 1e-6, "max came back as {}", x[1]);
        assert!(!within_round_trip_tolerance(0.0, x[0]));

        let state = QuantileState::fit(&reference, &config(OutputDistribution::Uniform)).unwrap();
        let back = state
            .inverse_transform(&state.transform(&input).unwrap())
            .unwrap();
        let x = &back.columns()[0].values;
        assert!(x[0].abs() < 1e-6);
        assert!(within_round_trip_tolerance(10_000.0, x[1]));
    }

    #[test]
    fn test_outliers_clip_to_boundary() {
        let state = QuantileState::fit(
            &reference_0_to_10000(1000),
            &config(OutputDistribution::Normal),
        )
        .unwrap();
        let input = RowBatch::single(
            "amount",
            vec![-1e12, f64::NEG_INFINITY, 1e12, f64::INFINITY],
        );
        let out = state.transform(&input).unwrap();
        let z = &out.columns()[0].values;
        let z_min = state.to_output(0.0);
        let z_max = state.to_output(1.0);

        assert!(z.iter().all(|v| v.is_finite()));
        assert!(z_min < -5.0 && z_max > 5.0);
        assert_eq!(z[0], z_min);
        assert_eq!(z[1], z_min);
        assert_eq!(z[2], z_max);
        assert_eq!(z[3], z_max);

        let back = state.inverse_transform(&out).unwrap();
        let x = &back.columns()[0].values;
        assert!(x[0] >= 0.0 && x[0] < 1.0);
        assert!(x[2] <= 10_000.0 && x[2] > 9_999.0);
    }

    #[test]
    fn test_inverse_clips_out_of_range_scores() {
        let state = QuantileState::fit(
            &reference_0_to_10000(1000),
            &config(OutputDistribution::Normal),
        )
        .unwrap();
        let back = state
            .inverse_transform(&RowBatch::single("amount", vec![-50.0, 50.0]))
            .unwrap();
        let x = &back.columns()[0].values;
        assert!(x.iter().all(|v| v.is_finite()));
        assert!(x[0] >= 0.0 && x[1] <= 10_000.0);
    }

    #[test]
    fn test_zero_variance_column_is_well_defined() {
        let reference = RowBatch::single("flat", vec![0.0; 100]);
        let state = QuantileState::fit(&reference, &config(OutputDistribution::Normal)).unwrap();

        let out = state
            .transform(&RowBatch::single("flat", vec![-5.0, 0.0, 3.0, 1e9]))
            .unwrap();
        for z in &out.columns()[0].values {
            assert!(z.is_finite());
            assert!(z.abs() < 1e-12, "expected midpoint score 0, got {}", z);
        }

        let back = state.inverse_transform(&out).unwrap();
        assert!(back.columns()[0].values.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_tied_knots_round_trip() {
        let mut values = vec![5.0; 60];
        values.extend((0..40).map(|i| 10.0 + i as f64));
        let reference = RowBatch::single("tied", values);
        let state = QuantileState::fit(&reference, &config(OutputDistribution::Normal)).unwrap();

        let input = RowBatch::single("tied", vec![5.0, 7.5, 12.25, 30.0]);
        assert_round_trip(&input, &state);
    }

    #[test]
    fn test_single_row_reference() {
        let state = QuantileState::fit(
            &RowBatch::single("one", vec![42.0]),
            &config(OutputDistribution::Normal),
        )
        .unwrap();
        assert_eq!(state.n_quantiles(), 2);
        let back = state
            .inverse_transform(&state.transform(&RowBatch::single("one", vec![1.0])).unwrap())
            .unwrap();
        assert_eq!(back.columns()[0].values, vec![42.0]);
    }

    #[test]
    fn test_monotone_mapping() {
        let state = QuantileState::fit(
            &reference_0_to_10000(1000),
            &config(OutputDistribution::Normal),
        )
        .unwrap();
        let input = RowBatch::single("amount", (0..100).map(|i| i as f64 * 100.0).collect());
        let out = state.transform(&input).unwrap();
        let z = &out.columns()[0].values;
        assert!(z.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let reference = reference_0_to_10000(1000);
        let a = QuantileState::fit(&reference, &QuantileConfig::default()).unwrap();
        let b = QuantileState::fit(&reference, &QuantileConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_ignores_non_finite_reference_values() {
        let reference = RowBatch::single("x", vec![f64::NAN, 1.0, f64::INFINITY, 3.0]);
        let state = QuantileState::fit(&reference, &QuantileConfig::default()).unwrap();
        let knots = state.knots("x").unwrap();
        assert_eq!(knots.quantiles.first(), Some(&1.0));
        assert_eq!(knots.quantiles.last(), Some(&3.0));
    }

    #[test]
    fn test_fit_errors() {
        assert_eq!(
            QuantileState::fit(&RowBatch::default(), &QuantileConfig::default()).unwrap_err(),
            FitError::NoColumns
        );
        assert_eq!(
            QuantileState::fit(&RowBatch::single("x", vec![]), &QuantileConfig::default())
                .unwrap_err(),
            FitError::NoRows
        );
        assert_eq!(
            QuantileState::fit(
                &RowBatch::single("x", vec![f64::NAN, f64::NAN]),
                &QuantileConfig::default()
            )
            .unwrap_err(),
            FitError::NoUsableValues("x".to_string())
        );
        let bad = QuantileConfig {
            n_quantiles: 1,
            ..QuantileConfig::default()
        };
        assert!(matches!(
            QuantileState::fit(&RowBatch::single("x", vec![1.0]), &bad),
            Err(FitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_layout_errors() {
        let state =
            QuantileState::fit(&reference_0_to_10000(10), &QuantileConfig::default()).unwrap();

        assert_eq!(
            state
                .transform(&RowBatch::single("amount", vec![]))
                .unwrap_err(),
            TransformError::EmptyBatch
        );
        assert_eq!(
            state
                .transform(&RowBatch::single("other", vec![1.0]))
                .unwrap_err(),
            TransformError::ColumnName {
                index: 0,
                expected: "amount".to_string(),
                actual: "other".to_string()
            }
        );
        let wide = RowBatch::new(vec![
            Column::new("amount", vec![1.0]),
            Column::new("extra", vec![1.0]),
        ])
        .unwrap();
        assert_eq!(
            state.transform(&wide).unwrap_err(),
            TransformError::ColumnCount {
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(
            state
                .inverse_transform(&RowBatch::single("amount", vec![0.0, f64::NAN]))
                .unwrap_err(),
            TransformError::NotANumber {
                column: "amount".to_string(),
                row: 1
            }
        );
    }
}
