//! Volatility classification and indicator surprise calculations.
//!
//! Percentiles use linear interpolation between the closest ranks: for a sorted
//! sample `s` of length `n`, the `p`-th percentile sits at rank `p * (n - 1)`
//! and is interpolated between `s[floor(rank)]` and `s[ceil(rank)]`. For the
//! values `1..=10` this gives p33 = 3.97 and p67 = 7.03.
//!
//! Buckets are LOW (`v < p33`), MEDIUM (`p33 <= v <= p67`) and HIGH (`v > p67`).
//! With fewer than [`MIN_CLASSIFIABLE_VALUES`] values the percentile split is
//! meaningless, so every value is reported as MEDIUM and the result is flagged
//! as degenerate.

use serde::{Serialize, Serializer};

use crate::error::StatisticsError;
use crate::models::VolatilityCategory;

pub const LOW_PERCENTILE: f64 = 0.33;
pub const HIGH_PERCENTILE: f64 = 0.67;
pub const MIN_CLASSIFIABLE_VALUES: usize = 3;

/// Default absolute thresholds: 5 and 10 pips.
pub const DEFAULT_ABSOLUTE_LOW: f64 = 0.0005;
pub const DEFAULT_ABSOLUTE_HIGH: f64 = 0.001;

pub type StatisticsResult<T> = Result<T, StatisticsError>;

fn validated_sorted(values: &[f64]) -> StatisticsResult<Vec<f64>> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyInput);
    }
    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(StatisticsError::InvalidValue { index, value });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Interpolated percentile of an ascending slice, `p` in `[0, 1]`.
pub fn percentile(sorted: &[f64], p: f64) -> StatisticsResult<f64> {
    if sorted.is_empty() {
        return Err(StatisticsError::EmptyInput);
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(StatisticsError::InvalidPercentile(p));
    }

    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Ok(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    fn from_sorted(sorted: &[f64]) -> StatisticsResult<Self> {
        Ok(Thresholds {
            low: percentile(sorted, LOW_PERCENTILE)?,
            high: percentile(sorted, HIGH_PERCENTILE)?,
        })
    }

    /// p33/p67 thresholds of `values` (any order).
    pub fn from_values(values: &[f64]) -> StatisticsResult<Self> {
        Self::from_sorted(&validated_sorted(values)?)
    }

    pub fn absolute(low: f64, high: f64) -> StatisticsResult<Self> {
        let valid = low.is_finite() && high.is_finite() && low >= 0.0 && low <= high;
        if !valid {
            return Err(StatisticsError::InvalidThresholds { low, high });
        }
        Ok(Thresholds { low, high })
    }

    pub fn classify(&self, value: f64) -> VolatilityCategory {
        if value < self.low {
            VolatilityCategory::Low
        } else if value > self.high {
            VolatilityCategory::High
        } else {
            VolatilityCategory::Medium
        }
    }
}

/// How classification thresholds are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
    #[default]
    Percentile,
    Absolute { low: f64, high: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedValue {
    pub value: f64,
    pub category: VolatilityCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub category: VolatilityCategory,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub method: ThresholdMethod,
    pub thresholds: Thresholds,
    pub degenerate: bool,
    /// In input order.
    pub values: Vec<ClassifiedValue>,
}

impl Classification {
    pub fn members(&self, category: VolatilityCategory) -> Vec<f64> {
        self.values
            .iter()
            .filter(|v| v.category == category)
            .map(|v| v.value)
            .collect()
    }

    pub fn count(&self, category: VolatilityCategory) -> usize {
        self.values.iter().filter(|v| v.category == category).count()
    }

    /// Count, mean, min and max per bucket, HIGH first.
    pub fn bucket_summaries(&self) -> Vec<BucketSummary> {
        VolatilityCategory::ALL
            .iter()
            .map(|&category| {
                let members = self.members(category);
                let count = members.len();
                let mean = (count > 0).then(|| members.iter().sum::<f64>() / count as f64);
                BucketSummary {
                    category,
                    count,
                    mean,
                    min: members.iter().copied().reduce(f64::min),
                    max: members.iter().copied().reduce(f64::max),
                }
            })
            .collect()
    }
}

pub fn classify(values: &[f64]) -> StatisticsResult<Classification> {
    classify_with(values, ThresholdMethod::Percentile)
}

pub fn classify_with(values: &[f64], method: ThresholdMethod) -> StatisticsResult<Classification> {
    let sorted = validated_sorted(values)?;
    let (thresholds, degenerate) = match method {
        ThresholdMethod::Percentile => (
            Thresholds::from_sorted(&sorted)?,
            sorted.len() < MIN_CLASSIFIABLE_VALUES,
        ),
        ThresholdMethod::Absolute { low, high } => (Thresholds::absolute(low, high)?, false),
    };

    let values = values
        .iter()
        .map(|&value| ClassifiedValue {
            value,
            category: if degenerate {
                VolatilityCategory::Medium
            } else {
                thresholds.classify(value)
            },
        })
        .collect();

    Ok(Classification {
        method,
        thresholds,
        degenerate,
        values,
    })
}

/// Descriptive statistics; `std_dev` is the sample deviation (n - 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> StatisticsResult<Summary> {
    let sorted = validated_sorted(values)?;
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std_dev = (count >= 2).then(|| {
        let squares: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    });

    Ok(Summary {
        count,
        mean,
        median: percentile(&sorted, 0.5)?,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
    })
}

/// Actual minus forecast, or an explicit marker when either side is missing
/// or the difference is not representable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surprise {
    Available(f64),
    Unavailable,
}

impl Surprise {
    pub fn value(&self) -> Option<f64> {
        match self {
            Surprise::Available(v) => Some(*v),
            Surprise::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Surprise::Available(_))
    }

    pub fn direction(&self) -> SurpriseDirection {
        match self {
            Surprise::Available(v) if *v > 0.0 => SurpriseDirection::Beat,
            Surprise::Available(v) if *v < 0.0 => SurpriseDirection::Miss,
            Surprise::Available(_) => SurpriseDirection::InLine,
            Surprise::Unavailable => SurpriseDirection::Unknown,
        }
    }
}

impl Serialize for Surprise {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Where the actual print landed relative to the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurpriseDirection {
    Beat,
    Miss,
    InLine,
    Unknown,
}

pub fn surprise(actual: Option<f64>, forecast: Option<f64>) -> Surprise {
    match (actual, forecast) {
        (Some(actual), Some(forecast)) if (actual - forecast).is_finite() => {
            Surprise::Available(actual - forecast)
        }
        _ => Surprise::Unavailable,
    }
}

/// Surprise relative to the magnitude of the forecast, in percent.
pub fn surprise_percent(actual: Option<f64>, forecast: Option<f64>) -> Option<f64> {
    let (actual, forecast) = (actual?, forecast?);
    if forecast == 0.0 {
        return None;
    }
    Some((actual - forecast) / forecast.abs() * 100.0).filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = one_to_ten();
        assert!((percentile(&values, LOW_PERCENTILE).unwrap() - 3.97).abs() < EPS);
        assert!((percentile(&values, HIGH_PERCENTILE).unwrap() - 7.03).abs() < EPS);
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 1.0).unwrap(), 10.0);
        assert!((percentile(&values, 0.5).unwrap() - 5.5).abs() < EPS);
    }

    #[test]
    fn test_percentile_rejects_bad_input() {
        assert_eq!(percentile(&[], 0.5), Err(StatisticsError::EmptyInput));
        assert_eq!(
            percentile(&[1.0], 1.5),
            Err(StatisticsError::InvalidPercentile(1.5))
        );
        assert!(percentile(&[1.0], f64::NAN).is_err());
        assert_eq!(percentile(&[2.5], 0.33).unwrap(), 2.5);
    }

    #[test]
    fn test_classify_one_to_ten() {
        let result = classify(&one_to_ten()).unwrap();
        assert!(!result.degenerate);
        assert_eq!(result.method, ThresholdMethod::Percentile);

        assert_eq!(result.thresholds.classify(3.0), VolatilityCategory::Low);
        assert_eq!(result.thresholds.classify(5.0), VolatilityCategory::Medium);
        assert_eq!(result.thresholds.classify(9.0), VolatilityCategory::High);

        assert_eq!(result.members(VolatilityCategory::Low), vec![1.0, 2.0, 3.0]);
        assert_eq!(result.members(VolatilityCategory::Medium), vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(result.members(VolatilityCategory::High), vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_classify_boundaries_are_medium() {
        let thresholds = Thresholds::absolute(1.0, 2.0).unwrap();
        assert_eq!(thresholds.classify(1.0), VolatilityCategory::Medium);
        assert_eq!(thresholds.classify(2.0), VolatilityCategory::Medium);
        assert_eq!(thresholds.classify(0.999), VolatilityCategory::Low);
        assert_eq!(thresholds.classify(2.001), VolatilityCategory::High);
    }

    #[test]
    fn test_classify_keeps_input_order() {
        let result = classify(&[9.0, 1.0, 5.0]).unwrap();
        let categories: Vec<_> = result.values.iter().map(|v| v.category).collect();
        assert_eq!(
            categories,
            vec![
                VolatilityCategory::High,
                VolatilityCategory::Low,
                VolatilityCategory::Medium
            ]
        );
    }

    #[test]
    fn test_classify_empty_input_fails() {
        assert_eq!(classify(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(summarize(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(Thresholds::from_values(&[]), Err(StatisticsError::EmptyInput));
    }

    #[test]
    fn test_classify_invalid_values_fail() {
        assert_eq!(
            classify(&[1.0, -0.5]),
            Err(StatisticsError::InvalidValue { index: 1, value: -0.5 })
        );
        assert!(matches!(
            classify(&[f64::INFINITY]),
            Err(StatisticsError::InvalidValue { index: 0, .. })
        ));
        assert!(classify(&[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_small_inputs_degenerate_to_medium() {
        for values in [vec![0.4], vec![0.1, 0.9]] {
            let result = classify(&values).unwrap();
            assert!(result.degenerate);
            assert!(result
                .values
                .iter()
                .all(|v| v.category == VolatilityCategory::Medium));
        }
        assert!(!classify(&[0.1, 0.5, 0.9]).unwrap().degenerate);
    }

    #[test]
    fn test_absolute_method() {
        let method = ThresholdMethod::Absolute {
            low: DEFAULT_ABSOLUTE_LOW,
            high: DEFAULT_ABSOLUTE_HIGH,
        };
        let result = classify_with(&[0.0002], method).unwrap();
        assert!(!result.degenerate);
        assert_eq!(result.values[0].category, VolatilityCategory::Low);

        let result = classify_with(&[0.0002, 0.0007, 0.0015], method).unwrap();
        assert_eq!(result.count(VolatilityCategory::Low), 1);
        assert_eq!(result.count(VolatilityCategory::Medium), 1);
        assert_eq!(result.count(VolatilityCategory::High), 1);
    }

    #[test]
    fn test_absolute_thresholds_validated() {
        assert!(Thresholds::absolute(2.0, 1.0).is_err());
        assert!(Thresholds::absolute(-1.0, 1.0).is_err());
        assert!(Thresholds::absolute(0.0, f64::NAN).is_err());
        assert!(Thresholds::absolute(0.5, 0.5).is_ok());
    }

    #[test]
    fn test_bucket_summaries() {
        let result = classify(&one_to_ten()).unwrap();
        let buckets = result.bucket_summaries();
        assert_eq!(buckets.len(), 3);

        let high = &buckets[0];
        assert_eq!(high.category, VolatilityCategory::High);
        assert_eq!(high.count, 3);
        assert_eq!(high.mean, Some(9.0));
        assert_eq!(high.min, Some(8.0));
        assert_eq!(high.max, Some(10.0));

        let degenerate = classify(&[1.0]).unwrap().bucket_summaries();
        assert_eq!(degenerate[0].count, 0);
        assert_eq!(degenerate[0].mean, None);
        assert_eq!(degenerate[1].count, 1);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&[4.0, 2.0, 6.0, 8.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 8.0);
        // sqrt(20 / 3)
        assert!((summary.std_dev.unwrap() - 2.581988897471611).abs() < EPS);

        assert_eq!(summarize(&[3.0]).unwrap().std_dev, None);
    }

    #[test]
    fn test_surprise() {
        assert_eq!(surprise(Some(105.0), Some(100.0)), Surprise::Available(5.0));
        assert_eq!(surprise(None, Some(100.0)), Surprise::Unavailable);
        assert_eq!(surprise(Some(105.0), None), Surprise::Unavailable);

        let zero = surprise(Some(100.0), Some(100.0));
        assert_eq!(zero, Surprise::Available(0.0));
        assert_ne!(zero, Surprise::Unavailable);
        assert_eq!(zero.direction(), SurpriseDirection::InLine);
    }

    #[test]
    fn test_surprise_direction_and_percent() {
        assert_eq!(surprise(Some(3.9), Some(4.0)).direction(), SurpriseDirection::Miss);
        assert_eq!(surprise(Some(4.1), Some(4.0)).direction(), SurpriseDirection::Beat);
        assert_eq!(Surprise::Unavailable.direction(), SurpriseDirection::Unknown);

        assert_eq!(surprise_percent(Some(105.0), Some(100.0)), Some(5.0));
        assert_eq!(surprise_percent(Some(-0.2), Some(-0.1)).map(|p| p.round()), Some(-100.0));
        assert_eq!(surprise_percent(Some(1.0), Some(0.0)), None);
        assert_eq!(surprise_percent(None, Some(1.0)), None);
    }

    #[test]
    fn test_overflowing_surprise_is_unavailable() {
        let overflow = surprise(Some(1e308), Some(-1e308));
        assert_eq!(overflow, Surprise::Unavailable);
        assert!(!overflow.is_available());
        assert_eq!(overflow.direction(), SurpriseDirection::Unknown);

        assert_eq!(surprise_percent(Some(1e308), Some(-1e308)), None);
        assert_eq!(surprise_percent(Some(1e308), Some(1e-308)), None);
    }

    #[test]
    fn test_surprise_serializes_as_nullable_number() {
        assert_eq!(serde_json::to_value(Surprise::Available(5.0)).unwrap(), serde_json::json!(5.0));
        assert_eq!(serde_json::to_value(Surprise::Unavailable).unwrap(), serde_json::Value::Null);
    }
}
