//! Property checks for the statistics engine through the public API

use shared::statistics::{classify, classify_with, summarize, Thresholds, ThresholdMethod};
use shared::VolatilityCategory;

/// Deterministic pseudo-random volatility series
fn generate_values(seed: u64, count: usize) -> Vec<f64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 10_000) as f64 / 1_000.0
        })
        .collect()
}

#[test]
fn test_classification_partitions_input() {
    for (seed, count) in [(1, 1), (2, 2), (3, 3), (4, 10), (5, 57), (6, 250)] {
        let values = generate_values(seed, count);
        let result = classify(&values).unwrap();

        assert_eq!(result.values.len(), values.len());
        let total = VolatilityCategory::ALL
            .iter()
            .map(|c| result.count(*c))
            .sum::<usize>();
        assert_eq!(total, values.len());

        let mut regrouped: Vec<f64> = VolatilityCategory::ALL
            .iter()
            .flat_map(|c| result.members(*c))
            .collect();
        let mut original = values.clone();
        regrouped.sort_by(f64::total_cmp);
        original.sort_by(f64::total_cmp);
        assert_eq!(regrouped, original);
    }
}

#[test]
fn test_classification_ignores_input_order() {
    let values = generate_values(42, 40);
    let mut reversed = values.clone();
    reversed.reverse();

    let forward = classify(&values).unwrap();
    let backward = classify(&reversed).unwrap();
    assert_eq!(forward.thresholds, backward.thresholds);

    for category in VolatilityCategory::ALL {
        let mut a = forward.members(category);
        let mut b = backward.members(category);
        a.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        assert_eq!(a, b);
    }
}

#[test]
fn test_buckets_respect_thresholds() {
    let values = generate_values(7, 120);
    let result = classify(&values).unwrap();
    let Thresholds { low, high } = result.thresholds;
    assert!(low <= high);

    for classified in &result.values {
        match classified.category {
            VolatilityCategory::Low => assert!(classified.value < low),
            VolatilityCategory::Medium => {
                assert!(classified.value >= low && classified.value <= high)
            }
            VolatilityCategory::High => assert!(classified.value > high),
        }
    }
}

#[test]
fn test_summary_brackets_thresholds() {
    let values = generate_values(9, 80);
    let summary = summarize(&values).unwrap();
    let thresholds = Thresholds::from_values(&values).unwrap();

    assert_eq!(summary.count, 80);
    assert!(summary.min <= thresholds.low);
    assert!(thresholds.low <= summary.median);
    assert!(summary.median <= thresholds.high);
    assert!(thresholds.high <= summary.max);
    assert!(summary.std_dev.unwrap() >= 0.0);
}

#[test]
fn test_absolute_method_uses_fixed_thresholds() {
    let values = generate_values(11, 30);
    let method = ThresholdMethod::Absolute { low: 2.0, high: 6.0 };
    let result = classify_with(&values, method).unwrap();

    assert_eq!(result.thresholds, Thresholds { low: 2.0, high: 6.0 });
    assert_eq!(result.method, method);
    assert_eq!(result.values.len(), 30);
}
