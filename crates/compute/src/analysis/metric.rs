use regions::RegionRecord;

/// Min/max of the active metric over the visible region set.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// Scans the visible records for the metric range; non-finite values are
/// ignored and an empty series yields the `{0, 0}` default.
pub fn metric_range(records: &[&RegionRecord]) -> MetricRange {
    let mut range: Option<MetricRange> = None;
    for record in records {
        let v = record.metric_value;
        if !v.is_finite() {
            continue;
        }
        range = Some(match range {
            None => MetricRange::new(v, v),
            Some(r) => MetricRange::new(r.min.min(v), r.max.max(v)),
        });
    }
    range.unwrap_or_default()
}

/// Linear normalization of `value` into [0, 1] over [min, max].
///
/// A degenerate range (min == max) renders as mid-intensity 0.5 instead of
/// dividing by zero.
pub fn normalize_value(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.5;
    }
    (value - min) / (max - min)
}
