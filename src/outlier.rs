use crate::types::MovieRecord;
use crate::util::quantile;
use tracing::debug;

/// Capability seam for outlier flagging: ROI values in, per-value flags
/// out. The pipeline depends only on this trait, so the IQR rule below can
/// be swapped for a model-based strategy without touching the stages.
pub trait OutlierDetector {
    /// Returns one flag per input value, in input order.
    fn flag(&self, values: &[f64]) -> Vec<bool>;
}

/// Tukey-fence detector: values outside
/// `[Q1 - k*IQR, Q3 + k*IQR]` are outliers, with quartiles taken by
/// `util::quantile`'s empirical interpolation.
#[derive(Debug, Clone)]
pub struct IqrDetector {
    pub multiplier: f64,
}

impl Default for IqrDetector {
    fn default() -> Self {
        IqrDetector { multiplier: 1.5 }
    }
}

impl OutlierDetector for IqrDetector {
    fn flag(&self, values: &[f64]) -> Vec<bool> {
        if values.is_empty() {
            return Vec::new();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        // Both quantiles exist for a non-empty slice.
        let q1 = quantile(&sorted, 0.25).unwrap_or(sorted[0]);
        let q3 = quantile(&sorted, 0.75).unwrap_or(sorted[sorted.len() - 1]);
        let iqr = q3 - q1;
        // Zero spread (identical or near-identical quartiles) gives fences
        // of zero width; flagging against them would mark everything, so
        // the whole view passes as normal instead.
        if iqr.abs() < f64::EPSILON {
            return vec![false; values.len()];
        }
        let lower = q1 - self.multiplier * iqr;
        let upper = q3 + self.multiplier * iqr;
        debug!(q1, q3, lower, upper, n = values.len(), "iqr fences");
        values.iter().map(|v| *v < lower || *v > upper).collect()
    }
}

/// Recompute every record's `is_outlier` against the distribution of this
/// record set alone. Bounds are scoped to the slice the caller passes in: a
/// film can be an outlier in one filtered view and normal in another.
/// Records without an ROI are never outliers.
pub fn apply_flags(records: &mut [MovieRecord], detector: &dyn OutlierDetector) {
    let values: Vec<f64> = records.iter().filter_map(|r| r.roi).collect();
    let flags = detector.flag(&values);
    let mut next = flags.into_iter();
    for rec in records.iter_mut() {
        rec.is_outlier = match rec.roi {
            Some(_) => next.next().unwrap_or(false),
            None => false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MovieRecord, MovieType};

    fn rec(title: &str, roi: Option<f64>) -> MovieRecord {
        MovieRecord {
            title: title.into(),
            publisher: "Marvel".into(),
            release_year: None,
            budget: None,
            gross_worldwide: None,
            roi,
            budget_tier: None,
            movie_type: MovieType::Origin,
            is_outlier: false,
        }
    }

    #[test]
    fn flags_only_the_extreme_value() {
        let detector = IqrDetector::default();
        let flags = detector.flag(&[-0.9, 0.1, 0.2, 0.3, 18.5]);
        assert_eq!(flags, vec![false, false, false, false, true]);
    }

    #[test]
    fn zero_iqr_flags_nothing() {
        let detector = IqrDetector::default();
        assert_eq!(
            detector.flag(&[2.0, 2.0, 2.0, 2.0]),
            vec![false, false, false, false]
        );
        // Identical quartiles despite one extreme value: the guard wins.
        assert_eq!(
            detector.flag(&[5.0, 5.0, 5.0, 5.0, 100.0]),
            vec![false, false, false, false, false]
        );
    }

    #[test]
    fn tiny_and_empty_sets_flag_nothing() {
        let detector = IqrDetector::default();
        assert!(detector.flag(&[]).is_empty());
        assert_eq!(detector.flag(&[7.5]), vec![false]);
        assert_eq!(detector.flag(&[1.0, 1.0, 2.0, 2.0]), vec![false; 4]);
    }

    #[test]
    fn null_roi_records_are_never_outliers() {
        let mut records = vec![
            rec("a", Some(-0.9)),
            rec("b", None),
            rec("c", Some(0.1)),
            rec("d", Some(0.2)),
            rec("e", Some(0.3)),
            rec("f", Some(18.5)),
        ];
        apply_flags(&mut records, &IqrDetector::default());
        let flagged: Vec<&str> = records
            .iter()
            .filter(|r| r.is_outlier)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(flagged, vec!["f"]);
    }

    #[test]
    fn flags_depend_on_the_view() {
        let detector = IqrDetector::default();
        let full = [-0.9, 0.1, 0.2, 0.3, 18.5, 17.0, 16.0, 19.0];
        let narrow = [-0.9, 0.1, 0.2, 0.3, 18.5];
        // In the wide view the big values are company; in the narrow view
        // 18.5 stands alone.
        assert!(!detector.flag(&full)[4]);
        assert!(detector.flag(&narrow)[4]);
    }
}
