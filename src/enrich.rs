use crate::schema::BaseRecord;
use crate::types::{BudgetTier, MovieRecord, MovieType};
use crate::util::{parse_i32_safe, parse_money, year_of_date};

const TIER_MEDIUM_FLOOR: f64 = 100_000_000.0;
const TIER_HIGH_FLOOR: f64 = 200_000_000.0;

/// Default sequel markers: sequel numerals, roman numerals, and
/// franchise-specific continuation titles. Matching is case-sensitive
/// substring, so a "2" anywhere in a title counts. That over-matching is a
/// known property of the heuristic, kept as-is.
const DEFAULT_SEQUEL_KEYWORDS: &[&str] = &[
    "2", "3", "II", "III", "Civil War", "Endgame", "Infinity", "Age of",
];

/// Keyword list driving the origin-vs-sequel classification. Held as data
/// so the list can be swapped or extended without touching pipeline logic.
#[derive(Debug, Clone)]
pub struct SequelKeywords {
    keywords: Vec<String>,
}

impl SequelKeywords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SequelKeywords {
            keywords: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, title: &str) -> MovieType {
        if self.keywords.iter().any(|k| title.contains(k.as_str())) {
            MovieType::Sequel
        } else {
            MovieType::Origin
        }
    }
}

impl Default for SequelKeywords {
    fn default() -> Self {
        SequelKeywords::new(DEFAULT_SEQUEL_KEYWORDS.iter().copied())
    }
}

/// `(gross - budget) / budget`, or `None` whenever the denominator cannot
/// carry it: zero, negative, missing or unparseable budget, or missing
/// gross. Records with `None` stay in the table for non-ROI views.
pub fn compute_roi(budget: Option<f64>, gross_worldwide: Option<f64>) -> Option<f64> {
    match (budget, gross_worldwide) {
        (Some(b), Some(g)) if b > 0.0 => Some((g - b) / b),
        _ => None,
    }
}

/// Tier bounds are inclusive below, exclusive above: exactly 100M is
/// `Medium`, exactly 200M is `High`.
pub fn budget_tier(budget: Option<f64>) -> Option<BudgetTier> {
    let b = budget?;
    Some(if b < TIER_MEDIUM_FLOOR {
        BudgetTier::Low
    } else if b < TIER_HIGH_FLOOR {
        BudgetTier::Medium
    } else {
        BudgetTier::High
    })
}

/// Turn one base record into a `MovieRecord` with all per-record derived
/// fields filled in. `is_outlier` starts out false; only the detector may
/// set it, and only against a concrete view.
pub fn enrich(base: &BaseRecord, keywords: &SequelKeywords) -> MovieRecord {
    let budget = parse_money(Some(base.budget.as_str()));
    let gross_worldwide = parse_money(Some(base.gross_worldwide.as_str()));
    let release_year = parse_i32_safe(base.release_year.as_deref())
        .or_else(|| year_of_date(base.release_date.as_deref()));

    MovieRecord {
        title: base.title.clone(),
        publisher: base.publisher.clone(),
        release_year,
        roi: compute_roi(budget, gross_worldwide),
        budget_tier: budget_tier(budget),
        movie_type: keywords.classify(&base.title),
        budget,
        gross_worldwide,
        is_outlier: false,
    }
}

pub fn enrich_all(bases: &[BaseRecord], keywords: &SequelKeywords) -> Vec<MovieRecord> {
    bases.iter().map(|b| enrich(b, keywords)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    impl BaseRecord {
        fn bare(title: &str, publisher: &str, budget: &str, gross: &str) -> Self {
            BaseRecord {
                title: title.into(),
                publisher: publisher.into(),
                release_year: None,
                release_date: None,
                budget: budget.into(),
                gross_worldwide: gross.into(),
            }
        }
    }

    #[test]
    fn roi_follows_the_formula() {
        let roi = compute_roi(Some(140_000_000.0), Some(585_366_247.0)).unwrap();
        assert!((roi - 3.1812).abs() < 1e-4);
        let roi = compute_roi(Some(55_000_000.0), Some(1_074_251_311.0)).unwrap();
        assert!((roi - 18.5318).abs() < 1e-4);
    }

    #[test]
    fn roi_is_none_on_bad_denominators() {
        assert_eq!(compute_roi(None, Some(1.0)), None);
        assert_eq!(compute_roi(Some(0.0), Some(1.0)), None);
        assert_eq!(compute_roi(Some(-5.0), Some(1.0)), None);
        assert_eq!(compute_roi(Some(5.0), None), None);
    }

    #[test]
    fn tier_bounds_are_lower_inclusive() {
        assert_eq!(budget_tier(Some(55_000_000.0)), Some(BudgetTier::Low));
        assert_eq!(budget_tier(Some(100_000_000.0)), Some(BudgetTier::Medium));
        assert_eq!(budget_tier(Some(199_999_999.0)), Some(BudgetTier::Medium));
        assert_eq!(budget_tier(Some(200_000_000.0)), Some(BudgetTier::High));
        assert_eq!(budget_tier(None), None);
    }

    #[test]
    fn sequel_keywords_classify_known_titles() {
        let kw = SequelKeywords::default();
        assert_eq!(kw.classify("Avengers: Endgame"), MovieType::Sequel);
        assert_eq!(kw.classify("Captain America: Civil War"), MovieType::Sequel);
        assert_eq!(kw.classify("Iron Man 2"), MovieType::Sequel);
        assert_eq!(kw.classify("Black Panther"), MovieType::Origin);
        assert_eq!(kw.classify("Wonder Woman"), MovieType::Origin);
    }

    #[test]
    fn keyword_list_is_swappable() {
        let kw = SequelKeywords::new(["Returns"]);
        assert_eq!(kw.classify("Batman Returns"), MovieType::Sequel);
        assert_eq!(kw.classify("Iron Man 2"), MovieType::Origin);
    }

    #[test]
    fn enrich_parses_formatted_money_and_dates() {
        let base = BaseRecord {
            title: "Joker".into(),
            publisher: "DC".into(),
            release_year: None,
            release_date: Some("2019-10-04".into()),
            budget: "$55,000,000".into(),
            gross_worldwide: "1,074,251,311".into(),
        };
        let rec = enrich(&base, &SequelKeywords::default());
        assert_eq!(rec.release_year, Some(2019));
        assert_eq!(rec.budget, Some(55_000_000.0));
        assert_eq!(rec.budget_tier, Some(BudgetTier::Low));
        assert_eq!(rec.movie_type, MovieType::Origin);
        assert!(rec.roi.is_some());
    }

    #[test]
    fn enrichment_is_idempotent() {
        let bases = vec![
            BaseRecord::bare("Iron Man", "Marvel", "140000000", "585366247"),
            BaseRecord::bare("Joker", "DC", "55000000", "1074251311"),
            BaseRecord::bare("Mystery", "DC", "n/a", "12"),
        ];
        let kw = SequelKeywords::default();
        assert_eq!(enrich_all(&bases, &kw), enrich_all(&bases, &kw));
    }
}
