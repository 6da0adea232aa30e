use crate::cache::{CachedLoad, LoadCache, SourceKey};
use crate::enrich::{enrich_all, SequelKeywords};
use crate::error::Result;
use crate::loader;
use crate::outlier::{self, OutlierDetector};
use crate::schema::{self, NormalizeReport};
use crate::types::MovieRecord;
use std::path::Path;
use tracing::info;

/// Outcome of a load: the enriched record set plus normalize diagnostics.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub records: Vec<MovieRecord>,
    pub report: NormalizeReport,
    pub from_cache: bool,
}

/// Wires the stages together: loader -> normalizer -> enrichment, with an
/// optionally injected read-through cache. Fully synchronous; every stage
/// consumes the whole output of the previous one, and a structural failure
/// is terminal for the run.
#[derive(Debug, Default)]
pub struct Pipeline {
    keywords: SequelKeywords,
    cache: Option<LoadCache>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn with_keywords(mut self, keywords: SequelKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_cache(mut self, cache: LoadCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve raw bytes into enriched records, consulting the cache by
    /// content hash first when one is attached.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<LoadResult> {
        let key = SourceKey::of(bytes);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                info!(key = key.as_str(), "load served from cache");
                return Ok(LoadResult {
                    records: hit.records.clone(),
                    report: hit.report.clone(),
                    from_cache: true,
                });
            }
        }

        let table = loader::load_bytes(bytes)?;
        let (bases, report) = schema::build_records(&table)?;
        let records = enrich_all(&bases, &self.keywords);
        info!(
            rows = report.total_rows,
            kept = report.kept_rows,
            "records enriched"
        );

        if let Some(cache) = &mut self.cache {
            cache.insert(
                key,
                CachedLoad {
                    records: records.clone(),
                    report: report.clone(),
                },
            );
        }
        Ok(LoadResult {
            records,
            report,
            from_cache: false,
        })
    }

    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadResult> {
        let bytes = std::fs::read(path.as_ref()).map_err(crate::error::LoadError::Io)?;
        self.load_bytes(&bytes)
    }
}

/// Filter predicates the presentation layer applies before outlier
/// detection and aggregation.
#[derive(Debug, Clone)]
pub struct ViewFilter {
    /// Keep only these publishers (case-sensitive exact match). `None`
    /// keeps everything.
    pub publishers: Option<Vec<String>>,
    /// Inclusive year bounds. A bound excludes records without a release
    /// year, since their membership cannot be established.
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    /// When false, records flagged by the detector are removed from the
    /// view after flagging.
    pub include_outliers: bool,
}

impl Default for ViewFilter {
    fn default() -> Self {
        ViewFilter {
            publishers: None,
            year_min: None,
            year_max: None,
            include_outliers: true,
        }
    }
}

impl ViewFilter {
    fn keeps(&self, r: &MovieRecord) -> bool {
        if let Some(pubs) = &self.publishers {
            if !pubs.iter().any(|p| *p == r.publisher) {
                return false;
            }
        }
        if self.year_min.is_some() || self.year_max.is_some() {
            let Some(year) = r.release_year else {
                return false;
            };
            if self.year_min.is_some_and(|min| year < min) {
                return false;
            }
            if self.year_max.is_some_and(|max| year > max) {
                return false;
            }
        }
        true
    }
}

/// Build the view the aggregator runs over: apply the filter, then flag
/// outliers against this subset only. Fences come from the filtered
/// distribution, so the same film can be an outlier in one view and normal
/// in another; callers wanting global fences must pass the full set.
pub fn build_view(
    records: &[MovieRecord],
    filter: &ViewFilter,
    detector: &dyn OutlierDetector,
) -> Vec<MovieRecord> {
    let mut view: Vec<MovieRecord> = records.iter().filter(|r| filter.keeps(r)).cloned().collect();
    outlier::apply_flags(&mut view, detector);
    if !filter.include_outliers {
        view.retain(|r| !r.is_outlier);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlier::IqrDetector;
    use crate::types::MovieType;

    const CSV: &[u8] = b"title,studio,year,budget,gross worldwide\n\
Iron Man,Marvel,2008,140000000,585366247\n\
Joker,DC,2019,55000000,1074251311\n";

    fn rec(title: &str, publisher: &str, year: Option<i32>, roi: Option<f64>) -> MovieRecord {
        MovieRecord {
            title: title.into(),
            publisher: publisher.into(),
            release_year: year,
            budget: None,
            gross_worldwide: None,
            roi,
            budget_tier: None,
            movie_type: MovieType::Origin,
            is_outlier: false,
        }
    }

    #[test]
    fn load_bytes_without_cache_reparses() {
        let mut pipeline = Pipeline::new();
        let first = pipeline.load_bytes(CSV).unwrap();
        let second = pipeline.load_bytes(CSV).unwrap();
        assert!(!first.from_cache);
        assert!(!second.from_cache);
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn cache_serves_identical_bytes() {
        let mut pipeline = Pipeline::new().with_cache(LoadCache::new());
        let first = pipeline.load_bytes(CSV).unwrap();
        let second = pipeline.load_bytes(CSV).unwrap();
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.records, second.records);
        assert_eq!(second.report.total_rows, first.report.total_rows);

        // A different source misses.
        let other = pipeline
            .load_bytes(b"title,studio,budget,gross\nShazam!,DC,100000000,366000000\n")
            .unwrap();
        assert!(!other.from_cache);
    }

    #[test]
    fn filter_restricts_publisher_and_years() {
        let records = vec![
            rec("a", "Marvel", Some(2008), Some(1.0)),
            rec("b", "Marvel", Some(2019), Some(2.0)),
            rec("c", "DC", Some(2019), Some(3.0)),
            rec("d", "Marvel", None, Some(4.0)),
        ];
        let filter = ViewFilter {
            publishers: Some(vec!["Marvel".into()]),
            year_min: Some(2010),
            year_max: Some(2020),
            include_outliers: true,
        };
        let view = build_view(&records, &filter, &IqrDetector::default());
        let titles: Vec<&str> = view.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b"]);
    }

    #[test]
    fn publisher_match_is_case_sensitive() {
        let records = vec![rec("a", "marvel", None, Some(1.0))];
        let filter = ViewFilter {
            publishers: Some(vec!["Marvel".into()]),
            ..ViewFilter::default()
        };
        let view = build_view(&records, &filter, &IqrDetector::default());
        assert!(view.is_empty());
    }

    #[test]
    fn outlier_flags_are_scoped_to_the_view() {
        let mut records = vec![
            rec("low1", "Marvel", Some(2008), Some(-0.9)),
            rec("low2", "Marvel", Some(2009), Some(0.1)),
            rec("low3", "Marvel", Some(2010), Some(0.2)),
            rec("low4", "Marvel", Some(2011), Some(0.3)),
            rec("spike", "Marvel", Some(2012), Some(18.5)),
        ];
        // Companions that normalize the spike in the full view.
        for (i, roi) in [16.0, 17.0, 19.0].iter().enumerate() {
            records.push(rec(&format!("big{i}"), "DC", Some(2013), Some(*roi)));
        }

        let detector = IqrDetector::default();
        let full = build_view(&records, &ViewFilter::default(), &detector);
        assert!(!full.iter().find(|r| r.title == "spike").unwrap().is_outlier);

        let marvel_only = ViewFilter {
            publishers: Some(vec!["Marvel".into()]),
            ..ViewFilter::default()
        };
        let narrow = build_view(&records, &marvel_only, &detector);
        assert!(narrow.iter().find(|r| r.title == "spike").unwrap().is_outlier);
    }

    #[test]
    fn excluding_outliers_drops_flagged_records() {
        let records = vec![
            rec("a", "Marvel", None, Some(-0.9)),
            rec("b", "Marvel", None, Some(0.1)),
            rec("c", "Marvel", None, Some(0.2)),
            rec("d", "Marvel", None, Some(0.3)),
            rec("e", "Marvel", None, Some(18.5)),
        ];
        let filter = ViewFilter {
            include_outliers: false,
            ..ViewFilter::default()
        };
        let view = build_view(&records, &filter, &IqrDetector::default());
        assert_eq!(view.len(), 4);
        assert!(view.iter().all(|r| r.title != "e"));
    }
}
