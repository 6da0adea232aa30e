use crate::types::{
    BudgetTier, FilmRank, GroupSummary, MovieRecord, MovieType, PublisherSummary, SummaryStats,
};
use crate::util::{average, median};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// How many most-recent films feed the median in the publisher ranking.
pub const DEFAULT_RECENT_WINDOW: usize = 15;

// Descending compare that always sorts missing statistics last.
fn cmp_stat_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Newest first; records without a year can never displace a dated film.
fn cmp_year_desc(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Primary publisher ranking: per publisher, film counts, mean ROI over all
/// films with a usable ROI, and the median ROI of the `recent_window` most
/// recently released films (stable sort, so equal years keep source row
/// order). Output is sorted by the median statistic descending, groups
/// without one last, ties by publisher name.
pub fn publisher_ranking(data: &[MovieRecord], recent_window: usize) -> Vec<PublisherSummary> {
    #[derive(Default)]
    struct Acc {
        films: usize,
        rois: Vec<f64>,
        by_release: Vec<(Option<i32>, Option<f64>)>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.publisher.as_str()).or_default();
        e.films += 1;
        if let Some(roi) = r.roi {
            e.rois.push(roi);
        }
        e.by_release.push((r.release_year, r.roi));
    }

    let mut out: Vec<PublisherSummary> = map
        .into_iter()
        .map(|(publisher, mut acc)| {
            acc.by_release.sort_by(|a, b| cmp_year_desc(a.0, b.0));
            let recent_rois: Vec<f64> = acc
                .by_release
                .iter()
                .take(recent_window)
                .filter_map(|(_, roi)| *roi)
                .collect();
            PublisherSummary {
                publisher: publisher.to_string(),
                films: acc.films,
                films_with_roi: acc.rois.len(),
                mean_roi: average(&acc.rois),
                median_recent_roi: median(recent_rois),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        cmp_stat_desc(a.median_recent_roi, b.median_recent_roi)
            .then_with(|| a.publisher.cmp(&b.publisher))
    });
    out
}

// Shared grouping for the secondary breakdowns: count + mean ROI per
// (publisher, key), sorted by mean descending, missing means last, ties by
// group key ascending.
fn group_mean<K, F>(data: &[MovieRecord], key_of: F) -> Vec<GroupSummary<K>>
where
    K: Ord,
    F: Fn(&MovieRecord) -> K,
{
    #[derive(Default)]
    struct Acc {
        films: usize,
        rois: Vec<f64>,
    }

    let mut map: BTreeMap<(String, K), Acc> = BTreeMap::new();
    for r in data {
        let e = map
            .entry((r.publisher.clone(), key_of(r)))
            .or_insert_with(Acc::default);
        e.films += 1;
        if let Some(roi) = r.roi {
            e.rois.push(roi);
        }
    }

    let mut out: Vec<GroupSummary<K>> = map
        .into_iter()
        .map(|((publisher, key), acc)| GroupSummary {
            publisher,
            key,
            films: acc.films,
            mean_roi: average(&acc.rois),
        })
        .collect();

    out.sort_by(|a, b| {
        cmp_stat_desc(a.mean_roi, b.mean_roi)
            .then_with(|| a.publisher.cmp(&b.publisher))
            .then_with(|| a.key.cmp(&b.key))
    });
    out
}

pub fn tier_breakdown(data: &[MovieRecord]) -> Vec<GroupSummary<Option<BudgetTier>>> {
    group_mean(data, |r| r.budget_tier)
}

pub fn type_breakdown(data: &[MovieRecord]) -> Vec<GroupSummary<MovieType>> {
    group_mean(data, |r| r.movie_type)
}

pub fn year_trend(data: &[MovieRecord]) -> Vec<GroupSummary<Option<i32>>> {
    group_mean(data, |r| r.release_year)
}

fn rank_films(data: &[MovieRecord], n: usize, best_first: bool) -> Vec<FilmRank> {
    let mut ranked: Vec<(&MovieRecord, f64)> =
        data.iter().filter_map(|r| r.roi.map(|roi| (r, roi))).collect();
    ranked.sort_by(|a, b| {
        let ord = b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal);
        if best_first {
            ord
        } else {
            ord.reverse()
        }
    });
    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, (r, roi))| FilmRank {
            rank: idx + 1,
            title: r.title.clone(),
            publisher: r.publisher.clone(),
            release_year: r.release_year,
            roi,
            budget_tier: r.budget_tier,
            movie_type: r.movie_type,
            is_outlier: r.is_outlier,
        })
        .collect()
}

/// Films with the highest ROI, best first. Films without an ROI never rank.
pub fn top_films_by_roi(data: &[MovieRecord], n: usize) -> Vec<FilmRank> {
    rank_films(data, n, true)
}

/// Films with the lowest ROI, worst first.
pub fn bottom_films_by_roi(data: &[MovieRecord], n: usize) -> Vec<FilmRank> {
    rank_films(data, n, false)
}

pub fn summary_stats(data: &[MovieRecord]) -> SummaryStats {
    let publishers: HashSet<&str> = data.iter().map(|r| r.publisher.as_str()).collect();
    let rois: Vec<f64> = data.iter().filter_map(|r| r.roi).collect();
    SummaryStats {
        total_films: data.len(),
        publisher_count: publishers.len(),
        films_with_roi: rois.len(),
        outlier_count: data.iter().filter(|r| r.is_outlier).count(),
        mean_roi: average(&rois),
    }
}
