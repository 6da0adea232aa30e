use serde::Serialize;
use std::fmt;
use tabled::Tabled;

use crate::util::{format_int, format_opt};

/// Coarse bucket of film cost, split at 100M and 200M (lower bound
/// inclusive, upper exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetTier::Low => write!(f, "Low"),
            BudgetTier::Medium => write!(f, "Medium"),
            BudgetTier::High => write!(f, "High"),
        }
    }
}

/// Keyword-based guess at whether a title starts a franchise or continues
/// one. False positives are expected (any "2" in the title matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MovieType {
    Origin,
    Sequel,
}

impl fmt::Display for MovieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieType::Origin => write!(f, "Origin"),
            MovieType::Sequel => write!(f, "Sequel"),
        }
    }
}

/// One normalized source row.
///
/// `roi`, `budget_tier`, `movie_type` and `is_outlier` are always derived
/// from the base fields (and, for `is_outlier`, from the surrounding record
/// set); they are never read from the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub publisher: String,
    pub release_year: Option<i32>,
    pub budget: Option<f64>,
    pub gross_worldwide: Option<f64>,
    pub roi: Option<f64>,
    pub budget_tier: Option<BudgetTier>,
    pub movie_type: MovieType,
    pub is_outlier: bool,
}

/// Per-publisher summary used for the primary ranking report.
#[derive(Debug, Clone, PartialEq)]
pub struct PublisherSummary {
    pub publisher: String,
    pub films: usize,
    pub films_with_roi: usize,
    pub mean_roi: Option<f64>,
    /// Median ROI over the N most recently released films of the group.
    pub median_recent_roi: Option<f64>,
}

/// Count/mean pair for the secondary breakdowns (tier, type, year).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary<K> {
    pub publisher: String,
    pub key: K,
    pub films: usize,
    pub mean_roi: Option<f64>,
}

/// One entry of the top/bottom-N film ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmRank {
    pub rank: usize,
    pub title: String,
    pub publisher: String,
    pub release_year: Option<i32>,
    pub roi: f64,
    pub budget_tier: Option<BudgetTier>,
    pub movie_type: MovieType,
    pub is_outlier: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PublisherRankingRow {
    #[serde(rename = "Publisher")]
    #[tabled(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Films")]
    #[tabled(rename = "Films")]
    pub films: usize,
    #[serde(rename = "FilmsWithROI")]
    #[tabled(rename = "FilmsWithROI")]
    pub films_with_roi: usize,
    #[serde(rename = "MeanROI")]
    #[tabled(rename = "MeanROI")]
    pub mean_roi: String,
    #[serde(rename = "MedianRecentROI")]
    #[tabled(rename = "MedianRecentROI")]
    pub median_recent_roi: String,
}

impl From<&PublisherSummary> for PublisherRankingRow {
    fn from(s: &PublisherSummary) -> Self {
        PublisherRankingRow {
            publisher: s.publisher.clone(),
            films: s.films,
            films_with_roi: s.films_with_roi,
            mean_roi: format_opt(s.mean_roi, 4),
            median_recent_roi: format_opt(s.median_recent_roi, 4),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TierBreakdownRow {
    #[serde(rename = "Publisher")]
    #[tabled(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "BudgetTier")]
    #[tabled(rename = "BudgetTier")]
    pub budget_tier: String,
    #[serde(rename = "Films")]
    #[tabled(rename = "Films")]
    pub films: usize,
    #[serde(rename = "MeanROI")]
    #[tabled(rename = "MeanROI")]
    pub mean_roi: String,
}

impl From<&GroupSummary<Option<BudgetTier>>> for TierBreakdownRow {
    fn from(s: &GroupSummary<Option<BudgetTier>>) -> Self {
        TierBreakdownRow {
            publisher: s.publisher.clone(),
            budget_tier: s.key.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
            films: s.films,
            mean_roi: format_opt(s.mean_roi, 4),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TypeBreakdownRow {
    #[serde(rename = "Publisher")]
    #[tabled(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "MovieType")]
    #[tabled(rename = "MovieType")]
    pub movie_type: String,
    #[serde(rename = "Films")]
    #[tabled(rename = "Films")]
    pub films: usize,
    #[serde(rename = "MeanROI")]
    #[tabled(rename = "MeanROI")]
    pub mean_roi: String,
}

impl From<&GroupSummary<MovieType>> for TypeBreakdownRow {
    fn from(s: &GroupSummary<MovieType>) -> Self {
        TypeBreakdownRow {
            publisher: s.publisher.clone(),
            movie_type: s.key.to_string(),
            films: s.films,
            mean_roi: format_opt(s.mean_roi, 4),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearTrendRow {
    #[serde(rename = "Publisher")]
    #[tabled(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "ReleaseYear")]
    #[tabled(rename = "ReleaseYear")]
    pub release_year: String,
    #[serde(rename = "Films")]
    #[tabled(rename = "Films")]
    pub films: usize,
    #[serde(rename = "MeanROI")]
    #[tabled(rename = "MeanROI")]
    pub mean_roi: String,
}

impl From<&GroupSummary<Option<i32>>> for YearTrendRow {
    fn from(s: &GroupSummary<Option<i32>>) -> Self {
        YearTrendRow {
            publisher: s.publisher.clone(),
            release_year: s.key.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            films: s.films,
            mean_roi: format_opt(s.mean_roi, 4),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FilmRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publisher")]
    #[tabled(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "ReleaseYear")]
    #[tabled(rename = "ReleaseYear")]
    pub release_year: String,
    #[serde(rename = "ROI")]
    #[tabled(rename = "ROI")]
    pub roi: String,
    #[serde(rename = "BudgetTier")]
    #[tabled(rename = "BudgetTier")]
    pub budget_tier: String,
    #[serde(rename = "MovieType")]
    #[tabled(rename = "MovieType")]
    pub movie_type: String,
    #[serde(rename = "Outlier")]
    #[tabled(rename = "Outlier")]
    pub outlier: String,
}

impl From<&FilmRank> for FilmRankingRow {
    fn from(r: &FilmRank) -> Self {
        FilmRankingRow {
            rank: r.rank,
            title: r.title.clone(),
            publisher: r.publisher.clone(),
            release_year: r.release_year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            roi: format_opt(Some(r.roi), 4),
            budget_tier: r.budget_tier.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
            movie_type: r.movie_type.to_string(),
            outlier: if r.is_outlier { "Outlier" } else { "Normal" }.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_films: usize,
    pub publisher_count: usize,
    pub films_with_roi: usize,
    pub outlier_count: usize,
    pub mean_roi: Option<f64>,
}

impl SummaryStats {
    pub fn headline(&self) -> String {
        format!(
            "{} films across {} publishers, {} with usable ROI, {} outliers",
            format_int(self.total_films as i64),
            format_int(self.publisher_count as i64),
            format_int(self.films_with_roi as i64),
            format_int(self.outlier_count as i64)
        )
    }
}
