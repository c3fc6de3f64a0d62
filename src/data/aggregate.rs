use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::model::Article;

/// Number of specific areas plotted in the impact trend chart.
pub const TOP_AREAS: usize = 4;

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

/// One line of the impact-by-year chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaTrend {
    pub area: String,
    pub count: usize,
    /// `(year, mean impact factor)` ascending by year; years whose mean is
    /// undefined are left out.
    pub points: Vec<(i32, f64)>,
}

/// The top-areas impact chart: one series per area plus the integer year
/// ticks actually present in those areas' records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopAreaTrends {
    pub series: Vec<AreaTrend>,
    pub years: Vec<i32>,
}

/// A point of the classification vs. impact factor scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub classification: String,
    pub impact_factor: f64,
    pub evaluation_area: String,
}

/// Everything the dashboard displays for one filter state.
///
/// Means are `Option<f64>`: `None` marks a group with no defined impact
/// factor and is never coerced to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub mean_articles_per_year: Option<f64>,
    pub mean_impact_factor: Option<f64>,
    pub reference_year: i32,
    pub current_year_count: usize,
    /// Ascending by classification.
    pub classification_distribution: Vec<(String, usize)>,
    /// Ascending by classification.
    pub impact_by_classification: Vec<(String, Option<f64>)>,
    /// Descending by share, ties by label.
    pub internationalization_ratio: Vec<(String, f64)>,
    /// Ascending by year.
    pub articles_by_year: Vec<(i32, usize)>,
    pub impact_by_year_top_areas: TopAreaTrends,
    /// Ascending by mean; undefined means last.
    pub impact_by_evaluation_area: Vec<(String, Option<f64>)>,
    pub classification_vs_impact: Vec<ScatterPoint>,
    /// Descending by count, ties in first-seen order.
    pub specific_area_distribution: Vec<(String, usize)>,
    /// Ascending by `(classification, flag)`.
    pub internationalization_by_classification: Vec<(String, String, usize)>,
}

// ---------------------------------------------------------------------------
// NaN-safe mean accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            self.sum += v;
            self.n += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Mean impact factor over `articles`, ignoring undefined values.
pub fn mean_impact<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Option<f64> {
    let mut acc = MeanAcc::default();
    for a in articles {
        acc.push(a.impact_factor);
    }
    acc.mean()
}

// ---------------------------------------------------------------------------
// Individual aggregates
// ---------------------------------------------------------------------------

/// Count per key, ascending by key.
fn count_by<K: Ord>(articles: &[&Article], key: impl Fn(&Article) -> K) -> Vec<(K, usize)> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for &a in articles {
        *counts.entry(key(a)).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Mean impact factor per key, ascending by key.
fn mean_by<K: Ord>(articles: &[&Article], key: impl Fn(&Article) -> K) -> Vec<(K, Option<f64>)> {
    let mut groups: BTreeMap<K, MeanAcc> = BTreeMap::new();
    for &a in articles {
        groups.entry(key(a)).or_default().push(a.impact_factor);
    }
    groups.into_iter().map(|(k, acc)| (k, acc.mean())).collect()
}

/// Count per key, descending by count; equal counts keep first-seen order.
fn count_descending(articles: &[&Article], key: impl Fn(&Article) -> &str) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for &a in articles {
        let k = key(a);
        match slot.get(k) {
            Some(&i) => order[i].1 += 1,
            None => {
                slot.insert(k, order.len());
                order.push((k.to_string(), 1));
            }
        }
    }
    // Stable sort keeps first-seen order among ties.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

pub fn classification_distribution(articles: &[&Article]) -> Vec<(String, usize)> {
    count_by(articles, |a| a.classification.clone())
}

pub fn impact_by_classification(articles: &[&Article]) -> Vec<(String, Option<f64>)> {
    mean_by(articles, |a| a.classification.clone())
}

pub fn articles_by_year(articles: &[&Article]) -> Vec<(i32, usize)> {
    count_by(articles, |a| a.year)
}

/// Mean of the per-year counts across the distinct years present.
pub fn mean_articles_per_year(articles: &[&Article]) -> Option<f64> {
    let per_year = articles_by_year(articles);
    (!per_year.is_empty()).then(|| articles.len() as f64 / per_year.len() as f64)
}

pub fn current_year_count(articles: &[&Article], reference_year: i32) -> usize {
    articles.iter().filter(|a| a.year == reference_year).count()
}

/// Share of each internationalization label. Empty when `articles` is.
pub fn internationalization_ratio(articles: &[&Article]) -> Vec<(String, f64)> {
    let total = articles.len() as f64;
    let mut shares: Vec<(String, f64)> = count_by(articles, |a| a.internationalized.clone())
        .into_iter()
        .map(|(label, n)| (label, n as f64 / total))
        .collect();
    shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares
}

pub fn specific_area_distribution(articles: &[&Article]) -> Vec<(String, usize)> {
    count_descending(articles, |a| a.specific_area.as_str())
}

/// Impact trend per year for the `top` most frequent specific areas.
pub fn impact_by_year_top_areas(articles: &[&Article], top: usize) -> TopAreaTrends {
    let leaders: Vec<(String, usize)> = specific_area_distribution(articles)
        .into_iter()
        .take(top)
        .collect();

    let mut years = BTreeSet::new();
    let series = leaders
        .into_iter()
        .map(|(area, count)| {
            let members: Vec<&Article> = articles
                .iter()
                .copied()
                .filter(|a| a.specific_area == area)
                .collect();
            years.extend(members.iter().map(|a| a.year));
            let points = mean_by(&members, |a| a.year)
                .into_iter()
                .filter_map(|(year, mean)| mean.map(|m| (year, m)))
                .collect();
            AreaTrend {
                area,
                count,
                points,
            }
        })
        .collect();

    TopAreaTrends {
        series,
        years: years.into_iter().collect(),
    }
}

/// Mean impact per evaluation area, ascending by mean. Undefined means sort
/// after every defined one; ties fall back to the area name.
pub fn impact_by_evaluation_area(articles: &[&Article]) -> Vec<(String, Option<f64>)> {
    let mut means = mean_by(articles, |a| a.evaluation_area.clone());
    means.sort_by(|a, b| {
        let by_mean = match (a.1, b.1) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_mean.then_with(|| a.0.cmp(&b.0))
    });
    means
}

pub fn classification_vs_impact(articles: &[&Article]) -> Vec<ScatterPoint> {
    articles
        .iter()
        .filter_map(|a| {
            a.impact_factor.map(|impact_factor| ScatterPoint {
                classification: a.classification.clone(),
                impact_factor,
                evaluation_area: a.evaluation_area.clone(),
            })
        })
        .collect()
}

pub fn internationalization_by_classification(articles: &[&Article]) -> Vec<(String, String, usize)> {
    count_by(articles, |a| (a.classification.clone(), a.internationalized.clone()))
        .into_iter()
        .map(|((class, flag), n)| (class, flag, n))
        .collect()
}

// ---------------------------------------------------------------------------
// Full summary
// ---------------------------------------------------------------------------

/// Compute every statistic and chart dataset for the filtered articles.
/// Pure: the same input always yields the same summary.
pub fn summarize(articles: &[&Article], reference_year: i32) -> Summary {
    Summary {
        total_count: articles.len(),
        mean_articles_per_year: mean_articles_per_year(articles),
        mean_impact_factor: mean_impact(articles.iter().copied()),
        reference_year,
        current_year_count: current_year_count(articles, reference_year),
        classification_distribution: classification_distribution(articles),
        impact_by_classification: impact_by_classification(articles),
        internationalization_ratio: internationalization_ratio(articles),
        articles_by_year: articles_by_year(articles),
        impact_by_year_top_areas: impact_by_year_top_areas(articles, TOP_AREAS),
        impact_by_evaluation_area: impact_by_evaluation_area(articles),
        classification_vs_impact: classification_vs_impact(articles),
        specific_area_distribution: specific_area_distribution(articles),
        internationalization_by_classification: internationalization_by_classification(articles),
    }
}
