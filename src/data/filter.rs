use std::collections::BTreeSet;

use super::model::{Article, RecordStore};

// ---------------------------------------------------------------------------
// Filter predicate: selected classifications, year interval, selected areas
// ---------------------------------------------------------------------------

/// The three user-controlled constraints. An empty selection set matches
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub classifications: BTreeSet<String>,
    /// Inclusive `(lo, hi)`, kept with `lo <= hi`.
    pub year_range: (i32, i32),
    pub areas: BTreeSet<String>,
}

impl FilterState {
    /// Everything selected, full year range.
    pub fn all(store: &RecordStore) -> Self {
        FilterState {
            classifications: store.classifications.clone(),
            year_range: store.year_bounds,
            areas: store.evaluation_areas.clone(),
        }
    }

    /// Whether a single article passes all three constraints.
    pub fn matches(&self, article: &Article) -> bool {
        let (lo, hi) = self.year_range;
        self.classifications.contains(&article.classification)
            && (lo..=hi).contains(&article.year)
            && self.areas.contains(&article.evaluation_area)
    }

    /// True when the state selects the whole store.
    pub fn is_unconstrained(&self, store: &RecordStore) -> bool {
        *self == FilterState::all(store)
    }

    /// Set the year interval. A reversed pair is swapped and both ends are
    /// clamped to the store's year bounds.
    pub fn set_year_range(&mut self, store: &RecordStore, lo: i32, hi: i32) {
        let (min, max) = store.year_bounds;
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.year_range = (lo.clamp(min, max), hi.clamp(min, max));
    }

    /// Toggle a single classification in or out of the selection.
    pub fn toggle_classification(&mut self, value: &str) {
        toggle(&mut self.classifications, value);
    }

    /// Toggle a single evaluation area in or out of the selection.
    pub fn toggle_area(&mut self, value: &str) {
        toggle(&mut self.areas, value);
    }

    pub fn select_all_classifications(&mut self, store: &RecordStore) {
        self.classifications = store.classifications.clone();
    }

    pub fn select_no_classifications(&mut self) {
        self.classifications.clear();
    }

    pub fn select_all_areas(&mut self, store: &RecordStore) {
        self.areas = store.evaluation_areas.clone();
    }

    pub fn select_no_areas(&mut self) {
        self.areas.clear();
    }
}

fn toggle(selected: &mut BTreeSet<String>, value: &str) {
    if !selected.remove(value) {
        selected.insert(value.to_string());
    }
}

/// Return the articles that pass `filter`, in their original order.
pub fn apply<'a>(records: &'a [Article], filter: &FilterState) -> Vec<&'a Article> {
    records.iter().filter(|a| filter.matches(a)).collect()
}

/// Return indices of articles that pass `filter`.
pub fn filtered_indices(store: &RecordStore, filter: &FilterState) -> Vec<usize> {
    store
        .articles()
        .iter()
        .enumerate()
        .filter(|(_, a)| filter.matches(a))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::article;

    fn store() -> RecordStore {
        RecordStore::from_articles(vec![
            article("1", 2018, "A1", "Ensino", "Física", Some(1.0), "Sim"),
            article("2", 2019, "A2", "Engenharias", "Robótica", None, "Não"),
            article("3", 2020, "A1", "Engenharias", "Robótica", Some(2.0), "Sim"),
            article("4", 2021, "B1", "Ensino", "Química", Some(0.5), "Não"),
            article("5", 2022, "A2", "Ensino", "Física", Some(3.0), "Sim"),
        ])
        .unwrap()
    }

    fn ids(articles: &[&Article]) -> Vec<String> {
        articles.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn default_state_selects_everything() {
        let store = store();
        let filter = FilterState::all(&store);
        assert!(filter.is_unconstrained(&store));
        assert_eq!(apply(store.articles(), &filter).len(), store.len());
    }

    #[test]
    fn result_is_an_ordered_subsequence_satisfying_every_predicate() {
        let store = store();
        let mut filter = FilterState::all(&store);
        filter.toggle_classification("B1");
        filter.set_year_range(&store, 2019, 2022);
        filter.toggle_area("Ensino");
        filter.toggle_area("Ensino");

        let out = apply(store.articles(), &filter);
        assert_eq!(ids(&out), vec!["2", "3", "5"]);

        let mut cursor = store.articles().iter();
        for a in &out {
            assert!(filter.classifications.contains(&a.classification));
            assert!(a.year >= 2019 && a.year <= 2022);
            assert!(filter.areas.contains(&a.evaluation_area));
            assert!(cursor.any(|orig| std::ptr::eq(orig, *a)));
        }
        assert_eq!(filtered_indices(&store, &filter), vec![1, 2, 4]);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let store = store();
        let mut filter = FilterState::all(&store);
        filter.select_no_classifications();
        assert!(apply(store.articles(), &filter).is_empty());

        filter.select_all_classifications(&store);
        filter.select_no_areas();
        assert!(filtered_indices(&store, &filter).is_empty());

        filter.select_all_areas(&store);
        assert!(filter.is_unconstrained(&store));
    }

    #[test]
    fn year_range_is_normalised_and_clamped() {
        let store = store();
        let mut filter = FilterState::all(&store);
        filter.set_year_range(&store, 2030, 2019);
        assert_eq!(filter.year_range, (2019, 2022));

        filter.set_year_range(&store, 1990, 1995);
        assert_eq!(filter.year_range, (2018, 2018));
        assert_eq!(ids(&apply(store.articles(), &filter)), vec!["1"]);
    }

    #[test]
    fn year_range_excluding_all_records_yields_empty() {
        let store = store();
        let filter = FilterState {
            year_range: (2000, 2001),
            ..FilterState::all(&store)
        };
        assert!(apply(store.articles(), &filter).is_empty());
    }
}
