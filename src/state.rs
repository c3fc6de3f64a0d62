use crate::color::ColorMap;
use crate::config::ReferenceYear;
use crate::data::aggregate::{summarize, Summary};
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::model::{Article, RecordStore};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Colour maps for every categorical field drawn in a chart.
pub struct Palettes {
    pub classification: ColorMap,
    pub evaluation_area: ColorMap,
    pub specific_area: ColorMap,
    pub flag: ColorMap,
}

impl Palettes {
    fn new(store: &RecordStore) -> Self {
        Self {
            classification: ColorMap::new(&store.classifications),
            evaluation_area: ColorMap::new(&store.evaluation_areas),
            specific_area: ColorMap::new(&store.specific_areas),
            flag: ColorMap::pastel(&store.flags),
        }
    }
}

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Charts,
    Articles,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Shared, immutable dataset.
    pub store: &'static RecordStore,

    /// Current filter selections.
    pub filters: FilterState,

    /// Indices of articles passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Statistics and chart data for `visible_indices`.
    pub summary: Summary,

    pub reference_year: ReferenceYear,

    pub palettes: Palettes,

    pub view: View,
}

impl AppState {
    /// Start with every article selected.
    pub fn new(store: &'static RecordStore, reference_year: ReferenceYear) -> Self {
        let mut state = Self {
            store,
            filters: FilterState::all(store),
            visible_indices: Vec::new(),
            summary: Summary::default(),
            reference_year,
            palettes: Palettes::new(store),
            view: View::default(),
        };
        state.refilter();
        state
    }

    /// Articles passing the current filters, in store order.
    pub fn visible_articles(&self) -> Vec<&'static Article> {
        let articles = self.store.articles();
        self.visible_indices.iter().map(|&i| &articles[i]).collect()
    }

    /// Recompute the filtered view and the summary after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(self.store, &self.filters);
        let year = self.reference_year.resolve();
        self.summary = summarize(&self.visible_articles(), year);
        log::debug!(
            "Refiltered: {} of {} articles visible",
            self.visible_indices.len(),
            self.store.len()
        );
    }

    /// Replace the filters and recompute if they differ.
    pub fn set_filters(&mut self, filters: FilterState) {
        if filters != self.filters {
            self.filters = filters;
            self.refilter();
        }
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(FilterState::all(self.store));
    }

    /// Recompute if the reference year no longer matches the summary, e.g.
    /// the wall clock crossed into a new year while the window was open.
    /// Called once per frame.
    pub fn refresh_reference_year(&mut self) {
        let year = self.reference_year.resolve();
        if year != self.summary.reference_year {
            log::debug!(
                "Reference year changed from {} to {year}",
                self.summary.reference_year
            );
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::article;

    fn leaked_store() -> &'static RecordStore {
        let store = RecordStore::from_articles(vec![
            article("1", 2020, "A1", "Ensino", "Física", Some(1.0), "Sim"),
            article("2", 2021, "A1", "Engenharias", "Robótica", None, "Não"),
            article("3", 2021, "B1", "Ensino", "Física", Some(3.0), "Sim"),
        ])
        .unwrap();
        Box::leak(Box::new(store))
    }

    #[test]
    fn starts_with_everything_visible() {
        let state = AppState::new(leaked_store(), ReferenceYear::Pinned(2021));
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.summary.total_count, 3);
        assert_eq!(state.summary.current_year_count, 2);
        assert_eq!(state.summary.reference_year, 2021);
    }

    #[test]
    fn filter_change_recomputes_summary() {
        let mut state = AppState::new(leaked_store(), ReferenceYear::Pinned(2021));
        let mut filters = state.filters.clone();
        filters.toggle_classification("A1");
        state.set_filters(filters);

        assert_eq!(state.visible_indices, vec![2]);
        assert_eq!(state.summary.total_count, 1);
        assert_eq!(state.summary.mean_impact_factor, Some(3.0));

        state.reset_filters();
        assert_eq!(state.summary.total_count, 3);
        assert_eq!(state.summary.mean_impact_factor, Some(2.0));
    }

    #[test]
    fn summary_matches_total_of_visible_articles() {
        let mut state = AppState::new(leaked_store(), ReferenceYear::Pinned(1999));
        let mut filters = state.filters.clone();
        filters.set_year_range(state.store, 2021, 2021);
        state.set_filters(filters);

        assert_eq!(state.summary.total_count, state.visible_articles().len());
        assert_eq!(state.summary.current_year_count, 0);
    }

    #[test]
    fn reference_year_change_is_picked_up_without_a_filter_change() {
        let mut state = AppState::new(leaked_store(), ReferenceYear::Pinned(2020));
        assert_eq!(state.summary.current_year_count, 1);

        state.refresh_reference_year();
        assert_eq!(state.summary.reference_year, 2020);

        state.reference_year = ReferenceYear::Pinned(2021);
        state.refresh_reference_year();
        assert_eq!(state.summary.reference_year, 2021);
        assert_eq!(state.summary.current_year_count, 2);
        assert_eq!(state.summary.total_count, 3);
    }
}
